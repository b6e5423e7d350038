//! Collaborators that receive battery readings

use tracing::info;

use crate::types::DeviceType;

/// Company tag announced once the runtime is detected.
pub const COMPANY: &str = "pico";

/// Receiver of normalized battery readings.
///
/// Implementations are called from the poll task and must not block for long.
/// The calls mirror the host application's battery pipeline:
/// subscriber notification, local cache, charge prediction and branding.
pub trait BatterySink: Send + Sync + 'static {
    /// Notify battery-level subscribers.
    fn report_battery_level(&self, percentage: i32, device_type: DeviceType);

    /// Update the local battery-state cache.
    ///
    /// `side_hint` is `-1` for the headset and `0` for everything else.
    fn set_local_battery_state(&self, device_type: DeviceType, percentage: i32, side_hint: i32);

    /// Feed a headset percentage into the charge-state predictor.
    fn predict_charge_state(&self, _percentage: i32) {}

    /// Announce the detected vendor, once per session.
    fn set_company(&self, _company: &str) {}
}

/// Sink that only logs what it receives.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl BatterySink for TracingSink {
    fn report_battery_level(&self, percentage: i32, device_type: DeviceType) {
        info!(?device_type, percentage, "Battery level");
    }

    fn set_local_battery_state(&self, device_type: DeviceType, percentage: i32, side_hint: i32) {
        tracing::debug!(?device_type, percentage, side_hint, "Local battery state");
    }

    fn predict_charge_state(&self, percentage: i32) {
        tracing::debug!(percentage, "Charge prediction input");
    }

    fn set_company(&self, company: &str) {
        info!(company, "Runtime vendor detected");
    }
}

impl<S: BatterySink> BatterySink for std::sync::Arc<S> {
    fn report_battery_level(&self, percentage: i32, device_type: DeviceType) {
        (**self).report_battery_level(percentage, device_type);
    }

    fn set_local_battery_state(&self, device_type: DeviceType, percentage: i32, side_hint: i32) {
        (**self).set_local_battery_state(device_type, percentage, side_hint);
    }

    fn predict_charge_state(&self, percentage: i32) {
        (**self).predict_charge_state(percentage);
    }

    fn set_company(&self, company: &str) {
        (**self).set_company(company);
    }
}
