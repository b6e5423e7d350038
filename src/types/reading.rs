//! Normalized battery readings

use super::{DeviceType, Side};

/// A normalized `(device, side, active, percentage)` reading.
///
/// Readings are built fresh for every poll cycle and dropped once they have
/// been forwarded. `percentage` is passed through from the runtime without
/// range checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalReading {
    pub device_type: DeviceType,
    pub side: Option<Side>,
    pub active: bool,
    pub percentage: i32,
}

impl CanonicalReading {
    /// Reading for the headset (never carries a side).
    pub fn headset(active: bool, percentage: i32) -> Self {
        Self { device_type: DeviceType::Headset, side: None, active, percentage }
    }

    /// Reading for a hand controller; the device kind follows the side.
    pub fn controller(side: Side, active: bool, percentage: i32) -> Self {
        let device_type = match side {
            Side::Left => DeviceType::ControllerLeft,
            Side::Right => DeviceType::ControllerRight,
        };
        Self { device_type, side: Some(side), active, percentage }
    }

    pub fn is_headset(&self) -> bool {
        self.device_type == DeviceType::Headset
    }
}
