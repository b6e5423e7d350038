//! Raw battery entries as written by PICO Connect

use serde::Deserialize;

/// Device tag PICO Connect uses for the headset.
pub const DEVICE_TAG_HEAD: &str = "kDeviceTypeHead";

/// Device tag PICO Connect uses for both hand controllers.
pub const DEVICE_TAG_HAND_CONTROLLER: &str = "kDeviceTypeHandController";

/// Side tag of the left controller.
pub const SIDE_TAG_LEFT: &str = "kSideLeft";

/// Side tag of the right controller.
pub const SIDE_TAG_RIGHT: &str = "kSideRight";

/// One element of the `battery_info` array embedded in a log line.
///
/// Missing keys fall back to their defaults so that a partially written
/// entry still deserializes; only a structurally invalid payload fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawBatteryRecord {
    pub device_type: Option<String>,
    pub side: Option<String>,
    pub active: bool,
    pub percentage: i32,
}

impl RawBatteryRecord {
    /// Build a record from tags; mostly useful for tests and fixtures.
    pub fn new(
        device_type: Option<&str>,
        side: Option<&str>,
        active: bool,
        percentage: i32,
    ) -> Self {
        Self {
            device_type: device_type.map(str::to_owned),
            side: side.map(str::to_owned),
            active,
            percentage,
        }
    }
}
