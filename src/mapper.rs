//! Vendor tag to canonical device mapping
//!
//! PICO Connect tags every battery entry with a device kind and, for hand
//! controllers, a side:
//!
//! | device tag                  | side tag     | result                 |
//! |-----------------------------|--------------|------------------------|
//! | `kDeviceTypeHead`           | ignored      | `Headset`, no side     |
//! | `kDeviceTypeHandController` | `kSideLeft`  | `ControllerLeft`, Left |
//! | `kDeviceTypeHandController` | `kSideRight` | `ControllerRight`, Right |
//! | `kDeviceTypeHandController` | other/absent | dropped                |
//! | other/absent                | any          | dropped                |

use tracing::trace;

use crate::types::{
    CanonicalReading, DEVICE_TAG_HAND_CONTROLLER, DEVICE_TAG_HEAD, DeviceType, RawBatteryRecord,
    SIDE_TAG_LEFT, SIDE_TAG_RIGHT, Side,
};

/// Map one raw entry to a canonical reading.
///
/// Returns `None` for entries the pipeline has no device for. `active` and
/// `percentage` are copied as-is.
pub fn map_record(raw: &RawBatteryRecord) -> Option<CanonicalReading> {
    let reading = match raw.device_type.as_deref()? {
        DEVICE_TAG_HEAD => CanonicalReading::headset(raw.active, raw.percentage),
        DEVICE_TAG_HAND_CONTROLLER => {
            let side = map_side(raw.side.as_deref())?;
            CanonicalReading::controller(side, raw.active, raw.percentage)
        }
        other => {
            trace!(device_type = other, "Dropping entry with unknown device tag");
            return None;
        }
    };

    Some(reading)
}

fn map_side(tag: Option<&str>) -> Option<Side> {
    match tag {
        Some(SIDE_TAG_LEFT) => Some(Side::Left),
        Some(SIDE_TAG_RIGHT) => Some(Side::Right),
        other => {
            trace!(side = ?other, "Dropping controller entry with unknown side tag");
            None
        }
    }
}

/// Device type reported to the battery-level subscriber.
///
/// Left controller readings are re-resolved from their side at forwarding
/// time; every other reading passes its device type through.
pub fn forwarded_device_type(reading: &CanonicalReading) -> DeviceType {
    match reading.device_type {
        DeviceType::ControllerLeft => match reading.side {
            Some(Side::Left) => DeviceType::ControllerLeft,
            _ => DeviceType::ControllerRight,
        },
        other => other,
    }
}
