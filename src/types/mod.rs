//! Core types for battery telemetry.
//!
//! The types split along the pipeline:
//! - [`RawBatteryRecord`] is one entry of the JSON payload PICO Connect logs
//! - [`CanonicalReading`] is the normalized reading handed to sinks
//! - [`BatterySnapshot`] is everything one log scan produced
//! - [`LogFileCandidate`] is a matching log file seen by the locator
//! - [`SessionState`] tracks the presence/teardown lifecycle of a session
//!
//! ## Usage Example
//!
//! ```rust
//! use pico_battery::types::{BatterySnapshot, CanonicalReading, DeviceType, Side};
//!
//! let snapshot = BatterySnapshot::Entries(vec![
//!     Some(CanonicalReading::headset(true, 57)),
//!     None,
//!     Some(CanonicalReading::controller(Side::Left, true, 40)),
//! ]);
//!
//! assert_eq!(snapshot.slots().len(), 3);
//! let devices: Vec<DeviceType> = snapshot.readings().map(|r| r.device_type).collect();
//! assert_eq!(devices, vec![DeviceType::Headset, DeviceType::ControllerLeft]);
//! ```

mod candidate;
mod device;
mod reading;
mod record;
mod session_state;
mod snapshot;

pub use candidate::LogFileCandidate;
pub use device::{DeviceType, Side};
pub use reading::CanonicalReading;
pub use record::{
    DEVICE_TAG_HAND_CONTROLLER, DEVICE_TAG_HEAD, RawBatteryRecord, SIDE_TAG_LEFT, SIDE_TAG_RIGHT,
};
pub use session_state::SessionState;
pub use snapshot::{BatterySnapshot, DEGRADED_SLOT_COUNT};
