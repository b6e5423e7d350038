//! Result of scanning one log file

use super::CanonicalReading;

/// Number of absent slots a degraded snapshot exposes.
///
/// Matches the headset plus two controllers the runtime reports.
pub const DEGRADED_SLOT_COUNT: usize = 3;

/// Battery state extracted from the newest battery line of a log file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatterySnapshot {
    /// The file holds no battery line at all.
    Empty,

    /// The newest battery line carried a malformed, null or empty payload.
    ///
    /// Scanning stops there even if older lines are valid.
    Degraded,

    /// One slot per payload entry. Entries that could not be mapped
    /// (null, untagged, unknown device or side) leave a `None` slot.
    Entries(Vec<Option<CanonicalReading>>),
}

impl BatterySnapshot {
    /// Slot view of the snapshot: 0 slots when empty, three absent slots
    /// when degraded, one slot per payload entry otherwise.
    pub fn slots(&self) -> Vec<Option<CanonicalReading>> {
        match self {
            BatterySnapshot::Empty => Vec::new(),
            BatterySnapshot::Degraded => vec![None; DEGRADED_SLOT_COUNT],
            BatterySnapshot::Entries(entries) => entries.clone(),
        }
    }

    /// Iterate over the readings that were actually produced.
    pub fn readings(&self) -> impl Iterator<Item = &CanonicalReading> + '_ {
        let entries: &[Option<CanonicalReading>] = match self {
            BatterySnapshot::Entries(entries) => entries,
            BatterySnapshot::Empty | BatterySnapshot::Degraded => &[],
        };
        entries.iter().flatten()
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, BatterySnapshot::Degraded)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, BatterySnapshot::Empty)
    }
}
