//! Canonical device model shared with the battery pipeline

/// Device kinds understood by the downstream battery pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceType {
    /// Head-mounted display
    Headset,
    /// Left hand controller
    ControllerLeft,
    /// Right hand controller
    ControllerRight,
}

impl DeviceType {
    /// Integer side hint for the local battery-state cache.
    ///
    /// `-1` means "no side" (headset), `0` means "primary" (everything else).
    pub const fn side_hint(self) -> i32 {
        match self {
            DeviceType::Headset => -1,
            DeviceType::ControllerLeft | DeviceType::ControllerRight => 0,
        }
    }
}

/// Hand a controller is held in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}
