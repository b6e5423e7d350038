//! Session lifecycle states

/// Lifecycle of a battery session.
///
/// `Idle -> Active` happens once, when the runtime is first detected.
/// Losing the runtime afterwards does not move the session back to `Idle`;
/// only teardown ends the `Active` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Waiting for PICO Connect to show up.
    #[default]
    Idle,
    /// Runtime detected; log polling is live.
    Active,
    /// Torn down; no further sink calls are made.
    TornDown,
}

impl SessionState {
    pub fn is_active(self) -> bool {
        self == SessionState::Active
    }

    pub fn is_torn_down(self) -> bool {
        self == SessionState::TornDown
    }
}
