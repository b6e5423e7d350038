//! Provider trait for battery snapshot sources

use crate::Result;
use crate::types::BatterySnapshot;

/// Trait for battery data sources
///
/// The driver calls [`Provider::poll`] once per cycle and never overlaps two
/// calls. Providers do any blocking work off the async scheduler themselves.
#[async_trait::async_trait]
pub trait Provider: Send + 'static {
    /// Produce the current battery snapshot
    ///
    /// Returns:
    /// - `Ok(Some(snapshot))` - A source was read (the snapshot may be empty)
    /// - `Ok(None)` - No source exists yet, nothing to report this cycle
    /// - `Err(e)` - Reading the source failed
    async fn poll(&mut self) -> Result<Option<BatterySnapshot>>;
}
