//! Log file provider for PICO Connect

use std::path::PathBuf;
use tracing::{debug, info};

use crate::Result;
use crate::extractor::read_snapshot;
use crate::locator::LogLocator;
use crate::provider::Provider;
use crate::types::BatterySnapshot;

/// Provider that reads the newest PICO Connect log on every poll
pub struct LogProvider {
    /// Finds the log file currently written by the runtime
    locator: LogLocator,

    /// Log file read on the previous poll
    current_file: Option<PathBuf>,
}

impl LogProvider {
    /// Create a provider over a locator
    pub fn new(locator: LogLocator) -> Self {
        Self { locator, current_file: None }
    }

    /// Log file read on the most recent poll
    pub fn current_file(&self) -> Option<&PathBuf> {
        self.current_file.as_ref()
    }
}

#[async_trait::async_trait]
impl Provider for LogProvider {
    async fn poll(&mut self) -> Result<Option<BatterySnapshot>> {
        let Some(path) = self.locator.locate() else {
            debug!(directory = %self.locator.directory().display(), "No PICO Connect log yet");
            return Ok(None);
        };

        if self.current_file.as_ref() != Some(&path) {
            info!(file = %path.display(), "Reading PICO Connect log");
            self.current_file = Some(path.clone());
        }

        // Whole-file scan; keep it off the scheduler thread.
        let snapshot = tokio::task::spawn_blocking(move || read_snapshot(&path)).await??;

        debug!(
            readings = snapshot.readings().count(),
            degraded = snapshot.is_degraded(),
            "Extracted battery snapshot"
        );

        Ok(Some(snapshot))
    }
}
