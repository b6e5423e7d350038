//! Battery telemetry for PICO Connect headsets and controllers.
//!
//! PICO Connect does not expose battery levels through an API, but it logs
//! every battery update it receives from the headset. This crate finds the
//! runtime's newest log file, pulls the latest battery record out of it and
//! hands normalized readings to a [`BatterySink`].
//!
//! # Pipeline
//!
//! - [`locator`]: picks the newest `pico_connect*.log` by creation time
//! - [`extractor`]: scans the log backward for the latest battery line
//! - [`mapper`]: turns vendor tags into [`DeviceType`] / [`Side`]
//! - [`driver`] and [`session`]: presence gating, polling and teardown
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pico_battery::{BatteryConfig, PicoBattery, TracingSink};
//!
//! #[tokio::main]
//! async fn main() -> pico_battery::Result<()> {
//!     let session = PicoBattery::start(BatteryConfig::default(), TracingSink).await?;
//!
//!     if session.wait_active().await {
//!         tokio::time::sleep(std::time::Duration::from_secs(30)).await;
//!     }
//!     session.teardown();
//!     Ok(())
//! }
//! ```
//!
//! ## One-off extraction
//!
//! ```rust,no_run
//! use pico_battery::{LogLocator, extractor};
//!
//! # fn main() -> pico_battery::Result<()> {
//! let locator = LogLocator::pico_connect()?;
//! if let Some(path) = locator.locate() {
//!     let snapshot = extractor::read_snapshot(&path)?;
//!     for reading in snapshot.readings() {
//!         println!("{:?}: {}%", reading.device_type, reading.percentage);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

// Core types and error handling
pub mod config;
mod error;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Log discovery and parsing
pub mod extractor;
pub mod locator;
pub mod mapper;

// Polling architecture
pub mod driver;
pub mod presence;
pub mod provider;
pub mod providers;
pub mod session;
pub mod sink;

// Core exports
pub use config::BatteryConfig;
pub use error::*;
pub use types::*;

// Main API exports
pub use driver::DriverOptions;
pub use locator::LogLocator;
pub use presence::{PresenceFlag, PresenceProbe, ProcessPresence};
pub use provider::Provider;
pub use providers::LogProvider;
pub use session::BatterySession;
pub use sink::{BatterySink, TracingSink};

use tracing::info;

/// Entry point for PICO Connect battery sessions.
///
/// Wires the production parts together: an OS process probe for presence
/// and a [`LogProvider`] over the configured log directory.
pub struct PicoBattery;

impl PicoBattery {
    /// Start tracking PICO Connect battery levels.
    ///
    /// The session starts idle and begins polling the log once the runtime
    /// process is found.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration is invalid
    /// - The file name pattern is not a valid regular expression
    /// - No log directory is configured and no per-user data directory exists
    pub async fn start<S: BatterySink>(config: BatteryConfig, sink: S) -> Result<BatterySession> {
        config.validate()?;

        let log_dir = config.resolve_log_dir()?;
        let locator = LogLocator::new(&log_dir, &config.file_pattern)?;
        let probe = ProcessPresence::new(config.process_name.clone());

        info!(
            log_dir = %log_dir.display(),
            process = %config.process_name,
            "Starting PICO Connect battery session"
        );

        Ok(BatterySession::spawn(
            LogProvider::new(locator),
            probe,
            sink,
            DriverOptions::from(&config),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn start_rejects_invalid_pattern() {
        let config = BatteryConfig {
            log_dir: Some(std::env::temp_dir()),
            file_pattern: "pico_connect(".to_string(),
            ..BatteryConfig::default()
        };

        let result = PicoBattery::start(config, TracingSink).await;
        assert!(matches!(result, Err(BatteryError::Pattern { .. })));
    }

    #[tokio::test]
    async fn start_rejects_zero_poll_interval() {
        let config = BatteryConfig {
            log_dir: Some(std::env::temp_dir()),
            poll_interval_ms: 0,
            ..BatteryConfig::default()
        };

        let result = PicoBattery::start(config, TracingSink).await;
        assert!(matches!(result, Err(BatteryError::Config { .. })));
    }

    #[tokio::test]
    async fn start_with_unknown_process_stays_idle() {
        let tmp = tempfile::tempdir().unwrap();
        let config = BatteryConfig {
            log_dir: Some(tmp.path().to_path_buf()),
            process_name: "definitely-not-pico-connect-0b1d".to_string(),
            presence_interval_ms: 10,
            poll_interval_ms: 10,
            ..BatteryConfig::default()
        };

        let session = PicoBattery::start(config, TracingSink).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        assert_eq!(session.state(), SessionState::Idle);
        session.teardown();
        assert!(session.is_torn_down());
    }
}
