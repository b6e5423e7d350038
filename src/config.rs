//! Configuration for a battery session
//!
//! Every field has a default, so an empty document is a valid configuration:
//!
//! ```yaml
//! predict_charging: true
//! log_dir: "D:/PICO Connect/logs"
//! poll_interval_ms: 5000
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::locator::{DEFAULT_FILE_PATTERN, default_log_dir};
use crate::presence::PICO_CONNECT_PROCESS;
use crate::{BatteryError, Result};

const DEFAULT_PRESENCE_INTERVAL_MS: u64 = 1_000;
const DEFAULT_POLL_INTERVAL_MS: u64 = 3_000;

/// Settings consumed by [`PicoBattery::start`](crate::PicoBattery::start).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Feed headset percentages into the charge-state predictor
    pub predict_charging: bool,

    /// Log directory override; `None` resolves the per-user default
    pub log_dir: Option<PathBuf>,

    /// Case-insensitive regex for rotated log file names
    pub file_pattern: String,

    /// Runtime process to wait for before polling
    pub process_name: String,

    /// Delay between presence checks
    pub presence_interval_ms: u64,

    /// Delay between poll cycles
    pub poll_interval_ms: u64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            predict_charging: false,
            log_dir: None,
            file_pattern: DEFAULT_FILE_PATTERN.to_string(),
            process_name: PICO_CONNECT_PROCESS.to_string(),
            presence_interval_ms: DEFAULT_PRESENCE_INTERVAL_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl BatteryConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml_ng::from_str(yaml)
                .map_err(|e| BatteryError::parse_error("battery config", e.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| BatteryError::file_error(path.to_path_buf(), e))?;
        Self::from_yaml_str(&yaml)
    }

    /// Reject values the poll loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.presence_interval_ms == 0 {
            return Err(BatteryError::invalid_config("presence_interval_ms must be non-zero"));
        }
        if self.poll_interval_ms == 0 {
            return Err(BatteryError::invalid_config("poll_interval_ms must be non-zero"));
        }
        if self.process_name.trim().is_empty() {
            return Err(BatteryError::invalid_config("process_name must not be empty"));
        }
        Ok(())
    }

    /// Configured log directory, or the per-user PICO Connect default.
    pub fn resolve_log_dir(&self) -> Result<PathBuf> {
        match &self.log_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_log_dir()
                .ok_or_else(|| BatteryError::invalid_config("no per-user data directory available")),
        }
    }

    pub fn presence_interval(&self) -> Duration {
        Duration::from_millis(self.presence_interval_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
