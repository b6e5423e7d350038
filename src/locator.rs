//! Log file discovery
//!
//! PICO Connect rotates its log into `pico_connect.log`, `pico_connect1.log`,
//! `pico_connect2.log` and so on. The file currently written to is the one
//! created last, so the locator picks the newest match by creation time.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use regex::{Regex, RegexBuilder};
use tracing::{debug, trace};

use crate::types::LogFileCandidate;
use crate::{BatteryError, Result};

/// Default file name pattern of PICO Connect's rotating logs.
pub const DEFAULT_FILE_PATTERN: &str = r"^pico_connect(?:\d*)\.log$";

/// Directory name of PICO Connect under the per-user data directory.
pub const APP_DIR_NAME: &str = "PICO Connect";

/// Log directory name inside [`APP_DIR_NAME`].
pub const LOG_DIR_NAME: &str = "logs";

/// Resolve `<per-user data dir>/PICO Connect/logs`.
///
/// Returns `None` on platforms without a per-user data directory.
pub fn default_log_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join(APP_DIR_NAME).join(LOG_DIR_NAME))
}

/// Compile a file name pattern, matched case-insensitively.
pub fn compile_pattern(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| BatteryError::invalid_pattern(pattern, e))
}

/// Finds the newest log file in a directory.
#[derive(Debug, Clone)]
pub struct LogLocator {
    directory: PathBuf,
    pattern: Regex,
}

impl LogLocator {
    /// Create a locator for `directory` with a file name pattern.
    ///
    /// The directory does not need to exist yet.
    pub fn new(directory: impl Into<PathBuf>, pattern: &str) -> Result<Self> {
        Ok(Self { directory: directory.into(), pattern: compile_pattern(pattern)? })
    }

    /// Locator over the default PICO Connect log directory and file pattern.
    pub fn pico_connect() -> Result<Self> {
        let directory = default_log_dir()
            .ok_or_else(|| BatteryError::invalid_config("no per-user data directory available"))?;
        Self::new(directory, DEFAULT_FILE_PATTERN)
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of the newest matching file, if any.
    pub fn locate(&self) -> Option<PathBuf> {
        find_latest_log(&self.directory, &self.pattern)
    }
}

/// Newest file in `directory` whose name matches `pattern`.
///
/// A missing or unreadable directory yields `None`.
pub fn find_latest_log(directory: &Path, pattern: &Regex) -> Option<PathBuf> {
    let candidates = collect_candidates(directory, pattern);
    debug!(
        directory = %directory.display(),
        candidates = candidates.len(),
        "Scanned log directory"
    );

    select_newest(candidates)
}

/// Path of the candidate with the latest creation time.
///
/// On ties the first candidate wins.
pub fn select_newest(candidates: impl IntoIterator<Item = LogFileCandidate>) -> Option<PathBuf> {
    candidates
        .into_iter()
        .reduce(|newest, candidate| if candidate.created > newest.created { candidate } else { newest })
        .map(|candidate| candidate.path)
}

/// All files in `directory` whose name matches `pattern`, in enumeration order.
pub fn collect_candidates(directory: &Path, pattern: &Regex) -> Vec<LogFileCandidate> {
    let entries = match std::fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(e) => {
            trace!(directory = %directory.display(), error = %e, "Log directory not readable");
            return Vec::new();
        }
    };

    entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_name().to_str().is_some_and(|name| pattern.is_match(name))
        })
        .filter_map(|entry| {
            let metadata = entry.metadata().ok()?;
            if !metadata.is_file() {
                return None;
            }
            let created = birth_or_write_time(metadata.created(), metadata.modified());
            Some(LogFileCandidate { path: entry.path(), created })
        })
        .collect()
}

// Not every filesystem records a birth time; fall back to the last write.
fn birth_or_write_time(
    created: std::io::Result<SystemTime>,
    modified: std::io::Result<SystemTime>,
) -> SystemTime {
    created.or(modified).unwrap_or(SystemTime::UNIX_EPOCH)
}
