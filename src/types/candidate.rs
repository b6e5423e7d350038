//! Log file candidates considered by the locator

use std::path::PathBuf;
use std::time::SystemTime;

/// A log file whose name matched the locator pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFileCandidate {
    pub path: PathBuf,
    pub created: SystemTime,
}
