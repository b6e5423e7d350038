//! Error types for battery telemetry extraction.
//!
//! Most of the "nothing to report" conditions of this crate are not errors at
//! all: a runtime that is not running, a log directory that does not exist yet
//! or a log without a battery line all surface as `None` or an empty
//! [`BatterySnapshot`](crate::BatterySnapshot). The variants below cover the
//! cases where something actually went wrong.
//!
//! ## Error Categories
//!
//! - **File Errors**: a located log file could not be opened or read
//! - **Parse Errors**: configuration documents that do not deserialize
//! - **Pattern Errors**: an invalid log file name pattern
//! - **Config Errors**: semantically invalid configuration values
//! - **Task Errors**: a blocking read task that panicked or was aborted
//!
//! ## Recovery and Retry
//!
//! ```rust
//! use pico_battery::BatteryError;
//!
//! let error = BatteryError::task_failed("read task was cancelled");
//! if error.is_retryable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for battery operations.
pub type Result<T, E = BatteryError> = std::result::Result<T, E>;

/// Main error type for battery operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum BatteryError {
    #[error("Log file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {context}: {details}")]
    Parse { context: String, details: String },

    #[error("Invalid log file pattern '{pattern}'")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    #[error("Background task failed: {reason}")]
    Task { reason: String },
}

impl BatteryError {
    /// Returns whether this error is potentially recoverable through retry.
    ///
    /// A log file may be rotated or still locked by the runtime, so file and
    /// task errors are worth another poll cycle. Bad configuration is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            BatteryError::File { .. } => true,
            BatteryError::Task { .. } => true,
            BatteryError::Parse { .. } => false,
            BatteryError::Pattern { .. } => false,
            BatteryError::Config { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            BatteryError::File { .. } => vec![
                "Check the PICO Connect log directory exists and is readable",
                "Wait for the runtime to finish rotating its log files",
                "Check file permissions",
            ],
            BatteryError::Parse { .. } => vec![
                "Check the configuration document is valid YAML",
                "Verify field names and value types",
            ],
            BatteryError::Pattern { .. } => vec![
                "Check the log file pattern is a valid regular expression",
                "Remove the pattern override to use the default",
            ],
            BatteryError::Config { .. } => vec![
                "Use non-zero polling intervals",
                "Set log_dir explicitly when no per-user data directory exists",
            ],
            BatteryError::Task { .. } => vec![
                "Retry on the next poll cycle",
                "Check the runtime is not shutting down",
            ],
        }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        BatteryError::File { path, source }
    }

    /// Helper constructor for parse errors.
    pub fn parse_error(context: impl Into<String>, details: impl Into<String>) -> Self {
        BatteryError::Parse { context: context.into(), details: details.into() }
    }

    /// Helper constructor for invalid file name patterns.
    pub fn invalid_pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        BatteryError::Pattern { pattern: pattern.into(), source }
    }

    /// Helper constructor for configuration errors.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        BatteryError::Config { reason: reason.into() }
    }

    /// Helper constructor for background task failures.
    pub fn task_failed(reason: impl Into<String>) -> Self {
        BatteryError::Task { reason: reason.into() }
    }
}

impl From<std::io::Error> for BatteryError {
    fn from(err: std::io::Error) -> Self {
        BatteryError::File { path: PathBuf::from("<unknown>"), source: err }
    }
}

impl From<tokio::task::JoinError> for BatteryError {
    fn from(err: tokio::task::JoinError) -> Self {
        BatteryError::Task { reason: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn error_messages_carry_their_context(
                context in "[a-z ]{1,20}",
                details in ".*",
                reason in ".*",
                file_name in "[a-z_]{1,12}\\.log"
            ) {
                let parse = BatteryError::parse_error(context.clone(), details.clone());
                let config = BatteryError::invalid_config(reason.clone());
                let task = BatteryError::task_failed(reason.clone());
                let file = BatteryError::file_error(
                    PathBuf::from(&file_name),
                    std::io::Error::other("boom"),
                );

                let parse_msg = parse.to_string();
                prop_assert!(parse_msg.contains(&context));
                prop_assert!(parse_msg.contains(&details));
                prop_assert!(config.to_string().contains(&reason));
                prop_assert!(task.to_string().contains(&reason));
                prop_assert!(file.to_string().contains(&file_name));
            }

            #[test]
            fn io_conversion_preserves_message(message in ".*") {
                let converted: BatteryError = std::io::Error::other(message.clone()).into();
                match converted {
                    BatteryError::File { source, .. } => {
                        prop_assert_eq!(source.to_string(), message);
                    }
                    _ => prop_assert!(false, "Expected File error from io::Error conversion"),
                }
            }
        }
    }

    #[test]
    fn pattern_error_chains_regex_source() {
        let source = regex::Regex::new("(unclosed").unwrap_err();
        let error = BatteryError::invalid_pattern("(unclosed", source);

        assert!(error.to_string().contains("(unclosed"));
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn error_traits_validation() {
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<BatteryError>();

        let error = BatteryError::invalid_config("test");
        let _: &dyn std::error::Error = &error;
    }

    #[test]
    fn recovery_methods_work() {
        let file_error = BatteryError::file_error(
            PathBuf::from("pico_connect.log"),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "locked"),
        );
        let config_error = BatteryError::invalid_config("poll interval must be non-zero");

        assert!(file_error.is_retryable());
        assert!(!config_error.is_retryable());

        for suggestion in file_error.recovery_suggestions() {
            assert!(suggestion.len() > 5);
        }
        assert!(!config_error.recovery_suggestions().is_empty());
    }
}
