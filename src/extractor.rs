//! Battery record extraction from PICO Connect logs
//!
//! PICO Connect logs every battery update as a free-form line with a JSON
//! array appended:
//!
//! ```text
//! [2024-05-01 10:00:00.123] [info]  update battery info callback, battery_info: [{"deviceType":"kDeviceTypeHead","side":null,"active":true,"percentage":57}]\r
//! ```
//!
//! Only the newest such line matters. The extractor reads the whole file,
//! walks it backward and decodes the first battery line it meets.
//!
//! # Malformed payloads
//!
//! When the newest battery line has a payload that fails to decode (or
//! decodes to `null` or `[]`), the scan stops and a
//! [`BatterySnapshot::Degraded`] is returned. Older, valid lines are not
//! consulted; the next poll cycle will pick up a fresh line once the runtime
//! writes one.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

use crate::mapper::map_record;
use crate::types::{BatterySnapshot, RawBatteryRecord};
use crate::{BatteryError, Result};

/// Substring identifying a battery-info callback line.
pub const BATTERY_MARKER: &str = "update battery info callback";

static BATTERY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(.*?) \[info\]  update battery info callback, battery_info: (.+)\r")
        .expect("battery line pattern is valid")
});

/// Open a log file for reading while the runtime keeps writing to it.
pub fn open_shared(path: &Path) -> Result<File> {
    let mut options = std::fs::OpenOptions::new();
    options.read(true);

    #[cfg(windows)]
    {
        use std::os::windows::fs::OpenOptionsExt;
        // FILE_SHARE_READ | FILE_SHARE_WRITE | FILE_SHARE_DELETE
        options.share_mode(0x1 | 0x2 | 0x4);
    }

    options.open(path).map_err(|e| BatteryError::file_error(path.to_path_buf(), e))
}

/// Open `path` and extract its latest battery snapshot.
pub fn read_snapshot(path: &Path) -> Result<BatterySnapshot> {
    let file = open_shared(path)?;
    extract_latest(file).map_err(|e| match e {
        BatteryError::File { source, .. } => BatteryError::file_error(path.to_path_buf(), source),
        other => other,
    })
}

/// Read everything from `reader` and extract the latest battery snapshot.
pub fn extract_latest<R: Read>(mut reader: R) -> Result<BatterySnapshot> {
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;
    let content = String::from_utf8_lossy(&buffer);

    Ok(extract_from_str(&content))
}

/// Extract the latest battery snapshot from log text.
///
/// The first line is never inspected.
pub fn extract_from_str(content: &str) -> BatterySnapshot {
    let lines: Vec<&str> = content.split('\n').collect();

    for (index, line) in lines.iter().enumerate().skip(1).rev() {
        if !line.contains(BATTERY_MARKER) {
            continue;
        }

        let Some(payload) = capture_payload(line) else {
            trace!(line = index, "Battery marker without a payload, continuing");
            continue;
        };

        debug!(line = index, bytes = payload.len(), "Found battery line");
        return decode_payload(payload);
    }

    trace!(lines = lines.len(), "No battery line in log");
    BatterySnapshot::Empty
}

/// Payload text of a battery line, if the line has the expected shape.
pub fn capture_payload(line: &str) -> Option<&str> {
    BATTERY_LINE
        .captures(line)
        .and_then(|captures| captures.get(2))
        .map(|payload| payload.as_str())
        .filter(|payload| !payload.is_empty())
}

/// Decode one payload into a snapshot.
pub fn decode_payload(payload: &str) -> BatterySnapshot {
    let entries: Vec<Option<RawBatteryRecord>> =
        match serde_json::from_str::<Option<Vec<Option<RawBatteryRecord>>>>(payload) {
            Ok(Some(entries)) if !entries.is_empty() => entries,
            Ok(_) => {
                debug!("Battery payload is null or empty, degrading");
                return BatterySnapshot::Degraded;
            }
            Err(e) => {
                debug!(error = %e, "Battery payload is malformed, degrading");
                return BatterySnapshot::Degraded;
            }
        };

    BatterySnapshot::Entries(entries.iter().map(|entry| entry.as_ref().and_then(map_record)).collect())
}
