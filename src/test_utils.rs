//! Test utilities for log fixtures, sinks and scripted providers
//!
//! Shared by the unit tests and the benchmarks.

#![cfg(any(test, feature = "benchmark"))]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::Result;
use crate::provider::Provider;
use crate::sink::BatterySink;
use crate::types::{BatterySnapshot, DeviceType};

/// Timestamp prefix used by generated log lines.
pub const LOG_TIMESTAMP: &str = "[2024-05-01 10:00:00.000]";

/// A PICO Connect battery line carrying `payload`, with the trailing `\r`
/// the runtime writes.
pub fn battery_line(payload: &str) -> String {
    format!(
        "{LOG_TIMESTAMP} [info]  update battery info callback, battery_info: {payload}\r"
    )
}

/// An unrelated PICO Connect log line.
pub fn noise_line(message: &str) -> String {
    format!("{LOG_TIMESTAMP} [info]  {message}\r")
}

/// Write a log file with a header line followed by `lines`.
pub fn write_log(dir: &Path, name: &str, lines: &[String]) -> PathBuf {
    let path = dir.join(name);
    let mut content = String::from("PICO Connect log started\r\n");
    for line in lines {
        content.push_str(line);
        content.push('\n');
    }
    std::fs::write(&path, content).expect("failed to write log fixture");
    path
}

/// A large log with `noise` unrelated lines after one battery line.
pub fn synthetic_log(noise: usize) -> String {
    let mut content = String::from("PICO Connect log started\r\n");
    content.push_str(&battery_line(
        r#"[{"deviceType":"kDeviceTypeHead","side":null,"active":true,"percentage":57},{"deviceType":"kDeviceTypeHandController","side":"kSideLeft","active":true,"percentage":40},{"deviceType":"kDeviceTypeHandController","side":"kSideRight","active":true,"percentage":64}]"#,
    ));
    content.push('\n');
    for i in 0..noise {
        content.push_str(&noise_line(&format!("frame {i} submitted, latency 11ms")));
        content.push('\n');
    }
    content
}

/// One call received by a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCall {
    Level { percentage: i32, device_type: DeviceType },
    Local { device_type: DeviceType, percentage: i32, side_hint: i32 },
    Predict { percentage: i32 },
    Company(String),
}

/// Sink that records every call in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    calls: Mutex<Vec<SinkCall>>,
}

impl RecordingSink {
    /// Battery calls received so far, without company announcements.
    pub fn calls(&self) -> Vec<SinkCall> {
        self.lock().iter().filter(|call| !matches!(call, SinkCall::Company(_))).cloned().collect()
    }

    /// Company names announced so far.
    pub fn company_calls(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|call| match call {
                SinkCall::Company(company) => Some(company.clone()),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SinkCall>> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(&self, call: SinkCall) {
        self.lock().push(call);
    }
}

impl BatterySink for RecordingSink {
    fn report_battery_level(&self, percentage: i32, device_type: DeviceType) {
        self.push(SinkCall::Level { percentage, device_type });
    }

    fn set_local_battery_state(&self, device_type: DeviceType, percentage: i32, side_hint: i32) {
        self.push(SinkCall::Local { device_type, percentage, side_hint });
    }

    fn predict_charge_state(&self, percentage: i32) {
        self.push(SinkCall::Predict { percentage });
    }

    fn set_company(&self, company: &str) {
        self.push(SinkCall::Company(company.to_string()));
    }
}

/// Provider that replays a fixed script of poll results.
///
/// Once the script runs out it either repeats a snapshot or reports no source.
pub struct ScriptedProvider {
    script: VecDeque<Result<Option<BatterySnapshot>>>,
    repeat: Option<BatterySnapshot>,
    polls: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Result<Option<BatterySnapshot>>>) -> Self {
        Self { script: script.into(), repeat: None, polls: Arc::new(AtomicUsize::new(0)) }
    }

    /// Provider returning the same snapshot on every poll.
    pub fn repeating(snapshot: BatterySnapshot) -> Self {
        Self { script: VecDeque::new(), repeat: Some(snapshot), polls: Arc::new(AtomicUsize::new(0)) }
    }

    /// Shared counter of polls served so far.
    pub fn poll_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.polls)
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    async fn poll(&mut self) -> Result<Option<BatterySnapshot>> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        match self.script.pop_front() {
            Some(result) => result,
            None => Ok(self.repeat.clone()),
        }
    }
}
