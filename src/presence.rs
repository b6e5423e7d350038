//! Runtime presence detection

use std::ffi::OsStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System};
use tracing::{trace, warn};

/// Process name of the PICO Connect runtime.
pub const PICO_CONNECT_PROCESS: &str = "PICO Connect";

/// Answers whether the VR runtime is currently running.
#[async_trait::async_trait]
pub trait PresenceProbe: Send + 'static {
    async fn is_present(&mut self) -> bool;
}

/// Presence probe backed by the OS process list.
///
/// The process scan runs on the blocking pool.
pub struct ProcessPresence {
    process_name: String,
    // Taken while a scan is in flight.
    system: Option<System>,
}

impl ProcessPresence {
    /// Probe for a process by name (case-insensitive, `.exe` suffix ignored).
    pub fn new(process_name: impl Into<String>) -> Self {
        Self { process_name: process_name.into(), system: Some(System::new()) }
    }
}

#[async_trait::async_trait]
impl PresenceProbe for ProcessPresence {
    async fn is_present(&mut self) -> bool {
        let mut system = self.system.take().unwrap_or_else(System::new);
        let expected = self.process_name.clone();

        let scan = tokio::task::spawn_blocking(move || {
            let found = scan_processes(&mut system, &expected);
            (system, found)
        });

        match scan.await {
            Ok((system, found)) => {
                self.system = Some(system);
                trace!(process = %self.process_name, found, "Checked process list");
                found
            }
            Err(e) => {
                warn!(process = %self.process_name, error = %e, "Process scan failed");
                false
            }
        }
    }
}

fn scan_processes(system: &mut System, expected: &str) -> bool {
    system.refresh_processes_specifics(ProcessesToUpdate::All, true, ProcessRefreshKind::nothing());
    system.processes().values().any(|process| process_name_matches(process.name(), expected))
}

/// Whether an OS process name refers to `expected`.
pub fn process_name_matches(name: &OsStr, expected: &str) -> bool {
    let name = name.to_string_lossy();
    let stem = match name.len().checked_sub(4) {
        Some(split) if name.is_char_boundary(split) && name[split..].eq_ignore_ascii_case(".exe") => {
            &name[..split]
        }
        _ => &name[..],
    };
    stem.eq_ignore_ascii_case(expected)
}

/// Presence driven by a boolean the host sets, for hosts that already
/// track the runtime themselves.
#[derive(Debug, Clone, Default)]
pub struct PresenceFlag {
    present: Arc<AtomicBool>,
}

impl PresenceFlag {
    pub fn new(present: bool) -> Self {
        Self { present: Arc::new(AtomicBool::new(present)) }
    }

    pub fn set(&self, present: bool) {
        self.present.store(present, Ordering::Release);
    }

    pub fn get(&self) -> bool {
        self.present.load(Ordering::Acquire)
    }
}

#[async_trait::async_trait]
impl PresenceProbe for PresenceFlag {
    async fn is_present(&mut self) -> bool {
        self.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn process_name_matching_ignores_case_and_exe_suffix() {
        assert!(process_name_matches(OsStr::new("PICO Connect"), PICO_CONNECT_PROCESS));
        assert!(process_name_matches(OsStr::new("PICO Connect.exe"), PICO_CONNECT_PROCESS));
        assert!(process_name_matches(OsStr::new("pico connect.EXE"), PICO_CONNECT_PROCESS));

        assert!(!process_name_matches(OsStr::new("PICO Connect Helper.exe"), PICO_CONNECT_PROCESS));
        assert!(!process_name_matches(OsStr::new("exe"), PICO_CONNECT_PROCESS));
        assert!(!process_name_matches(OsStr::new(""), PICO_CONNECT_PROCESS));
    }

    #[tokio::test]
    async fn presence_flag_is_shared_between_clones() {
        let flag = PresenceFlag::new(false);
        let mut probe = flag.clone();

        assert!(!probe.is_present().await);
        flag.set(true);
        assert!(probe.is_present().await);
    }

    #[tokio::test]
    async fn process_presence_does_not_find_unknown_process() {
        let mut probe = ProcessPresence::new("definitely-not-a-running-process-7f3a");
        assert!(!probe.is_present().await);
        assert!(!probe.is_present().await);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn process_scan_does_not_block_the_scheduler() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let stop = Arc::new(AtomicBool::new(false));

        let ticker = tokio::spawn({
            let ticks = Arc::clone(&ticks);
            let stop = Arc::clone(&stop);
            async move {
                while !stop.load(Ordering::Acquire) {
                    ticks.fetch_add(1, Ordering::AcqRel);
                    tokio::task::yield_now().await;
                }
            }
        });
        tokio::task::yield_now().await;

        let mut probe = ProcessPresence::new(PICO_CONNECT_PROCESS);
        let before = ticks.load(Ordering::Acquire);
        probe.is_present().await;
        let during = ticks.load(Ordering::Acquire) - before;

        stop.store(true, Ordering::Release);
        ticker.await.unwrap();

        assert!(during > 0, "ticker starved while scanning processes");
    }
}
