//! Driver spawns and manages the presence and poll tasks

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::config::BatteryConfig;
use crate::mapper::forwarded_device_type;
use crate::presence::PresenceProbe;
use crate::provider::Provider;
use crate::sink::{BatterySink, COMPANY};
use crate::types::{BatterySnapshot, SessionState};

/// Timing and behavior of the driver tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverOptions {
    /// Delay between presence checks while idle
    pub presence_interval: Duration,
    /// Delay before every poll cycle
    pub poll_interval: Duration,
    /// Forward headset percentages to the charge predictor
    pub predict_charging: bool,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self::from(&BatteryConfig::default())
    }
}

impl From<&BatteryConfig> for DriverOptions {
    fn from(config: &BatteryConfig) -> Self {
        Self {
            presence_interval: config.presence_interval(),
            poll_interval: config.poll_interval(),
            predict_charging: config.predict_charging,
        }
    }
}

/// Result of spawning driver tasks
pub struct DriverChannels {
    /// Receiver for session state changes
    pub state: watch::Receiver<SessionState>,
    /// Sender used to move the session to `TornDown`
    pub control: Arc<watch::Sender<SessionState>>,
    /// Cancellation token for graceful shutdown
    pub cancel: CancellationToken,
}

/// Driver spawns and manages battery polling tasks
///
/// A presence task waits for the runtime and flips the session to `Active`
/// once. A poll task then reads one snapshot per cycle and forwards it to
/// the sink. Both stop at their next await point after cancellation.
pub struct Driver;

impl Driver {
    /// Spawn driver tasks for the given provider and presence probe
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<P, Q>(
        provider: P,
        probe: Q,
        sink: Arc<dyn BatterySink>,
        options: DriverOptions,
    ) -> DriverChannels
    where
        P: Provider,
        Q: PresenceProbe,
    {
        let (state_tx, state_rx) = watch::channel(SessionState::Idle);
        let control = Arc::new(state_tx);
        let cancel = CancellationToken::new();

        tokio::spawn(Self::presence_task(
            probe,
            Arc::clone(&control),
            Arc::clone(&sink),
            options.presence_interval,
            cancel.clone(),
        ));

        tokio::spawn(Self::poll_task(provider, state_rx.clone(), sink, options, cancel.clone()));

        DriverChannels { state: state_rx, control, cancel }
    }

    /// Presence task - waits for the runtime, then activates the session
    async fn presence_task<Q>(
        mut probe: Q,
        control: Arc<watch::Sender<SessionState>>,
        sink: Arc<dyn BatterySink>,
        interval: Duration,
        cancel: CancellationToken,
    ) where
        Q: PresenceProbe,
    {
        info!("Waiting for PICO Connect...");
        let mut checks = 0u64;

        loop {
            let present = tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Presence task cancelled");
                    break;
                }
                present = probe.is_present() => present,
            };
            checks += 1;

            if present {
                let idle = *control.borrow() == SessionState::Idle;
                if idle && !cancel.is_cancelled() {
                    // Branding goes out before the first reading can.
                    sink.set_company(COMPANY);

                    let activated = control.send_if_modified(|state| {
                        if *state == SessionState::Idle {
                            *state = SessionState::Active;
                            true
                        } else {
                            false
                        }
                    });
                    if activated {
                        info!(checks, "PICO Connect detected, battery polling active");
                    }
                }
                break;
            }

            if checks % 30 == 0 {
                debug!("Still waiting for PICO Connect ({} checks)", checks);
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Presence task cancelled while waiting");
                    break;
                }
                _ = tokio::time::sleep(interval) => {}
            }
        }
    }

    /// Poll task - one provider read per cycle, forwarded to the sink
    async fn poll_task<P>(
        mut provider: P,
        state: watch::Receiver<SessionState>,
        sink: Arc<dyn BatterySink>,
        options: DriverOptions,
        cancel: CancellationToken,
    ) where
        P: Provider,
    {
        info!("Battery poll task started");
        let mut cycle_count = 0u64;
        let mut error_count = 0u32;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Battery poll task cancelled");
                    break;
                }
                _ = tokio::time::sleep(options.poll_interval) => {}
            }

            let active = state.borrow().is_active();
            if !active {
                trace!("Session not active, skipping cycle");
                continue;
            }

            // Dropping the poll future on cancellation does not stop a blocking
            // read already in flight; its result is simply discarded.
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Battery poll task cancelled during read");
                    break;
                }
                result = provider.poll() => result,
            };
            if cancel.is_cancelled() {
                info!("Battery poll task cancelled, discarding read");
                break;
            }
            cycle_count += 1;

            match result {
                Ok(Some(snapshot)) => {
                    error_count = 0;
                    let forwarded =
                        forward_snapshot(&snapshot, sink.as_ref(), options.predict_charging);
                    trace!(cycle = cycle_count, forwarded, "Cycle complete");
                }
                Ok(None) => {
                    error_count = 0;
                    trace!(cycle = cycle_count, "No log file, nothing to report");
                }
                Err(e) => {
                    // Never fatal: the next cycle reads the log again.
                    error_count += 1;
                    warn!(
                        cycle = cycle_count,
                        consecutive = error_count,
                        retryable = e.is_retryable(),
                        "Battery poll failed: {}",
                        e
                    );
                }
            }
        }

        info!("Battery poll task ended ({} cycles)", cycle_count);
    }
}

/// Forward every reading of a snapshot to the sink.
///
/// Per reading: battery level to subscribers, local cache update with the
/// side hint, and, for the headset when enabled, charge prediction.
/// Returns the number of readings forwarded.
pub fn forward_snapshot<S>(snapshot: &BatterySnapshot, sink: &S, predict_charging: bool) -> usize
where
    S: BatterySink + ?Sized,
{
    let mut forwarded = 0;

    for reading in snapshot.readings() {
        sink.report_battery_level(reading.percentage, forwarded_device_type(reading));
        sink.set_local_battery_state(
            reading.device_type,
            reading.percentage,
            reading.device_type.side_hint(),
        );

        if predict_charging && reading.is_headset() {
            sink.predict_charge_state(reading.percentage);
        }

        forwarded += 1;
    }

    forwarded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BatteryError;
    use crate::presence::PresenceFlag;
    use crate::test_utils::{RecordingSink, ScriptedProvider, SinkCall};
    use crate::types::{CanonicalReading, DeviceType, Side};
    use std::sync::Mutex;

    fn fast_options(predict_charging: bool) -> DriverOptions {
        DriverOptions {
            presence_interval: Duration::from_millis(10),
            poll_interval: Duration::from_millis(20),
            predict_charging,
        }
    }

    fn full_snapshot() -> BatterySnapshot {
        BatterySnapshot::Entries(vec![
            Some(CanonicalReading::headset(true, 57)),
            Some(CanonicalReading::controller(Side::Left, true, 40)),
            None,
            Some(CanonicalReading::controller(Side::Right, false, 64)),
        ])
    }

    #[test]
    fn forward_snapshot_calls_sink_in_order() {
        let sink = RecordingSink::default();

        let forwarded = forward_snapshot(&full_snapshot(), &sink, true);

        assert_eq!(forwarded, 3);
        assert_eq!(
            sink.calls(),
            vec![
                SinkCall::Level { percentage: 57, device_type: DeviceType::Headset },
                SinkCall::Local { device_type: DeviceType::Headset, percentage: 57, side_hint: -1 },
                SinkCall::Predict { percentage: 57 },
                SinkCall::Level { percentage: 40, device_type: DeviceType::ControllerLeft },
                SinkCall::Local {
                    device_type: DeviceType::ControllerLeft,
                    percentage: 40,
                    side_hint: 0
                },
                SinkCall::Level { percentage: 64, device_type: DeviceType::ControllerRight },
                SinkCall::Local {
                    device_type: DeviceType::ControllerRight,
                    percentage: 64,
                    side_hint: 0
                },
            ]
        );
    }

    #[test]
    fn forward_snapshot_skips_prediction_when_disabled() {
        let sink = RecordingSink::default();

        forward_snapshot(&full_snapshot(), &sink, false);

        assert!(sink.calls().iter().all(|call| !matches!(call, SinkCall::Predict { .. })));
    }

    #[test]
    fn degraded_snapshot_forwards_nothing() {
        let sink = RecordingSink::default();

        assert_eq!(forward_snapshot(&BatterySnapshot::Degraded, &sink, true), 0);
        assert_eq!(forward_snapshot(&BatterySnapshot::Empty, &sink, true), 0);
        assert!(sink.calls().is_empty());
    }

    #[tokio::test]
    async fn idle_session_never_polls() {
        let sink = Arc::new(RecordingSink::default());
        let provider = ScriptedProvider::repeating(full_snapshot());
        let polls = provider.poll_counter();

        let channels = Driver::spawn(
            provider,
            PresenceFlag::new(false),
            sink.clone(),
            fast_options(false),
        );

        tokio::time::sleep(Duration::from_millis(120)).await;
        channels.cancel.cancel();

        assert_eq!(*channels.state.borrow(), SessionState::Idle);
        assert_eq!(polls.load(std::sync::atomic::Ordering::SeqCst), 0);
        assert!(sink.calls().is_empty());
    }

    #[tokio::test]
    async fn presence_activates_once_and_polls_forward() {
        let _ = tracing_subscriber::fmt::try_init();

        let sink = Arc::new(RecordingSink::default());
        let presence = PresenceFlag::new(false);
        let channels = Driver::spawn(
            ScriptedProvider::repeating(full_snapshot()),
            presence.clone(),
            sink.clone(),
            fast_options(true),
        );

        tokio::time::sleep(Duration::from_millis(40)).await;
        presence.set(true);

        let mut state = channels.state.clone();
        tokio::time::timeout(Duration::from_secs(2), state.wait_for(|s| s.is_active()))
            .await
            .expect("session should become active")
            .expect("state sender alive");

        tokio::time::sleep(Duration::from_millis(150)).await;

        // Presence loss never deactivates the session.
        presence.set(false);
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(*channels.state.borrow(), SessionState::Active);

        channels.cancel.cancel();

        let calls = sink.calls();
        assert_eq!(sink.company_calls(), vec![COMPANY.to_string()]);
        assert!(calls.contains(&SinkCall::Predict { percentage: 57 }));
        assert!(calls.contains(&SinkCall::Level {
            percentage: 64,
            device_type: DeviceType::ControllerRight
        }));
    }

    #[tokio::test]
    async fn provider_errors_do_not_stop_polling() {
        let sink = Arc::new(RecordingSink::default());
        let provider = ScriptedProvider::new(vec![
            Err(BatteryError::task_failed("read aborted")),
            Ok(None),
            Ok(Some(BatterySnapshot::Entries(vec![Some(CanonicalReading::headset(true, 12))]))),
        ]);
        let polls = provider.poll_counter();

        let channels =
            Driver::spawn(provider, PresenceFlag::new(true), sink.clone(), fast_options(false));

        tokio::time::sleep(Duration::from_millis(250)).await;
        channels.cancel.cancel();

        assert!(polls.load(std::sync::atomic::Ordering::SeqCst) >= 3);
        assert!(sink.calls().contains(&SinkCall::Level {
            percentage: 12,
            device_type: DeviceType::Headset
        }));
    }

    #[tokio::test]
    async fn cancellation_stops_sink_calls() {
        let sink = Arc::new(RecordingSink::default());
        let channels = Driver::spawn(
            ScriptedProvider::repeating(full_snapshot()),
            PresenceFlag::new(true),
            sink.clone(),
            fast_options(false),
        );

        tokio::time::sleep(Duration::from_millis(80)).await;
        channels.cancel.cancel();
        tokio::time::sleep(Duration::from_millis(30)).await;

        let after_cancel = sink.calls().len();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(sink.calls().len(), after_cancel);
    }

    /// Sink that records the session state seen when the company is set.
    #[derive(Default)]
    struct BrandingSink {
        state: Mutex<Option<watch::Receiver<SessionState>>>,
        seen: Mutex<Vec<SessionState>>,
    }

    impl BatterySink for BrandingSink {
        fn report_battery_level(&self, _percentage: i32, _device_type: DeviceType) {}

        fn set_local_battery_state(&self, _device_type: DeviceType, _percentage: i32, _side_hint: i32) {}

        fn set_company(&self, _company: &str) {
            if let Some(state) = self.state.lock().unwrap().as_ref() {
                let current = *state.borrow();
                self.seen.lock().unwrap().push(current);
            }
        }
    }

    #[tokio::test]
    async fn company_is_set_before_session_turns_active() {
        let sink = Arc::new(BrandingSink::default());
        let presence = PresenceFlag::new(false);
        let channels = Driver::spawn(
            ScriptedProvider::new(vec![]),
            presence.clone(),
            sink.clone(),
            fast_options(false),
        );
        *sink.state.lock().unwrap() = Some(channels.state.clone());

        presence.set(true);
        let mut state = channels.state.clone();
        tokio::time::timeout(Duration::from_secs(2), state.wait_for(|s| s.is_active()))
            .await
            .expect("session should become active")
            .expect("state sender alive");
        channels.cancel.cancel();

        assert_eq!(*sink.seen.lock().unwrap(), vec![SessionState::Idle]);
    }
}
