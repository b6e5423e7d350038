//! Battery sessions: the lifetime of one tracked PICO Connect backend

use futures::Stream;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::driver::{Driver, DriverOptions};
use crate::presence::PresenceProbe;
use crate::provider::Provider;
use crate::sink::BatterySink;
use crate::types::SessionState;


/// Running battery session
///
/// Owns the presence and poll tasks spawned by the [`Driver`]. The session
/// state is the only state shared with those tasks. Dropping the session
/// tears it down.
pub struct BatterySession {
    /// Session state receiver
    state: watch::Receiver<SessionState>,

    /// Session state sender, used for teardown
    control: Arc<watch::Sender<SessionState>>,

    /// Cancellation token for stopping tasks
    cancel: CancellationToken,
}

impl BatterySession {
    /// Start a session from arbitrary parts.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<P, Q, S>(provider: P, probe: Q, sink: S, options: DriverOptions) -> Self
    where
        P: Provider,
        Q: PresenceProbe,
        S: BatterySink,
    {
        let channels = Driver::spawn(provider, probe, Arc::new(sink), options);

        info!(
            poll_interval = ?options.poll_interval,
            predict_charging = options.predict_charging,
            "Battery session started"
        );

        Self { state: channels.state, control: channels.control, cancel: channels.cancel }
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Session state changes as a stream
    ///
    /// Yields the current state immediately, then every change.
    pub fn state_updates(&self) -> impl Stream<Item = SessionState> + 'static {
        WatchStream::new(self.state.clone())
    }

    /// Wait until the runtime is detected.
    ///
    /// Returns `false` if the session is torn down first.
    pub async fn wait_active(&self) -> bool {
        let mut state = self.state.clone();
        match state.wait_for(|s| *s != SessionState::Idle).await {
            Ok(current) => current.is_active(),
            Err(_) => false,
        }
    }

    /// Stop both tasks at their next await point.
    ///
    /// Idempotent. A file read already in flight finishes in the background
    /// but its result is never forwarded.
    pub fn teardown(&self) {
        let changed = self.control.send_if_modified(|state| {
            if state.is_torn_down() {
                false
            } else {
                *state = SessionState::TornDown;
                true
            }
        });
        self.cancel.cancel();

        if changed {
            info!("Battery session torn down");
        }
    }

    pub fn is_torn_down(&self) -> bool {
        self.state().is_torn_down()
    }
}

impl Drop for BatterySession {
    fn drop(&mut self) {
        debug!("Dropping battery session");
        self.teardown();
    }
}
