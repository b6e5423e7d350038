//! Watch PICO Connect battery levels and log them.
//!
//! ```text
//! cargo run --example watch -- [config.yaml]
//! ```
//!
//! Set `RUST_LOG=pico_battery=debug` for per-cycle details.

use futures::StreamExt;
use pico_battery::{BatteryConfig, PicoBattery, SessionState, TracingSink};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => BatteryConfig::from_file(path)?,
        None => BatteryConfig::default(),
    };

    let session = PicoBattery::start(config, TracingSink).await?;
    let mut states = Box::pin(session.state_updates());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            state = states.next() => match state {
                Some(SessionState::TornDown) | None => break,
                Some(state) => tracing::info!(?state, "Session state"),
            },
        }
    }

    session.teardown();
    Ok(())
}
