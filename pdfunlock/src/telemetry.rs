//! Tracing initialization.
//!
//! Log output goes to stdout through the `tracing-subscriber` fmt layer. The filter comes from
//! `RUST_LOG` when set, otherwise from the `log_filter` configuration value.

use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize the global tracing subscriber.
///
/// Fails if `default_filter` is not a valid filter directive or if a global subscriber is
/// already installed.
pub fn init_telemetry(default_filter: &str) -> anyhow::Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)?,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    info!("Telemetry initialized");
    Ok(())
}
