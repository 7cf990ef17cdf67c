//! Logging initialization.
//!
//! Installs the global `tracing` subscriber for binaries. Library code and
//! tests never call this; tests use `tracing-test`.

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "info,synod=debug";

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("Failed to set global subscriber: {0}")]
    SetSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Install a fmt subscriber filtered by `RUST_LOG`, or by the default filter.
pub fn init_logging() -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(DEFAULT_FILTER)?,
    };
    install(env_filter)
}

/// Install a fmt subscriber with an explicit filter, ignoring `RUST_LOG`.
pub fn init_logging_with(filter: &str) -> Result<(), TelemetryError> {
    install(EnvFilter::try_new(filter)?)
}

fn install(env_filter: EnvFilter) -> Result<(), TelemetryError> {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true);

    let subscriber = Registry::default().with(env_filter).with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

