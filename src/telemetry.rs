//! Structured logging setup.

use crate::config::{LogFormat, TelemetrySettings};
use thiserror::Error;
use tracing_subscriber::{
    EnvFilter, fmt, layer::SubscriberExt, registry, util::SubscriberInitExt, util::TryInitError,
};

/// Errors raised while installing the global subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The configured level is not a valid filter directive.
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    /// A global subscriber is already installed.
    #[error(transparent)]
    Init(#[from] TryInitError),
}

/// Builds the event filter: `RUST_LOG` when set, the configured level
/// otherwise.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] when the configured level does not
/// parse.
pub fn env_filter(settings: &TelemetrySettings) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .map_err(TelemetryError::from)
}

/// Installs the global `tracing` subscriber.
///
/// # Errors
///
/// Returns [`TelemetryError`] when the filter is invalid or a subscriber is
/// already installed.
pub fn init_tracing(settings: &TelemetrySettings) -> Result<(), TelemetryError> {
    let base = registry().with(env_filter(settings)?);
    match settings.format {
        LogFormat::Json => base
            .with(fmt::layer().json().with_target(true))
            .try_init()?,
        LogFormat::Text => base.with(fmt::layer().with_target(true)).try_init()?,
    }
    Ok(())
}
