//! Runtime configuration loaded from `CONCLAVE__*` environment variables.
//!
//! Every field has a default, so an empty environment yields a working
//! configuration. Nested keys use `__` as the separator, for example
//! `CONCLAVE__REGISTRY__IDLE_THRESHOLD_SECS=1800`.

use crate::bus::services::{BusLimits, DEFAULT_DRAIN_BATCH, DEFAULT_QUEUE_CAPACITY};
use crate::registry::domain::{DEFAULT_IDLE_THRESHOLD, DEFAULT_REAPER_INTERVAL, RegistryLimits};
use ::config::{Config, ConfigError, Environment, Source};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "CONCLAVE";

/// Default container image for sandboxed commands.
pub const DEFAULT_SANDBOX_IMAGE: &str = "alpine:3.20";

/// Default container CLI binary.
pub const DEFAULT_RUNTIME_BINARY: &str = "docker";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConclaveConfig {
    /// Agent registry settings.
    pub registry: RegistrySettings,
    /// Message bus settings.
    pub bus: BusSettings,
    /// Sandbox settings.
    pub sandbox: SandboxSettings,
    /// Logging settings.
    pub telemetry: TelemetrySettings,
}

impl ConclaveConfig {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable cannot be converted to the
    /// field's type.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(environment())
    }

    /// Loads configuration from an explicit source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the source cannot be read or converted.
    pub fn load_from<S>(source: S) -> Result<Self, ConfigError>
    where
        S: Source + Send + Sync + 'static,
    {
        Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()
    }

    /// Returns registry limits with zero values clamped.
    #[must_use]
    pub fn registry_limits(&self) -> RegistryLimits {
        RegistryLimits::new(
            Duration::from_secs(self.registry.idle_threshold_secs),
            Duration::from_secs(self.registry.reaper_interval_secs),
        )
    }

    /// Returns bus limits with zero values clamped.
    #[must_use]
    pub fn bus_limits(&self) -> BusLimits {
        BusLimits::new(self.bus.queue_capacity, self.bus.drain_batch_size)
    }
}

/// The `CONCLAVE__` environment source.
#[must_use]
pub fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

/// Agent registry settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySettings {
    /// Seconds without a command before an agent is reaped.
    pub idle_threshold_secs: u64,
    /// Seconds between reaper passes.
    pub reaper_interval_secs: u64,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            idle_threshold_secs: DEFAULT_IDLE_THRESHOLD.as_secs(),
            reaper_interval_secs: DEFAULT_REAPER_INTERVAL.as_secs(),
        }
    }
}

/// Message bus settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusSettings {
    /// Messages a topic queue holds before publishes fail.
    pub queue_capacity: usize,
    /// Messages taken from each topic per drain.
    pub drain_batch_size: usize,
}

impl Default for BusSettings {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            drain_batch_size: DEFAULT_DRAIN_BATCH,
        }
    }
}

/// Sandbox settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxSettings {
    /// Image every sandbox container is created from.
    pub image: String,
    /// Container CLI used by the runtime adapter.
    pub runtime_binary: String,
}

impl Default for SandboxSettings {
    fn default() -> Self {
        Self {
            image: DEFAULT_SANDBOX_IMAGE.to_owned(),
            runtime_binary: DEFAULT_RUNTIME_BINARY.to_owned(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetrySettings {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Text,
        }
    }
}
