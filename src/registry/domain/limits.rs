//! Idle reaping limits.

use std::time::Duration;

/// Default time an agent may go without a command before it is reaped.
pub const DEFAULT_IDLE_THRESHOLD: Duration = Duration::from_secs(60 * 60);

/// Default interval between reaper passes.
pub const DEFAULT_REAPER_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Idle threshold and reaper cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryLimits {
    idle_threshold: Duration,
    reaper_interval: Duration,
}

impl RegistryLimits {
    /// Creates limits; zero durations are raised to one second.
    #[must_use]
    pub fn new(idle_threshold: Duration, reaper_interval: Duration) -> Self {
        let floor = Duration::from_secs(1);
        Self {
            idle_threshold: idle_threshold.max(floor),
            reaper_interval: reaper_interval.max(floor),
        }
    }

    /// Returns the idle threshold.
    #[must_use]
    pub const fn idle_threshold(self) -> Duration {
        self.idle_threshold
    }

    /// Returns the reaper interval.
    #[must_use]
    pub const fn reaper_interval(self) -> Duration {
        self.reaper_interval
    }
}

impl Default for RegistryLimits {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_THRESHOLD, DEFAULT_REAPER_INTERVAL)
    }
}
