//! Lock-free last-activity timestamp shared between an agent task and the
//! registry.

use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::atomic::{AtomicI64, Ordering};

/// Last time an agent received a command, stored as Unix milliseconds.
#[derive(Debug)]
pub struct ActivityStamp(AtomicI64);

impl ActivityStamp {
    /// Creates a stamp set to `at`.
    #[must_use]
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(AtomicI64::new(at.timestamp_millis()))
    }

    /// Records activity at the clock's current time.
    pub fn touch(&self, clock: &impl Clock) {
        self.0
            .fetch_max(clock.utc().timestamp_millis(), Ordering::AcqRel);
    }

    /// Returns the last recorded activity.
    #[must_use]
    pub fn last_active(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.0.load(Ordering::Acquire)).unwrap_or_default()
    }
}
