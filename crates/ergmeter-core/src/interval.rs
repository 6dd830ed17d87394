//! Validated poll interval.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lower bound of the accepted poll interval, in minutes.
pub const INTERVAL_MIN_MINUTES: u64 = 5;
/// Upper bound of the accepted poll interval, in minutes.
pub const INTERVAL_MAX_MINUTES: u64 = 1440;

const DEFAULT_MINUTES: u64 = 30;

/// Poll interval in minutes, guaranteed to lie in `5..=1440`.
///
/// Out-of-range values are rejected when the value is constructed, which is
/// configuration-load time; the scheduler never has to re-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct PollInterval(u64);

impl PollInterval {
    /// Create an interval, rejecting values outside the accepted range.
    pub fn new(minutes: u64) -> Result<Self> {
        if !(INTERVAL_MIN_MINUTES..=INTERVAL_MAX_MINUTES).contains(&minutes) {
            return Err(CoreError::IntervalOutOfRange(minutes));
        }
        Ok(Self(minutes))
    }

    /// Interval length in minutes.
    #[must_use]
    pub fn minutes(self) -> u64 {
        self.0
    }

    /// Interval length in seconds.
    #[must_use]
    pub fn seconds(self) -> u64 {
        self.0 * 60
    }

    /// Interval as a `Duration` for the scheduler.
    #[must_use]
    pub fn as_duration(self) -> Duration {
        Duration::from_secs(self.seconds())
    }
}

impl Default for PollInterval {
    fn default() -> Self {
        Self(DEFAULT_MINUTES)
    }
}

impl TryFrom<u64> for PollInterval {
    type Error = CoreError;

    fn try_from(minutes: u64) -> Result<Self> {
        Self::new(minutes)
    }
}

impl From<PollInterval> for u64 {
    fn from(interval: PollInterval) -> u64 {
        interval.0
    }
}
