//! Request pacing
//!
//! Each unit of work sleeps for a random duration before its fetch. The
//! delay is drawn per unit, so with N workers the upstream sees at most N
//! requests per sampled interval rather than one global cadence.

use rand::Rng;
use std::time::Duration;

/// Inclusive range the pacing delay is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    min_ms: u64,
    max_ms: u64,
}

impl DelayRange {
    /// Creates a range; bounds given in the wrong order are swapped
    pub fn from_millis(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms: min_ms.min(max_ms),
            max_ms: min_ms.max(max_ms),
        }
    }

    /// A range that always yields the same delay
    pub fn fixed(delay: Duration) -> Self {
        let ms = delay.as_millis() as u64;
        Self::from_millis(ms, ms)
    }

    pub fn min(&self) -> Duration {
        Duration::from_millis(self.min_ms)
    }

    pub fn max(&self) -> Duration {
        Duration::from_millis(self.max_ms)
    }

    /// True when every sample is zero
    pub fn is_zero(&self) -> bool {
        self.max_ms == 0
    }

    /// Draws a delay uniformly from the range
    pub fn sample(&self) -> Duration {
        if self.min_ms == self.max_ms {
            return Duration::from_millis(self.min_ms);
        }
        Duration::from_millis(rand::rng().random_range(self.min_ms..=self.max_ms))
    }
}
