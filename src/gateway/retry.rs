//! Backoff schedule for transient publish failures.

use std::time::Duration;

use rand::Rng;

/// Each retry waits this many times longer than the previous one.
const BACKOFF_FACTOR: u32 = 4;

/// Bounded exponential backoff with jitter.
///
/// Retry `n` (0-based) waits `base * 4^n` plus up to a quarter of that
/// again, so consecutive delays are always strictly increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, Duration::from_secs(1))
    }
}

impl RetryPolicy {
    /// Create a policy allowing `max_retries` attempts after the first.
    #[must_use]
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self { max_retries, base_delay }
    }

    /// Additional attempts allowed after the first.
    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Delay before retry `retry`, without jitter.
    #[must_use]
    pub fn nominal_delay(&self, retry: u32) -> Duration {
        self.base_delay.saturating_mul(BACKOFF_FACTOR.saturating_pow(retry))
    }

    /// Delay before retry `retry`, with jitter.
    #[must_use]
    pub fn delay(&self, retry: u32) -> Duration {
        let nominal = self.nominal_delay(retry);
        nominal.saturating_add(jitter(nominal / 4))
    }

    /// The full jittered schedule, one entry per allowed retry.
    #[cfg(test)]
    #[must_use]
    pub fn schedule(&self) -> Vec<Duration> {
        (0..self.max_retries).map(|retry| self.delay(retry)).collect()
    }
}

/// Uniform random duration in `[0, bound)`.
fn jitter(bound: Duration) -> Duration {
    let micros = u64::try_from(bound.as_micros()).unwrap_or(u64::MAX);
    if micros == 0 {
        return Duration::ZERO;
    }
    Duration::from_micros(rand::rng().random_range(0..micros))
}
