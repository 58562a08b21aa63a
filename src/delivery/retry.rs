//! Retry policy with backoff and jitter for failed sink writes
//!
//! Attempt semantics: attempt 1 is the initial write. `delay_before(attempt)`
//! is the sleep taken before retry number `attempt`, so `delay_before(1)`
//! precedes the second write call. Exponential delays saturate at the
//! configured cap.

use rand::Rng;
use std::time::Duration;

/// Delay curve between attempts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay before every retry
    Constant(Duration),
    /// `base * 2^(attempt-1)`, capped at `max`
    Exponential { base: Duration, max: Duration },
}

impl Backoff {
    pub fn delay(&self, attempt: usize) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        match self {
            Backoff::Constant(delay) => *delay,
            Backoff::Exponential { base, max } => {
                let exponent = attempt.saturating_sub(1).min(u32::MAX as usize) as u32;
                let multiplier = 2u32.checked_pow(exponent).unwrap_or(u32::MAX);
                base.checked_mul(multiplier).unwrap_or(*max).min(*max)
            }
        }
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff::Exponential {
            base: Duration::from_millis(100),
            max: Duration::from_secs(5),
        }
    }
}

/// Randomization applied to backoff delays to spread retries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Jitter {
    /// Deterministic delays, for tests and tightly controlled pipelines
    None,
    /// Uniform in `[0, delay]`
    Full,
}

impl Jitter {
    pub fn apply(&self, delay: Duration) -> Duration {
        match self {
            Jitter::None => delay,
            Jitter::Full => {
                let millis = delay.as_millis().min(u64::MAX as u128) as u64;
                if millis == 0 {
                    return delay;
                }
                Duration::from_millis(rand::thread_rng().gen_range(0..=millis))
            }
        }
    }
}

impl Default for Jitter {
    fn default() -> Self {
        Jitter::Full
    }
}

/// Per-wrapper retry budget
///
/// `max_attempts` counts write calls, not retries: `max_attempts = 3` means
/// at most three calls to `Sink::write` per entry before the terminal
/// `Error` outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: usize,
    backoff: Backoff,
    jitter: Jitter,
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, backoff: Backoff, jitter: Jitter) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
            jitter,
        }
    }

    /// Single attempt, no retries
    pub fn none() -> Self {
        Self::new(1, Backoff::Constant(Duration::ZERO), Jitter::None)
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn backoff(&self) -> &Backoff {
        &self.backoff
    }

    /// Jittered sleep before retry number `attempt`
    pub fn delay_before(&self, attempt: usize) -> Duration {
        self.jitter.apply(self.backoff.delay(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::default(),
            jitter: Jitter::default(),
        }
    }
}
