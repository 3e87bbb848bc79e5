use std::ops::Range;
use std::thread;
use std::time::Duration;

use failure::Error;
use log::{info, warn};
use rand::Rng;

/// Blocks the calling thread between attempts.
pub trait Sleep {
    fn sleep(&self, duration: Duration);
}

pub struct ThreadSleeper;

impl Sleep for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Exponential backoff with multiplicative jitter and a bounded number of attempts.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    jitter: Range<f64>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            5,
            Duration::from_secs(5),
            Duration::from_secs(300),
            0.5..1.5,
        )
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration, jitter: Range<f64>) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
            jitter,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// The delay after the failed attempt number `attempt` (starting at 1).
    ///
    /// `base * 2^(attempt - 1)`, capped, scaled by `jitter` and capped again.
    pub fn delay(&self, attempt: u32, jitter: f64) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31) as i32;
        let cap = self.max_delay.as_secs_f64();
        let backoff = (self.base_delay.as_secs_f64() * 2f64.powi(exponent)).min(cap);

        Duration::from_secs_f64((backoff * jitter).clamp(0.0, cap))
    }

    fn sample_jitter(&self) -> f64 {
        if self.jitter.start < self.jitter.end {
            rand::thread_rng().gen_range(self.jitter.clone())
        } else {
            self.jitter.start
        }
    }

    /// Run `operation` until it succeeds or the attempts are used up.
    ///
    /// Returns `None` after the last failed attempt; failures are only logged.
    pub fn run<T, F>(&self, sleeper: &dyn Sleep, description: &str, mut operation: F) -> Option<T>
    where
        F: FnMut() -> Result<T, Error>,
    {
        for attempt in 1..=self.max_attempts {
            info!(
                "Attempt {} of {}: {}",
                attempt, self.max_attempts, description
            );

            match operation() {
                Ok(value) => return Some(value),
                Err(e) => warn!("Request failed (attempt {}): {}", attempt, e),
            }

            if attempt < self.max_attempts {
                let delay = self.delay(attempt, self.sample_jitter());
                info!("Retrying in {:.1} seconds", delay.as_secs_f64());
                sleeper.sleep(delay);
            }
        }

        warn!("All {} attempts failed: {}", self.max_attempts, description);
        None
    }
}
