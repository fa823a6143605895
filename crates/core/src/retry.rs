//! Exponential backoff retry primitive.
//!
//! One [`RetryPolicy`] type serves both retrying call sites: model calls use
//! pure exponential backoff (`base * 2^attempt`), the search tool adds
//! uniform jitter in `[0, 1)` seconds on top. Waits are `tokio` sleeps, so a
//! paused test clock observes the exact schedule.

use std::{fmt::Display, time::Duration};
use thiserror::Error;

/// Default number of attempts for every retrying call site.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default base delay, doubled after each failed attempt.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Bounded exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Zero behaves as one.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub base_delay: Duration,
    /// Add uniform `[0, 1)` second jitter to each delay.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::exponential(DEFAULT_MAX_ATTEMPTS, DEFAULT_BASE_DELAY)
    }
}

impl RetryPolicy {
    /// Pure exponential backoff without jitter.
    pub const fn exponential(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            jitter: false,
        }
    }

    /// Enable jitter.
    pub fn with_jitter(mut self) -> Self {
        self.jitter = true;
        self
    }

    /// Override the number of attempts.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// The number of attempts actually made, never less than one.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay after the failed attempt with zero-based index `attempt`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let backoff = self.base_delay.saturating_mul(2u32.saturating_pow(attempt));
        if self.jitter {
            backoff + Duration::from_secs_f64(rand::random::<f64>())
        } else {
            backoff
        }
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// attempts are exhausted.
    ///
    /// `op` receives the zero-based attempt index. `label` is logged as the
    /// `agent` field of the retry and exhaustion events.
    pub async fn run<T, E, F, Fut>(
        &self,
        label: &str,
        mut op: F,
        retryable: impl Fn(&E) -> bool,
    ) -> Result<T, RetryError<E>>
    where
        E: Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = self.attempts();
        let mut attempt = 0;
        loop {
            let error = match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            if !retryable(&error) {
                return Err(RetryError::Fatal {
                    attempts: attempt + 1,
                    error,
                });
            }

            if attempt + 1 >= max_attempts {
                tracing::error!(
                    agent = label,
                    attempts = max_attempts,
                    "[{label}] failed after {max_attempts} attempts: {error}"
                );
                return Err(RetryError::Exhausted {
                    attempts: max_attempts,
                    error,
                });
            }

            let delay = self.delay(attempt);
            tracing::warn!(
                agent = label,
                attempt = attempt + 1,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                "[{label}] {error}, retrying in {:.2}s (attempt {}/{max_attempts})",
                delay.as_secs_f64(),
                attempt + 1,
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

/// Why [`RetryPolicy::run`] gave up.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RetryError<E> {
    /// Every attempt failed with a retryable error; holds the last one.
    #[error("failed after {attempts} attempts: {error}")]
    Exhausted {
        /// Attempts made.
        attempts: u32,
        /// The last error.
        error: E,
    },

    /// An attempt failed with an error that must not be retried.
    #[error("{error}")]
    Fatal {
        /// Attempts made, including the fatal one.
        attempts: u32,
        /// The fatal error.
        error: E,
    },
}

impl<E> RetryError<E> {
    /// Attempts made before giving up.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Exhausted { attempts, .. } | Self::Fatal { attempts, .. } => *attempts,
        }
    }

    /// The last error observed.
    pub fn into_inner(self) -> E {
        match self {
            Self::Exhausted { error, .. } | Self::Fatal { error, .. } => error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_doubles_from_base() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay(0), Duration::from_secs(1));
        assert_eq!(policy.delay(1), Duration::from_secs(2));
        assert_eq!(policy.delay(2), Duration::from_secs(4));
    }

    #[test]
    fn jitter_stays_below_one_second() {
        let policy = RetryPolicy::default().with_jitter();
        for attempt in 0..3 {
            let base = Duration::from_secs(1 << attempt);
            let delay = policy.delay(attempt);
            assert!(delay >= base);
            assert!(delay < base + Duration::from_secs(1));
        }
    }

    #[test]
    fn zero_attempts_means_one() {
        assert_eq!(RetryPolicy::default().with_max_attempts(0).attempts(), 1);
    }
}
