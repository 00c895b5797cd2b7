//! Fixed-delay retry policy

use anyhow::Result;
use std::time::Duration;
use tracing::warn;

use crate::error::ExtractError;

/// Re-run a fallible operation a bounded number of times.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Errors wrapping a non-retryable [`ExtractError`] stop immediately;
    /// everything else is treated as transient.
    pub fn is_retryable(err: &anyhow::Error) -> bool {
        err.chain()
            .filter_map(|cause| cause.downcast_ref::<ExtractError>())
            .all(ExtractError::is_retryable)
    }

    /// Call `op` until it succeeds, fails with a non-retryable error, or the
    /// attempts run out. The last error is returned.
    pub fn run<T, F>(&self, label: &str, mut op: F) -> Result<T>
    where
        F: FnMut(u32) -> Result<T>,
    {
        let mut attempt = 1;
        loop {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= self.max_attempts || !Self::is_retryable(&e) => return Err(e),
                Err(e) => {
                    warn!(
                        "Attempt {} for {} failed: {:#}, retrying in {:?}",
                        attempt, label, e, self.delay
                    );
                    if !self.delay.is_zero() {
                        std::thread::sleep(self.delay);
                    }
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Context};

    fn instant(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::ZERO)
    }

    #[test]
    fn test_succeeds_after_failures() {
        let mut calls = 0;
        let result = instant(3).run("x", |attempt| {
            calls += 1;
            if attempt < 3 {
                Err(anyhow!("flaky"))
            } else {
                Ok(attempt)
            }
        });
        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_gives_up_with_last_error() {
        let mut calls = 0;
        let result: Result<()> = instant(3).run("x", |attempt| {
            calls += 1;
            Err(anyhow!("failure {}", attempt))
        });
        assert_eq!(result.unwrap_err().to_string(), "failure 3");
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_non_retryable_stops_early() {
        let mut calls = 0;
        let result: Result<()> = instant(5).run("x", |_| {
            calls += 1;
            Err(ExtractError::Interrupted).context("while processing")
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_zero_attempts_still_runs_once() {
        let policy = instant(0);
        assert_eq!(policy.max_attempts, 1);
        let mut calls = 0;
        let _ = policy.run("x", |_| -> Result<()> {
            calls += 1;
            Err(anyhow!("nope"))
        });
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_logs_each_retry() {
        let (_, logs) = crate::logging::capture(|| {
            instant(3).run("bundle.ab", |_| -> Result<()> { Err(anyhow!("boom")) })
        });
        assert_eq!(logs.matches("retrying").count(), 2);
        assert!(logs.contains("bundle.ab"));
    }
}
