//! Caller-level retry: a fixed number of attempts with fixed sleeps, chosen by
//! the kind of the failure.

use std::future::Future;
use std::time::Duration;

use log::warn;

use crate::error::{ErrorKind, Result};

/// What to do after a failed attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryDecision {
    Retry(Duration),
    Abort,
}

#[derive(Clone, Debug)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
    /// Sleep after transient and unclassified failures.
    pub delay: Duration,
    /// Sleep after the service reported rate limiting.
    pub rate_limit_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
            rate_limit_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// A policy that runs the operation exactly once.
    pub fn once() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn decide(&self, kind: ErrorKind) -> RetryDecision {
        match kind {
            ErrorKind::RateLimited => RetryDecision::Retry(self.rate_limit_delay),
            ErrorKind::Transient | ErrorKind::Unknown => RetryDecision::Retry(self.delay),
            ErrorKind::InvalidInput | ErrorKind::NoContent | ErrorKind::Permanent => {
                RetryDecision::Abort
            }
        }
    }

    /// Runs `operation` until it succeeds, fails with a non-retryable error, or
    /// runs out of attempts. The closure receives the 1-based attempt number.
    ///
    /// # Errors
    ///
    /// Returns the last error produced by `operation`, unchanged.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let err = match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if attempt >= max_attempts {
                warn!("Giving up after {attempt} attempts: {err}");
                return Err(err);
            }

            match self.decide(err.kind()) {
                RetryDecision::Abort => return Err(err),
                RetryDecision::Retry(delay) => {
                    warn!("Attempt {attempt}/{max_attempts} failed: {err}. Retrying in {delay:?}");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
