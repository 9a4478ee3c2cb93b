//! Bounded retry with exponential backoff
//!
//! Wraps a fallible async operation: up to `max_attempts` calls, sleeping
//! `base_delay * 2^n` between failures. Only transient errors
//! (see [`DriveError::is_transient`]) are retried; terminal errors return
//! immediately. There is no sleep after the final attempt.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

use crate::error::{DriveError, Result};

/// Retry policy configuration
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of calls to the wrapped operation
    pub max_attempts: u32,
    /// Delay before the first retry; doubles each attempt
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Run `operation` until it succeeds, fails terminally, or the attempt
    /// budget is exhausted. Returns the last error on exhaustion.
    pub async fn run<T, F, Fut>(&self, operation_name: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt: u32 = 0;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    attempt += 1;

                    if !error.is_transient() {
                        warn!(
                            operation = operation_name,
                            error = %error,
                            "Operation failed with terminal error"
                        );
                        return Err(error);
                    }

                    if attempt >= self.max_attempts {
                        warn!(
                            operation = operation_name,
                            attempts = attempt,
                            error = %error,
                            "Operation failed after exhausting retries"
                        );
                        return Err(error);
                    }

                    let delay = self.base_delay * 2u32.pow(attempt - 1);
                    warn!(
                        operation = operation_name,
                        attempt = attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Transient error, retrying after backoff"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}
