//! Bounded retry with exponential backoff around the remote chat call.
//!
//! This is the only automatic-retry point in Tandem: a repeated identical
//! request to a stateless completion endpoint is safe to resend.

use std::future::Future;
use std::time::Duration;

use tandem_config::RetryConfig;
use tandem_core::error::ProviderError;
use tracing::{info, warn};

/// Attempt ceiling and backoff window.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    pub multiplier: Duration,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            multiplier: seconds(config.multiplier_secs),
            min_delay: seconds(config.min_delay_secs),
            max_delay: seconds(config.max_delay_secs),
        }
    }

    /// A single attempt, no sleeping. Useful for tests and dry runs.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            multiplier: Duration::ZERO,
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Wait before the attempt following `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exp = 2f64.powi(attempt.saturating_sub(1).min(63) as i32);
        let raw = self.multiplier.as_secs_f64() * exp;
        let clamped = raw
            .max(self.min_delay.as_secs_f64())
            .min(self.max_delay.as_secs_f64());
        Duration::try_from_secs_f64(clamped).unwrap_or(self.max_delay)
    }

    /// Run `operation` until it succeeds, fails permanently, or the attempt
    /// ceiling is reached. The last error is returned unchanged.
    pub async fn run<F, Fut, T>(&self, context: &str, operation: F) -> Result<T, ProviderError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let mut attempt = 0;

        loop {
            attempt += 1;

            match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        info!(context = %context, attempt, "Succeeded after retries");
                    }
                    return Ok(value);
                }
                Err(e) if !e.is_transient() || attempt >= self.max_attempts => {
                    return Err(e);
                }
                Err(e) => {
                    let wait = self.delay_after(attempt);
                    warn!(
                        context = %context,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        wait_ms = wait.as_millis() as u64,
                        "Chat call failed, retrying after backoff"
                    );
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }
}

/// Seconds as a `Duration`. Negative or NaN is zero; too large saturates.
fn seconds(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX)
}
