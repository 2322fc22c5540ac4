//! Timeout and backoff policy for provider calls.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::{RagError, Result};

/// Configuration for retry behavior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Multiplier applied to the delay after each retry.
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// A policy that never retries.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
        }
    }

    /// Calculates the delay before retry number `attempt` (0-based).
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let delay = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        let capped = delay.min(self.max_delay.as_secs_f64());
        if capped.is_finite() && capped >= 0.0 {
            Duration::from_secs_f64(capped)
        } else {
            self.max_delay
        }
    }
}

/// Runs `call` until it succeeds, bounding every attempt by `timeout`.
///
/// Exhaustion surfaces as [`RagError::ProviderUnavailable`] carrying the last failure.
pub(crate) async fn with_retry<T, F, Fut>(
    policy: &RetryConfig,
    timeout: Duration,
    operation: &'static str,
    mut call: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = pdfqa_core::Result<T>>,
{
    let attempts = policy.max_retries.saturating_add(1);
    let mut last_failure = String::new();

    for attempt in 0..attempts {
        if attempt > 0 {
            let delay = policy.delay_for_attempt(attempt - 1);
            warn!(
                operation,
                attempt,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                reason = %last_failure,
                "retrying provider call"
            );
            tokio::time::sleep(delay).await;
        }

        match tokio::time::timeout(timeout, call()).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(err)) => last_failure = format!("{err:#}"),
            Err(_) => last_failure = format!("timed out after {timeout:?}"),
        }
    }

    Err(RagError::ProviderUnavailable {
        operation,
        attempts,
        reason: last_failure,
    })
}
