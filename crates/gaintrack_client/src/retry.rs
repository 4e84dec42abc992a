use rand::{RngExt, rng};
use std::fmt::Display;
use std::time::Duration;

/// Exponential backoff with full jitter for transient repository failures.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Upper bound of the sleep before retry number `attempt` (1-based).
    fn backoff_ceiling(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.min(16));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Run `f` until it succeeds, the error is not retryable, or the retry
    /// budget is spent. The last error is returned unchanged.
    pub async fn retry_async<F, Fut, T, E, P>(&self, mut f: F, is_retryable: P) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: Display,
    {
        let mut attempt = 0u32;
        loop {
            match f().await {
                Ok(v) => return Ok(v),
                Err(e) => {
                    attempt += 1;
                    if attempt > self.max_retries || !is_retryable(&e) {
                        return Err(e);
                    }
                    let ceiling = self.backoff_ceiling(attempt).as_millis() as u64;
                    let jitter = rng().random_range(0..=ceiling);
                    tracing::warn!(attempt, delay_ms = jitter, error = %e, "retrying request");
                    tokio::time::sleep(Duration::from_millis(jitter)).await;
                }
            }
        }
    }
}
