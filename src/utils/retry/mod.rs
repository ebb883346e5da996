use scrollcheck_core::{ScrollError, ScrollResult};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry and timeout policy for calls to the chat platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_retries", rename = "maxRetries")]
    pub max_retries: usize,
    #[serde(default = "default_initial_delay_ms", rename = "initialDelayMs")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_max_delay_ms", rename = "maxDelayMs")]
    pub max_delay_ms: u64,
    #[serde(default = "default_backoff_multiplier", rename = "backoffMultiplier")]
    pub backoff_multiplier: f64,
    /// Per-attempt timeout. An attempt that runs longer counts as a transient failure.
    #[serde(default = "default_timeout_secs", rename = "timeoutSecs")]
    pub timeout_secs: u64,
}

fn default_max_retries() -> usize {
    3
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    10000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl RetryConfig {
    /// Exponential delay before retry number `attempt + 1`, without jitter.
    pub fn base_delay_ms(&self, attempt: usize) -> u64 {
        (self.initial_delay_ms as f64 * self.backoff_multiplier.powi(attempt as i32))
            .min(self.max_delay_ms as f64) as u64
    }

    /// Delay before the next attempt. A `retry_after` hint from the platform wins over
    /// the computed backoff.
    pub fn delay_for(&self, attempt: usize, retry_after: Option<u64>) -> Duration {
        if let Some(secs) = retry_after {
            debug!("Using retry-after hint: {}s", secs);
            return Duration::from_secs(secs);
        }
        let base = self.base_delay_ms(attempt);
        // Add jitter (up to 25% of delay) to avoid thundering herd
        let jitter = (base as f64 * 0.25 * fastrand::f64()) as u64;
        Duration::from_millis(base + jitter)
    }
}

/// Run `op` with a per-attempt timeout, retrying retryable failures with backoff.
///
/// Permission, configuration and fatal errors return immediately. `what` names the
/// operation in log lines.
pub async fn with_retry<T, F, Fut>(config: &RetryConfig, what: &str, op: F) -> ScrollResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ScrollResult<T>>,
{
    retry_loop(config, what, true, op).await
}

/// Like [`with_retry`], but an attempt that times out is not repeated.
///
/// For calls that are not idempotent, such as posting a message, where a request
/// that timed out may still have been applied.
pub async fn with_retry_no_replay<T, F, Fut>(
    config: &RetryConfig,
    what: &str,
    op: F,
) -> ScrollResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ScrollResult<T>>,
{
    retry_loop(config, what, false, op).await
}

async fn retry_loop<T, F, Fut>(
    config: &RetryConfig,
    what: &str,
    replay_timeouts: bool,
    mut op: F,
) -> ScrollResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ScrollResult<T>>,
{
    let timeout = Duration::from_secs(config.timeout_secs);
    let mut attempt = 0;
    loop {
        let result = match tokio::time::timeout(timeout, op()).await {
            Ok(result) => result,
            Err(_) if !replay_timeouts => {
                warn!(
                    "{} timed out after {}s; not retrying",
                    what, config.timeout_secs
                );
                return Err(ScrollError::transient(format!(
                    "{} timed out after {}s",
                    what, config.timeout_secs
                )));
            }
            Err(_) => Err(ScrollError::transient(format!(
                "{} timed out after {}s",
                what, config.timeout_secs
            ))),
        };

        match result {
            Ok(value) => {
                if attempt > 0 {
                    debug!("{} succeeded on attempt {}", what, attempt + 1);
                }
                return Ok(value);
            }
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) if attempt >= config.max_retries => {
                warn!("{} failed after {} attempts: {}", what, attempt + 1, e);
                return Err(e);
            }
            Err(e) => {
                let delay = config.delay_for(attempt, e.retry_after());
                warn!(
                    "{} failed on attempt {}/{}: {} (retrying in {}ms)",
                    what,
                    attempt + 1,
                    config.max_retries + 1,
                    e,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests;
