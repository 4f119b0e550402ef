use std::future::Future;
use std::time::Duration;

use mise_core::config::{ConfigError, ConfigProperties, MiseConfig, PropertyMeta};

use crate::error::DataError;

/// How often and how patiently a failed backend call is repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included. Zero behaves like one.
    pub max_attempts: u32,
    /// Delay before attempt `n + 1` is `base_delay * n`.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Single attempt, no waiting.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Saturates at [`Duration::MAX`] instead of overflowing.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.checked_mul(attempt).unwrap_or(Duration::MAX)
    }
}

impl ConfigProperties for RetryPolicy {
    fn prefix() -> &'static str {
        "retry"
    }

    fn properties_metadata() -> Vec<PropertyMeta> {
        vec![
            PropertyMeta {
                key: "retry.max.attempts",
                type_name: "u32",
                description: "Attempts per backend call, the first one included",
            },
            PropertyMeta {
                key: "retry.base.delay.ms",
                type_name: "u64",
                description: "Linear backoff step in milliseconds",
            },
        ]
    }

    fn from_config(config: &MiseConfig) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            max_attempts: config
                .get_opt("retry.max.attempts")?
                .unwrap_or(defaults.max_attempts),
            base_delay: config
                .get_opt::<u64>("retry.base.delay.ms")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.base_delay),
        })
    }
}

/// Run `op`, repeating it while it fails with a retryable error.
///
/// Transport failures and 5xx responses are retried up to
/// `policy.max_attempts` attempts in total, sleeping `base_delay * attempt`
/// in between. Every other error is returned at once.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    mut op: F,
) -> Result<T, DataError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DataError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < max_attempts => {
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    operation,
                    attempt,
                    max_attempts,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "backend call failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
