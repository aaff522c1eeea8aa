//! Bounded retry for integration creation
//!
//! Cloud-side prerequisites (IAM roles, queues, service accounts) are often
//! still propagating when an integration is created right after them. Kinds
//! that opt in get a fixed number of create attempts.
//!
//! The split mirrors how the work is shared:
//! - [`AttemptBudget`] counts attempts and decides retryable vs terminal
//! - [`retry_until`] is the scheduler: it waits a fixed interval between
//!   attempts and stops at the timeout, with no backoff of its own

use crate::error::{ProviderError, Result};
use lacework_api::{ApiError, Integration, IntegrationType, IntegrationsApi, IntegrationsResponse};
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// Retry configuration for create
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total create attempts, including the first
    pub max_attempts: u32,

    /// Overall budget for all attempts
    pub timeout: Duration,

    /// Wait between attempts
    pub interval: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: crate::schema::DEFAULT_RETRIES,
            timeout: Duration::from_secs(5 * 60),
            interval: Duration::from_secs(2),
        }
    }
}

impl RetryConfig {
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }
}

/// Outcome of one failed attempt
#[derive(Debug)]
pub enum RetryError<E> {
    /// Try again after the interval
    Retryable(E),
    /// Stop and surface this error
    NonRetryable(E),
}

/// Remaining create attempts for one integration
pub struct AttemptBudget {
    integration_type: IntegrationType,
    max_attempts: u32,
    remaining: AtomicU32,
}

impl AttemptBudget {
    pub fn new(integration_type: IntegrationType, max_attempts: u32) -> Self {
        let max_attempts = max_attempts.max(1);
        Self {
            integration_type,
            max_attempts,
            remaining: AtomicU32::new(max_attempts),
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining.load(Ordering::SeqCst)
    }

    /// Spend one attempt on `error`.
    pub fn on_failure(&self, error: ApiError) -> RetryError<ProviderError> {
        let remaining = match self.remaining.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
            n.checked_sub(1)
        }) {
            Ok(before) => before - 1,
            Err(_) => 0,
        };

        if remaining > 0 {
            tracing::warn!(
                integration_type = %self.integration_type,
                remaining = remaining,
                error = %error,
                "Create failed, retrying"
            );
            RetryError::Retryable(ProviderError::Api(error))
        } else {
            RetryError::NonRetryable(ProviderError::RetriesExhausted {
                integration_type: self.integration_type,
                attempts: self.max_attempts,
                source: error,
            })
        }
    }
}

/// Run `operation` until it succeeds, fails terminally, or `timeout` runs out.
pub async fn retry_until<T, F, Fut>(
    timeout: Duration,
    interval: Duration,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, RetryError<ProviderError>>>,
{
    let started = tokio::time::Instant::now();

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(RetryError::NonRetryable(e)) => return Err(e),
            Err(RetryError::Retryable(e)) => {
                if started.elapsed() + interval > timeout {
                    return Err(ProviderError::Timeout(format!(
                        "gave up after {:?}: {}",
                        timeout, e
                    )));
                }
                tokio::time::sleep(interval).await;
            }
        }
    }
}

/// Create `request`, retrying up to `config.max_attempts` times.
pub async fn create_with_retry(
    client: &dyn IntegrationsApi,
    request: &Integration,
    config: &RetryConfig,
) -> Result<IntegrationsResponse> {
    let integration_type = request.integration_type;
    let budget = AttemptBudget::new(integration_type, config.max_attempts);
    let budget = &budget;

    retry_until(config.timeout, config.interval, move || async move {
        client
            .create(request)
            .await
            .map_err(|e| budget.on_failure(e))
    })
    .await
    .map_err(|e| match e {
        ProviderError::Timeout(message) => ProviderError::Timeout(format!(
            "creating {} integration: {}",
            integration_type, message
        )),
        other => other,
    })
}
