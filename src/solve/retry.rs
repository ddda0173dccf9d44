//! Retrying wrapper around any [`GenerationClient`].
//!
//! [`RetryingClient`] adds what a single backend attempt does not have:
//!
//! * a per-attempt timeout,
//! * bounded retries with exponential backoff for retryable errors
//!   (see [`GenerationError::is_retryable`]),
//! * cooperative cancellation through a [`CancelToken`], honoured both while
//!   an attempt is in flight and while sleeping between attempts.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::watch;

use crate::config::{GenerationConfig, RetryConfig};
use crate::solve::client::{GenerationClient, GenerationError};
use crate::solve::prompt::GenerationRequest;

// ---------------------------------------------------------------------------
// CancelToken
// ---------------------------------------------------------------------------

/// Cloneable cancellation flag.
///
/// All clones observe the same flag; once cancelled it stays cancelled.
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once [`cancel`](Self::cancel) has been called on any clone.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        // The sender lives as long as `self`, so this only returns on cancel.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// RetryPolicy
// ---------------------------------------------------------------------------

/// Attempt budget, backoff curve and per-attempt timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first; never below 1.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub attempt_timeout: Duration,
}

impl RetryPolicy {
    pub fn from_config(retry: &RetryConfig, generation: &GenerationConfig) -> Self {
        Self {
            max_attempts: retry.max_attempts.max(1),
            initial_backoff: Duration::from_millis(retry.initial_backoff_ms),
            max_backoff: Duration::from_millis(retry.max_backoff_ms),
            attempt_timeout: Duration::from_secs(generation.timeout_secs),
        }
    }

    /// Delay after failed attempt number `attempt` (1-based):
    /// `initial * 2^(attempt-1)`, capped at `max_backoff`.
    ///
    /// ```
    /// use std::time::Duration;
    /// use algo_solver::solve::RetryPolicy;
    ///
    /// let policy = RetryPolicy {
    ///     max_attempts: 5,
    ///     initial_backoff: Duration::from_millis(100),
    ///     max_backoff: Duration::from_millis(250),
    ///     attempt_timeout: Duration::from_secs(1),
    /// };
    /// assert_eq!(policy.backoff(1), Duration::from_millis(100));
    /// assert_eq!(policy.backoff(2), Duration::from_millis(200));
    /// assert_eq!(policy.backoff(3), Duration::from_millis(250));
    /// ```
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .checked_mul(factor)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default(), &GenerationConfig::default())
    }
}

// ---------------------------------------------------------------------------
// RetryingClient
// ---------------------------------------------------------------------------

/// Wraps a single-attempt client with timeout, retry and cancellation.
///
/// ```rust,no_run
/// use algo_solver::config::{AppConfig, Credential};
/// use algo_solver::solve::{GeminiClient, RetryPolicy, RetryingClient};
///
/// let config = AppConfig::default();
/// let inner = GeminiClient::new(&config.generation, Credential::new("key"));
/// let client = RetryingClient::new(
///     inner,
///     RetryPolicy::from_config(&config.retry, &config.generation),
/// );
/// ```
pub struct RetryingClient<C: GenerationClient> {
    inner: C,
    policy: RetryPolicy,
}

impl<C: GenerationClient> RetryingClient<C> {
    pub fn new(inner: C, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    async fn attempt(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        tokio::time::timeout(self.policy.attempt_timeout, self.inner.generate(request))
            .await
            .unwrap_or(Err(GenerationError::Timeout))
    }
}

#[async_trait]
impl<C: GenerationClient> GenerationClient for RetryingClient<C> {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.generate_cancellable(request, &CancelToken::new()).await
    }

    async fn generate_cancellable(
        &self,
        request: &GenerationRequest,
        cancel: &CancelToken,
    ) -> Result<String, GenerationError> {
        let mut attempt = 1;
        loop {
            if cancel.is_cancelled() {
                return Err(GenerationError::Cancelled);
            }

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(GenerationError::Cancelled),
                outcome = self.attempt(request) => outcome,
            };

            match outcome {
                Ok(text) => {
                    if attempt > 1 {
                        log::info!("solve: backend succeeded on attempt {attempt}");
                    }
                    return Ok(text);
                }
                Err(err) if err.is_retryable() && attempt < self.policy.max_attempts => {
                    let delay = self.policy.backoff(attempt);
                    log::warn!(
                        "solve: attempt {attempt}/{} failed ({err}), retrying in {delay:?}",
                        self.policy.max_attempts
                    );
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(GenerationError::Cancelled),
                        _ = tokio::time::sleep(delay) => {}
                    }
                    attempt += 1;
                }
                Err(err) => {
                    log::error!("solve: backend call failed after {attempt} attempt(s): {err}");
                    return Err(err);
                }
            }
        }
    }

    /// Model listing is a diagnostic; one attempt with the same timeout.
    async fn list_models(&self) -> Result<Value, GenerationError> {
        tokio::time::timeout(self.policy.attempt_timeout, self.inner.list_models())
            .await
            .unwrap_or(Err(GenerationError::Timeout))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
