//! Retry with exponential backoff.

use crate::errors::GatewayError;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retries after the initial attempt
    pub max_retries: u32,
    /// Delay before the first retry
    pub initial_backoff: Duration,
    /// Upper bound on any computed delay
    pub max_backoff: Duration,
    /// Growth factor applied per attempt
    pub backoff_multiplier: f64,
    /// Randomization factor in [0, 1]; 0 disables jitter
    pub jitter: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            jitter: 0.0,
        }
    }
}

/// Predicate deciding whether an error is worth a retry attempt.
///
/// Errors the classifier rejects propagate immediately without consuming
/// retry budget.
pub type RetryClassifier = Arc<dyn Fn(&GatewayError) -> bool + Send + Sync>;

/// Retry executor that handles retry logic with exponential backoff
pub struct RetryExecutor {
    config: RetryConfig,
    classifier: RetryClassifier,
    retry_hook: Option<Arc<dyn RetryHook>>,
}

impl RetryExecutor {
    /// Create a new retry executor with the given configuration.
    ///
    /// The default classifier is [`GatewayError::is_retryable`]: timeouts,
    /// network failures, rate limits, and 5xx API errors.
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config,
            classifier: Arc::new(GatewayError::is_retryable),
            retry_hook: None,
        }
    }

    /// Replace the error classifier
    pub fn with_classifier(mut self, classifier: RetryClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Add a retry hook invoked before every retry
    pub fn with_hook(mut self, hook: Arc<dyn RetryHook>) -> Self {
        self.retry_hook = Some(hook);
        self
    }

    /// Execute the given operation with retry logic.
    ///
    /// After the retry budget is exhausted the last error is returned
    /// unchanged, so a breaker wrapping this call sees one failure per
    /// outer call rather than one per attempt.
    pub async fn execute<F, Fut, T>(&self, operation: &str, f: F) -> Result<T, GatewayError>
    where
        F: Fn() -> Fut + Send,
        Fut: Future<Output = Result<T, GatewayError>> + Send,
        T: Send,
    {
        let mut attempt = 0;
        let mut last_error = None;

        while attempt <= self.config.max_retries {
            attempt += 1;

            match f().await {
                Ok(result) => return Ok(result),
                Err(e) if !(self.classifier)(&e) => return Err(e),
                Err(e) => {
                    last_error = Some(e.clone());

                    if attempt > self.config.max_retries {
                        break;
                    }

                    let delay = self.calculate_backoff(attempt, e.retry_after());
                    tracing::debug!(
                        operation = operation,
                        attempt = attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "retrying after transient failure"
                    );

                    if let Some(hook) = &self.retry_hook {
                        match hook
                            .on_retry(RetryContext {
                                attempt,
                                error: e.clone(),
                                delay,
                                operation: operation.to_string(),
                            })
                            .await
                        {
                            RetryDecision::Abort => return Err(e),
                            RetryDecision::Retry(custom_delay) => {
                                sleep(custom_delay).await;
                                continue;
                            }
                            RetryDecision::Default => {}
                        }
                    }

                    sleep(delay).await;
                }
            }
        }

        Err(last_error.unwrap_or(GatewayError::Internal {
            message: "retry loop exited without an error".to_string(),
        }))
    }

    /// Calculate the backoff delay for a given attempt
    fn calculate_backoff(&self, attempt: u32, server_retry_after: Option<Duration>) -> Duration {
        let base_delay = self.config.initial_backoff.as_millis() as f64
            * self.config.backoff_multiplier.powi((attempt - 1) as i32);

        let jitter_range = base_delay * self.config.jitter;
        let jitter = if jitter_range > 0.0 {
            rand::random::<f64>() * jitter_range * 2.0 - jitter_range
        } else {
            0.0
        };
        let delay_ms = (base_delay + jitter)
            .clamp(0.0, self.config.max_backoff.as_millis() as f64);

        let calculated = Duration::from_millis(delay_ms as u64);

        // Use the server's retry-after if longer
        match server_retry_after {
            Some(server_delay) if server_delay > calculated => server_delay,
            _ => calculated,
        }
    }
}

/// Hook for custom retry behavior
#[async_trait]
pub trait RetryHook: Send + Sync {
    /// Called before each retry; the decision can override or abort it
    async fn on_retry(&self, context: RetryContext) -> RetryDecision;
}

/// Context information for a retry attempt
#[derive(Debug, Clone)]
pub struct RetryContext {
    /// Attempt number that just failed (1-based)
    pub attempt: u32,
    /// The error that triggered the retry
    pub error: GatewayError,
    /// Delay computed for the next attempt
    pub delay: Duration,
    /// Name of the operation being retried
    pub operation: String,
}

/// Decision on how to proceed with a retry
#[derive(Debug)]
pub enum RetryDecision {
    /// Use the default retry behavior
    Default,
    /// Retry with a custom delay
    Retry(Duration),
    /// Abort the retry and return the error
    Abort,
}
