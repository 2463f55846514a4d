//! Invocation facade.
//!
//! Routes every provider call through the resilience chain (circuit breaker →
//! retry policy → timeout guard), meters token usage into a cost, and records
//! an append-only usage audit entry for each successful call.

use crate::errors::GatewayResult;
use crate::observability::{metric_names, MetricsCollector, NoopMetricsCollector};
use crate::pricing::{provider_for_model, PricingTable};
use crate::resilience::{
    with_timeout, CircuitBreaker, CircuitBreakerConfig, CircuitState, RetryConfig, RetryExecutor,
};
use crate::services::completions::{
    validate_completion_request, CompletionRequest, CompletionResponse, CompletionsService,
};
use crate::usage::{log_usage, InMemoryUsageStore, UsageMetrics, UsageStore};
use chrono::Utc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Result of a successful invocation: the provider response and the usage
/// record that was written for it.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Raw provider response
    pub response: CompletionResponse,
    /// Usage record persisted for this call
    pub metrics: UsageMetrics,
}

/// Facade through which all provider calls pass.
///
/// Holds an explicit, injected [`CircuitBreaker`]: every caller of the same
/// upstream dependency shares one instance, and tests construct their own.
pub struct Invoker {
    service: Arc<dyn CompletionsService>,
    circuit_breaker: Arc<CircuitBreaker>,
    retry: RetryExecutor,
    attempt_timeout: Duration,
    pricing: PricingTable,
    usage_store: Arc<dyn UsageStore>,
    metrics: Arc<dyn MetricsCollector>,
}

impl Invoker {
    /// Create a builder for configuring an invoker
    pub fn builder(service: Arc<dyn CompletionsService>) -> InvokerBuilder {
        InvokerBuilder::new(service)
    }

    /// The breaker guarding this invoker's upstream
    pub fn circuit_breaker(&self) -> &CircuitBreaker {
        &self.circuit_breaker
    }

    /// Invoke the provider through the full resilience chain.
    ///
    /// `function_name` labels the calling operation in logs, metrics, and the
    /// usage record. Failures are classified and returned without writing a
    /// usage record; the usage store is only touched after success, and its
    /// failures never surface here.
    pub async fn invoke(
        &self,
        function_name: &str,
        request: CompletionRequest,
    ) -> GatewayResult<Invocation> {
        validate_completion_request(&request)?;

        let started = Instant::now();
        let attempts = AtomicU32::new(0);
        let attempt_timeout = self.attempt_timeout;
        let service = self.service.clone();

        let result = self
            .circuit_breaker
            .execute(|| {
                self.retry.execute(function_name, || {
                    let service = service.clone();
                    let request = request.clone();
                    attempts.fetch_add(1, Ordering::SeqCst);
                    async move { with_timeout(attempt_timeout, service.create(request)).await }
                })
            })
            .await;

        let retries = attempts.load(Ordering::SeqCst).saturating_sub(1);
        self.record_breaker_state();

        let response = match result {
            Ok(response) => response,
            Err(error) => {
                self.metrics.increment_counter(
                    metric_names::REQUEST_ERRORS,
                    1,
                    &[("kind", error.kind_label())],
                );
                tracing::error!(
                    function = function_name,
                    kind = error.kind_label(),
                    retries = retries,
                    error = %error,
                    "invocation failed"
                );
                return Err(error);
            }
        };

        let duration_ms = started.elapsed().as_millis() as u64;
        let cost_usd = match self.pricing.price_or_default(&request.model) {
            Some((price, fell_back)) => {
                if fell_back {
                    tracing::warn!(
                        model = %request.model,
                        "no pricing entry for model, using default model pricing"
                    );
                }
                Some(price.cost(&response.usage))
            }
            None => None,
        };

        let usage_record = UsageMetrics {
            function_name: function_name.to_string(),
            provider: provider_for_model(&request.model).to_string(),
            model: request.model.clone(),
            input_tokens: response.usage.input_tokens,
            output_tokens: response.usage.output_tokens,
            cost_usd,
            request_id: response.id.clone(),
            user_id: request.user.clone(),
            created_at: Utc::now(),
            duration_ms,
            retries,
        };

        self.record_success_metrics(&usage_record);
        log_usage(self.usage_store.as_ref(), &usage_record).await;

        tracing::info!(
            function = function_name,
            model = %usage_record.model,
            input_tokens = usage_record.input_tokens,
            output_tokens = usage_record.output_tokens,
            duration_ms = duration_ms,
            retries = retries,
            "invocation succeeded"
        );

        Ok(Invocation {
            response,
            metrics: usage_record,
        })
    }

    fn record_success_metrics(&self, record: &UsageMetrics) {
        let labels = &[("model", record.model.as_str())];
        self.metrics
            .increment_counter(metric_names::REQUEST_COUNT, 1, labels);
        self.metrics.record_histogram(
            metric_names::REQUEST_DURATION_MS,
            record.duration_ms as f64,
            labels,
        );
        self.metrics.increment_counter(
            metric_names::TOKENS_INPUT,
            u64::from(record.input_tokens),
            labels,
        );
        self.metrics.increment_counter(
            metric_names::TOKENS_OUTPUT,
            u64::from(record.output_tokens),
            labels,
        );
        if record.retries > 0 {
            self.metrics.increment_counter(
                metric_names::RETRY_ATTEMPTS,
                u64::from(record.retries),
                labels,
            );
        }
    }

    fn record_breaker_state(&self) {
        let state = match self.circuit_breaker.state() {
            CircuitState::Closed => 0.0,
            CircuitState::Open => 1.0,
            CircuitState::HalfOpen => 2.0,
        };
        self.metrics.set_gauge(
            metric_names::CIRCUIT_BREAKER_STATE,
            state,
            &[("breaker", self.circuit_breaker.name())],
        );
    }
}

/// Builder for [`Invoker`]
pub struct InvokerBuilder {
    service: Arc<dyn CompletionsService>,
    circuit_breaker: Option<Arc<CircuitBreaker>>,
    retry_config: RetryConfig,
    attempt_timeout: Duration,
    pricing: PricingTable,
    usage_store: Option<Arc<dyn UsageStore>>,
    metrics: Option<Arc<dyn MetricsCollector>>,
}

impl InvokerBuilder {
    /// Create a builder around the service that performs the provider call
    pub fn new(service: Arc<dyn CompletionsService>) -> Self {
        Self {
            service,
            circuit_breaker: None,
            retry_config: RetryConfig::default(),
            attempt_timeout: Duration::from_secs(crate::DEFAULT_TIMEOUT_SECS),
            pricing: PricingTable::default(),
            usage_store: None,
            metrics: None,
        }
    }

    /// Share an existing circuit breaker instance
    pub fn circuit_breaker(mut self, breaker: Arc<CircuitBreaker>) -> Self {
        self.circuit_breaker = Some(breaker);
        self
    }

    /// Sets the retry configuration
    pub fn retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    /// Sets the per-attempt deadline
    pub fn attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// Replaces the pricing table
    pub fn pricing(mut self, pricing: PricingTable) -> Self {
        self.pricing = pricing;
        self
    }

    /// Sets the usage store
    pub fn usage_store(mut self, store: Arc<dyn UsageStore>) -> Self {
        self.usage_store = Some(store);
        self
    }

    /// Sets the metrics collector
    pub fn metrics(mut self, metrics: Arc<dyn MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Build the invoker
    pub fn build(self) -> Invoker {
        Invoker {
            service: self.service,
            circuit_breaker: self
                .circuit_breaker
                .unwrap_or_else(|| Arc::new(CircuitBreaker::new(CircuitBreakerConfig::default()))),
            retry: RetryExecutor::new(self.retry_config),
            attempt_timeout: self.attempt_timeout,
            pricing: self.pricing,
            usage_store: self
                .usage_store
                .unwrap_or_else(|| Arc::new(InMemoryUsageStore::new())),
            metrics: self.metrics.unwrap_or_else(|| Arc::new(NoopMetricsCollector)),
        }
    }
}
