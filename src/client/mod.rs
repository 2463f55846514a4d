//! Client interface wiring configuration into the invocation stack.

use crate::auth::{AuthManager, BearerAuthManager};
use crate::batch::{batch_process, BatchConfig, BatchResult};
use crate::config::GatewayConfig;
use crate::errors::{GatewayError, GatewayResult};
use crate::invoke::{Invocation, Invoker};
use crate::resilience::{CircuitBreaker, CircuitBreakerConfig, RetryConfig};
use crate::services::completions::{CompletionRequest, CompletionsServiceImpl};
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::usage::{InMemoryUsageStore, JsonlUsageStore, UsageStore};
use std::sync::Arc;
use url::Url;

/// Gateway client: owns one circuit breaker per upstream dependency and the
/// invoker all calls flow through.
pub struct GatewayClient {
    config: Arc<GatewayConfig>,
    invoker: Arc<Invoker>,
    circuit_breaker: Arc<CircuitBreaker>,
}

impl GatewayClient {
    /// Create a new client from configuration
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        let config = Arc::new(config);

        let auth_manager = Arc::new(BearerAuthManager::new(config.api_key.clone()));
        auth_manager
            .validate_api_key()
            .map_err(|e| GatewayError::Configuration {
                message: format!("Invalid API key: {}", e),
            })?;

        let transport =
            Arc::new(ReqwestTransport::new(config.timeout)?) as Arc<dyn HttpTransport>;
        let base_url = Url::parse(&config.base_url)?;
        let service = Arc::new(CompletionsServiceImpl::new(
            transport,
            auth_manager as Arc<dyn AuthManager>,
            base_url,
        ));

        let circuit_breaker = Arc::new(CircuitBreaker::new(CircuitBreakerConfig::default()));

        let usage_store: Arc<dyn UsageStore> = match &config.usage_log_path {
            Some(path) => Arc::new(JsonlUsageStore::new(path)),
            None => Arc::new(InMemoryUsageStore::new()),
        };

        let invoker = Arc::new(
            Invoker::builder(service)
                .circuit_breaker(circuit_breaker.clone())
                .retry_config(RetryConfig {
                    max_retries: config.max_retries,
                    ..Default::default()
                })
                .attempt_timeout(config.timeout)
                .pricing(config.pricing.clone())
                .usage_store(usage_store)
                .build(),
        );

        Ok(Self {
            config,
            invoker,
            circuit_breaker,
        })
    }

    /// Create a client with an externally built invoker (for testing)
    #[cfg(test)]
    pub fn with_invoker(config: GatewayConfig, invoker: Arc<Invoker>) -> Self {
        let circuit_breaker = Arc::new(CircuitBreaker::new(CircuitBreakerConfig::default()));
        Self {
            config: Arc::new(config),
            invoker,
            circuit_breaker,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// The invoker all calls flow through
    pub fn invoker(&self) -> Arc<Invoker> {
        self.invoker.clone()
    }

    /// The breaker guarding the upstream provider
    pub fn circuit_breaker(&self) -> &CircuitBreaker {
        &self.circuit_breaker
    }

    /// Invoke the provider once.
    ///
    /// A request without a model is routed to the configured default model.
    pub async fn complete(
        &self,
        function_name: &str,
        mut request: CompletionRequest,
    ) -> GatewayResult<Invocation> {
        if request.model.is_empty() {
            request.model = self.config.default_model.clone();
        }
        self.invoker.invoke(function_name, request).await
    }

    /// Run many requests through the invoker in concurrency-bounded windows.
    pub async fn complete_batch(
        &self,
        function_name: &str,
        requests: Vec<CompletionRequest>,
        config: &BatchConfig<Invocation>,
    ) -> GatewayResult<Vec<BatchResult<Invocation>>> {
        let invoker = self.invoker.clone();
        let function_name = function_name.to_string();
        let default_model = self.config.default_model.clone();

        batch_process(
            requests,
            move |mut request, _index| {
                let invoker = invoker.clone();
                let function_name = function_name.clone();
                if request.model.is_empty() {
                    request.model = default_model.clone();
                }
                async move { invoker.invoke(&function_name, request).await }
            },
            config,
        )
        .await
    }
}

/// Create a new gateway client from configuration
pub fn create_client(config: GatewayConfig) -> GatewayResult<GatewayClient> {
    GatewayClient::new(config)
}

/// Create a new gateway client from environment variables
pub fn create_client_from_env() -> GatewayResult<GatewayClient> {
    let config = GatewayConfig::from_env()?;
    create_client(config)
}
