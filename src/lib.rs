//! # LLM Gateway
//!
//! Resilient invocation gateway for LLM provider calls.
//!
//! Every call the application makes to its text-generation provider passes
//! through this layer, which provides:
//!
//! - Circuit breaking: one shared breaker per upstream dependency sheds load
//!   as soon as the provider is judged unhealthy
//! - Retry with exponential backoff, driven by an error classifier that only
//!   spends retry budget on transient failures
//! - Per-attempt timeouts that cancel the in-flight request at the deadline
//! - Cost metering: token usage from every successful call is priced against
//!   a per-model table and appended to an immutable usage audit log
//! - Batch orchestration: bulk work runs in concurrency-bounded windows with
//!   optional inter-window delay for rate limiting
//! - Comprehensive observability (structured logging, metrics)
//! - Secure credential handling with `SecretString`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use llm_gateway::{create_client, ChatMessage, CompletionRequest, GatewayConfig};
//! use secrecy::SecretString;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GatewayConfig::builder()
//!         .api_key(SecretString::new("sk-...".to_string()))
//!         .build()?;
//!
//!     let client = create_client(config)?;
//!     // Or create from environment variables:
//!     // let client = llm_gateway::create_client_from_env()?;
//!
//!     let request = CompletionRequest::new(
//!         "gpt-4o-mini",
//!         vec![ChatMessage::user("Summarize this resume...")],
//!     );
//!     let invocation = client.complete("summarize_resume", request).await?;
//!     println!("cost: {:?} USD", invocation.metrics.cost_usd);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - `client` - Client wiring and factory functions
//! - `config` - Configuration types and builder
//! - `auth` - Authentication header management
//! - `transport` - HTTP transport layer
//! - `services` - Provider API surfaces (completions)
//! - `resilience` - Circuit breaker, retry policy, timeout guard
//! - `invoke` - The invocation facade all calls flow through
//! - `usage` - Usage metering and the append-only audit store
//! - `pricing` - Model allow-list and cost table
//! - `batch` - Concurrency-bounded batch orchestration
//! - `errors` - Error types and taxonomy

#![warn(missing_docs)]
#![warn(clippy::all)]

// Public modules
pub mod auth;
pub mod batch;
pub mod client;
pub mod config;
pub mod errors;
pub mod invoke;
pub mod observability;
pub mod pricing;
pub mod resilience;
pub mod services;
pub mod transport;
pub mod usage;

// Development/testing modules
#[cfg(test)]
pub mod fixtures;
#[cfg(test)]
pub mod mocks;

// Re-exports for convenience
pub use auth::{AuthManager, BearerAuthManager};
pub use batch::{
    batch_process, chunk, BatchConfig, BatchObserver, BatchResult, DEFAULT_BATCH_CONCURRENCY,
};
pub use client::{create_client, create_client_from_env, GatewayClient};
pub use config::{GatewayConfig, GatewayConfigBuilder};
pub use errors::{GatewayError, GatewayResult};
pub use invoke::{Invocation, Invoker, InvokerBuilder};
pub use observability::{
    InMemoryMetricsCollector, LogFormat, LogLevel, LoggingConfig, MetricsCollector,
    NoopMetricsCollector,
};
pub use pricing::{
    is_supported_model, provider_for_model, ModelPrice, PricingTable, DEFAULT_MODEL,
    SUPPORTED_MODELS,
};
pub use resilience::{
    with_timeout, CircuitBreaker, CircuitBreakerConfig, CircuitBreakerHook, CircuitState,
    RetryClassifier, RetryConfig, RetryContext, RetryDecision, RetryExecutor, RetryHook,
};
pub use services::completions::{
    ChatMessage, CompletionRequest, CompletionResponse, CompletionsService, CompletionsServiceImpl,
    Role, TokenUsage,
};
pub use transport::{HttpTransport, ReqwestTransport};
pub use usage::{log_usage, InMemoryUsageStore, JsonlUsageStore, UsageMetrics, UsageStore};

/// The default provider API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// The default per-attempt timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 45;

/// The default maximum number of retry attempts
pub const DEFAULT_MAX_RETRIES: u32 = 3;
