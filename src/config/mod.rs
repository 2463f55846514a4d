//! Configuration types for the LLM gateway.

use crate::errors::{GatewayError, GatewayResult};
use crate::pricing::PricingTable;
use crate::{DEFAULT_BASE_URL, DEFAULT_MAX_RETRIES, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};
use secrecy::SecretString;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the LLM gateway.
#[derive(Clone)]
pub struct GatewayConfig {
    /// API key for the provider
    pub api_key: SecretString,
    /// Base URL for the provider API
    pub base_url: String,
    /// Model used when a request does not specify one
    pub default_model: String,
    /// Deadline for a single attempt
    pub timeout: Duration,
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Per-model pricing table
    pub pricing: PricingTable,
    /// Append-only usage audit log; in-memory when unset
    pub usage_log_path: Option<PathBuf>,
}

impl GatewayConfig {
    /// Creates a new configuration builder
    pub fn builder() -> GatewayConfigBuilder {
        GatewayConfigBuilder::default()
    }

    /// Creates a configuration from environment variables
    pub fn from_env() -> GatewayResult<Self> {
        let api_key =
            std::env::var("LLM_GATEWAY_API_KEY").map_err(|_| GatewayError::Configuration {
                message: "LLM_GATEWAY_API_KEY environment variable not set".to_string(),
            })?;

        let base_url =
            std::env::var("LLM_GATEWAY_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let default_model =
            std::env::var("LLM_GATEWAY_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let timeout_secs = std::env::var("LLM_GATEWAY_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let max_retries = std::env::var("LLM_GATEWAY_MAX_RETRIES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_RETRIES);

        let usage_log_path = std::env::var("LLM_GATEWAY_USAGE_LOG").ok().map(PathBuf::from);

        Ok(Self {
            api_key: SecretString::new(api_key),
            base_url,
            default_model,
            timeout: Duration::from_secs(timeout_secs),
            max_retries,
            pricing: PricingTable::default(),
            usage_log_path,
        })
    }
}

/// Builder for GatewayConfig
#[derive(Default)]
pub struct GatewayConfigBuilder {
    api_key: Option<SecretString>,
    base_url: Option<String>,
    default_model: Option<String>,
    timeout: Option<Duration>,
    max_retries: Option<u32>,
    pricing: Option<PricingTable>,
    usage_log_path: Option<PathBuf>,
}

impl GatewayConfigBuilder {
    /// Sets the API key
    pub fn api_key(mut self, api_key: SecretString) -> Self {
        self.api_key = Some(api_key);
        self
    }

    /// Sets the base URL
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the default model
    pub fn default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = Some(model.into());
        self
    }

    /// Sets the per-attempt timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the maximum number of retries
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Replaces the pricing table
    pub fn pricing(mut self, pricing: PricingTable) -> Self {
        self.pricing = Some(pricing);
        self
    }

    /// Sets the usage audit log path
    pub fn usage_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.usage_log_path = Some(path.into());
        self
    }

    /// Builds the configuration
    pub fn build(self) -> GatewayResult<GatewayConfig> {
        let api_key = self.api_key.ok_or_else(|| GatewayError::Configuration {
            message: "API key is required".to_string(),
        })?;

        Ok(GatewayConfig {
            api_key,
            base_url: self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            default_model: self
                .default_model
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout: self
                .timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            pricing: self.pricing.unwrap_or_default(),
            usage_log_path: self.usage_log_path,
        })
    }
}
