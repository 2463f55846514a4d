//! Completions service implementation.

use super::types::{ApiErrorBody, CompletionRequest, CompletionResponse};
use super::validation::validate_completion_request;
use crate::auth::AuthManager;
use crate::errors::{GatewayError, GatewayResult};
use crate::transport::HttpTransport;
use async_trait::async_trait;
use bytes::Bytes;
use http::{Method, Response};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Completions service trait for testability
#[async_trait]
pub trait CompletionsService: Send + Sync {
    /// Create a completion
    async fn create(&self, request: CompletionRequest) -> GatewayResult<CompletionResponse>;
}

/// Implementation of the completions service over an HTTP transport
pub struct CompletionsServiceImpl {
    transport: Arc<dyn HttpTransport>,
    auth_manager: Arc<dyn AuthManager>,
    base_url: Url,
}

impl CompletionsServiceImpl {
    /// Create a new completions service
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        auth_manager: Arc<dyn AuthManager>,
        base_url: Url,
    ) -> Self {
        Self {
            transport,
            auth_manager,
            base_url,
        }
    }

    /// Map a non-success response to a gateway error
    fn parse_api_error(&self, response: &Response<Bytes>) -> GatewayError {
        let status = response.status().as_u16();
        let (message, kind) = match serde_json::from_slice::<ApiErrorBody>(response.body()) {
            Ok(body) => (
                body.error.message,
                body.error.kind.unwrap_or_else(|| "unknown".to_string()),
            ),
            Err(_) => (
                String::from_utf8_lossy(response.body()).to_string(),
                "unknown".to_string(),
            ),
        };

        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs);
            return GatewayError::RateLimited {
                message,
                retry_after,
            };
        }

        GatewayError::Api {
            status,
            message,
            kind,
        }
    }
}

#[async_trait]
impl CompletionsService for CompletionsServiceImpl {
    async fn create(&self, request: CompletionRequest) -> GatewayResult<CompletionResponse> {
        validate_completion_request(&request)?;

        let url = self.base_url.join("/v1/chat/completions")?;
        let headers = self.auth_manager.get_headers();
        let body = serde_json::to_vec(&request)?;

        tracing::debug!(model = %request.model, "sending completion request");

        let response = self
            .transport
            .send(Method::POST, url, headers, Some(Bytes::from(body)))
            .await?;

        if response.status().is_success() {
            let completion = serde_json::from_slice::<CompletionResponse>(response.body())?;
            Ok(completion)
        } else {
            Err(self.parse_api_error(&response))
        }
    }
}
