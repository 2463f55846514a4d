//! Error types for the LLM gateway.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Main error type for the LLM gateway.
///
/// This enum covers all possible error scenarios with rich context for debugging
/// and proper retry handling.
#[derive(Error, Debug, Clone)]
pub enum GatewayError {
    /// Configuration error (missing credential, invalid settings)
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message describing the configuration issue
        message: String,
    },

    /// Validation error (unknown model, invalid request parameters)
    #[error("Validation error: {message}")]
    Validation {
        /// Error message describing the validation issue
        message: String,
    },

    /// A single attempt exceeded its deadline
    #[error("Request timed out after {elapsed:?}")]
    Timeout {
        /// The deadline that was exceeded
        elapsed: Duration,
    },

    /// Non-success response from the provider
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the provider
        status: u16,
        /// Error message from the provider
        message: String,
        /// Provider-reported error type, "unknown" if not parseable
        kind: String,
    },

    /// Rate limit error (too many requests, quota exceeded)
    #[error("Rate limit error: {message}")]
    RateLimited {
        /// Error message describing the rate limit issue
        message: String,
        /// Duration to wait before retrying (if provided by the API)
        retry_after: Option<Duration>,
    },

    /// Network error (connection failed, DNS issues)
    #[error("Network error: {message}")]
    Network {
        /// Error message describing the network issue
        message: String,
    },

    /// Circuit breaker is shedding load
    #[error("Circuit breaker is open, try again in {retry_after:?}")]
    CircuitOpen {
        /// Remaining wait until the breaker will probe the provider again
        retry_after: Duration,
    },

    /// Internal error (unexpected conditions, library bugs)
    #[error("Internal error: {message}")]
    Internal {
        /// Error message describing the internal issue
        message: String,
    },
}

impl GatewayError {
    /// Returns true if this error is transient and worth retrying with backoff.
    ///
    /// Retryable errors include:
    /// - Timeouts (the attempt was cancelled at its deadline)
    /// - Rate limit errors (429)
    /// - Network errors (connection issues)
    /// - Server-side API errors (5xx)
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayError::Timeout { .. }
                | GatewayError::RateLimited { .. }
                | GatewayError::Network { .. }
                | GatewayError::Api {
                    status: 500..=599,
                    ..
                }
        )
    }

    /// Returns the retry-after duration if available.
    ///
    /// Set on rate limit errors when the API provided a Retry-After header,
    /// and on circuit-open errors as the remaining cooldown.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            GatewayError::RateLimited { retry_after, .. } => *retry_after,
            GatewayError::CircuitOpen { retry_after } => Some(*retry_after),
            _ => None,
        }
    }

    /// Short stable label for the error kind, used in logs and metric labels.
    pub fn kind_label(&self) -> &'static str {
        match self {
            GatewayError::Configuration { .. } => "configuration",
            GatewayError::Validation { .. } => "validation",
            GatewayError::Timeout { .. } => "timeout",
            GatewayError::Api { .. } => "api",
            GatewayError::RateLimited { .. } => "rate_limited",
            GatewayError::Network { .. } => "network",
            GatewayError::CircuitOpen { .. } => "circuit_open",
            GatewayError::Internal { .. } => "internal",
        }
    }
}

// Conversions from common error types
impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Network {
                message: format!("Request timed out: {}", err),
            }
        } else if err.is_connect() {
            GatewayError::Network {
                message: format!("Connection failed: {}", err),
            }
        } else {
            GatewayError::Network {
                message: format!("Network error: {}", err),
            }
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Internal {
            message: format!("JSON serialization/deserialization error: {}", err),
        }
    }
}

impl From<url::ParseError> for GatewayError {
    fn from(err: url::ParseError) -> Self {
        GatewayError::Configuration {
            message: format!("Invalid URL: {}", err),
        }
    }
}
