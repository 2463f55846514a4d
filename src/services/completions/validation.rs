//! Request validation for the completions API.

use super::types::CompletionRequest;
use crate::errors::{GatewayError, GatewayResult};
use crate::pricing::is_supported_model;

/// Validate a completion request before any network interaction.
///
/// An unknown model identifier is always rejected here, deterministically,
/// so invalid calls never consume a retry attempt or touch the breaker.
pub fn validate_completion_request(request: &CompletionRequest) -> GatewayResult<()> {
    if request.model.is_empty() {
        return Err(GatewayError::Validation {
            message: "model is required".to_string(),
        });
    }

    if !is_supported_model(&request.model) {
        return Err(GatewayError::Validation {
            message: format!("unknown model: {}", request.model),
        });
    }

    if request.messages.is_empty() {
        return Err(GatewayError::Validation {
            message: "messages must not be empty".to_string(),
        });
    }

    for (i, message) in request.messages.iter().enumerate() {
        if message.content.is_empty() {
            return Err(GatewayError::Validation {
                message: format!("message content must not be empty (index {})", i),
            });
        }
    }

    if let Some(temp) = request.temperature {
        if !(0.0..=2.0).contains(&temp) {
            return Err(GatewayError::Validation {
                message: "temperature must be between 0.0 and 2.0".to_string(),
            });
        }
    }

    if let Some(max_tokens) = request.max_tokens {
        if max_tokens == 0 {
            return Err(GatewayError::Validation {
                message: "max_tokens must be greater than 0".to_string(),
            });
        }
    }

    Ok(())
}
