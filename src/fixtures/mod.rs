//! Test fixtures and helper data.

use crate::services::completions::{
    ChatMessage, CompletionRequest, CompletionResponse, TokenUsage,
};
use serde_json::json;

/// Sample API key for testing
pub const TEST_API_KEY: &str = "sk-test123456789012345";

/// Sample model ID
pub const TEST_MODEL: &str = "gpt-4o-mini";

/// Create a minimal valid completion request
pub fn sample_request() -> CompletionRequest {
    CompletionRequest::new(TEST_MODEL, vec![ChatMessage::user("Hello!")])
}

/// Create a sample completion response
pub fn sample_response() -> CompletionResponse {
    CompletionResponse {
        id: "cmpl_abc123".to_string(),
        model: TEST_MODEL.to_string(),
        content: "Hello! How can I help you today?".to_string(),
        usage: TokenUsage {
            input_tokens: 12,
            output_tokens: 34,
        },
    }
}

/// Create a sample completion response body as JSON
pub fn sample_completion_json() -> serde_json::Value {
    json!({
        "id": "cmpl_abc123",
        "model": TEST_MODEL,
        "content": "Hello! How can I help you today?",
        "usage": {
            "input_tokens": 12,
            "output_tokens": 34
        }
    })
}

/// Create a sample error response body as JSON
pub fn sample_error_json(kind: &str, message: &str) -> serde_json::Value {
    json!({
        "error": {
            "type": kind,
            "message": message
        }
    })
}
