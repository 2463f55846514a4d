//! Request and response types for the completions API.

use serde::{Deserialize, Serialize};

/// Role of a chat message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions
    System,
    /// End-user input
    User,
    /// Model output
    Assistant,
}

/// One message in a chat completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author of the message
    pub role: Role,
    /// Message text
    pub content: String,
}

impl ChatMessage {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Request body for a completion call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model identifier, must be in the allow-list
    pub model: String,
    /// Conversation messages
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Maximum number of output tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// End-user identifier attached to the call for attribution
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl CompletionRequest {
    /// Create a request with the required fields
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: None,
            max_tokens: None,
            user: None,
        }
    }

    /// Sets the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the output token limit
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Attaches an end-user identifier
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }
}

/// Token counts reported by the provider for one call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens consumed by the prompt
    pub input_tokens: u32,
    /// Tokens generated in the response
    pub output_tokens: u32,
}

impl TokenUsage {
    /// Total tokens for the call
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// Provider response for a completion call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Provider-issued request identifier
    pub id: String,
    /// Model that produced the response
    pub model: String,
    /// Generated text
    pub content: String,
    /// Token accounting for the call
    pub usage: TokenUsage,
}

/// Error body returned by the provider on non-success responses
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// Error detail object
    pub error: ApiErrorDetail,
}

/// Detail of a provider error
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    /// Human-readable message
    pub message: String,
    /// Provider error type
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_request_serialization_skips_unset_fields() {
        let request = CompletionRequest::new("gpt-4o-mini", vec![ChatMessage::user("hi")]);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "user");
        assert!(json.get("temperature").is_none());
        assert!(json.get("max_tokens").is_none());
        assert!(json.get("user").is_none());
    }

    #[test]
    fn test_request_builder_methods() {
        let request = CompletionRequest::new("gpt-4o", vec![ChatMessage::user("hi")])
            .with_temperature(0.2)
            .with_max_tokens(256)
            .with_user("user-42");

        assert_eq!(request.temperature, Some(0.2));
        assert_eq!(request.max_tokens, Some(256));
        assert_eq!(request.user.as_deref(), Some("user-42"));
    }

    #[test]
    fn test_response_deserialization() {
        let body = r#"{
            "id": "cmpl_abc123",
            "model": "gpt-4o-mini",
            "content": "Hello there",
            "usage": {"input_tokens": 12, "output_tokens": 5}
        }"#;

        let response: CompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.id, "cmpl_abc123");
        assert_eq!(response.usage.input_tokens, 12);
        assert_eq!(response.usage.total(), 17);
    }

    #[test]
    fn test_error_body_deserialization() {
        let body = r#"{"error": {"message": "model overloaded", "type": "server_error"}}"#;
        let parsed: ApiErrorBody = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.error.message, "model overloaded");
        assert_eq!(parsed.error.kind.as_deref(), Some("server_error"));
    }

    #[test]
    fn test_error_body_without_type() {
        let body = r#"{"error": {"message": "oops"}}"#;
        let parsed: ApiErrorBody = serde_json::from_str(body).unwrap();
        assert!(parsed.error.kind.is_none());
    }
}
