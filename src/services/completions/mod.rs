//! Completions service: the single provider call surface the gateway wraps.

mod service;
mod types;
mod validation;


pub use service::{CompletionsService, CompletionsServiceImpl};
pub use types::{
    ApiErrorBody, ApiErrorDetail, ChatMessage, CompletionRequest, CompletionResponse, Role,
    TokenUsage,
};
pub use validation::validate_completion_request;
