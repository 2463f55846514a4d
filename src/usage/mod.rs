//! Usage metering for provider calls.
//!
//! Every successful invocation produces one immutable [`UsageMetrics`]
//! record; records are appended to a [`UsageStore`] and never updated or
//! deleted.

mod store;

pub use store::{log_usage, InMemoryUsageStore, JsonlUsageStore, UsageStore};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One persisted record of token counts and computed cost for a successful
/// provider call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageMetrics {
    /// Logical name of the calling operation
    pub function_name: String,
    /// Provider derived from the model identifier
    pub provider: String,
    /// Model that served the call
    pub model: String,
    /// Tokens consumed by the prompt
    pub input_tokens: u32,
    /// Tokens generated in the response
    pub output_tokens: u32,
    /// Computed cost in USD; absent when the model had no usable pricing
    pub cost_usd: Option<f64>,
    /// Provider-issued request identifier
    pub request_id: String,
    /// End-user identifier, when the caller supplied one
    pub user_id: Option<String>,
    /// When the record was created
    pub created_at: DateTime<Utc>,
    /// Wall-clock duration of the whole invocation in milliseconds
    pub duration_ms: u64,
    /// Number of retries the invocation needed (0 when the first attempt won)
    pub retries: u32,
}
