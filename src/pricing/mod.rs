//! Model allow-list, pricing table, and cost computation.
//!
//! Every invocation is metered: token counts from the provider response are
//! converted to a USD cost using a static per-model price table (USD per
//! million tokens). The allow-list of valid model identifiers is checked
//! before any network call is made.

use crate::services::completions::TokenUsage;
use std::collections::HashMap;

/// Model identifiers accepted by the gateway.
///
/// A model may be allowed before its pricing entry lands; cost computation
/// then falls back to the default model's pricing.
pub const SUPPORTED_MODELS: &[&str] = &[
    "gpt-4o",
    "gpt-4o-mini",
    "gpt-4.1",
    "gpt-4.1-mini",
    "o3-mini",
];

/// The model used when a request does not specify one, and whose pricing is
/// the fallback for allowed-but-unpriced models.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Returns true if the model identifier is in the allow-list.
pub fn is_supported_model(model: &str) -> bool {
    SUPPORTED_MODELS.contains(&model)
}

/// Derive the provider name from the model identifier naming convention.
pub fn provider_for_model(model: &str) -> &'static str {
    if model.starts_with("claude-") {
        "anthropic"
    } else if model.starts_with("gemini-") {
        "google"
    } else if model.starts_with("mistral-") {
        "mistral"
    } else {
        // gpt-*, o1/o3/o4-* and anything else routed through the default provider
        "openai"
    }
}

/// Price of one model, in USD per million tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPrice {
    /// USD per million input tokens
    pub input_per_million: f64,
    /// USD per million output tokens
    pub output_per_million: f64,
}

impl ModelPrice {
    /// Create a new price entry.
    pub const fn new(input_per_million: f64, output_per_million: f64) -> Self {
        Self {
            input_per_million,
            output_per_million,
        }
    }

    /// Compute the cost of a call from its token usage.
    pub fn cost(&self, usage: &TokenUsage) -> f64 {
        usage.input_tokens as f64 / 1_000_000.0 * self.input_per_million
            + usage.output_tokens as f64 / 1_000_000.0 * self.output_per_million
    }
}

/// Per-model pricing table.
#[derive(Debug, Clone)]
pub struct PricingTable {
    entries: HashMap<String, ModelPrice>,
}

impl Default for PricingTable {
    fn default() -> Self {
        let mut entries = HashMap::new();
        entries.insert("gpt-4o".to_string(), ModelPrice::new(2.50, 10.00));
        entries.insert("gpt-4o-mini".to_string(), ModelPrice::new(0.15, 0.60));
        entries.insert("gpt-4.1".to_string(), ModelPrice::new(2.00, 8.00));
        entries.insert("o3-mini".to_string(), ModelPrice::new(1.10, 4.40));
        // gpt-4.1-mini is allowed but not yet priced; callers fall back to
        // the default model's pricing.
        Self { entries }
    }
}

impl PricingTable {
    /// Create an empty pricing table.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Insert or replace the price entry for a model.
    pub fn set(&mut self, model: impl Into<String>, price: ModelPrice) {
        self.entries.insert(model.into(), price);
    }

    /// Look up the price entry for a model.
    pub fn price_for(&self, model: &str) -> Option<&ModelPrice> {
        self.entries.get(model)
    }

    /// Price entry for a model, falling back to the default model's entry.
    ///
    /// Returns the price and whether the fallback was taken; `None` when
    /// neither the model nor the default model has an entry.
    pub fn price_or_default(&self, model: &str) -> Option<(&ModelPrice, bool)> {
        if let Some(price) = self.entries.get(model) {
            return Some((price, false));
        }
        self.entries.get(DEFAULT_MODEL).map(|price| (price, true))
    }
}
