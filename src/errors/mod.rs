//! Error types for the LLM gateway.
//!
//! The taxonomy distinguishes fatal errors (configuration, validation) from
//! transient ones (timeout, network, rate limit, server-side API errors) so
//! the retry layer can tell them apart.

mod error;

pub use error::{GatewayError, GatewayResult};
