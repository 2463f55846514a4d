//! HTTP transport layer.
//!
//! Services talk to the provider through the [`HttpTransport`] trait so tests
//! can substitute a mock; [`ReqwestTransport`] is the production implementation.

mod http_transport;

pub use http_transport::{HttpTransport, ReqwestTransport};
