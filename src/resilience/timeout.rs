//! Per-attempt deadline guard.

use crate::errors::{GatewayError, GatewayResult};
use std::future::Future;
use std::time::Duration;

/// Bound a single attempt with a deadline.
///
/// On expiry the inner future is dropped, which aborts the in-flight HTTP
/// request and frees its connection rather than abandoning the wait, and a
/// [`GatewayError::Timeout`] is returned. The retry classifier treats that
/// error as transient.
pub async fn with_timeout<T, Fut>(deadline: Duration, future: Fut) -> GatewayResult<T>
where
    Fut: Future<Output = GatewayResult<T>>,
{
    match tokio::time::timeout(deadline, future).await {
        Ok(result) => result,
        Err(_) => Err(GatewayError::Timeout { elapsed: deadline }),
    }
}
