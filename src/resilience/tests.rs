//! Integration tests for the composed resilience stack.
//!
//! The composition mirrors production wiring: the breaker wraps the retry
//! executor, which wraps the timeout guard around each attempt.

use super::*;
use crate::errors::{GatewayError, GatewayResult};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn server_error() -> GatewayError {
    GatewayError::Api {
        status: 503,
        message: "Service unavailable".to_string(),
        kind: "server_error".to_string(),
    }
}

fn fast_retry(max_retries: u32) -> RetryExecutor {
    RetryExecutor::new(RetryConfig {
        max_retries,
        initial_backoff: Duration::from_millis(5),
        max_backoff: Duration::from_millis(100),
        backoff_multiplier: 2.0,
        jitter: 0.0,
    })
}

fn breaker(failure_threshold: u32, open_timeout: Duration) -> Arc<CircuitBreaker> {
    Arc::new(CircuitBreaker::new(CircuitBreakerConfig {
        failure_threshold,
        success_threshold: 2,
        open_timeout,
        name: "stack-test".to_string(),
    }))
}

async fn run_stack<F, Fut>(
    cb: &CircuitBreaker,
    retry: &RetryExecutor,
    attempt_timeout: Duration,
    f: F,
) -> GatewayResult<u32>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: std::future::Future<Output = GatewayResult<u32>> + Send,
{
    cb.execute(|| retry.execute("stack", || with_timeout(attempt_timeout, f())))
        .await
}

#[tokio::test]
async fn test_full_stack_success() {
    let cb = breaker(5, Duration::from_secs(30));
    let retry = fast_retry(3);

    let result = run_stack(&cb, &retry, Duration::from_secs(1), || async { Ok(42) }).await;

    assert_eq!(result.unwrap(), 42);
    assert_eq!(cb.state(), CircuitState::Closed);
    assert_eq!(cb.failure_count(), 0);
}

#[tokio::test]
async fn test_retry_exhaustion_counts_as_one_breaker_failure() {
    let cb = breaker(5, Duration::from_secs(30));
    let retry = fast_retry(3);
    let attempts = Arc::new(AtomicU32::new(0));

    let attempts_clone = attempts.clone();
    let result = run_stack(&cb, &retry, Duration::from_secs(1), move || {
        attempts_clone.fetch_add(1, Ordering::SeqCst);
        async { Err(server_error()) }
    })
    .await;

    assert!(result.is_err());
    // Four attempts inside the retry loop, but the breaker saw one failure
    assert_eq!(attempts.load(Ordering::SeqCst), 4);
    assert_eq!(cb.failure_count(), 1);
    assert_eq!(cb.state(), CircuitState::Closed);
}

#[tokio::test]
async fn test_repeated_exhaustion_opens_breaker() {
    let cb = breaker(2, Duration::from_secs(30));
    let retry = fast_retry(1);

    for _ in 0..2 {
        let result =
            run_stack(&cb, &retry, Duration::from_secs(1), || async { Err(server_error()) }).await;
        assert!(result.is_err());
    }

    assert_eq!(cb.state(), CircuitState::Open);

    // Open breaker rejects before the retry layer ever runs
    let attempts = Arc::new(AtomicU32::new(0));
    let attempts_clone = attempts.clone();
    let result = run_stack(&cb, &retry, Duration::from_secs(1), move || {
        attempts_clone.fetch_add(1, Ordering::SeqCst);
        async { Ok(1) }
    })
    .await;

    assert!(matches!(result, Err(GatewayError::CircuitOpen { .. })));
    assert_eq!(attempts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_timeout_is_retried_then_succeeds() {
    let cb = breaker(5, Duration::from_secs(30));
    let retry = fast_retry(2);
    let attempts = Arc::new(AtomicU32::new(0));

    let attempts_clone = attempts.clone();
    let result = run_stack(&cb, &retry, Duration::from_millis(20), move || {
        let n = attempts_clone.fetch_add(1, Ordering::SeqCst);
        async move {
            if n == 0 {
                // First attempt hangs past the deadline and is cancelled
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
            Ok(7)
        }
    })
    .await;

    assert_eq!(result.unwrap(), 7);
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    assert_eq!(cb.failure_count(), 0);
}

#[tokio::test]
async fn test_fatal_error_skips_retry_but_still_trips_breaker() {
    let cb = breaker(1, Duration::from_secs(30));
    let retry = fast_retry(5);
    let attempts = Arc::new(AtomicU32::new(0));

    let attempts_clone = attempts.clone();
    let result = run_stack(&cb, &retry, Duration::from_secs(1), move || {
        attempts_clone.fetch_add(1, Ordering::SeqCst);
        async {
            Err(GatewayError::Api {
                status: 400,
                message: "bad request".to_string(),
                kind: "invalid_request_error".to_string(),
            })
        }
    })
    .await;

    assert!(result.is_err());
    // Non-retryable: a single attempt, and the breaker records the failure
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    assert_eq!(cb.state(), CircuitState::Open);
}

#[tokio::test]
async fn test_breaker_recovers_through_half_open_probes() {
    let cb = breaker(1, Duration::from_millis(20));
    let retry = fast_retry(0);

    let result =
        run_stack(&cb, &retry, Duration::from_secs(1), || async { Err(server_error()) }).await;
    assert!(result.is_err());
    assert_eq!(cb.state(), CircuitState::Open);

    tokio::time::sleep(Duration::from_millis(50)).await;

    // success_threshold is 2: two clean probes close the circuit
    for _ in 0..2 {
        let result = run_stack(&cb, &retry, Duration::from_secs(1), || async { Ok(1) }).await;
        assert!(result.is_ok());
    }
    assert_eq!(cb.state(), CircuitState::Closed);
}

#[tokio::test]
async fn test_concurrent_callers_share_breaker_state() {
    let cb = breaker(100, Duration::from_secs(30));
    let retry = Arc::new(fast_retry(0));

    let mut handles = Vec::new();
    for i in 0..8u32 {
        let cb = cb.clone();
        let retry = retry.clone();
        handles.push(tokio::spawn(async move {
            cb.execute(|| {
                retry.execute("concurrent", move || {
                    with_timeout(Duration::from_secs(1), async move {
                        tokio::time::sleep(Duration::from_millis(u64::from(i % 3))).await;
                        if i % 2 == 0 {
                            Ok(i)
                        } else {
                            Err(server_error())
                        }
                    })
                })
            })
            .await
        }));
    }

    let results = futures::future::join_all(handles).await;
    let failures = results.iter().filter(|r| r.as_ref().unwrap().is_err()).count();
    assert_eq!(failures, 4);
    assert_eq!(cb.state(), CircuitState::Closed);
    assert!(cb.failure_count() <= 4);
}
