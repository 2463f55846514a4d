//! Circuit breaker for the upstream provider.
//!
//! A stateful gate shared by every caller of one upstream dependency. The
//! instance is constructed once and injected wherever calls are made, so
//! tests can hold isolated breakers and independent upstreams can have
//! independent health tracking.

use crate::errors::{GatewayError, GatewayResult};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Configuration for circuit breaker behavior
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures while closed before the circuit opens
    pub failure_threshold: u32,
    /// Consecutive probe successes while half-open before the circuit closes
    pub success_threshold: u32,
    /// Cooldown after opening before a probe is allowed
    pub open_timeout: Duration,
    /// Logical name of the guarded dependency
    pub name: String,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 3,
            open_timeout: Duration::from_secs(30),
            name: "llm-provider".to_string(),
        }
    }
}

/// Circuit breaker state
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CircuitState {
    /// Circuit is closed, requests flow normally
    Closed,
    /// Circuit is open, requests are rejected without reaching the provider
    Open,
    /// Circuit is half-open, probing whether the provider recovered
    HalfOpen,
}

// All mutable state lives behind one mutex: the tokio runtime schedules
// callers on multiple OS threads, so transitions and counter updates must be
// atomic with respect to each other.
struct BreakerInner {
    state: CircuitState,
    failure_count: u32,
    success_count: u32,
    last_failure_at: Option<Instant>,
}

/// Circuit breaker implementation
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerInner>,
    hook: Option<Arc<dyn CircuitBreakerHook>>,
}

impl CircuitBreaker {
    /// Create a new circuit breaker with the given configuration
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(BreakerInner {
                state: CircuitState::Closed,
                failure_count: 0,
                success_count: 0,
                last_failure_at: None,
            }),
            hook: None,
        }
    }

    /// Add a hook for circuit breaker state changes
    pub fn with_hook(mut self, hook: Arc<dyn CircuitBreakerHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Execute a unit of work through the breaker.
    ///
    /// While open and inside the cooldown the work is never invoked and the
    /// call is rejected with [`GatewayError::CircuitOpen`] carrying the
    /// remaining wait. Once the cooldown elapses the breaker moves to
    /// half-open and the work runs as a probe. Every error returned by the
    /// work, timeouts included, counts as a failure.
    pub async fn execute<F, Fut, T>(&self, f: F) -> GatewayResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = GatewayResult<T>>,
    {
        self.check_call_permitted()?;

        match f().await {
            Ok(value) => {
                self.record_success();
                Ok(value)
            }
            Err(error) => {
                self.record_failure();
                Err(error)
            }
        }
    }

    /// Get the current state of the circuit breaker
    pub fn state(&self) -> CircuitState {
        self.inner.lock().state
    }

    /// Consecutive failure count since the last success while closed
    pub fn failure_count(&self) -> u32 {
        self.inner.lock().failure_count
    }

    /// Consecutive probe success count; meaningful only while half-open
    pub fn success_count(&self) -> u32 {
        self.inner.lock().success_count
    }

    /// Logical name of the guarded dependency
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Remaining cooldown before the next probe; `None` unless open
    pub fn time_until_half_open(&self) -> Option<Duration> {
        let inner = self.inner.lock();
        if inner.state != CircuitState::Open {
            return None;
        }
        Some(self.remaining_cooldown(&inner))
    }

    /// Force the breaker back to closed with counters cleared
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        let old_state = inner.state;
        inner.state = CircuitState::Closed;
        inner.failure_count = 0;
        inner.success_count = 0;
        inner.last_failure_at = None;
        drop(inner);

        if old_state != CircuitState::Closed {
            self.notify_state_change(old_state, CircuitState::Closed);
        }
    }

    fn remaining_cooldown(&self, inner: &BreakerInner) -> Duration {
        match inner.last_failure_at {
            Some(at) => self.config.open_timeout.saturating_sub(at.elapsed()),
            None => Duration::ZERO,
        }
    }

    fn check_call_permitted(&self) -> GatewayResult<()> {
        let mut inner = self.inner.lock();
        match inner.state {
            CircuitState::Closed | CircuitState::HalfOpen => Ok(()),
            CircuitState::Open => {
                let remaining = self.remaining_cooldown(&inner);
                if remaining > Duration::ZERO {
                    return Err(GatewayError::CircuitOpen {
                        retry_after: remaining,
                    });
                }
                inner.state = CircuitState::HalfOpen;
                inner.success_count = 0;
                drop(inner);
                self.notify_state_change(CircuitState::Open, CircuitState::HalfOpen);
                Ok(())
            }
        }
    }

    fn record_success(&self) {
        let mut inner = self.inner.lock();
        inner.failure_count = 0;

        if inner.state == CircuitState::HalfOpen {
            inner.success_count += 1;
            if inner.success_count >= self.config.success_threshold {
                inner.state = CircuitState::Closed;
                inner.success_count = 0;
                drop(inner);
                self.notify_state_change(CircuitState::HalfOpen, CircuitState::Closed);
            }
        }
    }

    fn record_failure(&self) {
        let mut inner = self.inner.lock();
        inner.last_failure_at = Some(Instant::now());

        match inner.state {
            CircuitState::HalfOpen => {
                // A single probe failure cancels recovery
                inner.state = CircuitState::Open;
                inner.success_count = 0;
                drop(inner);
                self.notify_state_change(CircuitState::HalfOpen, CircuitState::Open);
            }
            CircuitState::Closed => {
                inner.failure_count += 1;
                if inner.failure_count >= self.config.failure_threshold {
                    inner.state = CircuitState::Open;
                    drop(inner);
                    self.notify_state_change(CircuitState::Closed, CircuitState::Open);
                }
            }
            CircuitState::Open => {}
        }
    }

    fn notify_state_change(&self, old: CircuitState, new: CircuitState) {
        tracing::info!(
            breaker = %self.config.name,
            from = ?old,
            to = ?new,
            "circuit breaker state change"
        );
        if let Some(hook) = &self.hook {
            hook.on_state_change(old, new);
        }
    }
}

/// Hook for circuit breaker state changes
pub trait CircuitBreakerHook: Send + Sync {
    /// Called after every state transition
    fn on_state_change(&self, old_state: CircuitState, new_state: CircuitState);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn breaker(failure_threshold: u32, success_threshold: u32, open_timeout: Duration) -> CircuitBreaker {
        CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold,
            success_threshold,
            open_timeout,
            name: "test".to_string(),
        })
    }

    async fn fail(cb: &CircuitBreaker) -> GatewayResult<u32> {
        cb.execute(|| async {
            Err(GatewayError::Api {
                status: 503,
                message: "unavailable".to_string(),
                kind: "server_error".to_string(),
            })
        })
        .await
    }

    async fn succeed(cb: &CircuitBreaker) -> GatewayResult<u32> {
        cb.execute(|| async { Ok(42) }).await
    }

    #[tokio::test]
    async fn test_breaker_starts_closed() {
        let cb = breaker(3, 2, Duration::from_secs(30));
        assert_eq!(cb.state(), CircuitState::Closed);
        assert_eq!(cb.failure_count(), 0);
        assert_eq!(cb.time_until_half_open(), None);
    }

    #[tokio::test]
    async fn test_breaker_opens_after_failure_threshold() {
        let cb = breaker(3, 2, Duration::from_secs(30));

        let _ = fail(&cb).await;
        let _ = fail(&cb).await;
        assert_eq!(cb.state(), CircuitState::Closed);
        assert_eq!(cb.failure_count(), 2);

        let _ = fail(&cb).await;
        assert_eq!(cb.state(), CircuitState::Open);
    }

    #[tokio::test]
    async fn test_open_breaker_rejects_without_invoking_work() {
        let cb = breaker(1, 1, Duration::from_secs(30));
        let _ = fail(&cb).await;
        assert_eq!(cb.state(), CircuitState::Open);

        let calls = AtomicU32::new(0);
        let result = cb
            .execute(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(1) }
            })
            .await;

        match result {
            Err(GatewayError::CircuitOpen { retry_after }) => {
                assert!(retry_after > Duration::ZERO);
                assert!(retry_after <= Duration::from_secs(30));
            }
            other => panic!("expected CircuitOpen, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_elapsed_cooldown_transitions_to_half_open_and_probes_once() {
        let cb = breaker(1, 2, Duration::from_millis(20));
        let _ = fail(&cb).await;
        assert_eq!(cb.state(), CircuitState::Open);

        tokio::time::sleep(Duration::from_millis(40)).await;

        let calls = AtomicU32::new(0);
        let result = cb
            .execute(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(7) }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cb.state(), CircuitState::HalfOpen);
    }

    #[tokio::test]
    async fn test_success_threshold_closes_from_half_open() {
        let cb = breaker(1, 2, Duration::from_millis(10));
        let _ = fail(&cb).await;
        tokio::time::sleep(Duration::from_millis(30)).await;

        let _ = succeed(&cb).await;
        assert_eq!(cb.state(), CircuitState::HalfOpen);
        assert_eq!(cb.success_count(), 1);

        let _ = succeed(&cb).await;
        assert_eq!(cb.state(), CircuitState::Closed);
        assert_eq!(cb.failure_count(), 0);
        assert_eq!(cb.success_count(), 0);
    }

    #[tokio::test]
    async fn test_single_probe_failure_reopens() {
        let cb = breaker(1, 3, Duration::from_millis(10));
        let _ = fail(&cb).await;
        tokio::time::sleep(Duration::from_millis(30)).await;

        // Two successful probes, then one failure: straight back to open
        let _ = succeed(&cb).await;
        let _ = succeed(&cb).await;
        assert_eq!(cb.state(), CircuitState::HalfOpen);

        let _ = fail(&cb).await;
        assert_eq!(cb.state(), CircuitState::Open);
        assert_eq!(cb.success_count(), 0);
    }

    #[tokio::test]
    async fn test_success_resets_failure_count_while_closed() {
        let cb = breaker(3, 2, Duration::from_secs(30));

        let _ = fail(&cb).await;
        let _ = fail(&cb).await;
        assert_eq!(cb.failure_count(), 2);

        let _ = succeed(&cb).await;
        assert_eq!(cb.failure_count(), 0);
        assert_eq!(cb.state(), CircuitState::Closed);

        // Threshold counts consecutive failures, so two more keep it closed
        let _ = fail(&cb).await;
        let _ = fail(&cb).await;
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_manual_reset() {
        let cb = breaker(1, 2, Duration::from_secs(30));
        let _ = fail(&cb).await;
        assert_eq!(cb.state(), CircuitState::Open);

        cb.reset();
        assert_eq!(cb.state(), CircuitState::Closed);
        assert_eq!(cb.failure_count(), 0);
        assert_eq!(cb.time_until_half_open(), None);

        assert_eq!(succeed(&cb).await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_time_until_half_open_counts_down() {
        let cb = breaker(1, 2, Duration::from_millis(100));
        let _ = fail(&cb).await;

        let remaining = cb.time_until_half_open().unwrap();
        assert!(remaining <= Duration::from_millis(100));

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(cb.time_until_half_open(), Some(Duration::ZERO));
    }

    #[tokio::test]
    async fn test_interleaved_completions_update_counters_once_each() {
        // Several calls in flight at once; each completion lands exactly once
        // and the final counter state reflects the completion order.
        let cb = Arc::new(breaker(100, 2, Duration::from_secs(30)));

        let mut handles = Vec::new();
        for i in 0..20u32 {
            let cb = cb.clone();
            handles.push(tokio::spawn(async move {
                cb.execute(|| async move {
                    tokio::time::sleep(Duration::from_millis(u64::from(i % 5))).await;
                    if i % 2 == 0 {
                        Ok(i)
                    } else {
                        Err(GatewayError::Network {
                            message: "flaky".to_string(),
                        })
                    }
                })
                .await
            }));
        }

        let results = futures::future::join_all(handles).await;
        let failures = results
            .iter()
            .filter(|r| r.as_ref().unwrap().is_err())
            .count();
        assert_eq!(failures, 10);

        // Ten failures interleaved with ten successes can never exceed the
        // failure budget of 100, and each success zeroed the counter, so the
        // breaker is still closed with a bounded counter.
        assert_eq!(cb.state(), CircuitState::Closed);
        assert!(cb.failure_count() <= 10);
    }

    struct RecordingHook {
        opened: AtomicU32,
        closed: AtomicU32,
    }

    impl CircuitBreakerHook for RecordingHook {
        fn on_state_change(&self, _old: CircuitState, new: CircuitState) {
            match new {
                CircuitState::Open => {
                    self.opened.fetch_add(1, Ordering::SeqCst);
                }
                CircuitState::Closed => {
                    self.closed.fetch_add(1, Ordering::SeqCst);
                }
                CircuitState::HalfOpen => {}
            }
        }
    }

    #[tokio::test]
    async fn test_hook_observes_transitions() {
        let hook = Arc::new(RecordingHook {
            opened: AtomicU32::new(0),
            closed: AtomicU32::new(0),
        });
        let cb = CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: 1,
            success_threshold: 1,
            open_timeout: Duration::from_millis(10),
            name: "hooked".to_string(),
        })
        .with_hook(hook.clone());

        let _ = fail(&cb).await;
        assert_eq!(hook.opened.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(30)).await;
        let _ = succeed(&cb).await;
        assert_eq!(hook.closed.load(Ordering::SeqCst), 1);
    }
}
