//! Concurrency-bounded batch orchestration.
//!
//! Bulk callers run a processor over a collection of items in consecutive
//! windows of fixed size: all items in a window run concurrently, the window
//! joins before the next begins, and an optional inter-window delay provides
//! rate limiting. Per-item failures are captured as results or abort the
//! whole batch, per configuration.

use crate::errors::{GatewayError, GatewayResult};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// Default number of items processed concurrently within a window
pub const DEFAULT_BATCH_CONCURRENCY: usize = 5;

/// Outcome of one item in a batch.
///
/// `index` is the item's position in the caller-supplied collection,
/// preserved regardless of which item's work finished first.
#[derive(Debug)]
pub struct BatchResult<R> {
    /// Position of the item in the input collection
    pub index: usize,
    /// The item's result or captured error
    pub outcome: Result<R, GatewayError>,
}

impl<R> BatchResult<R> {
    /// True when the item succeeded
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// The success value, if any
    pub fn value(&self) -> Option<&R> {
        self.outcome.as_ref().ok()
    }

    /// The captured error, if any
    pub fn error(&self) -> Option<&GatewayError> {
        self.outcome.as_ref().err()
    }
}

/// Observer of batch progress.
///
/// Multiple observers may be registered; each is notified after every window.
pub trait BatchObserver<R>: Send + Sync {
    /// Called after each window with the cumulative completed count
    fn on_progress(&self, completed: usize, total: usize) {
        let _ = (completed, total);
    }

    /// Called after each window with that window's results
    fn on_window_complete(&self, window: &[BatchResult<R>]) {
        let _ = window;
    }
}

/// Configuration for batch processing
pub struct BatchConfig<R> {
    /// Window size: how many items run concurrently
    pub concurrency: usize,
    /// Pause between windows; the rate-limiting mechanism
    pub delay: Duration,
    /// Capture per-item failures instead of aborting the batch
    pub continue_on_error: bool,
    /// Progress observers
    pub observers: Vec<Arc<dyn BatchObserver<R>>>,
}

impl<R> Default for BatchConfig<R> {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_BATCH_CONCURRENCY,
            delay: Duration::ZERO,
            continue_on_error: true,
            observers: Vec::new(),
        }
    }
}

impl<R> BatchConfig<R> {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the window size
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Sets the pause between windows
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Derives the inter-window delay from a target request rate.
    ///
    /// A window issues `concurrency` requests, so spacing windows
    /// `concurrency * 60s / rpm` apart keeps the batch at or under the
    /// target. Call after setting the concurrency.
    pub fn with_requests_per_minute(mut self, rpm: u32) -> Self {
        if rpm > 0 {
            let window_ms = self.concurrency as u64 * 60_000 / u64::from(rpm);
            self.delay = Duration::from_millis(window_ms);
        }
        self
    }

    /// Sets whether per-item failures abort the batch
    pub fn continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.continue_on_error = continue_on_error;
        self
    }

    /// Registers a progress observer
    pub fn with_observer(mut self, observer: Arc<dyn BatchObserver<R>>) -> Self {
        self.observers.push(observer);
        self
    }
}

/// Process a collection of items in concurrency-bounded windows.
///
/// The processor receives each item and its position in the input. The
/// returned results are in input order: windows are sequential, and within a
/// window results are index-addressed rather than completion-ordered.
///
/// With `continue_on_error` unset, the first failing item's error propagates
/// out of the whole call and remaining items are abandoned; otherwise every
/// failure is captured in its [`BatchResult`].
pub async fn batch_process<T, R, F, Fut>(
    items: Vec<T>,
    processor: F,
    config: &BatchConfig<R>,
) -> GatewayResult<Vec<BatchResult<R>>>
where
    F: Fn(T, usize) -> Fut,
    Fut: Future<Output = GatewayResult<R>>,
{
    let total = items.len();
    let concurrency = config.concurrency.max(1);
    let mut results: Vec<BatchResult<R>> = Vec::with_capacity(total);

    let mut pending = items.into_iter().enumerate().peekable();
    while pending.peek().is_some() {
        let window: Vec<(usize, T)> = pending.by_ref().take(concurrency).collect();
        let window_start = results.len();

        let futures: Vec<_> = window
            .into_iter()
            .map(|(index, item)| {
                let fut = processor(item, index);
                async move { (index, fut.await) }
            })
            .collect();

        for (index, outcome) in futures::future::join_all(futures).await {
            if let Err(error) = &outcome {
                if !config.continue_on_error {
                    return Err(error.clone());
                }
            }
            results.push(BatchResult { index, outcome });
        }

        let completed = results.len();
        for observer in &config.observers {
            observer.on_progress(completed, total);
            observer.on_window_complete(&results[window_start..]);
        }

        if config.delay > Duration::ZERO && pending.peek().is_some() {
            sleep(config.delay).await;
        }
    }

    Ok(results)
}

/// Partition a slice into consecutive chunks of at most `size` elements.
///
/// Pure helper for callers that want the same windowing without the
/// orchestration. A `size` of zero yields no chunks.
pub fn chunk<T: Clone>(items: &[T], size: usize) -> Vec<Vec<T>> {
    if size == 0 {
        return Vec::new();
    }
    items.chunks(size).map(|c| c.to_vec()).collect()
}
