//! Usage record persistence.

use super::UsageMetrics;
use crate::errors::{GatewayError, GatewayResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

/// Append-only sink for usage records.
#[async_trait]
pub trait UsageStore: Send + Sync {
    /// Append one record
    async fn record(&self, metrics: &UsageMetrics) -> GatewayResult<()>;
}

/// Write a usage record, isolating every failure from the caller.
///
/// A record without a cost is skipped with a warning rather than persisted
/// with a fabricated value, and a store failure is logged but never allowed
/// to fail the call that produced the record.
pub async fn log_usage(store: &dyn UsageStore, metrics: &UsageMetrics) {
    if metrics.cost_usd.is_none() {
        tracing::warn!(
            function = %metrics.function_name,
            model = %metrics.model,
            "skipping usage record with no cost value"
        );
        return;
    }

    if let Err(e) = store.record(metrics).await {
        tracing::warn!(
            function = %metrics.function_name,
            error = %e,
            "failed to persist usage record"
        );
    }
}

/// In-memory usage store for tests and short-lived tools.
#[derive(Default)]
pub struct InMemoryUsageStore {
    records: Mutex<Vec<UsageMetrics>>,
}

impl InMemoryUsageStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded metrics
    pub fn records(&self) -> Vec<UsageMetrics> {
        self.records.lock().clone()
    }

    /// Number of recorded metrics
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// True when nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

#[async_trait]
impl UsageStore for InMemoryUsageStore {
    async fn record(&self, metrics: &UsageMetrics) -> GatewayResult<()> {
        self.records.lock().push(metrics.clone());
        Ok(())
    }
}

/// Append-only JSON-lines audit log, one line per successful call.
pub struct JsonlUsageStore {
    path: PathBuf,
}

impl JsonlUsageStore {
    /// Create a store appending to the given file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the underlying file
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl UsageStore for JsonlUsageStore {
    async fn record(&self, metrics: &UsageMetrics) -> GatewayResult<()> {
        let mut line = serde_json::to_string(metrics)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| GatewayError::Internal {
                message: format!("failed to open usage log {}: {}", self.path.display(), e),
            })?;

        file.write_all(line.as_bytes())
            .await
            .map_err(|e| GatewayError::Internal {
                message: format!("failed to append usage record: {}", e),
            })?;

        Ok(())
    }
}
