//! Observability: structured logging and metrics collection.
//!
//! - **Logging**: structured logging with multiple formats via `tracing`
//! - **Metrics**: counters, histograms, and gauges for gateway activity

mod logging;
mod metrics;

pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use metrics::{
    metric_names, InMemoryMetricsCollector, MetricsCollector, NoopMetricsCollector,
};
