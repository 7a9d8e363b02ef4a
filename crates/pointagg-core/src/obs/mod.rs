//! Observability: runtime telemetry (metrics) and sink abstractions.
//!
//! Aggregates never record metrics themselves; only the grouped executor
//! emits events, and only from its coordinating thread.

pub(crate) mod metrics;
pub(crate) mod sink;

#[cfg(test)]
mod tests;

// re-exports
pub use metrics::{
    AggregateCounters, AggregateSummary, EventOps, EventPerf, EventReport, EventState,
};
pub use sink::{MetricsEvent, MetricsSink, metrics_report, metrics_reset_all};
