//! Metrics sink boundary.
//!
//! Executor logic MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
//!
//! This module is the only allowed bridge between execution logic
//! and the thread-local metrics state.
use crate::obs::metrics;

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    ReduceStart {
        aggregate: &'static str,
        rows: u64,
        partitions: u64,
    },
    PartitionReduced {
        aggregate: &'static str,
        rows: u64,
        partial_states: u64,
    },
    GroupMerged {
        aggregate: &'static str,
        merges: u64,
    },
    ReduceFinish {
        aggregate: &'static str,
        groups: u64,
        elapsed_us: u64,
    },
    ReduceFailed {
        aggregate: &'static str,
        limit_exceeded: bool,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink: Send + Sync {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default sink that writes into the calling thread's metrics state.
/// Acts as the concrete sink when no sink is injected into the executor.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::ReduceStart { aggregate, .. } => {
                metrics::with_state_mut(|m| {
                    m.ops.reduce_calls = m.ops.reduce_calls.saturating_add(1);
                    let entry = m.aggregates.entry(aggregate.to_string()).or_default();
                    entry.reduce_calls = entry.reduce_calls.saturating_add(1);
                });
            }

            MetricsEvent::PartitionReduced {
                aggregate,
                rows,
                partial_states,
            } => {
                metrics::with_state_mut(|m| {
                    m.ops.partitions_reduced = m.ops.partitions_reduced.saturating_add(1);
                    m.ops.rows_reduced = m.ops.rows_reduced.saturating_add(rows);
                    m.ops.partial_states = m.ops.partial_states.saturating_add(partial_states);

                    let entry = m.aggregates.entry(aggregate.to_string()).or_default();
                    entry.rows_reduced = entry.rows_reduced.saturating_add(rows);
                    entry.partial_states = entry.partial_states.saturating_add(partial_states);
                });
            }

            MetricsEvent::GroupMerged { aggregate, merges } => {
                metrics::with_state_mut(|m| {
                    m.ops.merges = m.ops.merges.saturating_add(merges);
                    let entry = m.aggregates.entry(aggregate.to_string()).or_default();
                    entry.merges = entry.merges.saturating_add(merges);
                });
            }

            MetricsEvent::ReduceFinish {
                aggregate,
                groups,
                elapsed_us,
            } => {
                metrics::with_state_mut(|m| {
                    m.ops.groups_emitted = m.ops.groups_emitted.saturating_add(groups);
                    metrics::add_elapsed(
                        &mut m.perf.reduce_us_total,
                        &mut m.perf.reduce_us_max,
                        elapsed_us,
                    );

                    let entry = m.aggregates.entry(aggregate.to_string()).or_default();
                    entry.groups_emitted = entry.groups_emitted.saturating_add(groups);
                });
            }

            MetricsEvent::ReduceFailed {
                aggregate,
                limit_exceeded,
            } => {
                metrics::with_state_mut(|m| {
                    m.ops.reduce_failures = m.ops.reduce_failures.saturating_add(1);
                    let entry = m.aggregates.entry(aggregate.to_string()).or_default();
                    if limit_exceeded {
                        m.ops.limit_failures = m.ops.limit_failures.saturating_add(1);
                        entry.limit_failures = entry.limit_failures.saturating_add(1);
                    }
                });
            }
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

/// Route one event to the injected sink, or to the thread-local state.
pub(crate) fn record(sink: Option<&dyn MetricsSink>, event: MetricsEvent) {
    match sink {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

/// Snapshot the current thread's metrics state for CLI/test plumbing.
///
/// `window_start_ms` filters by window start (`EventState::since_ms`),
/// not by per-event timestamps.
#[must_use]
pub fn metrics_report(window_start_ms: Option<u64>) -> metrics::EventReport {
    metrics::report_window_start(window_start_ms)
}

/// Reset all metrics state (counters + perf).
pub fn metrics_reset_all() {
    metrics::reset_all();
}
