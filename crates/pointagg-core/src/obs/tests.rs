use crate::{
    aggregate::{OrderRow, PointAttribution},
    executor::{ExecutionConfig, GroupedReducer, PartitionStrategy, ReducerConfig},
    obs::{MetricsEvent, MetricsSink, metrics_report, metrics_reset_all},
};
use std::{num::NonZeroUsize, sync::Mutex};

fn rows() -> Vec<(u32, OrderRow)> {
    vec![
        (1, OrderRow::new(4)),
        (1, OrderRow::null()),
        (2, OrderRow::new(1)),
        (3, OrderRow::new(2)),
        (1, OrderRow::new(2)),
    ]
}

fn config(partitions: usize) -> ReducerConfig {
    ReducerConfig::default()
        .with_partitions(NonZeroUsize::new(partitions).expect("partitions should be non-zero"))
        .with_strategy(PartitionStrategy::RoundRobin)
}

#[test]
fn reduce_updates_thread_local_counters() {
    metrics_reset_all();

    GroupedReducer::new(PointAttribution, config(2))
        .execute(rows())
        .expect("grouped reduce should succeed");

    let report = metrics_report(None);
    let counters = report.counters.expect("counters should be present");
    assert_eq!(counters.ops.reduce_calls, 1);
    assert_eq!(counters.ops.partitions_reduced, 2);
    assert_eq!(counters.ops.rows_reduced, 5);
    assert_eq!(counters.ops.groups_emitted, 3);
    // round robin over two partitions splits group 1 across both
    assert_eq!(counters.ops.partial_states, 4);
    assert_eq!(counters.ops.merges, 1);
    assert_eq!(counters.ops.reduce_failures, 0);

    let summary = &report.aggregate_counters[0];
    assert_eq!(summary.name, PointAttribution::NAME);
    assert_eq!(summary.reduce_calls, 1);
    assert!((summary.avg_rows_per_group - 5.0 / 3.0).abs() < f64::EPSILON);
}

#[test]
fn limit_failures_are_counted() {
    metrics_reset_all();

    let limited = config(1).with_limits(ExecutionConfig::with_hard_limits(1, u64::MAX));
    let result = GroupedReducer::new(PointAttribution, limited).execute(rows());
    assert!(result.is_err());

    let counters = metrics_report(None)
        .counters
        .expect("counters should be present");
    assert_eq!(counters.ops.reduce_failures, 1);
    assert_eq!(counters.ops.limit_failures, 1);
    assert_eq!(counters.aggregates[PointAttribution::NAME].limit_failures, 1);
}

#[test]
fn report_window_filters_older_state() {
    metrics_reset_all();

    let report = metrics_report(Some(u64::MAX));

    assert!(report.counters.is_none());
    assert!(report.aggregate_counters.is_empty());
}

#[test]
fn report_serializes_to_json() {
    metrics_reset_all();
    GroupedReducer::new(PointAttribution, config(1))
        .execute(rows())
        .expect("grouped reduce should succeed");

    let json = serde_json::to_value(metrics_report(None)).expect("report should serialize");

    assert_eq!(json["counters"]["ops"]["reduce_calls"], 1);
}

///
/// RecordingSink
///

struct RecordingSink {
    events: Mutex<Vec<MetricsEvent>>,
}

impl MetricsSink for RecordingSink {
    fn record(&self, event: MetricsEvent) {
        self.events
            .lock()
            .expect("recording sink lock should not be poisoned")
            .push(event);
    }
}

static RECORDING_SINK: RecordingSink = RecordingSink {
    events: Mutex::new(Vec::new()),
};

#[test]
fn injected_sink_receives_events_in_phase_order() {
    metrics_reset_all();

    GroupedReducer::new(PointAttribution, config(2))
        .with_metrics_sink(&RECORDING_SINK)
        .execute(rows())
        .expect("grouped reduce should succeed");

    let events = RECORDING_SINK
        .events
        .lock()
        .expect("recording sink lock should not be poisoned")
        .clone();
    assert_eq!(events.len(), 5);
    assert!(matches!(
        events[0],
        MetricsEvent::ReduceStart {
            rows: 5,
            partitions: 2,
            ..
        }
    ));
    assert!(matches!(events[1], MetricsEvent::PartitionReduced { .. }));
    assert!(matches!(events[2], MetricsEvent::PartitionReduced { .. }));
    assert!(matches!(events[3], MetricsEvent::GroupMerged { merges: 1, .. }));
    assert!(matches!(events[4], MetricsEvent::ReduceFinish { groups: 3, .. }));

    // nothing leaked into the thread-local counters
    let counters = metrics_report(None)
        .counters
        .expect("counters should be present");
    assert_eq!(counters.ops.reduce_calls, 0);
}
