use serde::{Deserialize, Serialize};
use std::{
    cell::RefCell,
    collections::BTreeMap,
    time::{SystemTime, UNIX_EPOCH},
};

///
/// EventState
/// Ephemeral, in-memory counters and simple perf totals for grouped reductions.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub perf: EventPerf,
    pub aggregates: BTreeMap<String, AggregateCounters>,
    pub since_ms: u64,
}

impl Default for EventState {
    fn default() -> Self {
        Self {
            ops: EventOps::default(),
            perf: EventPerf::default(),
            aggregates: BTreeMap::new(),
            since_ms: now_millis(),
        }
    }
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventOps {
    // Executor entrypoints
    pub reduce_calls: u64,
    pub reduce_failures: u64,

    // Partition phase
    pub partitions_reduced: u64,
    pub rows_reduced: u64,
    pub partial_states: u64,

    // Merge phase
    pub merges: u64,
    pub groups_emitted: u64,

    // Budget guardrails
    pub limit_failures: u64,
}

///
/// AggregateCounters
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct AggregateCounters {
    pub reduce_calls: u64,
    pub rows_reduced: u64,
    pub partial_states: u64,
    pub merges: u64,
    pub groups_emitted: u64,
    pub limit_failures: u64,
}

///
/// EventPerf
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventPerf {
    // Wall-clock totals for completed reductions
    pub reduce_us_total: u128,
    pub reduce_us_max: u64,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
        })
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Reset all counters (useful in tests).
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

/// Accumulate elapsed micros and track a max.
pub(crate) fn add_elapsed(total: &mut u128, max: &mut u64, delta_us: u64) {
    *total = total.saturating_add(u128::from(delta_us));
    if delta_us > *max {
        *max = delta_us;
    }
}

///
/// EventReport
/// Counter report for the current thread's reductions.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventReport {
    /// Ephemeral runtime counters since `since_ms`.
    pub counters: Option<EventState>,
    /// Per-aggregate counters and averages.
    pub aggregate_counters: Vec<AggregateSummary>,
}

///
/// AggregateSummary
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct AggregateSummary {
    pub name: String,
    pub reduce_calls: u64,
    pub rows_reduced: u64,
    pub groups_emitted: u64,
    pub merges: u64,
    pub limit_failures: u64,
    pub avg_rows_per_reduce: f64,
    pub avg_rows_per_group: f64,
}

/// Build a metrics report, keeping counters only when their window started
/// at or after `window_start_ms`.
#[must_use]
#[expect(clippy::cast_precision_loss)]
pub(crate) fn report_window_start(window_start_ms: Option<u64>) -> EventReport {
    let snap = with_state(Clone::clone);
    if window_start_ms.is_some_and(|start| snap.since_ms < start) {
        return EventReport::default();
    }

    let mut aggregate_counters: Vec<AggregateSummary> = Vec::new();
    for (name, ops) in &snap.aggregates {
        let avg_rows_per_reduce = if ops.reduce_calls > 0 {
            ops.rows_reduced as f64 / ops.reduce_calls as f64
        } else {
            0.0
        };
        let avg_rows_per_group = if ops.groups_emitted > 0 {
            ops.rows_reduced as f64 / ops.groups_emitted as f64
        } else {
            0.0
        };

        aggregate_counters.push(AggregateSummary {
            name: name.clone(),
            reduce_calls: ops.reduce_calls,
            rows_reduced: ops.rows_reduced,
            groups_emitted: ops.groups_emitted,
            merges: ops.merges,
            limit_failures: ops.limit_failures,
            avg_rows_per_reduce,
            avg_rows_per_group,
        });
    }

    aggregate_counters.sort_by(|a, b| {
        b.rows_reduced
            .cmp(&a.rows_reduced)
            .then_with(|| a.name.cmp(&b.name))
    });

    EventReport {
        counters: Some(snap),
        aggregate_counters,
    }
}
