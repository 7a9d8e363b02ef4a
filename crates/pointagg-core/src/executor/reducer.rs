//! Module: executor::reducer
//! Responsibility: grouped partial aggregation across partitions, then merge and evaluate.
//! Does not own: aggregate semantics or partition placement policy.
//! Boundary: drives `initialize`/`update`/`merge`/`evaluate` for every group.

use crate::{
    aggregate::AggregateFunction,
    executor::{
        budget::{ExecutionConfig, ExecutionContext},
        error::GroupError,
        merge::{MergeOrder, merge_partials},
        output::{GroupRow, GroupedOutput},
        partition::{PartitionStrategy, partition_rows},
    },
    obs::sink::{self, MetricsEvent, MetricsSink},
};
use rayon::prelude::*;
use std::{
    collections::{BTreeMap, HashMap, btree_map, hash_map},
    hash::Hash,
    mem::size_of,
    num::NonZeroUsize,
    time::Instant,
};

const DEFAULT_PARTITIONS: NonZeroUsize = NonZeroUsize::MIN.saturating_add(3);

///
/// ReducerConfig
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReducerConfig {
    pub partitions: NonZeroUsize,
    pub strategy: PartitionStrategy,
    pub merge_order: MergeOrder,
    pub parallel: bool,
    pub limits: ExecutionConfig,
}

impl ReducerConfig {
    #[must_use]
    pub const fn with_partitions(mut self, partitions: NonZeroUsize) -> Self {
        self.partitions = partitions;
        self
    }

    #[must_use]
    pub const fn with_strategy(mut self, strategy: PartitionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use]
    pub const fn with_merge_order(mut self, merge_order: MergeOrder) -> Self {
        self.merge_order = merge_order;
        self
    }

    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    #[must_use]
    pub const fn with_limits(mut self, limits: ExecutionConfig) -> Self {
        self.limits = limits;
        self
    }
}

impl Default for ReducerConfig {
    fn default() -> Self {
        Self {
            partitions: DEFAULT_PARTITIONS,
            strategy: PartitionStrategy::default(),
            merge_order: MergeOrder::default(),
            parallel: true,
            limits: ExecutionConfig::default(),
        }
    }
}

///
/// PartitionPartial
///
/// One partition's private buffers, handed to the coordinator at the join.
///

struct PartitionPartial<K, B> {
    rows: u64,
    groups: HashMap<K, B>,
}

///
/// GroupedReducer
///
/// Runs one aggregate over keyed rows the way a partitioned engine would:
/// every partition owns one buffer per group, partitions run independently
/// (in parallel when configured), and only after all of them finish are the
/// partial buffers of each group merged and evaluated.
///

pub struct GroupedReducer<A> {
    aggregate: A,
    config: ReducerConfig,
    sink: Option<&'static dyn MetricsSink>,
}

impl<A: AggregateFunction> GroupedReducer<A> {
    #[must_use]
    pub const fn new(aggregate: A, config: ReducerConfig) -> Self {
        Self {
            aggregate,
            config,
            sink: None,
        }
    }

    /// Route metrics to `sink` instead of the thread-local counters.
    #[must_use]
    pub const fn with_metrics_sink(mut self, sink: &'static dyn MetricsSink) -> Self {
        self.sink = Some(sink);
        self
    }

    #[must_use]
    pub const fn aggregate(&self) -> &A {
        &self.aggregate
    }

    #[must_use]
    pub const fn config(&self) -> ReducerConfig {
        self.config
    }

    /// Reduce `rows` into one output per distinct key.
    pub fn execute<K>(
        &self,
        rows: Vec<(K, A::Input)>,
    ) -> Result<GroupedOutput<K, A::Output>, GroupError>
    where
        K: Hash + Ord + Send,
        A::Input: Send,
    {
        let name = self.aggregate.signature().name;
        let started = Instant::now();

        self.record(MetricsEvent::ReduceStart {
            aggregate: name,
            rows: rows.len() as u64,
            partitions: self.config.partitions.get() as u64,
        });
        tracing::debug!(
            aggregate = name,
            rows = rows.len(),
            partitions = self.config.partitions.get(),
            strategy = %self.config.strategy,
            merge_order = %self.config.merge_order,
            parallel = self.config.parallel,
            "grouped reduce start"
        );

        let result = self.execute_phases(name, rows);
        match &result {
            Ok(output) => {
                let elapsed_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
                self.record(MetricsEvent::ReduceFinish {
                    aggregate: name,
                    groups: output.len() as u64,
                    elapsed_us,
                });
                tracing::debug!(
                    aggregate = name,
                    groups = output.len(),
                    elapsed_us,
                    "grouped reduce finish"
                );
            }
            Err(err) => {
                self.record(MetricsEvent::ReduceFailed {
                    aggregate: name,
                    limit_exceeded: err.is_limit_exceeded(),
                });
                tracing::warn!(aggregate = name, error = %err, "grouped reduce failed");
            }
        }

        result
    }

    fn execute_phases<K>(
        &self,
        name: &'static str,
        rows: Vec<(K, A::Input)>,
    ) -> Result<GroupedOutput<K, A::Output>, GroupError>
    where
        K: Hash + Ord + Send,
        A::Input: Send,
    {
        let partitions = self.config.partitions;
        if partitions.get() > 1 && !self.aggregate.signature().allows_reordering() {
            return Err(GroupError::NonDeterministic {
                aggregate: name,
                partitions: partitions.get(),
            });
        }

        let split = partition_rows(rows, partitions, self.config.strategy);
        let partials = if self.config.parallel {
            split
                .into_par_iter()
                .enumerate()
                .map(|(index, rows)| self.reduce_partition(index, rows))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            split
                .into_iter()
                .enumerate()
                .map(|(index, rows)| self.reduce_partition(index, rows))
                .collect::<Result<Vec<_>, _>>()?
        };

        // join barrier: every partition has finished producing its buffers
        let gathered = self.gather(name, partials)?;

        let mut merges = 0u64;
        let mut rows = Vec::with_capacity(gathered.len());
        for (key, buffers) in gathered {
            merges = merges.saturating_add(buffers.len().saturating_sub(1) as u64);
            let buffer = merge_partials(&self.aggregate, buffers, self.config.merge_order);
            rows.push(GroupRow::new(key, self.aggregate.evaluate(&buffer)));
        }
        self.record(MetricsEvent::GroupMerged {
            aggregate: name,
            merges,
        });

        Ok(GroupedOutput::from_sorted(rows))
    }

    // Runs on a worker thread; must not touch thread-local metrics.
    fn reduce_partition<K>(
        &self,
        index: usize,
        rows: Vec<(K, A::Input)>,
    ) -> Result<PartitionPartial<K, A::Buffer>, GroupError>
    where
        K: Hash + Eq,
    {
        let mut context = ExecutionContext::new(self.config.limits);
        let mut groups: HashMap<K, A::Buffer> = HashMap::new();
        let row_count = rows.len() as u64;

        for (key, input) in rows {
            let buffer = match groups.entry(key) {
                hash_map::Entry::Occupied(slot) => slot.into_mut(),
                hash_map::Entry::Vacant(slot) => {
                    context.record_new_group(state_bytes::<K, A::Buffer>())?;
                    slot.insert(self.aggregate.initialize())
                }
            };
            self.aggregate.update(buffer, &input);
        }

        tracing::trace!(
            partition = index,
            rows = row_count,
            groups = groups.len(),
            "partition reduced"
        );

        Ok(PartitionPartial {
            rows: row_count,
            groups,
        })
    }

    fn gather<K>(
        &self,
        name: &'static str,
        partials: Vec<PartitionPartial<K, A::Buffer>>,
    ) -> Result<BTreeMap<K, Vec<A::Buffer>>, GroupError>
    where
        K: Ord,
    {
        let mut context = ExecutionContext::new(self.config.limits);
        let mut gathered: BTreeMap<K, Vec<A::Buffer>> = BTreeMap::new();

        for partial in partials {
            self.record(MetricsEvent::PartitionReduced {
                aggregate: name,
                rows: partial.rows,
                partial_states: partial.groups.len() as u64,
            });

            for (key, buffer) in partial.groups {
                match gathered.entry(key) {
                    btree_map::Entry::Occupied(mut slot) => slot.get_mut().push(buffer),
                    btree_map::Entry::Vacant(slot) => {
                        context.record_new_group(state_bytes::<K, A::Buffer>())?;
                        slot.insert(vec![buffer]);
                    }
                }
            }
        }

        Ok(gathered)
    }

    fn record(&self, event: MetricsEvent) {
        sink::record(self.sink, event);
    }
}

/// Reference path: every row of a group into one buffer, no partitioning.
pub fn reduce_single<A, K>(aggregate: &A, rows: &[(K, A::Input)]) -> GroupedOutput<K, A::Output>
where
    A: AggregateFunction,
    K: Clone + Ord,
{
    let mut groups: BTreeMap<K, A::Buffer> = BTreeMap::new();
    for (key, input) in rows {
        let buffer = groups
            .entry(key.clone())
            .or_insert_with(|| aggregate.initialize());
        aggregate.update(buffer, input);
    }

    let rows = groups
        .into_iter()
        .map(|(key, buffer)| {
            let output = aggregate.evaluate(&buffer);
            GroupRow::new(key, output)
        })
        .collect();

    GroupedOutput::from_sorted(rows)
}

// Shallow estimate: inline key and buffer sizes, heap payloads not counted.
const fn state_bytes<K, B>() -> u64 {
    (size_of::<K>() + size_of::<B>()) as u64
}
