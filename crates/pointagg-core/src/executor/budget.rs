//! Module: executor::budget
//! Responsibility: grouped hard limits and per-context group accounting.
//! Does not own: the decision of when a new group is created.
//! Boundary: guardrails charged by partition workers and the merge step.

use crate::executor::error::GroupError;

const GROUPED_DEFAULT_MAX_GROUPS: u64 = 10_000;
const GROUPED_DEFAULT_MAX_GROUP_BYTES: u64 = 16 * 1024 * 1024;

///
/// ExecutionConfig
///
/// Hard limits for one grouped execution context.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ExecutionConfig {
    max_groups: u64,
    max_group_bytes: u64,
}

impl ExecutionConfig {
    #[must_use]
    pub const fn with_hard_limits(max_groups: u64, max_group_bytes: u64) -> Self {
        Self {
            max_groups,
            max_group_bytes,
        }
    }

    /// Return configured max group count.
    #[must_use]
    pub const fn max_groups(self) -> u64 {
        self.max_groups
    }

    /// Return configured max grouped-budget bytes.
    #[must_use]
    pub const fn max_group_bytes(self) -> u64 {
        self.max_group_bytes
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self::with_hard_limits(GROUPED_DEFAULT_MAX_GROUPS, GROUPED_DEFAULT_MAX_GROUP_BYTES)
    }
}

///
/// GroupBudget
///
/// Observed usage counters for one execution context.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct GroupBudget {
    groups: u64,
    aggregate_states: u64,
    estimated_bytes: u64,
}

impl GroupBudget {
    /// Return observed group-count usage.
    #[must_use]
    pub const fn groups(self) -> u64 {
        self.groups
    }

    /// Return the number of aggregate buffers initialized.
    #[must_use]
    pub const fn aggregate_states(self) -> u64 {
        self.aggregate_states
    }

    /// Return observed grouped-budget byte estimate.
    #[must_use]
    pub const fn estimated_bytes(self) -> u64 {
        self.estimated_bytes
    }
}

///
/// ExecutionContext
///
/// One budget scope: a single partition worker, or the final merge step.
/// Contexts are never shared across threads.
///

#[derive(Clone, Copy, Debug)]
pub struct ExecutionContext {
    config: ExecutionConfig,
    budget: GroupBudget,
}

impl ExecutionContext {
    #[must_use]
    pub const fn new(config: ExecutionConfig) -> Self {
        Self {
            config,
            budget: GroupBudget {
                groups: 0,
                aggregate_states: 0,
                estimated_bytes: 0,
            },
        }
    }

    #[must_use]
    pub const fn config(&self) -> ExecutionConfig {
        self.config
    }

    #[must_use]
    pub const fn budget(&self) -> GroupBudget {
        self.budget
    }

    /// Charge one new group holding one fresh aggregate buffer.
    ///
    /// Counters are left untouched when a limit would be exceeded.
    pub fn record_new_group(&mut self, state_bytes: u64) -> Result<(), GroupError> {
        let groups = self.budget.groups.saturating_add(1);
        if groups > self.config.max_groups {
            return Err(GroupError::LimitExceeded {
                resource: "groups",
                attempted: groups,
                limit: self.config.max_groups,
            });
        }

        let estimated_bytes = self.budget.estimated_bytes.saturating_add(state_bytes);
        if estimated_bytes > self.config.max_group_bytes {
            return Err(GroupError::LimitExceeded {
                resource: "bytes",
                attempted: estimated_bytes,
                limit: self.config.max_group_bytes,
            });
        }

        self.budget.groups = groups;
        self.budget.estimated_bytes = estimated_bytes;
        self.budget.aggregate_states = self.budget.aggregate_states.saturating_add(1);

        Ok(())
    }
}
