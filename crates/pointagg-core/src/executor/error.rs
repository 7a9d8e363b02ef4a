//! Module: executor::error
//! Responsibility: grouped execution error taxonomy.
//! Does not own: aggregate contract violations, which are never signaled.
//! Boundary: typed errors returned by the grouped reducer.

use thiserror::Error as ThisError;

///
/// GroupError
///
/// GroupError is the typed grouped-execution error surface.
/// This taxonomy keeps grouped resource guardrails and determinism
/// preconditions explicit instead of degrading into generic failures.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum GroupError {
    #[error(
        "grouped execution limit exceeded ({resource}): attempted={attempted}, limit={limit}"
    )]
    LimitExceeded {
        resource: &'static str,
        attempted: u64,
        limit: u64,
    },

    #[error(
        "aggregate '{aggregate}' is not deterministic and cannot be split across {partitions} partitions"
    )]
    NonDeterministic {
        aggregate: &'static str,
        partitions: usize,
    },
}

impl GroupError {
    /// Return true when this error came from a grouped budget hard limit.
    #[must_use]
    pub const fn is_limit_exceeded(&self) -> bool {
        matches!(self, Self::LimitExceeded { .. })
    }
}
