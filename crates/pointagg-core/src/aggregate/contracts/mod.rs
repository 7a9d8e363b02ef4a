//! Module: aggregate::contracts
//! Responsibility: aggregate state-machine trait and declared interface shapes.
//! Does not own: any concrete aggregate policy.
//! Boundary: contract surface implemented by aggregates and consumed by executors.

mod signature;
mod state;

pub use signature::{AggregateSignature, ColumnSpec, ColumnType};
pub use state::{AggregateFunction, fold_rows};
