//! Module: aggregate
//! Responsibility: partial-aggregation contracts and the point attribution aggregate.
//! Does not own: partitioning, merge scheduling, or grouped budgets.
//! Boundary: aggregate surface consumed by the grouped executor and embedders.

mod contracts;
mod points;


pub use contracts::{AggregateFunction, AggregateSignature, ColumnSpec, ColumnType, fold_rows};
pub use points::{OrderRow, PointAttribution, PointBuffer, Points, points_for_quantity};
