//! Module: executor
//! Responsibility: partition-parallel grouped reduction driving one aggregate.
//! Does not own: aggregate policy or buffer semantics.
//! Boundary: the hosting pipeline stage that invokes aggregate lifecycles.

mod budget;
mod error;
mod merge;
mod output;
mod partition;
mod reducer;


pub use budget::{ExecutionConfig, ExecutionContext, GroupBudget};
pub use error::GroupError;
pub use merge::{MergeOrder, merge_partials};
pub use output::{GroupRow, GroupedOutput};
pub use partition::{PartitionStrategy, partition_rows};
pub use reducer::{GroupedReducer, ReducerConfig, reduce_single};
