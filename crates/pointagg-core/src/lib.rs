//! Core runtime for Pointagg: partial-aggregation contracts, the capped point
//! attribution aggregate, and the partitioned grouped reducer that drives it.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod aggregate;
pub mod executor;
pub mod obs;

///
/// CONSTANTS
///

/// Maximum number of points a single order row may contribute.
///
/// The cap applies to each row before summation, never to the running total.
pub const MAX_POINT_PER_ORDER: i32 = 3;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No executors, sinks, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        MAX_POINT_PER_ORDER,
        aggregate::{
            AggregateFunction, AggregateSignature, OrderRow, PointAttribution, PointBuffer, Points,
        },
    };
}
