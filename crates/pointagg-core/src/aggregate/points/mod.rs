//! Module: aggregate::points
//! Responsibility: capped per-order point attribution summed per group.
//! Does not own: grouping, partitioning, or merge scheduling.
//! Boundary: concrete `AggregateFunction` registered as `point_attribution`.

#[cfg(test)]
mod tests;

use crate::{
    MAX_POINT_PER_ORDER,
    aggregate::contracts::{AggregateFunction, AggregateSignature, ColumnSpec, ColumnType},
};
use derive_more::{Add, AddAssign, Display, From, Sum};
use serde::{Deserialize, Serialize};

const INPUT_COLUMNS: &[ColumnSpec] = &[ColumnSpec::new("quantity", ColumnType::Int32, true)];
const BUFFER_COLUMNS: &[ColumnSpec] = &[ColumnSpec::new("sum", ColumnType::Int64, false)];

///
/// OrderRow
///
/// One observed order line. An absent quantity contributes nothing.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct OrderRow {
    pub quantity: Option<i32>,
}

impl OrderRow {
    #[must_use]
    pub const fn new(quantity: i32) -> Self {
        Self {
            quantity: Some(quantity),
        }
    }

    #[must_use]
    pub const fn null() -> Self {
        Self { quantity: None }
    }
}

impl From<Option<i32>> for OrderRow {
    fn from(quantity: Option<i32>) -> Self {
        Self { quantity }
    }
}

///
/// PointBuffer
///
/// Running capped-point total for one group within one partition.
///

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct PointBuffer {
    sum: i64,
}

impl PointBuffer {
    #[must_use]
    pub const fn sum(self) -> i64 {
        self.sum
    }
}

///
/// Points
///
/// Final per-group point total.
///

#[derive(
    Add,
    AddAssign,
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    Sum,
)]
#[serde(transparent)]
pub struct Points(i64);

impl Points {
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

/// Points granted for one order of `quantity` items.
///
/// Only the upper bound is capped: quantities below the cap (negative ones
/// included) contribute their full value.
#[must_use]
pub fn points_for_quantity(quantity: i32) -> i64 {
    i64::from(quantity.min(MAX_POINT_PER_ORDER))
}

///
/// PointAttribution
///
/// Loyalty point aggregate: each order grants at most `MAX_POINT_PER_ORDER`
/// points, and a group's points are the sum over its orders.
///
/// Sums use wrapping arithmetic so update and merge stay total and keep the
/// associative/commutative laws at the numeric edges.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct PointAttribution;

impl PointAttribution {
    pub const NAME: &'static str = "point_attribution";
}

impl AggregateFunction for PointAttribution {
    type Input = OrderRow;
    type Buffer = PointBuffer;
    type Output = Points;

    fn signature(&self) -> AggregateSignature {
        AggregateSignature {
            name: Self::NAME,
            input: INPUT_COLUMNS,
            buffer: BUFFER_COLUMNS,
            output: ColumnType::Int64,
            deterministic: true,
        }
    }

    fn initialize(&self) -> PointBuffer {
        PointBuffer { sum: 0 }
    }

    fn update(&self, buffer: &mut PointBuffer, input: &OrderRow) {
        let Some(quantity) = input.quantity else {
            return;
        };

        buffer.sum = buffer.sum.wrapping_add(points_for_quantity(quantity));
    }

    fn merge(&self, into: &mut PointBuffer, from: PointBuffer) {
        into.sum = into.sum.wrapping_add(from.sum);
    }

    fn evaluate(&self, buffer: &PointBuffer) -> Points {
        Points(buffer.sum)
    }
}
