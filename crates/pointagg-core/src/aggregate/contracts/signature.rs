//! Module: aggregate::contracts::signature
//! Responsibility: declared input/buffer/output shapes and determinism flag.
//! Does not own: value validation against those shapes.
//! Boundary: metadata handed to hosting pipelines before execution.

use derive_more::Display;
use serde::Serialize;

///
/// ColumnType
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    #[display("int32")]
    Int32,
    #[display("int64")]
    Int64,
}

///
/// ColumnSpec
///
/// One named column in an aggregate input or buffer shape.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub ty: ColumnType,
    pub nullable: bool,
}

impl ColumnSpec {
    #[must_use]
    pub const fn new(name: &'static str, ty: ColumnType, nullable: bool) -> Self {
        Self { name, ty, nullable }
    }
}

///
/// AggregateSignature
///
/// Declared interface of one aggregate function.
/// Hosting engines may only reorder or parallelize partial aggregation when
/// `deterministic` is true.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct AggregateSignature {
    pub name: &'static str,
    pub input: &'static [ColumnSpec],
    pub buffer: &'static [ColumnSpec],
    pub output: ColumnType,
    pub deterministic: bool,
}

impl AggregateSignature {
    /// Return true when the host may split, reorder, and merge partials freely.
    #[must_use]
    pub const fn allows_reordering(&self) -> bool {
        self.deterministic
    }
}
