//! Module: aggregate::contracts::state
//! Responsibility: the four-operation partial-aggregation state machine.
//! Does not own: partition assignment or merge ordering.
//! Boundary: trait implemented by aggregates, driven by grouped executors.

use crate::aggregate::contracts::signature::AggregateSignature;

///
/// AggregateFunction
///
/// Partial-aggregation contract consumed by grouped executors.
///
/// Implementations must keep `merge` associative and commutative, with the
/// buffer returned by `initialize` as its identity element, so the final
/// result is independent of partitioning, row order, and merge order.
/// Callers guarantee that every row and buffer fed into one buffer belongs to
/// the same group; the aggregate has no notion of grouping.
///
/// Buffer lifecycle: `initialize` yields a fresh buffer, `update`/`merge`
/// accumulate into it, and `evaluate` reads it once accumulation is done.
/// Mutation after `evaluate` is not forbidden but has no defined meaning.
///

pub trait AggregateFunction: Send + Sync {
    type Input;
    type Buffer: Send;
    type Output;

    /// Return the declared interface of this aggregate.
    fn signature(&self) -> AggregateSignature;

    /// Build a fresh buffer holding the identity element.
    fn initialize(&self) -> Self::Buffer;

    /// Apply one input row to `buffer` in place.
    fn update(&self, buffer: &mut Self::Buffer, input: &Self::Input);

    /// Fold `from` into `into`; `from` is consumed and never observed again.
    fn merge(&self, into: &mut Self::Buffer, from: Self::Buffer);

    /// Read the final output without mutating `buffer`.
    fn evaluate(&self, buffer: &Self::Buffer) -> Self::Output;
}

/// Reduce `rows` into one fresh buffer, applying them in iteration order.
pub fn fold_rows<'a, A, I>(aggregate: &A, rows: I) -> A::Buffer
where
    A: AggregateFunction,
    A::Input: 'a,
    I: IntoIterator<Item = &'a A::Input>,
{
    let mut buffer = aggregate.initialize();
    for row in rows {
        aggregate.update(&mut buffer, row);
    }

    buffer
}
