//! Module: executor::merge
//! Responsibility: combining one group's partial buffers in a chosen order.
//! Does not own: merge semantics, which belong to the aggregate.
//! Boundary: ownership transfer point where absorbed buffers are dropped.

use crate::{aggregate::AggregateFunction, executor::partition::slot};
use derive_more::Display;
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{RngCore, SeedableRng},
};
use std::num::NonZeroUsize;

///
/// MergeOrder
///

#[derive(Clone, Copy, Debug, Default, Display, Eq, PartialEq)]
pub enum MergeOrder {
    /// `((p0 + p1) + p2) + ...`
    #[display("left_fold")]
    LeftFold,

    /// `p0 + (p1 + (p2 + ...))`
    #[display("right_fold")]
    RightFold,

    /// Pairwise tree reduction, one level at a time.
    #[default]
    #[display("balanced")]
    Balanced,

    /// Random pairs with a random survivor, reproducible from `seed`.
    #[display("seeded({seed})")]
    Seeded { seed: u64 },
}

impl MergeOrder {
    /// Every merge order, with `seed` feeding the seeded variant.
    #[must_use]
    pub const fn all(seed: u64) -> [Self; 4] {
        [
            Self::LeftFold,
            Self::RightFold,
            Self::Balanced,
            Self::Seeded { seed },
        ]
    }
}

/// Merge `partials` into one surviving buffer.
///
/// An empty list yields a fresh buffer. Every absorbed buffer is moved into
/// the aggregate and never touched again.
pub fn merge_partials<A>(aggregate: &A, partials: Vec<A::Buffer>, order: MergeOrder) -> A::Buffer
where
    A: AggregateFunction,
{
    match order {
        MergeOrder::LeftFold => left_fold(aggregate, partials),
        MergeOrder::RightFold => right_fold(aggregate, partials),
        MergeOrder::Balanced => balanced(aggregate, partials),
        MergeOrder::Seeded { seed } => seeded(aggregate, partials, seed),
    }
}

fn left_fold<A: AggregateFunction>(aggregate: &A, partials: Vec<A::Buffer>) -> A::Buffer {
    let mut partials = partials.into_iter();
    let Some(mut survivor) = partials.next() else {
        return aggregate.initialize();
    };
    for from in partials {
        aggregate.merge(&mut survivor, from);
    }

    survivor
}

fn right_fold<A: AggregateFunction>(aggregate: &A, partials: Vec<A::Buffer>) -> A::Buffer {
    let mut partials = partials.into_iter().rev();
    let Some(mut acc) = partials.next() else {
        return aggregate.initialize();
    };
    for mut into in partials {
        aggregate.merge(&mut into, acc);
        acc = into;
    }

    acc
}

fn balanced<A: AggregateFunction>(aggregate: &A, mut partials: Vec<A::Buffer>) -> A::Buffer {
    while partials.len() > 1 {
        let mut level = Vec::with_capacity(partials.len().div_ceil(2));
        let mut pending = partials.into_iter();
        while let Some(mut into) = pending.next() {
            if let Some(from) = pending.next() {
                aggregate.merge(&mut into, from);
            }
            level.push(into);
        }
        partials = level;
    }

    partials.pop().unwrap_or_else(|| aggregate.initialize())
}

fn seeded<A: AggregateFunction>(
    aggregate: &A,
    mut partials: Vec<A::Buffer>,
    seed: u64,
) -> A::Buffer {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    while let Some(len) = NonZeroUsize::new(partials.len()).filter(|len| len.get() > 1) {
        let first = partials.swap_remove(slot(rng.next_u64(), len));
        let Some(remaining) = NonZeroUsize::new(partials.len()) else {
            partials.push(first);
            break;
        };
        let second = partials.swap_remove(slot(rng.next_u64(), remaining));

        // either side may survive
        let (mut into, from) = if rng.next_u64() & 1 == 0 {
            (first, second)
        } else {
            (second, first)
        };
        aggregate.merge(&mut into, from);
        partials.push(into);
    }

    partials.pop().unwrap_or_else(|| aggregate.initialize())
}
