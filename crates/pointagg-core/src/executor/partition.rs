//! Module: executor::partition
//! Responsibility: splitting keyed rows into disjoint partitions.
//! Does not own: per-partition reduction.
//! Boundary: stands in for the data placement a distributed engine would supply.

use derive_more::Display;
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{RngCore, SeedableRng},
};
use std::{
    hash::{Hash, Hasher},
    num::NonZeroUsize,
};
use xxhash_rust::xxh3::Xxh3;

///
/// PartitionStrategy
///

#[derive(Clone, Copy, Debug, Default, Display, Eq, PartialEq)]
pub enum PartitionStrategy {
    /// Row `i` goes to partition `i % count`.
    #[default]
    #[display("round_robin")]
    RoundRobin,

    /// Consecutive runs of rows, earlier partitions filled first.
    #[display("contiguous")]
    Contiguous,

    /// All rows of one group key land in the same partition.
    #[display("hashed")]
    Hashed,

    /// Each row goes to a reproducible pseudo-random partition.
    #[display("seeded({seed})")]
    Seeded { seed: u64 },
}

impl PartitionStrategy {
    /// Every strategy, with `seed` feeding the seeded variant.
    #[must_use]
    pub const fn all(seed: u64) -> [Self; 4] {
        [
            Self::RoundRobin,
            Self::Contiguous,
            Self::Hashed,
            Self::Seeded { seed },
        ]
    }
}

/// Split `rows` into exactly `count` disjoint partitions.
///
/// Partitions may be empty; relative row order is kept within each one.
pub fn partition_rows<K, R>(
    rows: Vec<(K, R)>,
    count: NonZeroUsize,
    strategy: PartitionStrategy,
) -> Vec<Vec<(K, R)>>
where
    K: Hash,
{
    let count_usize = count.get();
    let mut partitions: Vec<Vec<(K, R)>> = (0..count_usize).map(|_| Vec::new()).collect();

    match strategy {
        PartitionStrategy::RoundRobin => {
            for (index, row) in rows.into_iter().enumerate() {
                partitions[index % count_usize].push(row);
            }
        }
        PartitionStrategy::Contiguous => {
            let per_partition = rows.len().div_ceil(count_usize).max(1);
            for (index, row) in rows.into_iter().enumerate() {
                partitions[index / per_partition].push(row);
            }
        }
        PartitionStrategy::Hashed => {
            for row in rows {
                let mut hasher = Xxh3::new();
                row.0.hash(&mut hasher);
                partitions[slot(hasher.finish(), count)].push(row);
            }
        }
        PartitionStrategy::Seeded { seed } => {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            for row in rows {
                partitions[slot(rng.next_u64(), count)].push(row);
            }
        }
    }

    partitions
}

/// Map a 64-bit draw onto `0..count`.
#[expect(clippy::cast_possible_truncation)]
pub(super) const fn slot(draw: u64, count: NonZeroUsize) -> usize {
    // remainder is below count, which is a usize
    (draw % count.get() as u64) as usize
}
