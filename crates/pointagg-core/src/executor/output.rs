//! Module: executor::output
//! Responsibility: per-group results of one grouped reduction.
//! Does not own: rendering or serialization formats beyond serde derives.
//! Boundary: value handed back to the hosting pipeline.

use serde::Serialize;

///
/// GroupRow
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct GroupRow<K, O> {
    key: K,
    output: O,
}

impl<K, O> GroupRow<K, O> {
    #[must_use]
    pub const fn new(key: K, output: O) -> Self {
        Self { key, output }
    }

    #[must_use]
    pub const fn key(&self) -> &K {
        &self.key
    }

    #[must_use]
    pub const fn output(&self) -> &O {
        &self.output
    }

    #[must_use]
    pub fn into_parts(self) -> (K, O) {
        (self.key, self.output)
    }
}

///
/// GroupedOutput
///
/// Evaluated groups, sorted ascending by key.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GroupedOutput<K, O> {
    rows: Vec<GroupRow<K, O>>,
}

impl<K: Ord, O> GroupedOutput<K, O> {
    /// Build from rows already sorted by key with no duplicate keys.
    pub(crate) const fn from_sorted(rows: Vec<GroupRow<K, O>>) -> Self {
        Self { rows }
    }

    #[must_use]
    pub fn rows(&self) -> &[GroupRow<K, O>] {
        &self.rows
    }

    #[must_use]
    pub fn into_rows(self) -> Vec<GroupRow<K, O>> {
        self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Look up one group's output by key.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&O> {
        self.rows
            .binary_search_by(|row| row.key.cmp(key))
            .ok()
            .map(|index| &self.rows[index].output)
    }

    /// Rows ordered by descending output, ties broken by ascending key.
    #[must_use]
    pub fn ranked(&self) -> Vec<&GroupRow<K, O>>
    where
        O: Ord,
    {
        let mut ranked: Vec<_> = self.rows.iter().collect();
        ranked.sort_by(|a, b| b.output.cmp(&a.output).then_with(|| a.key.cmp(&b.key)));

        ranked
    }
}
