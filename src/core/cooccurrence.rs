// File: src/core/cooccurrence.rs
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Sparse two-level counting table: first-level key -> second-level key -> count.
///
/// Access is asymmetric: `add(a, b)` never affects `get(b, a)`. An absent
/// pair counts as zero. Not meant to be shared between threads; parallel
/// callers fill one table per worker and [`merge`](Self::merge) them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoOccurrenceTable<K: Eq + Hash> {
    rows: HashMap<K, HashMap<K, u64>>,
}

impl<K: Eq + Hash> Default for CoOccurrenceTable<K> {
    fn default() -> Self {
        Self { rows: HashMap::new() }
    }
}

impl<K: Eq + Hash> CoOccurrenceTable<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the (a, b) cell, initialising it to 1.
    /// O(1) amortized complexity.
    pub fn add(&mut self, a: K, b: K) {
        self.add_count(a, b, 1);
    }

    fn add_count(&mut self, a: K, b: K, count: u64) {
        *self.rows.entry(a).or_default().entry(b).or_insert(0) += count;
    }

    pub fn get(&self, a: &K, b: &K) -> u64 {
        self.rows
            .get(a)
            .and_then(|row| row.get(b))
            .copied()
            .unwrap_or(0)
    }

    /// Sum of the counts in `a`'s row; zero if the row is absent.
    pub fn total_occurrences(&self, a: &K) -> u64 {
        self.rows.get(a).map(|row| row.values().sum()).unwrap_or(0)
    }

    pub fn first_level_keys(&self) -> impl Iterator<Item = &K> {
        self.rows.keys()
    }

    pub fn row(&self, a: &K) -> Option<&HashMap<K, u64>> {
        self.rows.get(a)
    }

    /// Number of non-zero cells.
    pub fn cell_count(&self) -> usize {
        self.rows.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cell_count() == 0
    }

    /// Drops one cell. No-op if absent.
    pub fn remove_cell(&mut self, a: &K, b: &K) {
        if let Some(row) = self.rows.get_mut(a) {
            row.remove(b);
        }
    }

    /// Drops an entire row. No-op if absent.
    pub fn remove_row(&mut self, a: &K) {
        self.rows.remove(a);
    }

    /// Each non-empty row divided by its total. Rows keep only the keys
    /// actually observed; empty rows are left out. The table is unchanged.
    pub fn normalise(&self) -> HashMap<K, HashMap<K, f64>>
    where
        K: Clone,
    {
        let mut out = HashMap::with_capacity(self.rows.len());
        for (key, row) in &self.rows {
            let total: u64 = row.values().sum();
            if total == 0 {
                continue;
            }
            let probabilities = row
                .iter()
                .map(|(other, &count)| (other.clone(), count as f64 / total as f64))
                .collect();
            out.insert(key.clone(), probabilities);
        }
        out
    }

    /// Adds every count of `other` into this table.
    pub fn merge(&mut self, other: Self) {
        for (a, row) in other.rows {
            let target = self.rows.entry(a).or_default();
            for (b, count) in row {
                *target.entry(b).or_insert(0) += count;
            }
        }
    }
}

impl<K: Eq + Hash + Clone> CoOccurrenceTable<K> {
    /// The same counts with both key levels swapped.
    pub fn transpose(&self) -> Self {
        let mut out = Self::new();
        for (a, row) in &self.rows {
            for (b, &count) in row {
                out.add_count(b.clone(), a.clone(), count);
            }
        }
        out
    }

    /// Sum of the counts in which `b` is the second-level key.
    pub fn column_total(&self, b: &K) -> u64 {
        self.rows.values().filter_map(|row| row.get(b)).sum()
    }

    /// Removes single observations: every row whose total is at most one,
    /// and every cell whose second-level key was seen exactly once overall.
    /// Both sets are computed on the table as it was before pruning.
    pub fn prune_singletons(&mut self) {
        let mut column_totals: HashMap<K, u64> = HashMap::new();
        for row in self.rows.values() {
            for (b, &count) in row {
                *column_totals.entry(b.clone()).or_insert(0) += count;
            }
        }
        let lonely_columns: HashSet<K> = column_totals
            .into_iter()
            .filter(|&(_, total)| total == 1)
            .map(|(b, _)| b)
            .collect();

        self.rows.retain(|_, row| row.values().sum::<u64>() > 1);
        for row in self.rows.values_mut() {
            row.retain(|b, _| !lonely_columns.contains(b));
        }
        self.rows.retain(|_, row| !row.is_empty());
    }
}
