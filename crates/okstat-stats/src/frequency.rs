//! Frequency tables over categorical values
//!
//! A [`FrequencyTable`] counts how often each distinct value occurs. It is the
//! building block of the prevalence comparison (one table per subgroup) and of
//! the essay vocabulary (one table over all tokens).
//!
//! Keys are kept in a [`BTreeMap`], so iteration order is deterministic and
//! ties in [`FrequencyTable::most_common`] are broken by key.
//!
//! # Examples
//!
//! ```
//! use okstat_stats::frequency::FrequencyTable;
//!
//! let table = FrequencyTable::from_values(["fit", "average", "fit", "thin"]);
//! assert_eq!(table.count(&"fit"), 2);
//! assert_eq!(table.count(&"curvy"), 0);
//! assert_eq!(table.total(), 4);
//! assert_eq!(table.most_common(1), vec![(&"fit", 2)]);
//! ```

use std::collections::BTreeMap;

/// Mapping from category to number of occurrences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable<K> {
    counts: BTreeMap<K, u64>,
    total: u64,
}

impl<K> Default for FrequencyTable<K> {
    fn default() -> Self {
        Self {
            counts: BTreeMap::new(),
            total: 0,
        }
    }
}

impl<K> FrequencyTable<K>
where
    K: Ord,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts every value yielded by the iterator.
    #[must_use]
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = K>,
    {
        let mut table = Self::new();
        table.extend(values);
        table
    }

    /// Records one occurrence of `value`.
    pub fn add(&mut self, value: K) {
        self.add_n(value, 1);
    }

    /// Records `n` occurrences of `value`.
    pub fn add_n(&mut self, value: K, n: u64) {
        if n == 0 {
            return;
        }
        *self.counts.entry(value).or_insert(0) += n;
        self.total += n;
    }

    /// Number of occurrences of `value` (zero when never seen).
    #[must_use]
    pub fn count(&self, value: &K) -> u64 {
        self.counts.get(value).copied().unwrap_or(0)
    }

    /// Sum of all counts.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterates over `(value, count)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, u64)> + '_ {
        self.counts.iter().map(|(k, c)| (k, *c))
    }

    /// Iterates over distinct values in key order.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.counts.keys()
    }

    /// The `n` most frequent values, most frequent first.
    ///
    /// Values with equal counts are ordered by key so the result does not
    /// depend on insertion order.
    #[must_use]
    pub fn most_common(&self, n: usize) -> Vec<(&K, u64)> {
        let mut entries = self.iter().collect::<Vec<_>>();
        // Stable sort keeps the ascending key order among equal counts
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries.truncate(n);
        entries
    }

    /// Fraction of the total held by `value`, or `None` for an empty table.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn fraction(&self, value: &K) -> Option<f64> {
        (self.total > 0).then(|| self.count(value) as f64 / self.total as f64)
    }
}

impl<K> Extend<K> for FrequencyTable<K>
where
    K: Ord,
{
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = K>,
    {
        for value in iter {
            self.add(value);
        }
    }
}

impl<K> FromIterator<K> for FrequencyTable<K>
where
    K: Ord,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = K>,
    {
        Self::from_values(iter)
    }
}
