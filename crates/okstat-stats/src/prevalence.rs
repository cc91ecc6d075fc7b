//! Relative prevalence of categorical values between two subgroups
//!
//! This module answers the question "which values of a categorical attribute
//! are disproportionately used by subgroup 1 rather than subgroup 2?" in a
//! way that does not depend on the size of the subgroups.
//!
//! # Algorithm
//!
//! 1. Count present values per subgroup (missing values are skipped)
//! 2. Take the union of categories; a category absent from one side counts 0 there
//! 3. Normalize each side: `frac = count / subgroup_total`
//! 4. Prevalence ratio: `ratio = frac1 / (frac1 + frac2)`
//! 5. Drop categories backed by fewer than `min_support` observations in total
//! 6. Sort by ratio (ties by category)
//!
//! A ratio of 0.5 means the value is proportionally as common in both
//! subgroups. Ratios near 1 mean the value is (almost) exclusive to
//! subgroup 1, ratios near 0 that it is exclusive to subgroup 2.
//!
//! ```text
//!  subgroup 1 bar: [0, ratio)          subgroup 2 bar: [ratio, 1]
//!  |██████████████████░░░░░░░░░░░░░░|
//!  0               0.5              1
//! ```
//!
//! # Examples
//!
//! ```
//! use okstat_stats::prevalence::{GroupedObservation, compare_prevalence};
//!
//! // 10 observations per subgroup: A is common in subgroup 1, B in subgroup 2
//! let mut observations = vec![];
//! observations.extend(std::iter::repeat_n(GroupedObservation::new(Some("A"), true, false), 8));
//! observations.extend(std::iter::repeat_n(GroupedObservation::new(Some("B"), true, false), 2));
//! observations.extend(std::iter::repeat_n(GroupedObservation::new(Some("A"), false, true), 2));
//! observations.extend(std::iter::repeat_n(GroupedObservation::new(Some("B"), false, true), 8));
//!
//! let comparison = compare_prevalence(observations, 0).unwrap();
//! let order = comparison
//!     .records()
//!     .iter()
//!     .map(|r| (r.category, r.ratio))
//!     .collect::<Vec<_>>();
//! assert_eq!(order, vec![("B", 0.2), ("A", 0.8)]);
//! ```

use std::{cmp::Ordering, fmt};

use serde::Serialize;

use crate::frequency::FrequencyTable;

/// Default minimum combined count for a category to be presented.
pub const DEFAULT_MIN_SUPPORT: u64 = 50;

/// One of the two subgroups being compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Subgroup {
    #[display("subgroup 1")]
    First,
    #[display("subgroup 2")]
    Second,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum PrevalenceError {
    #[display("{group} has no observations with a present value; fractions are undefined")]
    EmptySubgroup { group: Subgroup },
    #[display("prevalence ratio is undefined for category '{category}' (0/0)")]
    UndefinedRatio { category: String },
}

/// A single observation as seen by the comparator.
///
/// `value` is `None` when the observation lacks the attribute; such
/// observations are excluded from both frequency tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupedObservation<K> {
    pub value: Option<K>,
    pub in_group1: bool,
    pub in_group2: bool,
}

impl<K> GroupedObservation<K> {
    pub fn new(value: Option<K>, in_group1: bool, in_group2: bool) -> Self {
        Self {
            value,
            in_group1,
            in_group2,
        }
    }
}

/// Per-category comparison between the two subgroups.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrevalenceRecord<K> {
    pub category: K,
    /// Number of subgroup 1 observations with this value.
    pub group1_count: u64,
    /// Number of subgroup 2 observations with this value.
    pub group2_count: u64,
    /// Share of subgroup 1 holding this value.
    pub group1_fraction: f64,
    /// Share of subgroup 2 holding this value.
    pub group2_fraction: f64,
    /// `group1_fraction / (group1_fraction + group2_fraction)`, in `[0, 1]`.
    pub ratio: f64,
}

impl<K> PrevalenceRecord<K> {
    /// Combined number of observations backing this record.
    #[must_use]
    pub fn support(&self) -> u64 {
        self.group1_count + self.group2_count
    }
}

/// Full contingency table over the union of categories, before support filtering.
///
/// Records are in category order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrevalenceTable<K> {
    records: Vec<PrevalenceRecord<K>>,
    group1_total: u64,
    group2_total: u64,
}

impl<K> PrevalenceTable<K>
where
    K: Ord + Clone + fmt::Display,
{
    /// Builds the contingency table from grouped observations.
    ///
    /// An empty observation sequence yields an empty table. Otherwise both
    /// subgroups must contain at least one observation with a present value.
    pub fn from_observations<I>(observations: I) -> Result<Self, PrevalenceError>
    where
        I: IntoIterator<Item = GroupedObservation<K>>,
    {
        let mut freq1 = FrequencyTable::new();
        let mut freq2 = FrequencyTable::new();
        let mut num_observations = 0_usize;

        for observation in observations {
            num_observations += 1;
            let Some(value) = observation.value else {
                continue;
            };
            match (observation.in_group1, observation.in_group2) {
                (true, true) => {
                    freq1.add(value.clone());
                    freq2.add(value);
                }
                (true, false) => freq1.add(value),
                (false, true) => freq2.add(value),
                (false, false) => {}
            }
        }

        if num_observations == 0 {
            return Ok(Self {
                records: vec![],
                group1_total: 0,
                group2_total: 0,
            });
        }

        Self::from_frequencies(&freq1, &freq2)
    }

    /// Builds the contingency table from the two per-subgroup frequency tables.
    #[expect(clippy::cast_precision_loss)]
    pub fn from_frequencies(
        freq1: &FrequencyTable<K>,
        freq2: &FrequencyTable<K>,
    ) -> Result<Self, PrevalenceError> {
        let group1_total = freq1.total();
        let group2_total = freq2.total();
        if group1_total == 0 {
            return Err(PrevalenceError::EmptySubgroup {
                group: Subgroup::First,
            });
        }
        if group2_total == 0 {
            return Err(PrevalenceError::EmptySubgroup {
                group: Subgroup::Second,
            });
        }

        let mut categories = freq1.keys().chain(freq2.keys()).collect::<Vec<_>>();
        categories.sort();
        categories.dedup();

        let records = categories
            .into_iter()
            .map(|category| {
                let group1_count = freq1.count(category);
                let group2_count = freq2.count(category);
                let group1_fraction = group1_count as f64 / group1_total as f64;
                let group2_fraction = group2_count as f64 / group2_total as f64;
                let denominator = group1_fraction + group2_fraction;
                // Only categories seen on at least one side are in the union
                debug_assert!(denominator > 0.0, "category {category} has no support");
                if denominator <= 0.0 {
                    return Err(PrevalenceError::UndefinedRatio {
                        category: category.to_string(),
                    });
                }
                Ok(PrevalenceRecord {
                    category: category.clone(),
                    group1_count,
                    group2_count,
                    group1_fraction,
                    group2_fraction,
                    ratio: group1_fraction / denominator,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            records,
            group1_total,
            group2_total,
        })
    }
}

impl<K> PrevalenceTable<K> {
    /// All records, in category order.
    #[must_use]
    pub fn records(&self) -> &[PrevalenceRecord<K>] {
        &self.records
    }

    /// Number of subgroup 1 observations with a present value.
    #[must_use]
    pub fn group1_total(&self) -> u64 {
        self.group1_total
    }

    /// Number of subgroup 2 observations with a present value.
    #[must_use]
    pub fn group2_total(&self) -> u64 {
        self.group2_total
    }

    /// Drops rare categories and orders the rest for presentation.
    ///
    /// Categories with `group1_count + group2_count < min_support` are removed;
    /// the ratios of the retained ones are left untouched.
    #[must_use]
    pub fn into_comparison(self, min_support: u64) -> PrevalenceComparison<K>
    where
        K: Ord,
    {
        let total_categories = self.records.len();
        let mut records = self
            .records
            .into_iter()
            .filter(|record| record.support() >= min_support)
            .collect::<Vec<_>>();
        records.sort_by(|a, b| match a.ratio.total_cmp(&b.ratio) {
            Ordering::Equal => a.category.cmp(&b.category),
            ordering => ordering,
        });
        let excluded_categories = total_categories - records.len();

        PrevalenceComparison {
            records,
            group1_total: self.group1_total,
            group2_total: self.group2_total,
            min_support,
            excluded_categories,
        }
    }
}

/// Support-filtered records sorted by ascending prevalence ratio.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrevalenceComparison<K> {
    records: Vec<PrevalenceRecord<K>>,
    group1_total: u64,
    group2_total: u64,
    min_support: u64,
    excluded_categories: usize,
}

impl<K> PrevalenceComparison<K> {
    /// Records sorted by ascending ratio, ties broken by category.
    #[must_use]
    pub fn records(&self) -> &[PrevalenceRecord<K>] {
        &self.records
    }

    #[must_use]
    pub fn group1_total(&self) -> u64 {
        self.group1_total
    }

    #[must_use]
    pub fn group2_total(&self) -> u64 {
        self.group2_total
    }

    #[must_use]
    pub fn min_support(&self) -> u64 {
        self.min_support
    }

    /// Number of categories removed for insufficient support.
    #[must_use]
    pub fn excluded_categories(&self) -> usize {
        self.excluded_categories
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Builds the contingency table and filters/sorts it in one call.
///
/// See the [module documentation](self) for the algorithm.
pub fn compare_prevalence<K, I>(
    observations: I,
    min_support: u64,
) -> Result<PrevalenceComparison<K>, PrevalenceError>
where
    K: Ord + Clone + fmt::Display,
    I: IntoIterator<Item = GroupedObservation<K>>,
{
    Ok(PrevalenceTable::from_observations(observations)?.into_comparison(min_support))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observations(
        group1: &[(&'static str, usize)],
        group2: &[(&'static str, usize)],
    ) -> Vec<GroupedObservation<&'static str>> {
        let mut result = vec![];
        for &(value, n) in group1 {
            result.extend(std::iter::repeat_n(
                GroupedObservation::new(Some(value), true, false),
                n,
            ));
        }
        for &(value, n) in group2 {
            result.extend(std::iter::repeat_n(
                GroupedObservation::new(Some(value), false, true),
                n,
            ));
        }
        result
    }

    #[test]
    fn test_two_category_scenario() {
        let obs = observations(&[("A", 8), ("B", 2)], &[("A", 2), ("B", 8)]);
        let table = PrevalenceTable::from_observations(obs.clone()).unwrap();
        let a = &table.records()[0];
        assert_eq!(a.category, "A");
        assert!((a.group1_fraction - 0.8).abs() < 1e-12);
        assert!((a.group2_fraction - 0.2).abs() < 1e-12);

        let comparison = compare_prevalence(obs, 0).unwrap();
        let records = comparison.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].category, "B");
        assert!((records[0].ratio - 0.2).abs() < 1e-12);
        assert_eq!(records[1].category, "A");
        assert!((records[1].ratio - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_fractions_sum_to_one() {
        let obs = observations(
            &[("athletic", 13), ("average", 7), ("thin", 3), ("jacked", 1)],
            &[("curvy", 11), ("average", 5), ("thin", 9)],
        );
        let table = PrevalenceTable::from_observations(obs).unwrap();
        let sum1 = table.records().iter().map(|r| r.group1_fraction).sum::<f64>();
        let sum2 = table.records().iter().map(|r| r.group2_fraction).sum::<f64>();
        assert!((sum1 - 1.0).abs() < 1e-9);
        assert!((sum2 - 1.0).abs() < 1e-9);
        // Union of both sides, absent side counted as zero
        assert_eq!(table.records().len(), 5);
        let curvy = table.records().iter().find(|r| r.category == "curvy").unwrap();
        assert_eq!(curvy.group1_count, 0);
        assert_eq!(curvy.ratio, 0.0);
        let jacked = table.records().iter().find(|r| r.category == "jacked").unwrap();
        assert_eq!(jacked.ratio, 1.0);
    }

    #[test]
    fn test_equal_fractions_give_half_regardless_of_size() {
        // 3/10 in subgroup 1 and 30/100 in subgroup 2
        let obs = observations(&[("x", 3), ("y", 7)], &[("x", 30), ("y", 70)]);
        let table = PrevalenceTable::from_observations(obs).unwrap();
        for record in table.records() {
            assert_eq!(record.group1_fraction, record.group2_fraction);
            assert_eq!(record.ratio, 0.5);
        }
    }

    #[test]
    fn test_over_representation_means_ratio_above_half() {
        let obs = observations(
            &[("a", 5), ("b", 3), ("c", 2)],
            &[("a", 1), ("b", 3), ("c", 6)],
        );
        let table = PrevalenceTable::from_observations(obs).unwrap();
        for record in table.records() {
            match record.group1_fraction.total_cmp(&record.group2_fraction) {
                Ordering::Greater => assert!(record.ratio > 0.5),
                Ordering::Less => assert!(record.ratio < 0.5),
                Ordering::Equal => assert_eq!(record.ratio, 0.5),
            }
        }
    }

    #[test]
    fn test_support_filter_does_not_change_ratios() {
        let obs = observations(
            &[("common", 60), ("rare", 2), ("mid", 30)],
            &[("common", 40), ("rare", 1), ("mid", 25)],
        );
        let unfiltered = compare_prevalence(obs.clone(), 0).unwrap();
        let filtered = compare_prevalence(obs, 50).unwrap();

        assert_eq!(filtered.records().len(), 2);
        assert_eq!(filtered.excluded_categories(), 1);
        for record in filtered.records() {
            let original = unfiltered
                .records()
                .iter()
                .find(|r| r.category == record.category)
                .unwrap();
            assert_eq!(original.ratio, record.ratio);
        }
        // Fractions keep the unfiltered denominators
        assert_eq!(filtered.group1_total(), 92);
    }

    #[test]
    fn test_ties_broken_by_category() {
        let obs = observations(&[("z", 1), ("a", 1)], &[("z", 1), ("a", 1)]);
        let comparison = compare_prevalence(obs, 0).unwrap();
        let order = comparison
            .records()
            .iter()
            .map(|r| r.category)
            .collect::<Vec<_>>();
        assert_eq!(order, vec!["a", "z"]);
    }

    #[test]
    fn test_missing_values_are_skipped() {
        let mut obs = observations(&[("a", 2)], &[("a", 1), ("b", 1)]);
        obs.push(GroupedObservation::new(None, true, false));
        obs.push(GroupedObservation::new(None, false, true));
        let table = PrevalenceTable::from_observations(obs).unwrap();
        assert_eq!(table.group1_total(), 2);
        assert_eq!(table.group2_total(), 2);
    }

    #[test]
    fn test_empty_input_is_empty_result() {
        let comparison =
            compare_prevalence(Vec::<GroupedObservation<&str>>::new(), DEFAULT_MIN_SUPPORT)
                .unwrap();
        assert!(comparison.is_empty());
    }

    #[test]
    fn test_empty_subgroup_is_an_error() {
        let obs = observations(&[("a", 3)], &[]);
        let err = compare_prevalence(obs, 0).unwrap_err();
        assert!(matches!(
            err,
            PrevalenceError::EmptySubgroup {
                group: Subgroup::Second
            }
        ));

        // Members exist but all lack the attribute
        let obs = vec![
            GroupedObservation::new(None, true, false),
            GroupedObservation::new(Some("a"), false, true),
        ];
        let err = compare_prevalence(obs, 0).unwrap_err();
        assert!(matches!(
            err,
            PrevalenceError::EmptySubgroup {
                group: Subgroup::First
            }
        ));
    }

    #[test]
    fn test_overlapping_membership_counts_both_sides() {
        let obs = vec![
            GroupedObservation::new(Some("a"), true, true),
            GroupedObservation::new(Some("b"), false, true),
        ];
        let table = PrevalenceTable::from_observations(obs).unwrap();
        assert_eq!(table.group1_total(), 1);
        assert_eq!(table.group2_total(), 2);
    }
}
