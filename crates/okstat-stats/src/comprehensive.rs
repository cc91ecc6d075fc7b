use serde::Serialize;

use crate::{descriptive::DescriptiveStats, histogram::Histogram, percentiles::Percentiles};

/// Quartile points reported alongside the descriptive statistics.
pub const QUARTILES: [f64; 3] = [25.0, 50.0, 75.0];

/// Comprehensive statistical summary combining multiple measures.
///
/// This structure provides the overview printed for numeric columns such as
/// age: descriptive statistics, quartiles and a unit-width histogram.
///
/// # Examples
///
/// ```
/// use okstat_stats::comprehensive::ComprehensiveStats;
///
/// let ages = [22.0, 25.0, 25.0, 31.0, 47.0];
/// let stats = ComprehensiveStats::new(ages).unwrap();
///
/// assert_eq!(stats.stats.count, 5);
/// assert_eq!(stats.percentiles.get(50.0), Some(25.0));
/// assert_eq!(stats.histogram.binned_count(), 5);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ComprehensiveStats {
    /// Basic descriptive statistics for the dataset.
    pub stats: DescriptiveStats,
    /// Quartile values.
    pub percentiles: Percentiles,
    /// Unit-width histogram over the observed range.
    pub histogram: Histogram,
}

impl ComprehensiveStats {
    /// Computes comprehensive statistics from unsorted values.
    ///
    /// # Returns
    ///
    /// * `Some(ComprehensiveStats)` - if the dataset contains at least one value
    /// * `None` - if the dataset is empty
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut sorted = values.into_iter().collect::<Vec<_>>();
        sorted.sort_by(f64::total_cmp);
        Self::from_sorted(&sorted)
    }

    /// Computes comprehensive statistics from pre-sorted values.
    ///
    /// # Panics
    ///
    /// Panics in debug mode if `sorted_values` is not sorted in ascending order.
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64]) -> Option<Self> {
        debug_assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let stats = DescriptiveStats::from_sorted(sorted_values)?;
        let percentiles = Percentiles::from_sorted(sorted_values, &QUARTILES);
        let histogram = Histogram::unit_bins(sorted_values.iter().copied());

        Some(Self {
            stats,
            percentiles,
            histogram,
        })
    }
}
