use std::ops::Range;

use serde::Serialize;

/// A histogram representation of a dataset's distribution.
///
/// Bins have a fixed width and cover `[start, end)`. Values outside the
/// covered range are not dropped silently: they are tallied in
/// [`underflow`](Self::underflow) and [`overflow`](Self::overflow).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// The bins comprising the histogram, in ascending order.
    pub bins: Vec<HistogramBin>,
    /// Number of values below the first bin.
    pub underflow: u64,
    /// Number of values at or above the end of the last bin.
    pub overflow: u64,
}

/// A single bin in a histogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    /// The range of values covered by this bin (inclusive start, exclusive end).
    pub range: Range<f64>,
    /// The number of values that fall within this bin's range.
    pub count: u64,
}

impl Histogram {
    /// Creates a histogram with bins of width `bin_width` covering `[start, end)`.
    ///
    /// The last bin is truncated at `end` when the range is not a multiple of
    /// the width. An empty or inverted range, or a non-positive width, yields a
    /// histogram without bins where every value is counted as underflow or
    /// overflow.
    ///
    /// # Examples
    ///
    /// ```
    /// # use okstat_stats::histogram::Histogram;
    /// let ages = [18.0, 19.0, 19.0, 25.0, 71.0];
    /// let histogram = Histogram::new(ages, 18.0, 70.0, 1.0);
    /// assert_eq!(histogram.bins.len(), 52);
    /// assert_eq!(histogram.bins[1].count, 2);
    /// assert_eq!(histogram.overflow, 1);
    /// ```
    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_sign_loss,
        clippy::cast_possible_truncation
    )]
    #[must_use]
    pub fn new<I>(values: I, start: f64, end: f64, bin_width: f64) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let num_bins = if bin_width > 0.0 && end > start {
            ((end - start) / bin_width).ceil() as usize
        } else {
            0
        };

        // Recompute each boundary from the start to avoid accumulating rounding errors
        let mut bins = (0..num_bins)
            .map(|idx| HistogramBin {
                range: (start + idx as f64 * bin_width)..f64::min(
                    start + (idx + 1) as f64 * bin_width,
                    end,
                ),
                count: 0,
            })
            .collect::<Vec<_>>();

        let mut underflow = 0;
        let mut overflow = 0;
        for value in values {
            if num_bins == 0 || value < start {
                underflow += 1;
                continue;
            }
            if value >= end {
                overflow += 1;
                continue;
            }
            let idx = (((value - start) / bin_width).floor() as usize).min(num_bins - 1);
            bins[idx].count += 1;
        }

        Self {
            bins,
            underflow,
            overflow,
        }
    }

    /// Creates a histogram with unit-width bins spanning the integer range
    /// between the smallest and largest value.
    ///
    /// This is the natural binning for integer-valued measurements such as age
    /// in years. Returns a histogram without bins for empty input.
    ///
    /// ```
    /// # use okstat_stats::histogram::Histogram;
    /// let histogram = Histogram::unit_bins([20.0, 21.0, 21.0, 23.0]);
    /// let counts = histogram.bins.iter().map(|b| b.count).collect::<Vec<_>>();
    /// assert_eq!(counts, vec![1, 2, 0, 1]);
    /// ```
    #[must_use]
    pub fn unit_bins<I>(values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let values = values.into_iter().collect::<Vec<_>>();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if values.is_empty() {
            return Self {
                bins: vec![],
                underflow: 0,
                overflow: 0,
            };
        }
        Self::new(values, min.floor(), max.floor() + 1.0, 1.0)
    }

    /// Total number of values that landed in a bin.
    #[must_use]
    pub fn binned_count(&self) -> u64 {
        self.bins.iter().map(|bin| bin.count).sum()
    }

    /// The largest bin count, or zero for a histogram without bins.
    #[must_use]
    pub fn max_count(&self) -> u64 {
        self.bins.iter().map(|bin| bin.count).max().unwrap_or(0)
    }
}
