//! Empirical quantiles compared against reference percentiles
//!
//! Self-reported measurements are often rounded to whole units (heights in
//! inches, ages in years). Quantiles of such data collapse onto integers, which
//! makes a comparison against a smooth reference table misleading. When the
//! caller knows the data was rounded to the nearest unit, it can request
//! [`Dither::Uniform`]: every observation receives independent noise drawn
//! from `U(-half_width, +half_width)` before quantiles are computed. The noise
//! has zero expectation, so the mean is preserved while the quantiles become
//! continuous again.
//!
//! Dithering is never applied implicitly. Continuous data should use
//! [`Dither::None`].
//!
//! # Examples
//!
//! ```
//! use okstat_stats::quantile::{Dither, QuantileComparison};
//! use rand::SeedableRng as _;
//!
//! let heights = [70.0, 70.0, 70.0, 71.0, 71.0];
//! let reference = [(50.0, 70.5)];
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//!
//! let comparison =
//!     QuantileComparison::new(&heights, &reference, Dither::ROUNDED_TO_UNIT, &mut rng).unwrap();
//! let median = &comparison.gaps()[0];
//! assert!((69.5..=71.5).contains(&median.empirical));
//! assert_eq!(median.gap, median.empirical - 70.5);
//! ```

use rand::Rng;
use rand_distr::{Distribution as _, Uniform};
use serde::Serialize;

use crate::percentiles;

/// Half width of the dithering noise for values rounded to the nearest unit.
pub const DEFAULT_DITHER_HALF_WIDTH: f64 = 0.5;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum QuantileError {
    #[display("cannot compute quantiles of an empty sample")]
    EmptySample,
    #[display("percentiles must be strictly increasing within [0, 100], got {percentiles:?}")]
    InvalidPercentiles { percentiles: Vec<f64> },
    #[display("dither half width must be finite and non-negative, got {half_width}")]
    InvalidDither { half_width: f64 },
}

/// Noise added to each observation before quantiles are computed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Dither {
    /// Use the observations as they are.
    None,
    /// Add independent noise uniformly distributed on `[-half_width, +half_width]`.
    Uniform { half_width: f64 },
}

impl Dither {
    /// Dithering for values that were rounded to the nearest whole unit.
    pub const ROUNDED_TO_UNIT: Self = Self::Uniform {
        half_width: DEFAULT_DITHER_HALF_WIDTH,
    };

    /// Returns a dithered copy of `values`.
    ///
    /// Noise is drawn freshly from `rng` on every call; seed the generator
    /// for reproducible output.
    pub fn apply<R>(self, values: &[f64], rng: &mut R) -> Result<Vec<f64>, QuantileError>
    where
        R: Rng + ?Sized,
    {
        match self {
            Self::None => Ok(values.to_vec()),
            Self::Uniform { half_width } => {
                if !half_width.is_finite() || half_width < 0.0 {
                    return Err(QuantileError::InvalidDither { half_width });
                }
                let noise = Uniform::new_inclusive(-half_width, half_width)
                    .map_err(|_| QuantileError::InvalidDither { half_width })?;
                Ok(values.iter().map(|v| v + noise.sample(rng)).collect())
            }
        }
    }
}

/// Gap between the empirical and the reference value at one percentile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuantileGap {
    /// Percentile in `[0, 100]`.
    pub percentile: f64,
    /// Quantile of the (possibly dithered) sample.
    pub empirical: f64,
    /// Reference value at this percentile.
    pub reference: f64,
    /// `empirical - reference`.
    pub gap: f64,
}

impl QuantileGap {
    #[must_use]
    pub fn new(percentile: f64, empirical: f64, reference: f64) -> Self {
        Self {
            percentile,
            empirical,
            reference,
            gap: empirical - reference,
        }
    }

    /// The same comparison with the empirical and reference roles exchanged.
    #[must_use]
    pub fn swapped(self) -> Self {
        Self::new(self.percentile, self.reference, self.empirical)
    }
}

/// Per-percentile comparison of a sample against a reference distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuantileComparison {
    sample_size: usize,
    dither: Dither,
    gaps: Vec<QuantileGap>,
}

impl QuantileComparison {
    /// Compares the sample's quantiles with `reference`, a list of
    /// `(percentile, reference_value)` pairs.
    ///
    /// Percentiles must be strictly increasing and lie in `[0, 100]`. The
    /// result holds one [`QuantileGap`] per reference pair, in the same order.
    pub fn new<R>(
        sample: &[f64],
        reference: &[(f64, f64)],
        dither: Dither,
        rng: &mut R,
    ) -> Result<Self, QuantileError>
    where
        R: Rng + ?Sized,
    {
        if sample.is_empty() {
            return Err(QuantileError::EmptySample);
        }
        let valid_range = reference.iter().all(|(p, _)| (0.0..=100.0).contains(p));
        let increasing = reference.windows(2).all(|w| w[0].0 < w[1].0);
        if !valid_range || !increasing {
            return Err(QuantileError::InvalidPercentiles {
                percentiles: reference.iter().map(|(p, _)| *p).collect(),
            });
        }

        let mut values = dither.apply(sample, rng)?;
        values.sort_by(f64::total_cmp);

        let gaps = reference
            .iter()
            .map(|&(percentile, reference)| {
                let empirical = percentiles::compute_percentile(&values, percentile);
                QuantileGap::new(percentile, empirical, reference)
            })
            .collect();

        Ok(Self {
            sample_size: sample.len(),
            dither,
            gaps,
        })
    }

    /// Number of observations in the sample.
    #[must_use]
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    #[must_use]
    pub fn dither(&self) -> Dither {
        self.dither
    }

    /// Gaps in ascending percentile order.
    #[must_use]
    pub fn gaps(&self) -> &[QuantileGap] {
        &self.gaps
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;

    const PERCENTILES: [f64; 9] = [3.0, 5.0, 10.0, 25.0, 50.0, 75.0, 90.0, 95.0, 97.0];

    fn rng() -> Pcg64 {
        Pcg64::seed_from_u64(0x5eed)
    }

    #[test]
    fn test_rounded_sample_median() {
        let sample = [70.0, 70.0, 70.0, 71.0, 71.0];
        let comparison =
            QuantileComparison::new(&sample, &[(50.0, 70.5)], Dither::ROUNDED_TO_UNIT, &mut rng())
                .unwrap();
        let gap = comparison.gaps()[0];
        assert!((69.5..=71.5).contains(&gap.empirical));
        assert_ne!(gap.empirical, 70.0);
        assert_ne!(gap.empirical, 71.0);
        assert_eq!(gap.gap, gap.empirical - 70.5);
    }

    #[test]
    fn test_without_dither_quantiles_are_exact() {
        let sample = [70.0, 70.0, 70.0, 71.0, 71.0];
        let comparison =
            QuantileComparison::new(&sample, &[(50.0, 70.5)], Dither::None, &mut rng()).unwrap();
        assert_eq!(comparison.gaps()[0].empirical, 70.0);
        assert_eq!(comparison.gaps()[0].gap, -0.5);
    }

    #[test]
    fn test_gap_is_antisymmetric() {
        let a = [61.0, 63.5, 64.0, 66.0, 67.25, 70.0];
        let b = [60.0, 62.0, 65.5, 68.0, 69.0];
        let quantiles_of = |sample: &[f64]| {
            let mut sorted = sample.to_vec();
            sorted.sort_by(f64::total_cmp);
            PERCENTILES
                .iter()
                .map(|&p| (p, percentiles::compute_percentile(&sorted, p)))
                .collect::<Vec<_>>()
        };

        let ab = QuantileComparison::new(&a, &quantiles_of(&b), Dither::None, &mut rng()).unwrap();
        let ba = QuantileComparison::new(&b, &quantiles_of(&a), Dither::None, &mut rng()).unwrap();
        for (x, y) in ab.gaps().iter().zip(ba.gaps()) {
            assert_eq!(x.gap, -y.gap);
            assert_eq!(x.swapped().gap, y.gap);
        }
    }

    #[test]
    fn test_dither_preserves_mean_over_trials() {
        let sample = [64.0, 65.0, 65.0, 66.0, 70.0, 71.0, 71.0, 72.0];
        let expected = sample.iter().sum::<f64>() / 8.0;
        let mut rng = rng();

        let trials = 2000;
        let mut total = 0.0;
        for _ in 0..trials {
            let dithered = Dither::ROUNDED_TO_UNIT.apply(&sample, &mut rng).unwrap();
            total += dithered.iter().sum::<f64>() / 8.0;
        }
        let average = total / f64::from(trials);
        assert!((average - expected).abs() < 0.01, "{average} vs {expected}");
    }

    #[test]
    fn test_dither_stays_within_half_width() {
        let sample = [10.0; 100];
        let dithered = Dither::ROUNDED_TO_UNIT.apply(&sample, &mut rng()).unwrap();
        assert!(dithered.iter().all(|v| (9.5..=10.5).contains(v)));
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let sample = [1.0, 2.0, 3.0];
        let a = Dither::ROUNDED_TO_UNIT.apply(&sample, &mut rng()).unwrap();
        let b = Dither::ROUNDED_TO_UNIT.apply(&sample, &mut rng()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_sample() {
        let err = QuantileComparison::new(&[], &[(50.0, 1.0)], Dither::None, &mut rng())
            .unwrap_err();
        assert!(matches!(err, QuantileError::EmptySample));
    }

    #[test]
    fn test_invalid_percentiles() {
        let sample = [1.0, 2.0];
        for reference in [
            vec![(50.0, 1.0), (50.0, 1.0)],
            vec![(75.0, 1.0), (25.0, 1.0)],
            vec![(101.0, 1.0)],
        ] {
            let err = QuantileComparison::new(&sample, &reference, Dither::None, &mut rng())
                .unwrap_err();
            assert!(matches!(err, QuantileError::InvalidPercentiles { .. }));
        }
    }

    #[test]
    fn test_invalid_dither() {
        let err = Dither::Uniform { half_width: -1.0 }
            .apply(&[1.0], &mut rng())
            .unwrap_err();
        assert!(matches!(err, QuantileError::InvalidDither { .. }));
    }
}
