//! Profile heights compared with the growth chart
//!
//! Three views are provided:
//!
//! - [`height_distribution`]: per sex, the summary statistics of all reported
//!   heights and a one-inch histogram over 55 to 80 inches.
//! - [`compare_heights_at_age`]: per sex, the quantiles of the heights of
//!   profiles of one age against the growth-chart percentiles at that age.
//!   Heights are reported in whole inches, so callers normally pass
//!   [`Dither::ROUNDED_TO_UNIT`].
//! - [`height_by_age`]: per sex and age, the mean reported height next to the
//!   chart's P25/P50/P75 averaged over that year of age.

use std::ops::Range;

use okstat_stats::{
    comprehensive::QUARTILES,
    descriptive::DescriptiveStats,
    histogram::Histogram,
    percentiles::Percentiles,
    quantile::{Dither, QuantileComparison, QuantileError},
};
use rand::Rng;
use serde::Serialize;

use crate::{
    profile::Sex,
    reference::{GrowthChart, ReferenceError},
    store::{Filter, ProfileStore},
};

/// Percentiles compared against the growth chart.
pub const HEIGHT_PERCENTILES: [f64; 9] = [3.0, 5.0, 10.0, 25.0, 50.0, 75.0, 90.0, 95.0, 97.0];

/// Age at which heights are compared by default (the last age of the chart).
pub const DEFAULT_REFERENCE_AGE: u32 = 20;

/// Chart percentiles shown next to the mean height by age.
pub const HEIGHT_BY_AGE_PERCENTILES: [f64; 3] = [25.0, 50.0, 75.0];

/// Binned height range in inches; heights outside it are counted as under- or overflow.
pub const HEIGHT_HISTOGRAM_RANGE: Range<f64> = 55.0..80.0;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum HeightError {
    #[display("growth chart lookup failed")]
    Reference { source: ReferenceError },
    #[display("cannot compare heights of {sex} profiles")]
    Quantile { sex: Sex, source: QuantileError },
}

/// Reported heights of one sex.
#[derive(Debug, Clone, Serialize)]
pub struct SexHeightDistribution {
    pub sex: Sex,
    pub stats: DescriptiveStats,
    pub quartiles: Percentiles,
    /// One-inch bins over [`HEIGHT_HISTOGRAM_RANGE`].
    pub histogram: Histogram,
}

/// Height distribution per sex over every profile with a reported height.
///
/// A sex without any reported height is left out.
#[must_use]
pub fn height_distribution(store: &ProfileStore) -> Vec<SexHeightDistribution> {
    Sex::ALL
        .into_iter()
        .filter_map(|sex| {
            let mut heights = store
                .find(&Filter::Sex(sex))
                .filter_map(|p| p.height)
                .collect::<Vec<_>>();
            heights.sort_by(f64::total_cmp);
            let stats = DescriptiveStats::from_sorted(&heights)?;
            let quartiles = Percentiles::from_sorted(&heights, &QUARTILES);
            let histogram = Histogram::new(
                heights.iter().copied(),
                HEIGHT_HISTOGRAM_RANGE.start,
                HEIGHT_HISTOGRAM_RANGE.end,
                1.0,
            );
            Some(SexHeightDistribution {
                sex,
                stats,
                quartiles,
                histogram,
            })
        })
        .collect()
}

/// Quantile comparison for one sex.
#[derive(Debug, Clone, Serialize)]
pub struct SexHeightComparison {
    pub sex: Sex,
    pub age: u32,
    pub comparison: QuantileComparison,
}

/// Compares the heights of profiles aged `age` with the chart, one result per sex.
pub fn compare_heights_at_age<R>(
    store: &ProfileStore,
    chart: &GrowthChart,
    age: u32,
    percentiles: &[f64],
    dither: Dither,
    rng: &mut R,
) -> Result<Vec<SexHeightComparison>, HeightError>
where
    R: Rng + ?Sized,
{
    Sex::ALL
        .into_iter()
        .map(|sex| {
            let reference = chart
                .reference_points(sex, age, percentiles)
                .map_err(|source| HeightError::Reference { source })?;
            let filter = Filter::Sex(sex).and(Filter::AgeEquals(age));
            let heights = store.find(&filter).filter_map(|p| p.height).collect::<Vec<_>>();
            tracing::debug!(%sex, age, count = heights.len(), "comparing heights");
            let comparison = QuantileComparison::new(&heights, &reference, dither, &mut *rng)
                .map_err(|source| HeightError::Quantile { sex, source })?;
            Ok(SexHeightComparison {
                sex,
                age,
                comparison,
            })
        })
        .collect()
}

/// Mean height of one (sex, age) cell with the chart's values for that year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeightByAgeRow {
    pub sex: Sex,
    pub age: u32,
    /// Number of profiles with a reported height.
    pub count: usize,
    pub mean_height: Option<f64>,
    /// Chart values at [`HEIGHT_BY_AGE_PERCENTILES`]; `None` where the chart
    /// does not cover the age.
    pub reference: [Option<f64>; 3],
}

/// Mean height per sex and age for ages in `from..=to`.
pub fn height_by_age(
    store: &ProfileStore,
    chart: &GrowthChart,
    from: u32,
    to: u32,
) -> Result<Vec<HeightByAgeRow>, ReferenceError> {
    let window = Filter::Not(Box::new(Filter::AgeBelow(from)))
        .and(Filter::Not(Box::new(Filter::AgeAbove(to))));
    let means = store.mean_by(&window, |p| (p.sex, p.age), |p| p.height);
    let counts = store.group_by(&window, |p| (p.sex, p.age));

    let mut rows = vec![];
    for sex in Sex::ALL {
        let yearly = HEIGHT_BY_AGE_PERCENTILES
            .iter()
            .map(|&p| chart.yearly_means(sex, p))
            .collect::<Result<Vec<_>, _>>()?;
        for age in from..=to {
            let count = counts
                .get(&(sex, age))
                .map_or(0, |group| group.iter().filter(|p| p.height.is_some()).count());
            let reference = [0, 1, 2].map(|i| yearly[i].get(&age).copied());
            rows.push(HeightByAgeRow {
                sex,
                age,
                count,
                mean_height: means.get(&(sex, age)).copied(),
                reference,
            });
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;
    use crate::{profile::Profile, reference::CM_TO_INCH};

    const CHART: &str = "\
Sex,Agemos,P3,P5,P10,P25,P50,P75,P90,P95,P97
1,228,163,165,167,171,176,181,185,187,189
1,240,163,165,168,172,178,182,186,188,190
2,228,151,153,155,159,163,168,171,174,175
2,240,151,153,155,159,164,168,171,174,175
";

    fn profile(age: u32, sex: Sex, height: Option<f64>) -> Profile {
        let mut p = Profile::new(age, sex);
        p.height = height;
        p
    }

    fn store() -> ProfileStore {
        ProfileStore::new(vec![
            profile(20, Sex::Male, Some(70.0)),
            profile(20, Sex::Male, Some(71.0)),
            profile(20, Sex::Male, Some(69.0)),
            profile(20, Sex::Female, Some(64.0)),
            profile(20, Sex::Female, None),
            profile(19, Sex::Female, Some(66.0)),
            profile(21, Sex::Male, Some(75.0)),
        ])
    }

    #[test]
    fn test_height_distribution() {
        let mut profiles = store().profiles().to_vec();
        profiles.push(profile(30, Sex::Male, Some(50.0)));
        profiles.push(profile(30, Sex::Male, Some(80.0)));
        profiles.push(profile(30, Sex::Male, Some(95.0)));
        let distributions = height_distribution(&ProfileStore::new(profiles));
        assert_eq!(distributions.len(), 2);

        let male = &distributions[0];
        assert_eq!(male.sex, Sex::Male);
        assert_eq!(male.stats.count, 7);
        assert_eq!(male.quartiles.get(50.0), Some(71.0));
        assert_eq!(male.histogram.bins.len(), 25);
        assert_eq!(male.histogram.bins[0].range, 55.0..56.0);
        assert_eq!(male.histogram.bins[15].count, 1);
        assert_eq!(male.histogram.underflow, 1);
        assert_eq!(male.histogram.overflow, 2);
        assert_eq!(male.histogram.binned_count(), 4);

        let female = &distributions[1];
        assert_eq!(female.stats.count, 2);
        assert_eq!(female.histogram.binned_count(), 2);
        assert_eq!(female.histogram.bins[9].count, 1);
    }

    #[test]
    fn test_height_distribution_skips_sex_without_heights() {
        let store = ProfileStore::new(vec![
            profile(25, Sex::Female, Some(65.0)),
            profile(25, Sex::Male, None),
        ]);
        let distributions = height_distribution(&store);
        assert_eq!(distributions.len(), 1);
        assert_eq!(distributions[0].sex, Sex::Female);
    }

    #[test]
    fn test_compare_heights_at_age() {
        let chart = GrowthChart::from_reader(CHART.as_bytes()).unwrap();
        let mut rng = Pcg64::seed_from_u64(1);
        let results =
            compare_heights_at_age(&store(), &chart, 20, &[50.0], Dither::None, &mut rng).unwrap();
        assert_eq!(results.len(), 2);

        let male = &results[0];
        assert_eq!(male.sex, Sex::Male);
        assert_eq!(male.comparison.sample_size(), 3);
        let gap = male.comparison.gaps()[0];
        assert_eq!(gap.empirical, 70.0);
        assert!((gap.reference - 178.0 * CM_TO_INCH).abs() < 1e-12);

        let female = &results[1];
        assert_eq!(female.comparison.sample_size(), 1);
        assert_eq!(female.comparison.gaps()[0].empirical, 64.0);
    }

    #[test]
    fn test_compare_heights_without_profiles() {
        let chart = GrowthChart::from_reader(CHART.as_bytes()).unwrap();
        let store = ProfileStore::new(vec![profile(20, Sex::Male, Some(70.0))]);
        let err = compare_heights_at_age(
            &store,
            &chart,
            20,
            &HEIGHT_PERCENTILES,
            Dither::ROUNDED_TO_UNIT,
            &mut rand::rng(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            HeightError::Quantile {
                sex: Sex::Female,
                source: QuantileError::EmptySample
            }
        ));
    }

    #[test]
    fn test_height_by_age() {
        let chart = GrowthChart::from_reader(CHART.as_bytes()).unwrap();
        let rows = height_by_age(&store(), &chart, 19, 21).unwrap();
        assert_eq!(rows.len(), 6);

        let male_20 = rows.iter().find(|r| r.sex == Sex::Male && r.age == 20).unwrap();
        assert_eq!(male_20.count, 3);
        assert_eq!(male_20.mean_height, Some(70.0));
        assert!((male_20.reference[1].unwrap() - 178.0 * CM_TO_INCH).abs() < 1e-12);

        let male_19 = rows.iter().find(|r| r.sex == Sex::Male && r.age == 19).unwrap();
        assert_eq!(male_19.count, 0);
        assert_eq!(male_19.mean_height, None);
        assert!((male_19.reference[1].unwrap() - 176.0 * CM_TO_INCH).abs() < 1e-12);

        let male_21 = rows.iter().find(|r| r.sex == Sex::Male && r.age == 21).unwrap();
        assert_eq!(male_21.reference, [None, None, None]);

        let female_20 = rows.iter().find(|r| r.sex == Sex::Female && r.age == 20).unwrap();
        assert_eq!(female_20.count, 1);
        assert_eq!(female_20.mean_height, Some(64.0));
    }
}
