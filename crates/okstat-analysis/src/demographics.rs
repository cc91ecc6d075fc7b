//! Sex and age structure of the dataset
//!
//! # Typical Workflow
//!
//! ```text
//! ProfileStore
//!     ↓ remove_age_outliers (age > max_age)
//! Cleaned store
//!     ├─ SexDistribution
//!     ├─ AgeSummary (overall and per sex)
//!     ├─ male_share_by_age
//!     └─ compare_attribute_by_sex (prevalence of attribute values)
//! ```

use okstat_stats::{
    comprehensive::ComprehensiveStats,
    prevalence::{self, GroupedObservation, PrevalenceComparison, PrevalenceError},
};
use serde::Serialize;

use crate::{
    profile::{CategoricalAttribute, Sex},
    store::{Filter, ProfileStore},
};

/// Profiles older than this are treated as data-entry errors.
pub const DEFAULT_MAX_AGE: u32 = 80;

/// Minimum number of profiles of an age for its male share to be reported.
pub const DEFAULT_AGE_MIN_SUPPORT: usize = 100;

/// Removes profiles older than `max_age` and returns how many were removed.
pub fn remove_age_outliers(store: &mut ProfileStore, max_age: u32) -> usize {
    let removed = store.delete_where(&Filter::AgeAbove(max_age));
    tracing::info!(max_age, removed, remaining = store.len(), "removed age outliers");
    removed
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SexShare {
    pub sex: Sex,
    pub count: usize,
    pub fraction: f64,
}

/// Number and share of profiles of each sex.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SexDistribution {
    pub total: usize,
    pub shares: Vec<SexShare>,
}

impl SexDistribution {
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_store(store: &ProfileStore) -> Self {
        let total = store.len();
        let shares = Sex::ALL
            .into_iter()
            .map(|sex| {
                let count = store.count(&Filter::Sex(sex));
                let fraction = if total == 0 {
                    0.0
                } else {
                    count as f64 / total as f64
                };
                SexShare {
                    sex,
                    count,
                    fraction,
                }
            })
            .collect();
        Self { total, shares }
    }

    #[must_use]
    pub fn get(&self, sex: Sex) -> Option<&SexShare> {
        self.shares.iter().find(|s| s.sex == sex)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SexAgeSummary {
    pub sex: Sex,
    pub stats: ComprehensiveStats,
}

/// Age statistics of the whole dataset and of each sex.
///
/// Sexes without profiles are omitted from `by_sex`.
#[derive(Debug, Clone, Serialize)]
pub struct AgeSummary {
    pub overall: Option<ComprehensiveStats>,
    pub by_sex: Vec<SexAgeSummary>,
}

impl AgeSummary {
    #[must_use]
    pub fn from_store(store: &ProfileStore) -> Self {
        let ages = |filter: &Filter| {
            store
                .find(filter)
                .map(|p| f64::from(p.age))
                .collect::<Vec<_>>()
        };
        let overall = ComprehensiveStats::new(ages(&Filter::All));
        let by_sex = Sex::ALL
            .into_iter()
            .filter_map(|sex| {
                let stats = ComprehensiveStats::new(ages(&Filter::Sex(sex)))?;
                Some(SexAgeSummary { sex, stats })
            })
            .collect();
        Self { overall, by_sex }
    }
}

/// Share of male profiles among the profiles of one age.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeShare {
    pub age: u32,
    pub total: usize,
    pub male: usize,
    /// `None` when fewer than the minimum support profiles have this age.
    pub male_fraction: Option<f64>,
}

/// Male share per age, in ascending age order.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn male_share_by_age(store: &ProfileStore, min_support: usize) -> Vec<AgeShare> {
    store
        .group_by(&Filter::All, |p| p.age)
        .into_iter()
        .map(|(age, group)| {
            let total = group.len();
            let male = group.iter().filter(|p| p.sex == Sex::Male).count();
            let male_fraction = (total >= min_support).then(|| male as f64 / total as f64);
            AgeShare {
                age,
                total,
                male,
                male_fraction,
            }
        })
        .collect()
}

/// Prevalence of the values of `attribute` among male versus female profiles.
///
/// Males are subgroup 1, so a ratio above 0.5 marks a value more common among
/// men.
pub fn compare_attribute_by_sex(
    store: &ProfileStore,
    attribute: CategoricalAttribute,
    min_support: u64,
) -> Result<PrevalenceComparison<String>, PrevalenceError> {
    let observations = store.profiles().iter().map(|p| {
        GroupedObservation::new(
            p.attribute(attribute).map(str::to_owned),
            p.sex == Sex::Male,
            p.sex == Sex::Female,
        )
    });
    let comparison = prevalence::compare_prevalence(observations, min_support)?;
    tracing::debug!(
        %attribute,
        categories = comparison.records().len(),
        excluded = comparison.excluded_categories(),
        "compared attribute prevalence"
    );
    Ok(comparison)
}
