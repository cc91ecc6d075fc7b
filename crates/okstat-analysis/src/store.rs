//! In-memory profile store with typed queries
//!
//! [`ProfileStore`] holds the loaded profiles as an immutable snapshot
//! (`Arc<[Profile]>`). Queries take a [`Filter`]; the only mutation,
//! [`ProfileStore::delete_where`], builds a new snapshot so that snapshots
//! handed out earlier keep their contents.
//!
//! # Examples
//!
//! ```
//! use okstat_analysis::{
//!     profile::{Profile, Sex},
//!     store::{Filter, ProfileStore},
//! };
//!
//! let mut store = ProfileStore::new(vec![
//!     Profile::new(25, Sex::Male),
//!     Profile::new(31, Sex::Female),
//!     Profile::new(95, Sex::Male),
//! ]);
//! let before = store.snapshot();
//!
//! assert_eq!(store.delete_where(&Filter::AgeAbove(80)), 1);
//! assert_eq!(store.count(&Filter::All), 2);
//! assert_eq!(store.count(&Filter::Sex(Sex::Male)), 1);
//! assert_eq!(before.len(), 3);
//! ```

use std::{collections::BTreeMap, sync::Arc};

use okstat_stats::descriptive;
use regex::Regex;

use crate::{
    essays,
    profile::{CategoricalAttribute, Profile, Sex},
};

/// Predicate over profiles.
#[derive(Debug, Clone)]
pub enum Filter {
    /// Matches every profile.
    All,
    Sex(Sex),
    /// Age strictly greater than the value.
    AgeAbove(u32),
    /// Age strictly less than the value.
    AgeBelow(u32),
    AgeEquals(u32),
    /// Attribute present and exactly equal to the value.
    AttributeEquals(CategoricalAttribute, String),
    /// Essay text matches the pattern.
    ///
    /// With `essay: None` the pattern is applied to the concatenated essays.
    EssayMatches { essay: Option<usize>, pattern: Regex },
    And(Vec<Filter>),
    Not(Box<Filter>),
}

impl Filter {
    #[must_use]
    pub fn matches(&self, profile: &Profile) -> bool {
        match self {
            Self::All => true,
            Self::Sex(sex) => profile.sex == *sex,
            Self::AgeAbove(age) => profile.age > *age,
            Self::AgeBelow(age) => profile.age < *age,
            Self::AgeEquals(age) => profile.age == *age,
            Self::AttributeEquals(attribute, value) => profile.attribute(*attribute) == Some(value.as_str()),
            Self::EssayMatches {
                essay: Some(index),
                pattern,
            } => profile
                .essay(*index)
                .is_some_and(|text| pattern.is_match(text)),
            Self::EssayMatches {
                essay: None,
                pattern,
            } => pattern.is_match(&essays::corpus_text(profile)),
            Self::And(filters) => filters.iter().all(|f| f.matches(profile)),
            Self::Not(filter) => !filter.matches(profile),
        }
    }

    /// Conjunction of `self` and `other`, flattening nested `And`s.
    #[must_use]
    pub fn and(self, other: Filter) -> Self {
        match (self, other) {
            (Self::All, other) => other,
            (this, Self::All) => this,
            (Self::And(mut filters), Self::And(others)) => {
                filters.extend(others);
                Self::And(filters)
            }
            (Self::And(mut filters), other) => {
                filters.push(other);
                Self::And(filters)
            }
            (this, other) => Self::And(vec![this, other]),
        }
    }
}

/// Snapshot-based container of profiles.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    profiles: Arc<[Profile]>,
}

impl Default for ProfileStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl ProfileStore {
    #[must_use]
    pub fn new(profiles: Vec<Profile>) -> Self {
        Self {
            profiles: profiles.into(),
        }
    }

    /// Replaces the whole contents of the store.
    pub fn replace_all(&mut self, profiles: Vec<Profile>) {
        tracing::debug!(count = profiles.len(), "replacing store contents");
        self.profiles = profiles.into();
    }

    /// Current snapshot. It is unaffected by later mutations of the store.
    #[must_use]
    pub fn snapshot(&self) -> Arc<[Profile]> {
        Arc::clone(&self.profiles)
    }

    #[must_use]
    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    #[must_use]
    pub fn count(&self, filter: &Filter) -> usize {
        self.find(filter).count()
    }

    pub fn find<'s>(&'s self, filter: &Filter) -> impl Iterator<Item = &'s Profile> {
        self.profiles.iter().filter(move |p| filter.matches(p))
    }

    /// Removes every matching profile and returns how many were removed.
    pub fn delete_where(&mut self, filter: &Filter) -> usize {
        let before = self.profiles.len();
        let kept = self
            .profiles
            .iter()
            .filter(|p| !filter.matches(p))
            .cloned()
            .collect::<Vec<_>>();
        let removed = before - kept.len();
        if removed > 0 {
            self.profiles = kept.into();
        }
        tracing::debug!(removed, remaining = self.profiles.len(), "deleted profiles");
        removed
    }

    /// Groups matching profiles by `key`.
    pub fn group_by<K, F>(&self, filter: &Filter, mut key: F) -> BTreeMap<K, Vec<&Profile>>
    where
        K: Ord,
        F: FnMut(&Profile) -> K,
    {
        let mut groups = BTreeMap::<K, Vec<&Profile>>::new();
        for profile in self.find(filter) {
            groups.entry(key(profile)).or_default().push(profile);
        }
        groups
    }

    /// Mean of `value` per group, over profiles where the value is present.
    ///
    /// Groups without any present value are omitted.
    pub fn mean_by<K, F, V>(&self, filter: &Filter, key: F, mut value: V) -> BTreeMap<K, f64>
    where
        K: Ord,
        F: FnMut(&Profile) -> K,
        V: FnMut(&Profile) -> Option<f64>,
    {
        self.group_by(filter, key)
            .into_iter()
            .filter_map(|(k, group)| {
                let mean = descriptive::mean(group.into_iter().filter_map(&mut value))?;
                Some((k, mean))
            })
            .collect()
    }
}
