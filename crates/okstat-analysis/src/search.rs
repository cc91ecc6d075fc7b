//! Regular-expression search over essays
//!
//! An [`EssaySearch`] selects profiles whose essay matches a case-insensitive
//! pattern, optionally restricted by further [`Filter`]s (education, spoken
//! languages, ...). Matching profiles can then be mined for phrases: the first
//! match of an extraction pattern in each profile's essay is counted.
//!
//! ```
//! use okstat_analysis::{
//!     profile::{Profile, Sex},
//!     search::EssaySearch,
//!     store::ProfileStore,
//! };
//!
//! let mut profile = Profile::new(30, Sex::Male);
//! profile.essays[5] = Some("Sports: football season tickets".to_owned());
//! let store = ProfileStore::new(vec![profile]);
//!
//! let search = EssaySearch::new("sports", Some(5)).unwrap();
//! let result = search.run(&store, r"\bfootball [a-z]*\b").unwrap();
//! assert_eq!(result.matched, 1);
//! assert_eq!(result.phrases[0].phrase, "football season");
//! ```

use okstat_stats::frequency::FrequencyTable;
use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::{
    essays,
    profile::{CategoricalAttribute, Profile},
    store::{Filter, ProfileStore},
};

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("invalid pattern '{pattern}'")]
pub struct PatternError {
    pattern: String,
    source: regex::Error,
}

/// Builds a case-insensitive regular expression.
pub fn case_insensitive(pattern: &str) -> Result<Regex, PatternError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| PatternError {
            pattern: pattern.to_owned(),
            source,
        })
}

/// Essay query: a pattern on one essay (or all essays) plus extra filters.
#[derive(Debug, Clone)]
pub struct EssaySearch {
    essay: Option<usize>,
    pattern: Regex,
    filters: Vec<Filter>,
}

/// A phrase and the number of profiles in which it was the first match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhraseCount {
    pub phrase: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    /// Number of profiles matching the query.
    pub matched: usize,
    /// Extracted phrases, most frequent first.
    pub phrases: Vec<PhraseCount>,
}

impl EssaySearch {
    /// Matches `pattern` case-insensitively against essay `essay`, or against
    /// the concatenated essays when `essay` is `None`.
    pub fn new(pattern: &str, essay: Option<usize>) -> Result<Self, PatternError> {
        Ok(Self {
            essay,
            pattern: case_insensitive(pattern)?,
            filters: vec![],
        })
    }

    /// Additionally requires `attribute` to equal `value`.
    #[must_use]
    pub fn with_attribute(mut self, attribute: CategoricalAttribute, value: impl Into<String>) -> Self {
        self.filters
            .push(Filter::AttributeEquals(attribute, value.into()));
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// The combined store filter of this query.
    #[must_use]
    pub fn filter(&self) -> Filter {
        self.filters.iter().cloned().fold(
            Filter::EssayMatches {
                essay: self.essay,
                pattern: self.pattern.clone(),
            },
            Filter::and,
        )
    }

    fn text(&self, profile: &Profile) -> Option<String> {
        match self.essay {
            Some(index) => profile.essay(index).map(str::to_owned),
            None => Some(essays::corpus_text(profile)),
        }
    }

    /// Profiles matching the query.
    pub fn find<'a>(&self, store: &'a ProfileStore) -> Vec<&'a Profile> {
        let filter = self.filter();
        store.find(&filter).collect()
    }

    /// Runs the query and counts the first match of `extract` (case-sensitive)
    /// in each matching profile.
    pub fn run(&self, store: &ProfileStore, extract: &str) -> Result<SearchResult, PatternError> {
        let extract = Regex::new(extract).map_err(|source| PatternError {
            pattern: extract.to_owned(),
            source,
        })?;
        let matches = self.find(store);
        let phrases = matches
            .iter()
            .filter_map(|p| {
                let text = self.text(p)?;
                Some(extract.find(&text)?.as_str().to_owned())
            })
            .collect::<FrequencyTable<String>>();
        tracing::debug!(
            matched = matches.len(),
            extracted = phrases.total(),
            "ran essay search"
        );
        Ok(SearchResult {
            matched: matches.len(),
            phrases: phrases
                .most_common(phrases.len())
                .into_iter()
                .map(|(phrase, count)| PhraseCount {
                    phrase: phrase.clone(),
                    count,
                })
                .collect(),
        })
    }

    /// Runs the query without phrase extraction.
    #[must_use]
    pub fn count(&self, store: &ProfileStore) -> usize {
        store.count(&self.filter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Sex;

    fn profile(essay5: &str, education: Option<&str>, speaks: &str) -> Profile {
        let mut p = Profile::new(30, Sex::Female);
        p.essays[5] = Some(essay5.to_owned());
        p.education = education.map(str::to_owned);
        p.speaks = Some(speaks.to_owned());
        p
    }

    fn store() -> ProfileStore {
        ProfileStore::new(vec![
            profile("SPORTS, football games", Some("graduated from college/university"), "english (fluently)"),
            profile("sports and football games", None, "spanish"),
            profile("watching sports, football season", Some("graduated from college/university"), "english"),
            profile("family and friends", Some("graduated from college/university"), "english (fluently)"),
            profile("no football here", None, "english"),
        ])
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let search = EssaySearch::new("sports", Some(5)).unwrap();
        assert_eq!(search.count(&store()), 3);
        let search = EssaySearch::new("sports", Some(4)).unwrap();
        assert_eq!(search.count(&store()), 0);
        let search = EssaySearch::new("sports", None).unwrap();
        assert_eq!(search.count(&store()), 3);
    }

    #[test]
    fn test_search_with_attribute_filters() {
        let store = store();
        let graduated = EssaySearch::new("sports", Some(5))
            .unwrap()
            .with_attribute(CategoricalAttribute::Education, "graduated from college/university");
        assert_eq!(graduated.count(&store), 2);

        let spanish = EssaySearch::new("sports", Some(5))
            .unwrap()
            .with_attribute(CategoricalAttribute::Speaks, "spanish");
        assert_eq!(spanish.count(&store), 1);
    }

    #[test]
    fn test_extract_counts_first_match() {
        let search = EssaySearch::new("sports", Some(5)).unwrap();
        let result = search.run(&store(), r"\bfootball [a-z]*\b").unwrap();
        assert_eq!(result.matched, 3);
        assert_eq!(
            result.phrases,
            [
                PhraseCount {
                    phrase: "football games".to_owned(),
                    count: 2
                },
                PhraseCount {
                    phrase: "football season".to_owned(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(EssaySearch::new("(", None).is_err());
        let search = EssaySearch::new("x", None).unwrap();
        assert!(search.run(&store(), "[").is_err());
    }
}
