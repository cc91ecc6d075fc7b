//! Vocabulary selection for the word-membership table
//!
//! # Selection Steps
//!
//! ```text
//! Corpus
//!     ↓ split_tokens + frequency count
//! Top-K most frequent tokens (ties by token)
//!     ↓ length >= min_length, alphabetic only
//! Candidates
//!     ↓ VocabularyCuration (e.g. drop markup artifacts)
//! Vocabulary (kept terms + removed terms)
//! ```
//!
//! The curation step is an explicit trait object so callers can inspect or
//! replace it. [`ExcludeTerms::default`] removes the HTML fragments that leak
//! from the essays' markup (`href`, `ilink`).
//!
//! Tokens with equal counts are ranked by token, not by where they first
//! appear in the corpus, so the last few terms admitted by the top-K cutoff
//! can differ from a first-occurrence ranking when counts tie at the
//! boundary.

use std::collections::BTreeSet;

use okstat_stats::frequency::FrequencyTable;
use serde::{Deserialize, Serialize};

use crate::essays::{self, Corpus};

pub const DEFAULT_TOP_K: usize = 100;
pub const DEFAULT_MIN_LENGTH: usize = 4;
pub const DEFAULT_EXCLUDED_TERMS: [&str; 2] = ["href", "ilink"];

/// Parameters of the frequency-based selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VocabularyOptions {
    /// Number of most frequent tokens to consider.
    pub top_k: usize,
    /// Minimum length of a term in characters.
    pub min_length: usize,
}

impl Default for VocabularyOptions {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            min_length: DEFAULT_MIN_LENGTH,
        }
    }
}

/// Final filtering step applied to the candidate terms.
pub trait VocabularyCuration {
    /// Whether `term` should be dropped from the vocabulary.
    fn excludes(&self, term: &str) -> bool;
}

/// Curation that drops a fixed set of terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcludeTerms {
    terms: BTreeSet<String>,
}

impl ExcludeTerms {
    #[must_use]
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            terms: terms.into_iter().map(Into::into).collect(),
        }
    }

    /// Curation that keeps every candidate.
    #[must_use]
    pub fn none() -> Self {
        Self {
            terms: BTreeSet::new(),
        }
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }
}

impl Default for ExcludeTerms {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDED_TERMS)
    }
}

impl VocabularyCuration for ExcludeTerms {
    fn excludes(&self, term: &str) -> bool {
        self.terms.contains(term)
    }
}

/// A frequent token with its number of occurrences in the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermCount {
    pub term: String,
    pub count: u64,
}

/// Selected vocabulary, most frequent term first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    terms: Vec<TermCount>,
    removed: Vec<TermCount>,
}

impl Vocabulary {
    /// Selects the vocabulary from the corpus.
    #[must_use]
    pub fn select(
        corpus: &Corpus,
        options: VocabularyOptions,
        curation: &dyn VocabularyCuration,
    ) -> Self {
        let frequencies = corpus
            .texts()
            .iter()
            .flat_map(|text| essays::split_tokens(text))
            .collect::<FrequencyTable<&str>>();
        tracing::debug!(distinct_tokens = frequencies.len(), "counted corpus tokens");

        let candidates = frequencies
            .most_common(options.top_k)
            .into_iter()
            .filter(|(token, _)| is_candidate(token, options.min_length))
            .map(|(token, count)| TermCount {
                term: (*token).to_owned(),
                count,
            });

        let (removed, terms): (Vec<_>, Vec<_>) =
            candidates.partition(|term| curation.excludes(&term.term));
        if !removed.is_empty() {
            tracing::info!(
                removed = ?removed.iter().map(|t| t.term.as_str()).collect::<Vec<_>>(),
                "curated vocabulary"
            );
        }
        Self { terms, removed }
    }

    /// Builds a vocabulary from an explicit list of terms.
    #[must_use]
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            terms: terms
                .into_iter()
                .map(|term| TermCount {
                    term: term.into(),
                    count: 0,
                })
                .collect(),
            removed: vec![],
        }
    }

    /// Kept terms with their corpus counts.
    #[must_use]
    pub fn term_counts(&self) -> &[TermCount] {
        &self.terms
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(|t| t.term.as_str())
    }

    /// Candidates dropped by the curation step.
    #[must_use]
    pub fn removed(&self) -> &[TermCount] {
        &self.removed
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

fn is_candidate(token: &str, min_length: usize) -> bool {
    token.chars().count() >= min_length && token.chars().all(char::is_alphabetic)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(texts: &[&str]) -> Corpus {
        Corpus::from_texts(texts.iter().map(|t| (*t).to_owned()).collect())
    }

    #[test]
    fn test_select_filters_short_and_non_alphabetic_tokens() {
        let corpus = corpus(&[
            "the music, the music! and 2012 dogs",
            "music and dogs and friends don't",
        ]);
        let vocabulary = Vocabulary::select(&corpus, VocabularyOptions::default(), &ExcludeTerms::none());
        assert_eq!(vocabulary.terms().collect::<Vec<_>>(), ["music", "dogs", "friends"]);
        assert_eq!(vocabulary.term_counts()[0].count, 3);
    }

    #[test]
    fn test_top_k_is_applied_before_length_filter() {
        let corpus = corpus(&["a a a b b c c music"]);
        let options = VocabularyOptions {
            top_k: 3,
            min_length: 4,
        };
        let vocabulary = Vocabulary::select(&corpus, options, &ExcludeTerms::none());
        assert!(vocabulary.is_empty());
    }

    #[test]
    fn test_top_k_cutoff_ranks_tied_counts_by_token() {
        let corpus = corpus(&["zebra zebra music music apple apple"]);
        let options = VocabularyOptions {
            top_k: 2,
            min_length: 4,
        };
        let vocabulary = Vocabulary::select(&corpus, options, &ExcludeTerms::none());
        assert_eq!(vocabulary.terms().collect::<Vec<_>>(), ["apple", "music"]);
    }

    #[test]
    fn test_default_curation_reports_removed_terms() {
        let corpus = corpus(&["ilink href href friends friends friends"]);
        let vocabulary =
            Vocabulary::select(&corpus, VocabularyOptions::default(), &ExcludeTerms::default());
        assert_eq!(vocabulary.terms().collect::<Vec<_>>(), ["friends"]);
        let removed = vocabulary
            .removed()
            .iter()
            .map(|t| t.term.as_str())
            .collect::<Vec<_>>();
        assert_eq!(removed, ["href", "ilink"]);
    }

    #[test]
    fn test_custom_curation() {
        struct NoDogs;
        impl VocabularyCuration for NoDogs {
            fn excludes(&self, term: &str) -> bool {
                term == "dogs"
            }
        }
        let corpus = corpus(&["dogs dogs cats"]);
        let vocabulary = Vocabulary::select(&corpus, VocabularyOptions::default(), &NoDogs);
        assert_eq!(vocabulary.terms().collect::<Vec<_>>(), ["cats"]);
        assert_eq!(vocabulary.removed()[0].term, "dogs");
        assert_eq!(vocabulary.removed()[0].count, 2);
    }
}
