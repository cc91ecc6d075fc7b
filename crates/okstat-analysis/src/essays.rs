//! Essay corpus and tokenization
//!
//! The essay text of a profile is the concatenation of its ten essays, each
//! preceded by a single space. A missing essay contributes an empty string;
//! this is the only place where missing text is treated as empty.
//!
//! Two tokenizers are provided:
//!
//! - [`split_tokens`]: whitespace split with surrounding whitespace and ASCII
//!   punctuation stripped. Used to count word frequencies for the vocabulary.
//! - [`word_runs`]: maximal runs of word characters (alphanumeric or `_`).
//!   A term occurs in a text as a whole word exactly when it equals one of
//!   these runs, the same boundary rule as `\bterm\b`.
//!
//! ```
//! use okstat_analysis::essays::{split_tokens, word_runs};
//!
//! let text = "I love dogs, (and cats!) e-mail";
//! assert_eq!(
//!     split_tokens(text).collect::<Vec<_>>(),
//!     ["I", "love", "dogs", "and", "cats", "e-mail"]
//! );
//! assert_eq!(
//!     word_runs(text).collect::<Vec<_>>(),
//!     ["I", "love", "dogs", "and", "cats", "e", "mail"]
//! );
//! ```

use crate::profile::Profile;

/// Concatenated essay text of one profile.
#[must_use]
pub fn corpus_text(profile: &Profile) -> String {
    let mut text = String::new();
    for essay in &profile.essays {
        text.push(' ');
        text.push_str(essay.as_deref().unwrap_or(""));
    }
    text
}

/// Essay texts of a set of profiles, in profile order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    texts: Vec<String>,
}

impl Corpus {
    #[must_use]
    pub fn from_profiles<'a, I>(profiles: I) -> Self
    where
        I: IntoIterator<Item = &'a Profile>,
    {
        Self {
            texts: profiles.into_iter().map(corpus_text).collect(),
        }
    }

    #[must_use]
    pub fn from_texts(texts: Vec<String>) -> Self {
        Self { texts }
    }

    #[must_use]
    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

fn is_strippable(c: char) -> bool {
    c.is_ascii_whitespace() || c.is_ascii_punctuation()
}

/// Whitespace-separated tokens with surrounding whitespace and ASCII
/// punctuation removed.
///
/// Tokens consisting only of punctuation become empty strings and are still
/// yielded, so that the token count matches the number of words.
pub fn split_tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace().map(|w| w.trim_matches(is_strippable))
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Maximal runs of word characters.
pub fn word_runs(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !is_word_char(c))
        .filter(|run| !run.is_empty())
}

/// Whether `word` occurs in `text` as a whole word.
///
/// `word` is expected to consist of word characters only.
#[must_use]
pub fn contains_word(text: &str, word: &str) -> bool {
    word_runs(text).any(|run| run == word)
}
