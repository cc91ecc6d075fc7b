//! Word-membership table
//!
//! One row per essay text, one boolean column per vocabulary term: `true`
//! when the term occurs in the text as a whole word. Matching is
//! case-sensitive.
//!
//! Each text is split into word runs once and collected into a set; every
//! term is then a set lookup, so building the table is linear in the corpus
//! size instead of one scan per term.
//!
//! ```
//! use okstat_analysis::{essays::Corpus, membership::WordMembershipTable, vocabulary::Vocabulary};
//!
//! let corpus = Corpus::from_texts(vec![
//!     " i play music".to_owned(),
//!     " i am a musician".to_owned(),
//! ]);
//! let table = WordMembershipTable::build(&corpus, &Vocabulary::from_terms(["music"]));
//! assert_eq!(table.column_sum("music"), Some(1));
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    essays::{self, Corpus},
    vocabulary::Vocabulary,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordMembershipTable {
    terms: Vec<String>,
    rows: Vec<Vec<bool>>,
    column_sums: Vec<u64>,
}

impl WordMembershipTable {
    #[must_use]
    pub fn build(corpus: &Corpus, vocabulary: &Vocabulary) -> Self {
        let terms = vocabulary.terms().map(str::to_owned).collect::<Vec<_>>();
        let mut column_sums = vec![0; terms.len()];
        let rows = corpus
            .texts()
            .iter()
            .map(|text| {
                let words = essays::word_runs(text).collect::<HashSet<_>>();
                let row = terms
                    .iter()
                    .map(|term| words.contains(term.as_str()))
                    .collect::<Vec<_>>();
                for (sum, &present) in column_sums.iter_mut().zip(&row) {
                    *sum += u64::from(present);
                }
                row
            })
            .collect::<Vec<_>>();
        tracing::debug!(rows = rows.len(), columns = terms.len(), "built word-membership table");
        Self {
            terms,
            rows,
            column_sums,
        }
    }

    #[must_use]
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Membership flags of one text, in term order.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&[bool]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of texts containing each term, in term order.
    #[must_use]
    pub fn column_sums(&self) -> &[u64] {
        &self.column_sums
    }

    #[must_use]
    pub fn column_sum(&self, term: &str) -> Option<u64> {
        let index = self.terms.iter().position(|t| t == term)?;
        Some(self.column_sums[index])
    }

    /// Whether text `row` contains `term`.
    #[must_use]
    pub fn contains(&self, row: usize, term: &str) -> Option<bool> {
        let index = self.terms.iter().position(|t| t == term)?;
        Some(self.rows.get(row)?[index])
    }

    /// `(term, number of texts)` pairs, most frequent first.
    #[must_use]
    pub fn ranked_terms(&self) -> Vec<(&str, u64)> {
        let mut ranked = self
            .terms
            .iter()
            .map(String::as_str)
            .zip(self.column_sums.iter().copied())
            .collect::<Vec<_>>();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(texts: &[&str]) -> Corpus {
        Corpus::from_texts(texts.iter().map(|t| (*t).to_owned()).collect())
    }

    #[test]
    fn test_column_sums_count_whole_word_occurrences() {
        let corpus = corpus(&[
            " music music and movies",
            " musician, movies!",
            " Music is life",
            " (music)",
        ]);
        let table = WordMembershipTable::build(&corpus, &Vocabulary::from_terms(["music", "movies"]));
        assert_eq!(table.num_rows(), 4);
        assert_eq!(table.column_sums(), [2, 2]);
        assert_eq!(table.row(1), Some(&[false, true][..]));
        assert_eq!(table.contains(2, "music"), Some(false));
        assert_eq!(table.contains(3, "music"), Some(true));
        assert_eq!(table.contains(0, "books"), None);
        assert_eq!(table.contains(9, "music"), None);
    }

    #[test]
    fn test_column_sums_match_row_counts() {
        let corpus = corpus(&[" a cat", " dogs and cats", " cat dog", ""]);
        let table = WordMembershipTable::build(&corpus, &Vocabulary::from_terms(["cat", "dog", "cats"]));
        for (column, term) in table.terms().iter().enumerate() {
            let expected = (0..table.num_rows())
                .filter(|&row| table.row(row).unwrap()[column])
                .count() as u64;
            assert_eq!(table.column_sum(term), Some(expected));
        }
        assert_eq!(table.column_sums(), [2, 1, 1]);
    }

    #[test]
    fn test_ranked_terms() {
        let corpus = corpus(&[" b c", " c"]);
        let table = WordMembershipTable::build(&corpus, &Vocabulary::from_terms(["a", "b", "c"]));
        assert_eq!(table.ranked_terms(), [("c", 2), ("b", 1), ("a", 0)]);
    }
}
