//! Essay vocabulary command
//!
//! Selects the frequent words of the essays, removes the curated markup terms
//! and builds the word-membership table, reusing the on-disk cache when the
//! corpus and vocabulary are unchanged.
//!
//! The first profiles of the table are previewed against the most and least
//! used terms, one `x` per profile using the term.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Args;
use okstat_analysis::{
    cache::{CacheStatus, MembershipCache},
    essays::Corpus,
    membership::WordMembershipTable,
    vocabulary::{self, ExcludeTerms, TermCount, Vocabulary, VocabularyOptions},
};
use serde::Serialize;

use crate::{
    command::DatasetArg,
    util::{self, Report},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct EssaysArg {
    #[clap(flatten)]
    pub dataset: DatasetArg,

    /// Number of most frequent tokens considered for the vocabulary
    #[arg(long, default_value_t = vocabulary::DEFAULT_TOP_K)]
    pub top_k: usize,

    /// Minimum length of a vocabulary term
    #[arg(long, default_value_t = vocabulary::DEFAULT_MIN_LENGTH)]
    pub min_length: usize,

    /// Terms removed from the vocabulary (comma-separated)
    #[arg(long, value_delimiter = ',', default_values = vocabulary::DEFAULT_EXCLUDED_TERMS)]
    pub exclude: Vec<String>,

    /// Directory of the word-membership cache
    #[arg(long, default_value = ".okstat-cache")]
    pub cache_dir: PathBuf,

    /// Build the table without reading or writing the cache
    #[arg(long)]
    pub no_cache: bool,

    /// Number of ranked terms to print
    #[arg(long, default_value_t = 30)]
    pub show: usize,

    /// Number of profiles shown in the membership preview
    #[arg(long, default_value_t = 100)]
    pub preview_rows: usize,

    /// Number of most and of least used terms shown in the membership preview
    #[arg(long, default_value_t = 5)]
    pub preview_terms: usize,
}

#[derive(Debug, Serialize)]
struct EssaysReport<'a> {
    vocabulary: &'a [TermCount],
    removed: &'a [TermCount],
    cache: Option<CacheStatus>,
    documents: usize,
    ranked_terms: Vec<(&'a str, u64)>,
}

pub(crate) fn run(arg: &EssaysArg) -> anyhow::Result<()> {
    let (store, removed_outliers) = util::load_store(&arg.dataset)?;
    let corpus = Corpus::from_profiles(store.profiles());
    let options = VocabularyOptions {
        top_k: arg.top_k,
        min_length: arg.min_length,
    };
    let curation = ExcludeTerms::new(arg.exclude.iter().cloned());
    let vocabulary = Vocabulary::select(&corpus, options, &curation);
    tracing::info!(terms = vocabulary.len(), "selected vocabulary");

    let (table, cache) = if arg.no_cache {
        (WordMembershipTable::build(&corpus, &vocabulary), None)
    } else {
        let cache = MembershipCache::new(&arg.cache_dir);
        let (table, status) = cache.load_or_build(&corpus, &vocabulary).with_context(|| {
            format!(
                "Failed to use the word-membership cache in {}",
                arg.cache_dir.display()
            )
        })?;
        (table, Some(status))
    };

    println!("Essay Vocabulary");
    println!("================\n");
    println!(
        "Documents: {}, vocabulary: {} terms (top {} tokens, length >= {})",
        corpus.len(),
        vocabulary.len(),
        arg.top_k,
        arg.min_length
    );
    if let Some(status) = cache {
        println!("Word-membership table: cache {status}");
    }
    println!();

    if !vocabulary.removed().is_empty() {
        println!("Removed Terms");
        for term in vocabulary.removed() {
            println!("  {:<20} {:>10}", term.term, term.count);
        }
        println!();
    }

    let ranked = table.ranked_terms();
    print_ranked_terms(&ranked, table.num_rows(), arg.show);

    if arg.preview_rows > 0 && arg.preview_terms > 0 && !table.terms().is_empty() {
        println!();
        println!("Membership Preview (most and least used terms)");
        let columns = preview_columns(&table, arg.preview_terms);
        for line in preview_lines(&table, &columns, arg.preview_rows) {
            println!("{line}");
        }
    }

    Report::new(
        "essays",
        &arg.dataset,
        removed_outliers,
        EssaysReport {
            vocabulary: vocabulary.term_counts(),
            removed: vocabulary.removed(),
            cache,
            documents: table.num_rows(),
            ranked_terms: ranked,
        },
    )
    .save(&arg.dataset)?;
    Ok(())
}

#[expect(clippy::cast_precision_loss)]
fn print_ranked_terms(ranked: &[(&str, u64)], documents: usize, show: usize) {
    println!("Profiles Using Each Term");
    println!("  {:>4} {:<20} {:>10} {:>8}", "Rank", "Term", "Profiles", "Share");
    println!("  {}", "-".repeat(45));
    for (rank, (term, count)) in ranked.iter().take(show).enumerate() {
        let share = if documents == 0 {
            0.0
        } else {
            *count as f64 / documents as f64 * 100.0
        };
        println!("  {:>4} {:<20} {:>10} {:>7.1}%", rank + 1, term, count, share);
    }
    if ranked.len() > show {
        println!("  ... {} more", ranked.len() - show);
    }
}

/// Term indices of the `per_side` most used and `per_side` least used terms.
fn preview_columns(table: &WordMembershipTable, per_side: usize) -> Vec<usize> {
    let sums = table.column_sums();
    let mut order = (0..sums.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| sums[b].cmp(&sums[a]));
    if order.len() <= per_side * 2 {
        return order;
    }
    let tail = order.split_off(order.len() - per_side);
    order.truncate(per_side);
    order.extend(tail);
    order
}

fn preview_lines(table: &WordMembershipTable, columns: &[usize], rows: usize) -> Vec<String> {
    let terms = table.terms();
    let header = columns
        .iter()
        .map(|&c| terms[c].as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let mut lines = vec![format!("  {:>6} {header}", "Row")];
    for index in 0..rows {
        let Some(row) = table.row(index) else {
            break;
        };
        let cells = columns
            .iter()
            .map(|&c| {
                let mark = if row[c] { "x" } else { "·" };
                format!("{mark:^width$}", width = terms[c].chars().count())
            })
            .collect::<Vec<_>>()
            .join(" ");
        lines.push(format!("  {index:>6} {cells}"));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> WordMembershipTable {
        let corpus = Corpus::from_texts(
            [
                " music movies books",
                " music movies",
                " music travel",
                " hiking",
            ]
            .iter()
            .map(|t| (*t).to_owned())
            .collect(),
        );
        let vocabulary = Vocabulary::from_terms(["books", "hiking", "movies", "music", "travel"]);
        WordMembershipTable::build(&corpus, &vocabulary)
    }

    #[test]
    fn test_preview_columns_take_both_ends() {
        let table = table();
        let columns = preview_columns(&table, 1);
        let terms = columns
            .iter()
            .map(|&c| table.terms()[c].as_str())
            .collect::<Vec<_>>();
        assert_eq!(terms, ["music", "travel"]);

        assert_eq!(preview_columns(&table, 3).len(), 5);
    }

    #[test]
    fn test_preview_lines_mark_term_use() {
        let table = table();
        let columns = preview_columns(&table, 1);
        let lines = preview_lines(&table, &columns, 3);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "     Row music travel");
        assert_eq!(lines[1], "       0   x     ·   ");
        assert_eq!(lines[3], "       2   x     x   ");

        assert_eq!(preview_lines(&table, &columns, 100).len(), 5);
    }
}
