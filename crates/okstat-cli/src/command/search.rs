//! Essay search command

use anyhow::Context as _;
use clap::Args;
use okstat_analysis::{
    profile::{CategoricalAttribute, ESSAY_COUNT, Profile},
    search::{EssaySearch, SearchResult},
};
use serde::Serialize;

use crate::{
    command::DatasetArg,
    util::{self, Report},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct SearchArg {
    #[clap(flatten)]
    pub dataset: DatasetArg,

    /// Regular expression matched case-insensitively against the essays
    #[arg(long)]
    pub pattern: String,

    /// Essay to search (0-9); all essays when omitted
    #[arg(long)]
    pub essay: Option<usize>,

    /// Only profiles with this education
    #[arg(long)]
    pub education: Option<String>,

    /// Only profiles with this exact `speaks` value
    #[arg(long)]
    pub speaks: Option<String>,

    /// Regular expression whose first match in each matching essay is tallied
    #[arg(long)]
    pub extract: Option<String>,

    /// Number of matching profiles to list
    #[arg(long, default_value_t = 10)]
    pub show: usize,
}

#[derive(Debug, Serialize)]
struct SearchReport<'a> {
    pattern: &'a str,
    essay: Option<usize>,
    result: &'a SearchResult,
}

pub(crate) fn run(arg: &SearchArg) -> anyhow::Result<()> {
    if let Some(essay) = arg.essay {
        anyhow::ensure!(
            essay < ESSAY_COUNT,
            "Essay index {essay} out of range (0-{})",
            ESSAY_COUNT - 1
        );
    }
    let search = build_search(arg)?;
    let (store, removed) = util::load_store(&arg.dataset)?;

    let result = match &arg.extract {
        Some(extract) => search.run(&store, extract)?,
        None => SearchResult {
            matched: search.count(&store),
            phrases: vec![],
        },
    };

    println!("Essay Search");
    println!("============\n");
    match arg.essay {
        Some(essay) => println!("Pattern: /{}/i in essay{essay}", arg.pattern),
        None => println!("Pattern: /{}/i in all essays", arg.pattern),
    }
    println!("Matching profiles: {} of {}\n", result.matched, store.len());

    if !result.phrases.is_empty() {
        println!("Extracted Phrases");
        println!("  {:<40} {:>8}", "Phrase", "Count");
        println!("  {}", "-".repeat(49));
        for phrase in &result.phrases {
            println!("  {:<40} {:>8}", phrase.phrase, phrase.count);
        }
        println!();
    }

    let matches = search.find(&store);
    if !matches.is_empty() && arg.show > 0 {
        println!("First Matches");
        for profile in matches.iter().take(arg.show) {
            print_profile(profile);
        }
        if matches.len() > arg.show {
            println!("  ... {} more", matches.len() - arg.show);
        }
    }

    Report::new(
        "search",
        &arg.dataset,
        removed,
        SearchReport {
            pattern: &arg.pattern,
            essay: arg.essay,
            result: &result,
        },
    )
    .save(&arg.dataset)?;
    Ok(())
}

fn build_search(arg: &SearchArg) -> anyhow::Result<EssaySearch> {
    let mut search = EssaySearch::new(&arg.pattern, arg.essay)
        .with_context(|| format!("Failed to compile search pattern: {}", arg.pattern))?;
    if let Some(education) = &arg.education {
        search = search.with_attribute(CategoricalAttribute::Education, education);
    }
    if let Some(speaks) = &arg.speaks {
        search = search.with_attribute(CategoricalAttribute::Speaks, speaks);
    }
    Ok(search)
}

fn print_profile(profile: &Profile) {
    println!(
        "  {:>3} {:<7} {:<40} {}",
        profile.age,
        profile.sex.to_string(),
        profile.education.as_deref().unwrap_or("-"),
        profile.location.as_deref().unwrap_or("-"),
    );
}

#[cfg(test)]
mod tests {
    use okstat_analysis::{profile::Sex, store::ProfileStore};

    use super::*;

    fn arg(pattern: &str) -> SearchArg {
        SearchArg {
            dataset: DatasetArg {
                profiles: "profiles.csv".into(),
                max_age: 80,
                output: None,
                no_color: true,
            },
            pattern: pattern.to_owned(),
            essay: Some(0),
            education: None,
            speaks: None,
            extract: None,
            show: 10,
        }
    }

    #[test]
    fn test_build_search_applies_filters() {
        let mut graduate = Profile::new(30, Sex::Female);
        graduate.education = Some("graduated from masters program".to_owned());
        graduate.essays[0] = Some("I love hiking".to_owned());
        let mut student = graduate.clone();
        student.education = Some("working on college/university".to_owned());
        let store = ProfileStore::new(vec![graduate, student]);

        let search = build_search(&arg("HIKING")).unwrap();
        assert_eq!(search.count(&store), 2);

        let search = build_search(&SearchArg {
            education: Some("graduated from masters program".to_owned()),
            ..arg("hiking")
        })
        .unwrap();
        assert_eq!(search.count(&store), 1);
    }

    #[test]
    fn test_build_search_rejects_invalid_pattern() {
        assert!(build_search(&arg("(unclosed")).is_err());
    }
}
