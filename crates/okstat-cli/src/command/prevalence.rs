//! Attribute prevalence command
//!
//! For each value of a categorical attribute, compares how common it is among
//! men and among women. The ratio is normalized by the subgroup sizes, so 0.5
//! means equally prevalent regardless of how many men and women there are.

use anyhow::Context as _;
use clap::Args;
use okstat_analysis::{
    demographics,
    profile::{CategoricalAttribute, Sex},
};
use okstat_stats::prevalence::{self, PrevalenceComparison};
use serde::Serialize;

use crate::{
    command::DatasetArg,
    ui::{
        print,
        widgets::{DivergingBar, DivergingBarChart, color},
    },
    util::{self, Report},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct PrevalenceArg {
    #[clap(flatten)]
    pub dataset: DatasetArg,

    /// Categorical attribute to compare (e.g. `body_type`, `drugs`, `education`)
    #[arg(long)]
    pub attribute: CategoricalAttribute,

    /// Values with fewer profiles than this (both sexes together) are excluded
    #[arg(long, default_value_t = prevalence::DEFAULT_MIN_SUPPORT)]
    pub min_support: u64,
}

#[derive(Debug, Serialize)]
struct Prevalence<'a> {
    attribute: CategoricalAttribute,
    comparison: &'a PrevalenceComparison<String>,
}

pub(crate) fn run(arg: &PrevalenceArg) -> anyhow::Result<()> {
    let (store, removed) = util::load_store(&arg.dataset)?;
    let comparison = demographics::compare_attribute_by_sex(&store, arg.attribute, arg.min_support)
        .with_context(|| format!("Failed to compare {} by sex", arg.attribute))?;

    println!("Prevalence of {} by Sex", arg.attribute);
    println!("==========================\n");
    println!(
        "Profiles: {} male, {} female; minimum support {}",
        comparison.group1_total(),
        comparison.group2_total(),
        comparison.min_support()
    );
    if comparison.excluded_categories() > 0 {
        println!(
            "{} values below the minimum support excluded",
            comparison.excluded_categories()
        );
    }
    println!();

    if comparison.is_empty() {
        println!("No value of {} has enough support.", arg.attribute);
    } else {
        print_table(&comparison);
        println!();

        let bars = comparison
            .records()
            .iter()
            .map(|record| DivergingBar::new(record.category.as_str(), Some(record.ratio)))
            .collect();
        let chart = DivergingBarChart::new(bars)
            .left("more common among men", color::sex(Sex::Male))
            .right("among women", color::sex(Sex::Female))
            .bar_width(50);
        print::print_widget(&chart, chart.width(), chart.height(), arg.dataset.color())?;
    }

    Report::new(
        "prevalence",
        &arg.dataset,
        removed,
        Prevalence {
            attribute: arg.attribute,
            comparison: &comparison,
        },
    )
    .save(&arg.dataset)?;
    Ok(())
}

fn print_table(comparison: &PrevalenceComparison<String>) {
    println!(
        "  {:<40} {:>8} {:>8} {:>8} {:>8} {:>7}",
        "Value", "Male", "Female", "Male%", "Female%", "Ratio"
    );
    println!("  {}", "-".repeat(85));
    for record in comparison.records() {
        println!(
            "  {:<40} {:>8} {:>8} {:>7.2}% {:>7.2}% {:>7.3}",
            record.category,
            record.group1_count,
            record.group2_count,
            record.group1_fraction * 100.0,
            record.group2_fraction * 100.0,
            record.ratio,
        );
    }
}
