//! Dataset overview command
//!
//! Prints the sex distribution, age statistics overall and per sex, the age
//! histogram and the male share of each age.

use clap::Args;
use okstat_analysis::{
    demographics::{self, AgeShare, AgeSummary, SexDistribution},
    profile::Sex,
};
use okstat_stats::comprehensive::ComprehensiveStats;
use ratatui::widgets::Block;
use serde::Serialize;

use crate::{
    command::DatasetArg,
    ui::{
        print,
        widgets::{DivergingBar, DivergingBarChart, HistogramDisplay, color, style},
    },
    util::{self, Report},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct SummaryArg {
    #[clap(flatten)]
    pub dataset: DatasetArg,

    /// Minimum number of profiles of an age for its male share to be reported
    #[arg(long, default_value_t = demographics::DEFAULT_AGE_MIN_SUPPORT)]
    pub min_support: usize,
}

#[derive(Debug, Serialize)]
struct Summary<'a> {
    sex_distribution: &'a SexDistribution,
    age: &'a AgeSummary,
    male_share_by_age: &'a [AgeShare],
}

pub(crate) fn run(arg: &SummaryArg) -> anyhow::Result<()> {
    let (store, removed) = util::load_store(&arg.dataset)?;
    tracing::info!(profiles = store.len(), removed, "loaded profiles");

    let distribution = SexDistribution::from_store(&store);
    let ages = AgeSummary::from_store(&store);
    let shares = demographics::male_share_by_age(&store, arg.min_support);
    let use_color = arg.dataset.color();

    println!("Profile Summary");
    println!("===============\n");
    println!(
        "Profiles: {} ({removed} older than {} removed)\n",
        distribution.total, arg.dataset.max_age
    );

    print_sex_distribution(&distribution);
    println!();

    print_age_table(&ages);
    println!();

    if let Some(overall) = &ages.overall {
        let histogram = HistogramDisplay::new(&overall.histogram)
            .color(color::GRAY)
            .block(Block::bordered().title("Age").border_style(style::AXIS));
        print::print_widget(&histogram, print::terminal_width(), histogram.height(), use_color)?;
        println!();
    }
    for summary in &ages.by_sex {
        let title = format!("Age ({})", summary.sex);
        let histogram = HistogramDisplay::new(&summary.stats.histogram)
            .color(color::sex(summary.sex))
            .block(Block::bordered().title(title).border_style(style::AXIS));
        print::print_widget(&histogram, print::terminal_width(), histogram.height(), use_color)?;
        println!();
    }

    print_male_share(&shares, arg.min_support, use_color)?;

    Report::new(
        "summary",
        &arg.dataset,
        removed,
        Summary {
            sex_distribution: &distribution,
            age: &ages,
            male_share_by_age: &shares,
        },
    )
    .save(&arg.dataset)?;
    Ok(())
}

fn print_sex_distribution(distribution: &SexDistribution) {
    println!("Sex Distribution");
    println!("  {:<8} {:>8} {:>8}", "Sex", "Count", "Share");
    println!("  {}", "-".repeat(26));
    for share in &distribution.shares {
        println!(
            "  {:<8} {:>8} {:>7.1}%",
            share.sex.to_string(),
            share.count,
            share.fraction * 100.0
        );
    }
}

fn print_age_row(label: &str, stats: &ComprehensiveStats) {
    let quartile = |p| util::format_opt(stats.percentiles.get(p), 1);
    println!(
        "  {:<8} {:>8} {:>8.2} {:>8.2} {:>6.0} {:>6} {:>6} {:>6} {:>6.0}",
        label,
        stats.stats.count,
        stats.stats.mean,
        stats.stats.std_dev,
        stats.stats.min,
        quartile(25.0),
        quartile(50.0),
        quartile(75.0),
        stats.stats.max,
    );
}

fn print_age_table(ages: &AgeSummary) {
    println!("Age");
    println!(
        "  {:<8} {:>8} {:>8} {:>8} {:>6} {:>6} {:>6} {:>6} {:>6}",
        "Group", "Count", "Mean", "Std", "Min", "P25", "P50", "P75", "Max"
    );
    println!("  {}", "-".repeat(72));
    if let Some(overall) = &ages.overall {
        print_age_row("all", overall);
    }
    for summary in &ages.by_sex {
        print_age_row(&summary.sex.to_string(), &summary.stats);
    }
}

fn print_male_share(shares: &[AgeShare], min_support: usize, use_color: bool) -> anyhow::Result<()> {
    let bars = shares
        .iter()
        .filter(|share| share.male_fraction.is_some())
        .map(|share| DivergingBar::new(share.age.to_string(), share.male_fraction))
        .collect::<Vec<_>>();
    let skipped = shares.len() - bars.len();

    println!("Male Share by Age (ages with at least {min_support} profiles)");
    if bars.is_empty() {
        println!("  no age has enough profiles");
        return Ok(());
    }
    let chart = DivergingBarChart::new(bars)
        .left("male", color::sex(Sex::Male))
        .right("female", color::sex(Sex::Female));
    print::print_widget(&chart, chart.width(), chart.height(), use_color)?;
    if skipped > 0 {
        println!("  {skipped} ages below the minimum support omitted");
    }
    Ok(())
}
