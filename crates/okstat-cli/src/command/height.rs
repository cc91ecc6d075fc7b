//! Height versus growth-chart command
//!
//! The height distribution of each sex over the whole dataset is shown first,
//! then the profiles of one age are compared with the chart. Heights are
//! reported in whole inches. Before the quantiles are taken, each height is
//! dithered with uniform noise of one inch width so the sample
//! percentiles are not stuck on integers.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Args;
use okstat_analysis::height::{self, SexHeightComparison, SexHeightDistribution};
use okstat_stats::quantile::Dither;
use ratatui::widgets::Block;
use serde::Serialize;

use crate::{
    command::DatasetArg,
    ui::{
        print,
        widgets::{GapChart, HistogramDisplay, color, style},
    },
    util::{self, Report},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct HeightArg {
    #[clap(flatten)]
    pub dataset: DatasetArg,

    /// Path to the CDC stature-for-age CSV file
    #[arg(long)]
    pub reference: PathBuf,

    /// Age in years whose profiles are compared
    #[arg(long, default_value_t = height::DEFAULT_REFERENCE_AGE)]
    pub age: u32,

    /// Seed of the dithering noise; drawn from OS entropy when omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Use the reported heights as they are
    #[arg(long)]
    pub no_dither: bool,
}

#[derive(Debug, Serialize)]
struct HeightReport<'a> {
    distributions: &'a [SexHeightDistribution],
    seed: Option<u64>,
    comparisons: &'a [SexHeightComparison],
}

pub(crate) fn run(arg: &HeightArg) -> anyhow::Result<()> {
    let (store, removed) = util::load_store(&arg.dataset)?;
    let chart = util::load_growth_chart(&arg.reference)?;
    let mut rng = util::rng_from_seed(arg.seed);
    let dither = if arg.no_dither {
        Dither::None
    } else {
        Dither::ROUNDED_TO_UNIT
    };

    let distributions = height::height_distribution(&store);
    let comparisons = height::compare_heights_at_age(
        &store,
        &chart,
        arg.age,
        &height::HEIGHT_PERCENTILES,
        dither,
        &mut rng,
    )
    .with_context(|| format!("Failed to compare heights at age {}", arg.age))?;

    print_distributions(&distributions, arg.dataset.color())?;

    println!("Height at Age {} vs Growth Chart (inches)", arg.age);
    println!("========================================\n");
    match dither {
        Dither::None => println!("Dithering: off\n"),
        Dither::Uniform { half_width } => println!("Dithering: uniform +/- {half_width}\n"),
    }

    let max_gap = comparisons
        .iter()
        .flat_map(|c| c.comparison.gaps())
        .map(|gap| gap.gap.abs())
        .fold(0.0, f64::max);

    for result in &comparisons {
        print_table(result);
        println!();

        let title = format!("{} (sample - reference)", result.sex);
        let gap_chart = GapChart::new(result.comparison.gaps())
            .color(color::sex(result.sex))
            .half_width(25)
            .max_gap(max_gap)
            .block(Block::bordered().title(title).border_style(style::AXIS));
        print::print_widget(
            &gap_chart,
            gap_chart.width(),
            gap_chart.height(),
            arg.dataset.color(),
        )?;
        println!();
    }

    Report::new(
        "height",
        &arg.dataset,
        removed,
        HeightReport {
            distributions: &distributions,
            seed: arg.seed,
            comparisons: &comparisons,
        },
    )
    .save(&arg.dataset)?;
    Ok(())
}

fn print_distributions(
    distributions: &[SexHeightDistribution],
    use_color: bool,
) -> anyhow::Result<()> {
    println!("Height Distribution (inches)");
    println!("============================\n");
    println!(
        "  {:<8} {:>8} {:>8} {:>8} {:>6} {:>6} {:>6} {:>6} {:>6}",
        "Sex", "Count", "Mean", "Std", "Min", "P25", "P50", "P75", "Max"
    );
    println!("  {}", "-".repeat(72));
    for dist in distributions {
        let quartile = |p| util::format_opt(dist.quartiles.get(p), 1);
        println!(
            "  {:<8} {:>8} {:>8.2} {:>8.2} {:>6.0} {:>6} {:>6} {:>6} {:>6.0}",
            dist.sex.to_string(),
            dist.stats.count,
            dist.stats.mean,
            dist.stats.std_dev,
            dist.stats.min,
            quartile(25.0),
            quartile(50.0),
            quartile(75.0),
            dist.stats.max,
        );
    }
    println!();

    for dist in distributions {
        let title = format!("{} height", dist.sex);
        let histogram = HistogramDisplay::new(&dist.histogram)
            .color(color::sex(dist.sex))
            .block(Block::bordered().title(title).border_style(style::AXIS));
        print::print_widget(&histogram, print::terminal_width(), histogram.height(), use_color)?;
        println!();
    }
    Ok(())
}

fn print_table(result: &SexHeightComparison) {
    println!(
        "{} (n = {})",
        result.sex,
        result.comparison.sample_size()
    );
    println!(
        "  {:>10} {:>10} {:>10} {:>8}",
        "Percentile", "Sample", "Reference", "Gap"
    );
    println!("  {}", "-".repeat(41));
    for gap in result.comparison.gaps() {
        println!(
            "  {:>10} {:>10.2} {:>10.2} {:>+8.2}",
            format!("P{}", gap.percentile),
            gap.empirical,
            gap.reference,
            gap.gap
        );
    }
}
