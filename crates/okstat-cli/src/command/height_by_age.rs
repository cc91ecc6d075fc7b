//! Mean height by age command

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Args;
use okstat_analysis::height::{self, HeightByAgeRow};

use crate::{
    command::DatasetArg,
    util::{self, Report},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct HeightByAgeArg {
    #[clap(flatten)]
    pub dataset: DatasetArg,

    /// Path to the CDC stature-for-age CSV file
    #[arg(long)]
    pub reference: PathBuf,

    /// First age of the window
    #[arg(long, default_value_t = 16)]
    pub from: u32,

    /// Last age of the window (inclusive)
    #[arg(long, default_value_t = 27)]
    pub to: u32,
}

pub(crate) fn run(arg: &HeightByAgeArg) -> anyhow::Result<()> {
    anyhow::ensure!(
        arg.from <= arg.to,
        "Invalid age window: {} > {}",
        arg.from,
        arg.to
    );
    let (store, removed) = util::load_store(&arg.dataset)?;
    let chart = util::load_growth_chart(&arg.reference)?;
    let rows = height::height_by_age(&store, &chart, arg.from, arg.to)
        .context("Failed to read the growth chart percentiles")?;

    println!("Mean Height by Age (inches)");
    println!("===========================\n");

    let [p_lo, p_mid, p_hi] = height::HEIGHT_BY_AGE_PERCENTILES.map(|p| format!("Ref P{p}"));
    println!(
        "  {:<8} {:>5} {:>7} {:>8} {:>9} {:>9} {:>9}",
        "Sex", "Age", "Count", "Mean", p_lo, p_mid, p_hi
    );
    println!("  {}", "-".repeat(63));
    for row in &rows {
        print_row(row);
    }

    Report::new("height-by-age", &arg.dataset, removed, &rows).save(&arg.dataset)?;
    Ok(())
}

fn print_row(row: &HeightByAgeRow) {
    let [lo, mid, hi] = row.reference.map(|value| util::format_opt(value, 2));
    println!(
        "  {:<8} {:>5} {:>7} {:>8} {:>9} {:>9} {:>9}",
        row.sex.to_string(),
        row.age,
        row.count,
        util::format_opt(row.mean_height, 2),
        lo,
        mid,
        hi
    );
}
