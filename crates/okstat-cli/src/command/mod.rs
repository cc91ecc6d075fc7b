use std::{
    io::{self, IsTerminal as _},
    path::PathBuf,
};

use clap::{Args, Parser, Subcommand};
use okstat_analysis::demographics;

use self::{
    essays::EssaysArg, height::HeightArg, height_by_age::HeightByAgeArg,
    prevalence::PrevalenceArg, search::SearchArg, summary::SummaryArg,
};

mod essays;
mod height;
mod height_by_age;
mod prevalence;
mod search;
mod summary;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Analysis to run
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Sex distribution, age statistics and male share by age
    Summary(#[clap(flatten)] SummaryArg),
    /// Compare the prevalence of an attribute's values among men and women
    Prevalence(#[clap(flatten)] PrevalenceArg),
    /// Compare reported heights with the growth-chart percentiles
    Height(#[clap(flatten)] HeightArg),
    /// Mean height per sex and age next to the growth chart
    HeightByAge(#[clap(flatten)] HeightByAgeArg),
    /// Select the essay vocabulary and build the word-membership table
    Essays(#[clap(flatten)] EssaysArg),
    /// Search essay text
    Search(#[clap(flatten)] SearchArg),
}

/// Arguments shared by every command
#[derive(Debug, Clone, Args)]
pub(crate) struct DatasetArg {
    /// Path to the profiles CSV file
    pub profiles: PathBuf,

    /// Profiles older than this are removed as outliers
    #[arg(long, default_value_t = demographics::DEFAULT_MAX_AGE)]
    pub max_age: u32,

    /// Write the results as JSON to this path (`-` for stdout)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Disable colored charts
    #[arg(long)]
    pub no_color: bool,
}

impl DatasetArg {
    /// Charts are colored only on a terminal.
    pub fn color(&self) -> bool {
        !self.no_color && io::stdout().is_terminal()
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Summary(arg) => summary::run(&arg)?,
        Mode::Prevalence(arg) => prevalence::run(&arg)?,
        Mode::Height(arg) => height::run(&arg)?,
        Mode::HeightByAge(arg) => height_by_age::run(&arg)?,
        Mode::Essays(arg) => essays::run(&arg)?,
        Mode::Search(arg) => search::run(&arg)?,
    }
    Ok(())
}
