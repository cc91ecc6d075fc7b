use std::{
    fs::File,
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::{DateTime, Utc};
use okstat_analysis::{demographics, loader, reference::GrowthChart, store::ProfileStore};
use rand::SeedableRng as _;
use rand_pcg::Pcg64;

use crate::command::DatasetArg;

#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    /// Writes `value` as JSON to `output_path` when one was requested.
    ///
    /// A path of `-` selects stdout.
    pub fn save_json<T>(value: &T, output_path: Option<&Path>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let Some(path) = output_path else {
            return Ok(());
        };
        let mut output = Output::from_output_path(path)?;
        output.write_json(value)?;
        if let Output::File { path, .. } = &output {
            tracing::info!(path = %path.display(), "saved results");
        }
        Ok(())
    }

    pub fn from_output_path(path: &Path) -> anyhow::Result<Self> {
        if path.as_os_str() == "-" {
            Ok(Output::stdout())
        } else {
            Output::open(path.to_owned())
        }
    }

    pub fn stdout() -> Self {
        Output::Stdout {
            writer: io::stdout().lock(),
        }
    }

    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    pub fn write_json<T>(&mut self, value: T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, &value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        writeln!(&mut *self).with_context(|| {
            format!(
                "Failed to write newline after JSON to {}",
                self.display_path()
            )
        })?;
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))?;
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

/// JSON envelope of a command's results
#[derive(Debug, serde::Serialize)]
pub struct Report<'a, T> {
    pub command: &'a str,
    pub generated_at: DateTime<Utc>,
    pub profiles: &'a Path,
    pub removed_outliers: usize,
    pub result: T,
}

impl<'a, T> Report<'a, T> {
    pub fn new(command: &'a str, dataset: &'a DatasetArg, removed_outliers: usize, result: T) -> Self {
        Self {
            command,
            generated_at: Utc::now(),
            profiles: &dataset.profiles,
            removed_outliers,
            result,
        }
    }

    pub fn save(&self, dataset: &DatasetArg) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        Output::save_json(self, dataset.output.as_deref())
    }
}

/// Loads the profiles and removes age outliers
///
/// # Returns
///
/// The cleaned store and the number of profiles removed as outliers
pub fn load_store(arg: &DatasetArg) -> anyhow::Result<(ProfileStore, usize)> {
    let profiles = loader::load_profiles(&arg.profiles)
        .with_context(|| format!("Failed to load profiles: {}", arg.profiles.display()))?;
    let mut store = ProfileStore::new(profiles);
    let removed = demographics::remove_age_outliers(&mut store, arg.max_age);
    Ok((store, removed))
}

pub fn load_growth_chart(path: &Path) -> anyhow::Result<GrowthChart> {
    GrowthChart::load(path)
        .with_context(|| format!("Failed to load growth chart: {}", path.display()))
}

/// Random source for dithering: seeded when `seed` is given, OS entropy otherwise
pub fn rng_from_seed(seed: Option<u64>) -> Pcg64 {
    match seed {
        Some(seed) => Pcg64::seed_from_u64(seed),
        None => Pcg64::from_rng(&mut rand::rng()),
    }
}

/// Formats an optional number, `-` when missing
pub fn format_opt(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "-".to_owned(), |v| format!("{v:.precision$}"))
}

#[cfg(test)]
mod tests {
    use rand::Rng as _;

    use super::*;

    #[test]
    fn test_save_json_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        Output::save_json(&vec![1, 2, 3], Some(&path)).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let value = serde_json::from_str::<Vec<i32>>(&text).unwrap();
        assert_eq!(value, [1, 2, 3]);
    }

    #[test]
    fn test_report_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("report.json");
        let dataset = DatasetArg {
            profiles: PathBuf::from("profiles.csv"),
            max_age: 80,
            output: Some(output.clone()),
            no_color: true,
        };
        Report::new("summary", &dataset, 2, [1.5]).save(&dataset).unwrap();

        let value = serde_json::from_str::<serde_json::Value>(
            &std::fs::read_to_string(&output).unwrap(),
        )
        .unwrap();
        assert_eq!(value["command"], "summary");
        assert_eq!(value["profiles"], "profiles.csv");
        assert_eq!(value["removed_outliers"], 2);
        assert_eq!(value["result"][0], 1.5);
        assert!(value["generated_at"].is_string());
    }

    #[test]
    fn test_save_json_without_path_writes_nothing() {
        Output::save_json(&"ignored", None).unwrap();
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let a = rng_from_seed(Some(42)).random::<u64>();
        let b = rng_from_seed(Some(42)).random::<u64>();
        assert_eq!(a, b);
    }

    #[test]
    fn test_format_opt() {
        assert_eq!(format_opt(Some(1.23456), 2), "1.23");
        assert_eq!(format_opt(None, 2), "-");
    }
}
