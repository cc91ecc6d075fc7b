//! Stature-for-age reference table
//!
//! The CDC growth chart (`statage.csv`) lists, for each sex and age in
//! months, the stature in centimeters at a fixed set of percentiles:
//!
//! ```text
//! Sex,Agemos,L,M,S,P3,P5,P10,P25,P50,P75,P90,P95,P97
//! 1,24,...
//! ```
//!
//! On load the table is normalized to the profile dataset's conventions:
//!
//! - sex code `1` becomes [`Sex::Male`], `2` becomes [`Sex::Female`]
//! - percentile values are converted from centimeters to inches
//! - rows repeating the header line (the file concatenates per-sex tables)
//!   are skipped
//!
//! The `L`, `M` and `S` columns (LMS smoothing parameters) are not used.

use std::{
    collections::BTreeMap,
    fs::File,
    io,
    path::{Path, PathBuf},
};

use okstat_stats::descriptive;
use serde::Serialize;

use crate::profile::Sex;

/// Centimeters to inches.
pub const CM_TO_INCH: f64 = 0.393_701;

const SEX_COLUMN: &str = "Sex";
const AGE_COLUMN: &str = "Agemos";
const MONTHS_PER_YEAR: f64 = 12.0;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ReferenceError {
    #[display("failed to open {}", path.display())]
    Open { path: PathBuf, source: io::Error },
    #[display("failed to read growth chart")]
    Csv { source: csv::Error },
    #[display("growth chart has no '{column}' column")]
    MissingColumn { column: String },
    #[display("invalid value '{value}' in column '{column}' of growth chart record #{row}")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },
    #[display("invalid sex code '{value}' in growth chart record #{row}")]
    InvalidSex { row: usize, value: String },
    #[display("growth chart has no {sex} row at age {age}")]
    MissingAge { sex: Sex, age: u32 },
    #[display("growth chart has no P{percentile} column")]
    MissingPercentile { percentile: f64 },
}

/// One row of the growth chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthChartRow {
    pub sex: Sex,
    pub age_months: f64,
    /// Stature in inches, one value per percentile of the chart.
    pub values: Vec<f64>,
}

impl GrowthChartRow {
    #[must_use]
    pub fn age_years(&self) -> f64 {
        self.age_months / MONTHS_PER_YEAR
    }
}

/// Stature percentiles by sex and age.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthChart {
    percentiles: Vec<f64>,
    rows: Vec<GrowthChartRow>,
}

impl GrowthChart {
    pub fn load(path: &Path) -> Result<Self, ReferenceError> {
        let file = File::open(path).map_err(|source| ReferenceError::Open {
            path: path.to_owned(),
            source,
        })?;
        let chart = Self::from_reader(file)?;
        tracing::info!(
            path = %path.display(),
            rows = chart.rows.len(),
            percentiles = ?chart.percentiles,
            "loaded growth chart"
        );
        Ok(chart)
    }

    pub fn from_reader<R>(reader: R) -> Result<Self, ReferenceError>
    where
        R: io::Read,
    {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = reader
            .headers()
            .map_err(|source| ReferenceError::Csv { source })?
            .clone();

        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| ReferenceError::MissingColumn {
                    column: name.to_owned(),
                })
        };
        let sex_column = column(SEX_COLUMN)?;
        let age_column = column(AGE_COLUMN)?;
        let percentile_columns = headers
            .iter()
            .enumerate()
            .filter_map(|(i, h)| Some((i, h.strip_prefix('P')?.parse::<f64>().ok()?)))
            .collect::<Vec<_>>();
        if percentile_columns.is_empty() {
            return Err(ReferenceError::MissingColumn {
                column: "P*".to_owned(),
            });
        }

        let mut rows = vec![];
        for (i, record) in reader.records().enumerate() {
            let row = i + 1;
            let record = record.map_err(|source| ReferenceError::Csv { source })?;
            let field = |index: usize| record.get(index).unwrap_or("");
            if field(sex_column) == SEX_COLUMN {
                tracing::debug!(row, "skipping repeated header");
                continue;
            }
            let sex = match field(sex_column) {
                "1" => Sex::Male,
                "2" => Sex::Female,
                value => {
                    return Err(ReferenceError::InvalidSex {
                        row,
                        value: value.to_owned(),
                    });
                }
            };
            let number = |index: usize| {
                field(index)
                    .parse::<f64>()
                    .map_err(|_| ReferenceError::InvalidValue {
                        row,
                        column: headers[index].to_owned(),
                        value: field(index).to_owned(),
                    })
            };
            let age_months = number(age_column)?;
            let values = percentile_columns
                .iter()
                .map(|&(index, _)| Ok(number(index)? * CM_TO_INCH))
                .collect::<Result<Vec<_>, ReferenceError>>()?;
            rows.push(GrowthChartRow {
                sex,
                age_months,
                values,
            });
        }

        Ok(Self {
            percentiles: percentile_columns.into_iter().map(|(_, p)| p).collect(),
            rows,
        })
    }

    /// Percentiles of the chart's columns, in column order.
    #[must_use]
    pub fn percentiles(&self) -> &[f64] {
        &self.percentiles
    }

    #[must_use]
    pub fn rows(&self) -> &[GrowthChartRow] {
        &self.rows
    }

    fn percentile_index(&self, percentile: f64) -> Result<usize, ReferenceError> {
        self.percentiles
            .iter()
            .position(|&p| p == percentile)
            .ok_or(ReferenceError::MissingPercentile { percentile })
    }

    /// The row of `sex` at exactly `age` years.
    pub fn at_age(&self, sex: Sex, age: u32) -> Result<&GrowthChartRow, ReferenceError> {
        self.rows
            .iter()
            .find(|row| row.sex == sex && (row.age_years() - f64::from(age)).abs() < 1e-9)
            .ok_or(ReferenceError::MissingAge { sex, age })
    }

    /// `(percentile, stature)` pairs of `sex` at `age` years for the requested percentiles.
    pub fn reference_points(
        &self,
        sex: Sex,
        age: u32,
        percentiles: &[f64],
    ) -> Result<Vec<(f64, f64)>, ReferenceError> {
        let row = self.at_age(sex, age)?;
        percentiles
            .iter()
            .map(|&p| Ok((p, row.values[self.percentile_index(p)?])))
            .collect()
    }

    /// Mean stature at `percentile` per whole year of age.
    ///
    /// Rows are grouped by the floor of their age in years.
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn yearly_means(
        &self,
        sex: Sex,
        percentile: f64,
    ) -> Result<BTreeMap<u32, f64>, ReferenceError> {
        let index = self.percentile_index(percentile)?;
        let mut groups = BTreeMap::<u32, Vec<f64>>::new();
        for row in self.rows.iter().filter(|row| row.sex == sex) {
            let year = row.age_years().floor() as u32;
            groups.entry(year).or_default().push(row.values[index]);
        }
        Ok(groups
            .into_iter()
            .filter_map(|(year, values)| Some((year, descriptive::mean(values)?)))
            .collect())
    }
}
