//! Loading `profiles.csv`
//!
//! Rows are deserialized with `csv` + `serde` into an intermediate record and
//! converted to [`Profile`]. Empty cells become `None`. The dataset encodes an
//! unreported income as `-1`, which is also mapped to `None`.

use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::profile::{Profile, Sex};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum LoadError {
    #[display("failed to open {}", path.display())]
    Open { path: PathBuf, source: io::Error },
    #[display("invalid profile record #{row}")]
    Record { row: usize, source: csv::Error },
}

const UNREPORTED_INCOME: i64 = -1;

#[derive(Debug, Deserialize)]
struct ProfileRecord {
    age: u32,
    sex: Sex,
    height: Option<f64>,
    income: Option<i64>,
    body_type: Option<String>,
    diet: Option<String>,
    drinks: Option<String>,
    drugs: Option<String>,
    education: Option<String>,
    ethnicity: Option<String>,
    job: Option<String>,
    location: Option<String>,
    offspring: Option<String>,
    orientation: Option<String>,
    pets: Option<String>,
    religion: Option<String>,
    sign: Option<String>,
    smokes: Option<String>,
    speaks: Option<String>,
    status: Option<String>,
    last_online: Option<String>,
    essay0: Option<String>,
    essay1: Option<String>,
    essay2: Option<String>,
    essay3: Option<String>,
    essay4: Option<String>,
    essay5: Option<String>,
    essay6: Option<String>,
    essay7: Option<String>,
    essay8: Option<String>,
    essay9: Option<String>,
}

impl From<ProfileRecord> for Profile {
    fn from(record: ProfileRecord) -> Self {
        Self {
            age: record.age,
            sex: record.sex,
            height: record.height,
            income: record.income.filter(|&income| income != UNREPORTED_INCOME),
            body_type: record.body_type,
            diet: record.diet,
            drinks: record.drinks,
            drugs: record.drugs,
            education: record.education,
            ethnicity: record.ethnicity,
            job: record.job,
            location: record.location,
            offspring: record.offspring,
            orientation: record.orientation,
            pets: record.pets,
            religion: record.religion,
            sign: record.sign,
            smokes: record.smokes,
            speaks: record.speaks,
            status: record.status,
            last_online: record.last_online,
            essays: [
                record.essay0,
                record.essay1,
                record.essay2,
                record.essay3,
                record.essay4,
                record.essay5,
                record.essay6,
                record.essay7,
                record.essay8,
                record.essay9,
            ],
        }
    }
}

/// Loads every profile of a `profiles.csv` file.
pub fn load_profiles(path: &Path) -> Result<Vec<Profile>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_owned(),
        source,
    })?;
    let profiles = read_profiles(file)?;
    tracing::info!(path = %path.display(), count = profiles.len(), "loaded profiles");
    Ok(profiles)
}

/// Reads profiles from CSV data with a header row.
///
/// Records are numbered from 1, not counting the header.
pub fn read_profiles<R>(reader: R) -> Result<Vec<Profile>, LoadError>
where
    R: io::Read,
{
    csv::Reader::from_reader(reader)
        .deserialize::<ProfileRecord>()
        .enumerate()
        .map(|(i, record)| {
            record
                .map(Profile::from)
                .map_err(|source| LoadError::Record { row: i + 1, source })
        })
        .collect()
}
