//! Profile records of the dating-profile dataset
//!
//! A [`Profile`] is one row of `profiles.csv`: demographics, a set of
//! categorical self-descriptions and ten free-text essays. Profiles are
//! immutable once loaded; see [`store`](crate::store) for the container that
//! holds them.
//!
//! # Data Structure
//!
//! ```text
//! Profile
//! ├─ age, sex
//! ├─ height (inches), income (missing when unreported)
//! ├─ categorical attributes (body_type, diet, ..., status)
//! ├─ last_online
//! └─ essays[0..10]
//! ```
//!
//! Missing values stay missing. The only place where a missing essay is
//! treated as empty text is the essay corpus (see [`essays`](crate::essays)).

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Number of free-text essays per profile.
pub const ESSAY_COUNT: usize = 10;

/// Self-reported sex of a profile.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
pub enum Sex {
    #[serde(rename = "m")]
    #[display("male")]
    Male,
    #[serde(rename = "f")]
    #[display("female")]
    Female,
}

impl Sex {
    pub const ALL: [Self; 2] = [Self::Male, Self::Female];

    /// Single-letter code used by the dataset.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Male => "m",
            Self::Female => "f",
        }
    }
}

/// One profile of the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub age: u32,
    pub sex: Sex,
    /// Height in inches.
    pub height: Option<f64>,
    /// Yearly income in dollars.
    pub income: Option<i64>,
    pub body_type: Option<String>,
    pub diet: Option<String>,
    pub drinks: Option<String>,
    pub drugs: Option<String>,
    pub education: Option<String>,
    pub ethnicity: Option<String>,
    pub job: Option<String>,
    pub location: Option<String>,
    pub offspring: Option<String>,
    pub orientation: Option<String>,
    pub pets: Option<String>,
    pub religion: Option<String>,
    pub sign: Option<String>,
    pub smokes: Option<String>,
    pub speaks: Option<String>,
    pub status: Option<String>,
    pub last_online: Option<String>,
    pub essays: [Option<String>; ESSAY_COUNT],
}

impl Profile {
    /// Creates a profile with the given age and sex and every optional field missing.
    #[must_use]
    pub fn new(age: u32, sex: Sex) -> Self {
        Self {
            age,
            sex,
            height: None,
            income: None,
            body_type: None,
            diet: None,
            drinks: None,
            drugs: None,
            education: None,
            ethnicity: None,
            job: None,
            location: None,
            offspring: None,
            orientation: None,
            pets: None,
            religion: None,
            sign: None,
            smokes: None,
            speaks: None,
            status: None,
            last_online: None,
            essays: Default::default(),
        }
    }

    /// Value of a categorical attribute, `None` when missing.
    #[must_use]
    pub fn attribute(&self, attribute: CategoricalAttribute) -> Option<&str> {
        let value = match attribute {
            CategoricalAttribute::BodyType => &self.body_type,
            CategoricalAttribute::Diet => &self.diet,
            CategoricalAttribute::Drinks => &self.drinks,
            CategoricalAttribute::Drugs => &self.drugs,
            CategoricalAttribute::Education => &self.education,
            CategoricalAttribute::Ethnicity => &self.ethnicity,
            CategoricalAttribute::Job => &self.job,
            CategoricalAttribute::Location => &self.location,
            CategoricalAttribute::Offspring => &self.offspring,
            CategoricalAttribute::Orientation => &self.orientation,
            CategoricalAttribute::Pets => &self.pets,
            CategoricalAttribute::Religion => &self.religion,
            CategoricalAttribute::Sign => &self.sign,
            CategoricalAttribute::Smokes => &self.smokes,
            CategoricalAttribute::Speaks => &self.speaks,
            CategoricalAttribute::Status => &self.status,
        };
        value.as_deref()
    }

    /// Text of essay `index`, `None` when missing or out of range.
    #[must_use]
    pub fn essay(&self, index: usize) -> Option<&str> {
        self.essays.get(index)?.as_deref()
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("unknown attribute '{name}'")]
pub struct ParseAttributeError {
    name: String,
}

/// Categorical columns of the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalAttribute {
    BodyType,
    Diet,
    Drinks,
    Drugs,
    Education,
    Ethnicity,
    Job,
    Location,
    Offspring,
    Orientation,
    Pets,
    Religion,
    Sign,
    Smokes,
    Speaks,
    Status,
}

impl CategoricalAttribute {
    pub const ALL: [Self; 16] = [
        Self::BodyType,
        Self::Diet,
        Self::Drinks,
        Self::Drugs,
        Self::Education,
        Self::Ethnicity,
        Self::Job,
        Self::Location,
        Self::Offspring,
        Self::Orientation,
        Self::Pets,
        Self::Religion,
        Self::Sign,
        Self::Smokes,
        Self::Speaks,
        Self::Status,
    ];

    /// Column name in `profiles.csv`.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::BodyType => "body_type",
            Self::Diet => "diet",
            Self::Drinks => "drinks",
            Self::Drugs => "drugs",
            Self::Education => "education",
            Self::Ethnicity => "ethnicity",
            Self::Job => "job",
            Self::Location => "location",
            Self::Offspring => "offspring",
            Self::Orientation => "orientation",
            Self::Pets => "pets",
            Self::Religion => "religion",
            Self::Sign => "sign",
            Self::Smokes => "smokes",
            Self::Speaks => "speaks",
            Self::Status => "status",
        }
    }
}

impl fmt::Display for CategoricalAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CategoricalAttribute {
    type Err = ParseAttributeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('-', "_").to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|attribute| attribute.name() == normalized)
            .ok_or_else(|| ParseAttributeError { name: s.to_owned() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_names_round_trip_through_from_str() {
        for attribute in CategoricalAttribute::ALL {
            assert_eq!(attribute.name().parse::<CategoricalAttribute>().unwrap(), attribute);
        }
        assert_eq!(
            "Body-Type".parse::<CategoricalAttribute>().unwrap(),
            CategoricalAttribute::BodyType
        );
        assert!("height".parse::<CategoricalAttribute>().is_err());
    }

    #[test]
    fn test_attribute_lookup() {
        let mut profile = Profile::new(30, Sex::Female);
        profile.body_type = Some("athletic".to_owned());
        assert_eq!(profile.attribute(CategoricalAttribute::BodyType), Some("athletic"));
        assert_eq!(profile.attribute(CategoricalAttribute::Diet), None);
    }

    #[test]
    fn test_essay_out_of_range() {
        let mut profile = Profile::new(30, Sex::Male);
        profile.essays[9] = Some("last".to_owned());
        assert_eq!(profile.essay(9), Some("last"));
        assert_eq!(profile.essay(10), None);
    }

    #[test]
    fn test_sex_serializes_as_dataset_code() {
        assert_eq!(serde_json::to_string(&Sex::Male).unwrap(), "\"m\"");
        assert_eq!(Sex::Female.to_string(), "female");
        assert_eq!(Sex::Female.code(), "f");
    }
}
