//! Data access and analyses over the dating-profile dataset
//!
//! This crate loads `profiles.csv` into a typed in-memory store, cross-references
//! it with the CDC stature-for-age growth chart and builds the essay features
//! used for exploration. Numeric routines live in `okstat-stats`.
//!
//! # Overview
//!
//! ## Data Access Workflow
//!
//! 1. **Load Profiles** ([`loader::load_profiles`]): Parse the CSV into [`profile::Profile`]s
//! 2. **Store** ([`store::ProfileStore`]): Snapshot-based container queried with [`store::Filter`]s
//! 3. **Clean** ([`demographics::remove_age_outliers`]): Drop implausible ages once, up front
//!
//! ## Demographics and Heights
//!
//! - [`demographics`]: Sex distribution, age summaries, male share by age and
//!   attribute prevalence by sex
//! - [`reference::GrowthChart`]: Growth-chart percentiles in inches
//! - [`height`]: Dithered height quantiles against the chart, mean height by age
//!
//! ## Essay Workflow
//!
//! 1. **Corpus** ([`essays::Corpus`]): Concatenated essay text per profile
//! 2. **Vocabulary** ([`vocabulary::Vocabulary`]): Frequent words, curated
//! 3. **Membership** ([`membership::WordMembershipTable`]): Which profiles use which word
//! 4. **Cache** ([`cache::MembershipCache`]): Versioned on-disk storage of the table
//!
//! Ad-hoc queries over essay text are available through [`search::EssaySearch`].
//!
//! # Examples
//!
//! ```no_run
//! use std::path::Path;
//!
//! use okstat_analysis::{
//!     cache::MembershipCache,
//!     demographics::{self, SexDistribution},
//!     essays::Corpus,
//!     loader,
//!     store::ProfileStore,
//!     vocabulary::{ExcludeTerms, Vocabulary, VocabularyOptions},
//! };
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let mut store = ProfileStore::new(loader::load_profiles(Path::new("profiles.csv"))?);
//! demographics::remove_age_outliers(&mut store, demographics::DEFAULT_MAX_AGE);
//!
//! let distribution = SexDistribution::from_store(&store);
//! println!("{} profiles", distribution.total);
//!
//! let corpus = Corpus::from_profiles(store.profiles());
//! let vocabulary =
//!     Vocabulary::select(&corpus, VocabularyOptions::default(), &ExcludeTerms::default());
//! let (table, status) = MembershipCache::new(".cache").load_or_build(&corpus, &vocabulary)?;
//! println!("{} terms ({status})", table.terms().len());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod demographics;
pub mod essays;
pub mod height;
pub mod loader;
pub mod membership;
pub mod profile;
pub mod reference;
pub mod search;
pub mod store;
pub mod vocabulary;
