//! Statistical routines for exploring the profile dataset.
//!
//! This crate provides the numeric core shared by the analysis and CLI crates:
//!
//! - **Descriptive statistics**: count, mean, standard deviation, min/max, median
//! - **Percentiles**: linearly interpolated quantiles at requested percentile points
//! - **Histograms**: unit-width frequency distributions over integer-valued data
//! - **Comprehensive statistics**: descriptive statistics, quartiles and histogram in one pass
//! - **Frequency tables**: category counts with deterministic "most common" ordering
//! - **Prevalence comparison**: normalized contingency comparison of two subgroups
//! - **Quantile comparison**: dithered empirical quantiles against reference values
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`percentiles`]: Percentile computation and storage
//! - [`histogram`]: Histogram construction for visualizing data distributions
//! - [`comprehensive`]: Combined summary used for `describe`-style reports
//! - [`frequency`]: Frequency tables over categorical values
//! - [`prevalence`]: Relative prevalence of categories between two subgroups
//! - [`quantile`]: Quantile gaps between a sample and a reference distribution
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use okstat_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```
//!
//! ## Comparing two subgroups over a categorical attribute
//!
//! ```
//! use okstat_stats::prevalence::{GroupedObservation, compare_prevalence};
//!
//! let observations = [
//!     GroupedObservation::new(Some("fit"), true, false),
//!     GroupedObservation::new(Some("curvy"), false, true),
//!     GroupedObservation::new(Some("fit"), false, true),
//! ];
//! let comparison = compare_prevalence(observations, 0).unwrap();
//! assert_eq!(comparison.records().len(), 2);
//! ```
//!
//! ## Comparing quantiles against a reference
//!
//! ```
//! use okstat_stats::quantile::{Dither, QuantileComparison};
//!
//! let sample = [62.0, 64.0, 66.0, 68.0, 70.0];
//! let reference = [(50.0, 65.0)];
//! let comparison =
//!     QuantileComparison::new(&sample, &reference, Dither::None, &mut rand::rng()).unwrap();
//! assert_eq!(comparison.gaps()[0].gap, 1.0);
//! ```

pub mod comprehensive;
pub mod descriptive;
pub mod frequency;
pub mod histogram;
pub mod percentiles;
pub mod prevalence;
pub mod quantile;
