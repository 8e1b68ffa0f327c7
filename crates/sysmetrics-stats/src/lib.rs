//! Statistical summarization for the sysmetrics project.
//!
//! This crate is the computational core shared by every front end:
//!
//! - **Descriptive statistics**: mean, median, mode set, sample variance,
//!   standard deviation, range and coefficient of variation
//! - **Frequency distributions**: categorical tallies or equal-width numeric bins,
//!   ranked by frequency with relative and cumulative percentages
//!
//! Every operation is a pure function of its input. Nothing is cached between calls,
//! so independent dimensions of the same batch can be computed in any order (or in
//! parallel) without coordination.
//!
//! # Modules
//!
//! - [`descriptive`]: [`StatisticalSummary`](descriptive::StatisticalSummary) and the
//!   standalone measures it is built from
//! - [`frequency`]: [`FrequencyDistribution`](frequency::FrequencyDistribution) construction
//!
//! # Examples
//!
//! ## Summarizing measurements
//!
//! ```
//! use sysmetrics_stats::descriptive::StatisticalSummary;
//!
//! let summary = StatisticalSummary::new([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
//! assert_eq!(summary.mean, 5.0);
//! assert_eq!(summary.modes, vec![4.0]);
//! assert!((summary.std_dev - 2.1381).abs() < 1e-4);
//! ```
//!
//! ## Tallying labels
//!
//! ```
//! use sysmetrics_stats::frequency::FrequencyDistribution;
//!
//! let dist = FrequencyDistribution::categorical(["a", "a", "b"]);
//! assert_eq!(dist.rows()[0].label, "a");
//! assert_eq!(dist.rows()[0].cumulative_percent, "66.67%");
//! assert_eq!(dist.rows()[1].cumulative_percent, "100.00%");
//! ```
//!
//! ## Binning measurements
//!
//! ```
//! use sysmetrics_stats::frequency::FrequencyDistribution;
//!
//! let values = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
//! let dist = FrequencyDistribution::numeric(&values, 10).unwrap();
//! assert_eq!(dist.len(), 10);
//! assert_eq!(dist.total(), 10);
//! ```

pub mod descriptive;
pub mod frequency;
