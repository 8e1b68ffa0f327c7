//! Frequency distributions over categorical labels or numeric bins.
//!
//! A [`FrequencyDistribution`] is a table of [`FrequencyRow`]s ranked by descending
//! absolute frequency. Each row carries its relative frequency and the cumulative
//! relative frequency accumulated in that ranked order, so the cumulative column
//! reads as "the top N classes account for X% of observations" rather than a CDF
//! over bin position.
//!
//! # Numeric binning
//!
//! Numeric observations are split into `num_bins` equal-width half-open intervals
//! `[min + i·w, min + (i+1)·w)` with `w = (max - min) / num_bins`. Every bin is
//! emitted, even if empty. The maximum value always lands in the last bin, and a
//! sequence whose values are all identical collapses to a single bin.
//!
//! Bins are identified by index while counting; the display label is derived once
//! per bin when rows are built, so two bins whose bounds format identically remain
//! distinct rows and no observation is ever dropped.
//!
//! # Examples
//!
//! ```
//! use sysmetrics_stats::frequency::{DistributionMode, FrequencyDistribution, Observation};
//!
//! let observations = ["auth", "video", "auth", "alert"]
//!     .into_iter()
//!     .map(Observation::from)
//!     .collect::<Vec<_>>();
//! let dist = FrequencyDistribution::new(&observations, DistributionMode::Categorical).unwrap();
//!
//! let labels = dist.iter().map(|row| row.label.as_str()).collect::<Vec<_>>();
//! assert_eq!(labels, ["auth", "video", "alert"]);
//! assert_eq!(dist.rows()[0].fri_percent, "50.00%");
//! ```

use std::{collections::HashMap, fmt, slice};

use serde::{Deserialize, Serialize};

/// Number of bins used when the caller does not choose one.
pub const DEFAULT_NUM_BINS: usize = 10;

/// A single data point: a measurement or a categorical label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_more::Display)]
#[serde(untagged)]
pub enum Observation {
    /// A real-valued measurement.
    Measurement(f64),
    /// A discrete label.
    Label(String),
}

impl Observation {
    /// Returns the measurement, or `None` for a label.
    #[must_use]
    pub fn as_measurement(&self) -> Option<f64> {
        match self {
            Observation::Measurement(value) => Some(*value),
            Observation::Label(_) => None,
        }
    }
}

impl From<f64> for Observation {
    fn from(value: f64) -> Self {
        Observation::Measurement(value)
    }
}

impl From<String> for Observation {
    fn from(label: String) -> Self {
        Observation::Label(label)
    }
}

impl From<&str> for Observation {
    fn from(label: &str) -> Self {
        Observation::Label(label.to_owned())
    }
}

/// How observations are grouped into classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionMode {
    /// One class per distinct label.
    Categorical,
    /// Equal-width bins between the minimum and maximum measurement.
    Numeric { num_bins: usize },
}

impl Default for DistributionMode {
    fn default() -> Self {
        DistributionMode::Numeric {
            num_bins: DEFAULT_NUM_BINS,
        }
    }
}

/// Reasons a [`FrequencyDistribution`] cannot be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum FrequencyError {
    #[display("numeric distributions need a positive number of bins, got {num_bins}")]
    InvalidBinCount { num_bins: usize },
    #[display("observation #{index} is a label, but numeric binning was requested")]
    NonNumericObservation { index: usize },
    #[display("observation #{index} is not a finite number")]
    NonFinite { index: usize },
}

/// The numeric interval covered by a bin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BinInterval {
    /// Position of the bin, counted from the minimum value.
    pub index: usize,
    /// Inclusive lower bound.
    pub lower: f64,
    /// Exclusive upper bound (inclusive for the last bin).
    pub upper: f64,
}

impl BinInterval {
    fn label(&self) -> String {
        format!("{:.1} - {:.1}", self.lower, self.upper)
    }
}

/// One class of a frequency distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyRow {
    /// Category label, or the bin interval formatted as `"lower - upper"`.
    pub label: String,
    /// Absolute frequency.
    pub fi: usize,
    /// Relative frequency in `[0, 1]`.
    pub fri: f64,
    /// Relative frequency as a percentage with two decimals (e.g. `"33.33%"`).
    pub fri_percent: String,
    /// Cumulative relative frequency, in ranked order, as a percentage with two decimals.
    pub cumulative_percent: String,
    /// Bin covered by this row; `None` for categorical rows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<BinInterval>,
}

/// A frequency table ranked by descending absolute frequency.
///
/// Ties keep the order in which their classes were first encountered (categorical)
/// or their bin order (numeric).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrequencyDistribution {
    total: usize,
    rows: Vec<FrequencyRow>,
}

/// A class and its count before ranking.
#[derive(Debug)]
struct Tally {
    label: String,
    count: usize,
    interval: Option<BinInterval>,
}

impl FrequencyDistribution {
    /// Builds a distribution from mixed-representation observations.
    ///
    /// In [`DistributionMode::Categorical`] every observation is tallied by its
    /// display form, so measurements become labels such as `"200"` or `"1.5"`.
    ///
    /// # Errors
    ///
    /// * [`FrequencyError::InvalidBinCount`] - numeric mode with zero bins, reported
    ///   before any observation is inspected
    /// * [`FrequencyError::NonNumericObservation`] - a label in numeric mode
    /// * [`FrequencyError::NonFinite`] - a `NaN` or infinite measurement in numeric mode
    pub fn new(
        observations: &[Observation],
        mode: DistributionMode,
    ) -> Result<Self, FrequencyError> {
        match mode {
            DistributionMode::Categorical => Ok(Self::categorical(observations)),
            DistributionMode::Numeric { num_bins } => {
                if num_bins == 0 {
                    return Err(FrequencyError::InvalidBinCount { num_bins });
                }
                let values = observations
                    .iter()
                    .enumerate()
                    .map(|(index, obs)| {
                        obs.as_measurement()
                            .ok_or(FrequencyError::NonNumericObservation { index })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Self::numeric(&values, num_bins)
            }
        }
    }

    /// Tallies exact matches of each distinct label.
    ///
    /// # Examples
    ///
    /// ```
    /// # use sysmetrics_stats::frequency::FrequencyDistribution;
    /// let dist = FrequencyDistribution::categorical([200, 500, 200, 401]);
    /// assert_eq!(dist.rows()[0].label, "200");
    /// assert_eq!(dist.rows()[0].fi, 2);
    /// assert_eq!(dist.len(), 3);
    /// ```
    pub fn categorical<I>(labels: I) -> Self
    where
        I: IntoIterator,
        I::Item: fmt::Display,
    {
        let mut index_of = HashMap::<String, usize>::new();
        let mut tallies = Vec::<Tally>::new();
        let mut total = 0;

        for label in labels {
            let label = label.to_string();
            total += 1;
            if let Some(&idx) = index_of.get(&label) {
                tallies[idx].count += 1;
            } else {
                index_of.insert(label.clone(), tallies.len());
                tallies.push(Tally {
                    label,
                    count: 1,
                    interval: None,
                });
            }
        }

        Self::from_tallies(tallies, total)
    }

    /// Counts measurements into `num_bins` equal-width bins.
    ///
    /// An empty `values` slice yields an empty distribution.
    ///
    /// # Errors
    ///
    /// * [`FrequencyError::InvalidBinCount`] - if `num_bins` is zero
    /// * [`FrequencyError::NonFinite`] - if any value is `NaN` or infinite
    ///
    /// # Examples
    ///
    /// ```
    /// # use sysmetrics_stats::frequency::FrequencyDistribution;
    /// let dist = FrequencyDistribution::numeric(&[0.0, 1.0, 2.0, 3.0, 10.0], 2).unwrap();
    /// assert_eq!(dist.rows()[0].label, "0.0 - 5.0");
    /// assert_eq!(dist.rows()[0].fi, 4);
    /// assert_eq!(dist.rows()[1].label, "5.0 - 10.0");
    /// assert_eq!(dist.rows()[1].fi, 1);
    ///
    /// let single = FrequencyDistribution::numeric(&[5.0, 5.0, 5.0], 10).unwrap();
    /// assert_eq!(single.len(), 1);
    /// assert_eq!(single.rows()[0].fi, 3);
    /// ```
    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_sign_loss,
        clippy::cast_possible_truncation
    )]
    pub fn numeric(values: &[f64], num_bins: usize) -> Result<Self, FrequencyError> {
        if num_bins == 0 {
            return Err(FrequencyError::InvalidBinCount { num_bins });
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(FrequencyError::NonFinite { index });
        }
        let (Some(min), Some(max)) = (
            values.iter().copied().reduce(f64::min),
            values.iter().copied().reduce(f64::max),
        ) else {
            return Ok(Self::default());
        };

        // Work on halved values so `max - min` stays finite across the whole f64
        // range; halving and doubling are exact.
        let (half_min, half_max) = (min / 2.0, max / 2.0);
        let half_width = (half_max - half_min) / num_bins as f64;
        if half_width <= 0.0 {
            // All observations are identical: no width to divide by
            tracing::debug!(value = min, count = values.len(), "collapsing to a single bin");
            let interval = BinInterval {
                index: 0,
                lower: min,
                upper: max,
            };
            let tally = Tally {
                label: interval.label(),
                count: values.len(),
                interval: Some(interval),
            };
            return Ok(Self::from_tallies(vec![tally], values.len()));
        }

        let mut counts = vec![0_usize; num_bins];
        for &value in values {
            let idx = if value >= max {
                num_bins - 1
            } else {
                // Rounding can push values just below `max` onto `num_bins`
                (((value / 2.0 - half_min) / half_width).floor() as usize).min(num_bins - 1)
            };
            counts[idx] += 1;
        }
        tracing::debug!(
            num_bins,
            min,
            max,
            bin_width = 2.0 * half_width,
            "binned numeric observations"
        );

        let tallies = counts
            .into_iter()
            .enumerate()
            .map(|(index, count)| {
                let bound = |i: usize| 2.0 * (half_min + i as f64 * half_width);
                let interval = BinInterval {
                    index,
                    lower: bound(index),
                    upper: if index + 1 == num_bins {
                        max
                    } else {
                        bound(index + 1)
                    },
                };
                Tally {
                    label: interval.label(),
                    count,
                    interval: Some(interval),
                }
            })
            .collect();

        Ok(Self::from_tallies(tallies, values.len()))
    }

    /// Ranks tallies by descending count and fills in relative and cumulative columns.
    #[expect(clippy::cast_precision_loss)]
    fn from_tallies(mut tallies: Vec<Tally>, total: usize) -> Self {
        debug_assert_eq!(tallies.iter().map(|t| t.count).sum::<usize>(), total);

        // stable: ties keep first-seen / bin order
        tallies.sort_by(|a, b| b.count.cmp(&a.count));

        let mut cumulative = 0.0;
        let rows = tallies
            .into_iter()
            .map(|tally| {
                let relative = if total == 0 {
                    0.0
                } else {
                    tally.count as f64 / total as f64
                };
                cumulative += relative;
                FrequencyRow {
                    label: tally.label,
                    fi: tally.count,
                    fri: relative,
                    fri_percent: format_percent(relative),
                    cumulative_percent: format_percent(cumulative),
                    interval: tally.interval,
                }
            })
            .collect();

        Self { total, rows }
    }

    /// Number of observations tallied.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Rows in ranked order.
    #[must_use]
    pub fn rows(&self) -> &[FrequencyRow] {
        &self.rows
    }

    /// Number of classes (rows).
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, FrequencyRow> {
        self.rows.iter()
    }

    /// Rows of a numeric distribution in bin order (lowest interval first).
    ///
    /// Categorical rows, which have no interval, keep their ranked order after
    /// the binned rows.
    #[must_use]
    pub fn rows_in_bin_order(&self) -> Vec<&FrequencyRow> {
        let mut rows = self.rows.iter().collect::<Vec<_>>();
        rows.sort_by_key(|row| row.interval.map_or(usize::MAX, |i| i.index));
        rows
    }
}

impl<'a> IntoIterator for &'a FrequencyDistribution {
    type Item = &'a FrequencyRow;
    type IntoIter = slice::Iter<'a, FrequencyRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn format_percent(relative: f64) -> String {
    format!("{:.2}%", relative * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(dist: &FrequencyDistribution) -> Vec<&str> {
        dist.iter().map(|row| row.label.as_str()).collect()
    }

    fn assert_totals(dist: &FrequencyDistribution, expected_total: usize) {
        assert_eq!(dist.total(), expected_total);
        assert_eq!(dist.iter().map(|r| r.fi).sum::<usize>(), expected_total);
        if expected_total > 0 {
            let sum = dist.iter().map(|r| r.fri).sum::<f64>();
            assert!((sum - 1.0).abs() < 1e-9, "fri sums to {sum}");
        }
    }

    mod categorical {
        use super::*;

        #[test]
        fn test_ranked_with_cumulative_percentages() {
            let dist = FrequencyDistribution::categorical(["a", "a", "b"]);
            assert_eq!(labels(&dist), ["a", "b"]);

            let a = &dist.rows()[0];
            assert_eq!(a.fi, 2);
            assert!((a.fri - 2.0 / 3.0).abs() < 1e-12);
            assert_eq!(a.fri_percent, "66.67%");
            assert_eq!(a.cumulative_percent, "66.67%");
            assert_eq!(a.interval, None);

            let b = &dist.rows()[1];
            assert_eq!(b.fi, 1);
            assert_eq!(b.fri_percent, "33.33%");
            assert_eq!(b.cumulative_percent, "100.00%");
            assert_totals(&dist, 3);
        }

        #[test]
        fn test_ties_keep_first_seen_order() {
            let dist = FrequencyDistribution::categorical(["z", "y", "x", "y", "z", "x", "w"]);
            assert_eq!(labels(&dist), ["z", "y", "x", "w"]);
            assert_totals(&dist, 7);
        }

        #[test]
        fn test_numeric_labels_ranked_by_count_not_value() {
            let dist = FrequencyDistribution::categorical([500, 200, 200, 401, 200, 500]);
            assert_eq!(labels(&dist), ["200", "500", "401"]);
        }

        #[test]
        fn test_measurements_as_labels() {
            let observations = [Observation::from(1.5), Observation::from(200.0)];
            let dist =
                FrequencyDistribution::new(&observations, DistributionMode::Categorical).unwrap();
            assert_eq!(labels(&dist), ["1.5", "200"]);
        }

        #[test]
        fn test_empty_input() {
            let dist = FrequencyDistribution::categorical(Vec::<String>::new());
            assert!(dist.is_empty());
            assert_totals(&dist, 0);
        }

        #[test]
        fn test_cumulative_reaches_one_hundred() {
            let dist = FrequencyDistribution::categorical(["a", "b", "c", "a", "b", "a", "d"]);
            assert_eq!(dist.rows().last().unwrap().cumulative_percent, "100.00%");
            assert_totals(&dist, 7);
        }
    }

    mod numeric {
        use super::*;

        #[test]
        fn test_max_lands_in_last_bin() {
            let values = (0..10).map(f64::from).collect::<Vec<_>>();
            let dist = FrequencyDistribution::numeric(&values, 10).unwrap();
            assert_eq!(dist.len(), 10);
            assert_totals(&dist, 10);

            let last = dist
                .iter()
                .find(|row| row.interval.unwrap().index == 9)
                .unwrap();
            assert_eq!(last.fi, 1);
            assert_eq!(last.label, "8.1 - 9.0");
            assert!(dist.iter().all(|row| row.fi == 1));
        }

        #[test]
        fn test_all_bins_present_even_if_empty() {
            let dist = FrequencyDistribution::numeric(&[0.0, 0.5, 10.0], 5).unwrap();
            assert_eq!(dist.len(), 5);
            assert_totals(&dist, 3);

            let ordered = dist
                .rows_in_bin_order()
                .into_iter()
                .map(|row| (row.label.as_str(), row.fi))
                .collect::<Vec<_>>();
            assert_eq!(
                ordered,
                [
                    ("0.0 - 2.0", 2),
                    ("2.0 - 4.0", 0),
                    ("4.0 - 6.0", 0),
                    ("6.0 - 8.0", 0),
                    ("8.0 - 10.0", 1),
                ]
            );
        }

        #[test]
        fn test_empty_bins_keep_bin_order_among_ties() {
            let dist = FrequencyDistribution::numeric(&[0.0, 0.5, 10.0], 5).unwrap();
            let indexes = dist
                .iter()
                .map(|row| row.interval.unwrap().index)
                .collect::<Vec<_>>();
            assert_eq!(indexes, [0, 4, 1, 2, 3]);
            assert_eq!(dist.rows()[2].cumulative_percent, "100.00%");
        }

        #[test]
        fn test_identical_values_collapse_to_one_bin() {
            let dist = FrequencyDistribution::numeric(&[5.0, 5.0, 5.0], 10).unwrap();
            assert_eq!(dist.len(), 1);
            let row = &dist.rows()[0];
            assert_eq!(row.fi, 3);
            assert_eq!(row.label, "5.0 - 5.0");
            assert_eq!(row.fri_percent, "100.00%");
            assert_totals(&dist, 3);
        }

        #[test]
        fn test_bins_with_identical_labels_stay_separate() {
            // width 0.01 formats every bound to one decimal place identically
            let values = [0.0, 0.015, 0.025, 0.035, 0.05];
            let dist = FrequencyDistribution::numeric(&values, 5).unwrap();
            assert_eq!(dist.len(), 5);
            assert_totals(&dist, 5);
        }

        #[test]
        fn test_values_near_max_do_not_overflow() {
            let values = [0.1, 0.2, 0.3, 0.7, 0.30000000000000004];
            let dist = FrequencyDistribution::numeric(&values, 3).unwrap();
            assert_eq!(dist.len(), 3);
            assert_totals(&dist, values.len());
        }

        #[test]
        fn test_negative_range() {
            let dist = FrequencyDistribution::numeric(&[-10.0, -5.0, 0.0], 2).unwrap();
            let ordered = dist
                .rows_in_bin_order()
                .into_iter()
                .map(|row| (row.label.as_str(), row.fi))
                .collect::<Vec<_>>();
            assert_eq!(ordered, [("-10.0 - -5.0", 1), ("-5.0 - 0.0", 2)]);
        }

        #[test]
        fn test_full_f64_range_keeps_finite_bounds() {
            let dist = FrequencyDistribution::numeric(&[-f64::MAX, f64::MAX], 2).unwrap();
            let ordered = dist.rows_in_bin_order();
            assert_eq!(ordered.len(), 2);
            for row in &ordered {
                let interval = row.interval.unwrap();
                assert!(interval.lower.is_finite() && interval.upper.is_finite(), "{row:?}");
                assert!(!row.label.contains("NaN") && !row.label.contains("inf"));
                assert_eq!(row.fi, 1);
            }
            assert_eq!(ordered[0].interval.unwrap().lower, -f64::MAX);
            assert_eq!(ordered[0].interval.unwrap().upper, 0.0);
            assert_eq!(ordered[1].interval.unwrap().upper, f64::MAX);
        }

        #[test]
        fn test_empty_input() {
            let dist = FrequencyDistribution::numeric(&[], 10).unwrap();
            assert!(dist.is_empty());
            assert_totals(&dist, 0);
        }

        #[test]
        fn test_zero_bins_is_rejected() {
            assert_eq!(
                FrequencyDistribution::numeric(&[1.0, 2.0], 0),
                Err(FrequencyError::InvalidBinCount { num_bins: 0 })
            );
        }

        #[test]
        fn test_zero_bins_is_rejected_before_empty_check() {
            assert_eq!(
                FrequencyDistribution::new(&[], DistributionMode::Numeric { num_bins: 0 }),
                Err(FrequencyError::InvalidBinCount { num_bins: 0 })
            );
        }

        #[test]
        fn test_labels_rejected_in_numeric_mode() {
            let observations = [Observation::from(1.0), Observation::from("oops")];
            assert_eq!(
                FrequencyDistribution::new(&observations, DistributionMode::default()),
                Err(FrequencyError::NonNumericObservation { index: 1 })
            );
        }

        #[test]
        fn test_non_finite_rejected() {
            assert_eq!(
                FrequencyDistribution::numeric(&[1.0, f64::NAN], 4),
                Err(FrequencyError::NonFinite { index: 1 })
            );
        }

        #[test]
        fn test_large_batch_preserves_total() {
            let values = (0..1000)
                .map(|i| f64::from((i * 37) % 991) * 1.7 + 50.0)
                .collect::<Vec<_>>();
            let dist = FrequencyDistribution::numeric(&values, 12).unwrap();
            assert_eq!(dist.len(), 12);
            assert_totals(&dist, 1000);
            assert!(dist.rows().windows(2).all(|w| w[0].fi >= w[1].fi));
        }
    }

    #[test]
    fn test_default_mode_uses_ten_bins() {
        assert_eq!(
            DistributionMode::default(),
            DistributionMode::Numeric { num_bins: 10 }
        );
    }

    #[test]
    fn test_serialized_row_shape() {
        let dist = FrequencyDistribution::categorical(["ok"]);
        let json = serde_json::to_value(&dist).unwrap();
        assert_eq!(json["total"], 1);
        let row = &json["rows"][0];
        assert_eq!(row["label"], "ok");
        assert_eq!(row["fi"], 1);
        assert_eq!(row["fri_percent"], "100.00%");
        assert!(row.get("interval").is_none());
    }
}
