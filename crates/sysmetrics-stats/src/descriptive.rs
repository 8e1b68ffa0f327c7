use serde::Serialize;

/// Reasons a [`StatisticalSummary`] cannot be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum SummaryError {
    #[display("cannot summarize an empty sequence")]
    Empty,
    #[display("sample variance requires at least 2 observations, got {len}")]
    InsufficientData { len: usize },
    #[display("observation #{index} is not a finite number")]
    NonFinite { index: usize },
}

/// Descriptive statistics summarizing a sequence of measurements.
///
/// Contains measures of central tendency (mean, median, modes) and dispersion
/// (sample variance, standard deviation, range, coefficient of variation).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticalSummary {
    /// Number of observations summarized.
    pub count: usize,
    /// The minimum value.
    pub min: f64,
    /// The maximum value.
    pub max: f64,
    /// The arithmetic mean.
    pub mean: f64,
    /// The median (average of the two middle values for even counts).
    pub median: f64,
    /// Values attaining the highest occurrence count, in ascending order.
    ///
    /// Empty when the data is amodal (see [`modes`]).
    pub modes: Vec<f64>,
    /// The sample variance (divisor `n - 1`).
    pub variance: f64,
    /// The sample standard deviation (`sqrt(variance)`).
    pub std_dev: f64,
    /// `max - min`.
    pub range: f64,
    /// Standard deviation as a percentage of the mean.
    ///
    /// `NaN` when the mean is zero.
    pub coefficient_of_variation: f64,
}

impl StatisticalSummary {
    /// Computes a summary from unsorted values.
    ///
    /// The values are collected and sorted internally.
    ///
    /// # Errors
    ///
    /// * [`SummaryError::NonFinite`] - if any value is `NaN` or infinite
    /// * [`SummaryError::Empty`] - if there are no values
    /// * [`SummaryError::InsufficientData`] - if there is a single value, since the
    ///   sample variance is undefined
    ///
    /// # Examples
    ///
    /// ```
    /// # use sysmetrics_stats::descriptive::{StatisticalSummary, SummaryError};
    /// let summary = StatisticalSummary::new([5.0, 1.0, 3.0]).unwrap();
    /// assert_eq!(summary.median, 3.0);
    /// assert_eq!(summary.range, 4.0);
    ///
    /// assert_eq!(StatisticalSummary::new([]), Err(SummaryError::Empty));
    /// assert_eq!(
    ///     StatisticalSummary::new([1.0]),
    ///     Err(SummaryError::InsufficientData { len: 1 })
    /// );
    /// ```
    pub fn new<I>(values: I) -> Result<Self, SummaryError>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(SummaryError::NonFinite { index });
        }
        values.sort_by(f64::total_cmp);
        Self::from_sorted(&values)
    }

    /// Computes a summary from values already sorted in ascending order.
    ///
    /// Skips the sort performed by [`StatisticalSummary::new`]. Values must be finite.
    ///
    /// # Panics
    ///
    /// Panics in debug mode if `sorted_values` is not sorted in ascending order.
    pub fn from_sorted(sorted_values: &[f64]) -> Result<Self, SummaryError> {
        debug_assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let (Some(&min), Some(&max)) = (sorted_values.first(), sorted_values.last()) else {
            return Err(SummaryError::Empty);
        };
        let mean = mean(sorted_values).ok_or(SummaryError::Empty)?;
        let variance = sample_variance(sorted_values, mean).ok_or(
            SummaryError::InsufficientData {
                len: sorted_values.len(),
            },
        )?;
        let median = median_of_sorted(sorted_values).ok_or(SummaryError::Empty)?;
        let std_dev = variance.sqrt();

        Ok(Self {
            count: sorted_values.len(),
            min,
            max,
            mean,
            median,
            modes: modes_of_sorted(sorted_values),
            variance,
            std_dev,
            range: max - min,
            coefficient_of_variation: coefficient_of_variation(std_dev, mean),
        })
    }

    /// Returns `true` if no value stands out as a mode.
    #[must_use]
    pub fn is_amodal(&self) -> bool {
        self.modes.is_empty()
    }
}

/// Arithmetic mean. `None` for an empty slice.
///
/// ```
/// # use sysmetrics_stats::descriptive::mean;
/// assert_eq!(mean(&[1.0, 2.0, 6.0]), Some(3.0));
/// assert_eq!(mean(&[]), None);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median of unsorted values. `None` for an empty slice.
///
/// ```
/// # use sysmetrics_stats::descriptive::median;
/// assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
/// assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
/// ```
#[must_use]
pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    median_of_sorted(&sorted)
}

fn median_of_sorted(sorted_values: &[f64]) -> Option<f64> {
    let len = sorted_values.len();
    if len == 0 {
        return None;
    }
    let mid = len / 2;
    if len % 2 == 1 {
        Some(sorted_values[mid])
    } else {
        Some(f64::midpoint(sorted_values[mid - 1], sorted_values[mid]))
    }
}

/// Values occurring most often, in ascending order.
///
/// When every distinct value shares the same occurrence count and there is more
/// than one distinct value, the data is amodal and the result is empty. This also
/// holds for two distinct values seen once each (`[1, 2]`).
///
/// ```
/// # use sysmetrics_stats::descriptive::modes;
/// assert_eq!(modes(&[1.0, 1.0, 1.0, 2.0, 3.0]), vec![1.0]);
/// assert_eq!(modes(&[1.0, 1.0, 2.0, 2.0, 3.0]), vec![1.0, 2.0]);
/// assert!(modes(&[1.0, 1.0, 2.0, 2.0, 3.0, 3.0]).is_empty());
/// ```
#[must_use]
pub fn modes(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    modes_of_sorted(&sorted)
}

#[expect(clippy::float_cmp)]
fn modes_of_sorted(sorted_values: &[f64]) -> Vec<f64> {
    // (value, occurrences) for each run of equal values
    let mut runs: Vec<(f64, usize)> = Vec::new();
    for &value in sorted_values {
        match runs.last_mut() {
            Some((last, count)) if *last == value => *count += 1,
            _ => runs.push((value, 1)),
        }
    }

    let Some(max_freq) = runs.iter().map(|&(_, count)| count).max() else {
        return vec![];
    };
    let modes = runs
        .iter()
        .filter(|&&(_, count)| count == max_freq)
        .map(|&(value, _)| value)
        .collect::<Vec<_>>();

    if modes.len() == runs.len() && modes.len() > 1 {
        return vec![];
    }
    modes
}

/// Sample variance around a precomputed `mean` (divisor `n - 1`).
///
/// `None` when fewer than two values are given.
///
/// ```
/// # use sysmetrics_stats::descriptive::sample_variance;
/// let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
/// let variance = sample_variance(&values, 5.0).unwrap();
/// assert!((variance - 32.0 / 7.0).abs() < 1e-12);
/// assert_eq!(sample_variance(&[1.0], 1.0), None);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn sample_variance(values: &[f64], mean: f64) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let sum_sq = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
    Some(sum_sq / (values.len() - 1) as f64)
}

/// `max - min`. `None` for an empty slice.
#[must_use]
pub fn range(values: &[f64]) -> Option<f64> {
    let min = values.iter().copied().reduce(f64::min)?;
    let max = values.iter().copied().reduce(f64::max)?;
    Some(max - min)
}

/// Standard deviation expressed as a percentage of the mean.
///
/// Returns `NaN` when `mean` is zero; the value is presentational and an undefined
/// ratio should not abort a summary.
///
/// ```
/// # use sysmetrics_stats::descriptive::coefficient_of_variation;
/// assert_eq!(coefficient_of_variation(5.0, 50.0), 10.0);
/// assert!(coefficient_of_variation(1.0, 0.0).is_nan());
/// ```
#[must_use]
pub fn coefficient_of_variation(std_dev: f64, mean: f64) -> f64 {
    if mean == 0.0 {
        return f64::NAN;
    }
    std_dev / mean * 100.0
}
