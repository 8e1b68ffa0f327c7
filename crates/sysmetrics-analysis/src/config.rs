use serde::{Deserialize, Serialize};

/// Tuning knobs for [`EventAnalysis`](crate::EventAnalysis).
///
/// Missing fields fall back to their defaults when deserialized, so a config file
/// only needs to list what it overrides.
///
/// ```
/// use sysmetrics_analysis::AnalysisConfig;
///
/// let config: AnalysisConfig = serde_json::from_str(r#"{ "response_time_bins": 8 }"#).unwrap();
/// assert_eq!(config.response_time_bins, 8);
/// assert_eq!(config.cv_moderate_max, 30.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Number of equal-width bins in the response-time histogram.
    pub response_time_bins: usize,
    /// Highest coefficient of variation (%) still considered homogeneous.
    pub cv_homogeneous_max: f64,
    /// Highest coefficient of variation (%) still considered moderately dispersed.
    pub cv_moderate_max: f64,
}

impl AnalysisConfig {
    pub const DEFAULT_RESPONSE_TIME_BINS: usize = 12;
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            response_time_bins: Self::DEFAULT_RESPONSE_TIME_BINS,
            cv_homogeneous_max: 15.0,
            cv_moderate_max: 30.0,
        }
    }
}
