//! Text renderings of an analysis shared by the printed report, the CSV export
//! and the dashboard.

use sysmetrics_analysis::{DispersionLevel, EventAnalysis};
use sysmetrics_stats::{descriptive::StatisticalSummary, frequency::FrequencyRow};

/// Metric name / formatted value pairs describing a batch.
pub fn summary_rows(analysis: &EventAnalysis) -> Vec<(&'static str, String)> {
    let s = &analysis.response_times;
    vec![
        ("Total events", analysis.total_events.to_string()),
        ("Total errors", analysis.total_errors.to_string()),
        ("Error rate", format!("{:.2}%", analysis.error_rate)),
        ("Mean (ms)", format!("{:.2}", s.mean)),
        ("Median (ms)", format!("{:.2}", s.median)),
        ("Mode (ms)", format_modes(s)),
        ("Variance", format!("{:.2}", s.variance)),
        ("Std. deviation (ms)", format!("{:.2}", s.std_dev)),
        ("Range (ms)", format!("{:.2}", s.range)),
        (
            "Coeff. of variation",
            format_cv(s.coefficient_of_variation),
        ),
        ("Dispersion", dispersion_label(analysis.dispersion).to_owned()),
    ]
}

pub fn format_modes(summary: &StatisticalSummary) -> String {
    if summary.is_amodal() {
        return "amodal".to_owned();
    }
    summary
        .modes
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn format_cv(cv: f64) -> String {
    if cv.is_nan() {
        "undefined".to_owned()
    } else {
        format!("{cv:.2}%")
    }
}

pub fn dispersion_label(level: DispersionLevel) -> &'static str {
    match level {
        DispersionLevel::Homogeneous => "homogeneous",
        DispersionLevel::Moderate => "moderate",
        DispersionLevel::Heterogeneous => "heterogeneous",
    }
}

/// Relative frequency with four decimals, as tables print it.
pub fn format_fri(row: &FrequencyRow) -> String {
    format!("{:.4}", row.fri)
}
