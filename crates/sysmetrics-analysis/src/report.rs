use std::fmt;

use serde::Serialize;

use crate::{DispersionLevel, EventAnalysis};

/// Plain-language reading of an [`EventAnalysis`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    /// What the dispersion of response times says about stability.
    pub interpretation: String,
    /// Observations about volume and failures.
    pub patterns: Vec<String>,
    /// Where to look next.
    pub suggestion: String,
}

impl Report {
    #[must_use]
    pub fn from_analysis(analysis: &EventAnalysis) -> Self {
        let interpretation = match analysis.dispersion {
            DispersionLevel::Homogeneous => {
                "Response times are homogeneous, which points to a stable system."
            }
            DispersionLevel::Moderate => {
                "Response times show moderate dispersion; some variability is present and may be normal."
            }
            DispersionLevel::Heterogeneous => {
                "Response times are heterogeneous, which points to instability or significant outliers worth investigating."
            }
        }
        .to_owned();

        let mut patterns = vec![format!(
            "The system processed {} events with {} failures (error rate {:.2}%).",
            analysis.total_events, analysis.total_errors, analysis.error_rate
        )];
        let suggestion = if let Some(worst) = &analysis.most_problematic_service {
            patterns.push(format!(
                "The most problematic service was {} with {} errors.",
                worst.service, worst.errors
            ));
            format!(
                "Focus the investigation on {} to find the root cause of its failures.",
                worst.service
            )
        } else {
            patterns.push("No errors were recorded.".to_owned());
            "The system is running stably without errors; optimization can target overall performance."
                .to_owned()
        };

        Self {
            interpretation,
            patterns,
            suggestion,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Interpretation:")?;
        writeln!(f, "  {}", self.interpretation)?;
        writeln!(f, "Patterns:")?;
        for pattern in &self.patterns {
            writeln!(f, "  - {pattern}")?;
        }
        writeln!(f, "Suggestion:")?;
        write!(f, "  {}", self.suggestion)
    }
}
