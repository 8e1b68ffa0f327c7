use serde::Serialize;
use sysmetrics_events::{Service, SystemEvent};
use sysmetrics_stats::{
    descriptive::{StatisticalSummary, SummaryError},
    frequency::{FrequencyDistribution, FrequencyError},
};

use crate::{AnalysisConfig, report::Report};

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum AnalysisError {
    #[display("cannot summarize response times: {_0}")]
    Summary(SummaryError),
    #[display("cannot build frequency table: {_0}")]
    Frequency(FrequencyError),
}

/// How spread out response times are, judged from the coefficient of variation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispersionLevel {
    Homogeneous,
    Moderate,
    Heterogeneous,
}

impl DispersionLevel {
    /// Classifies a coefficient of variation (in percent).
    ///
    /// An undefined (`NaN`) coefficient is treated as heterogeneous.
    #[must_use]
    pub fn from_cv(cv: f64, config: &AnalysisConfig) -> Self {
        if cv <= config.cv_homogeneous_max {
            DispersionLevel::Homogeneous
        } else if cv <= config.cv_moderate_max {
            DispersionLevel::Moderate
        } else {
            DispersionLevel::Heterogeneous
        }
    }
}

/// Error count of a single service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServiceErrors {
    pub service: Service,
    pub errors: usize,
}

/// A dimension of an event batch that gets its own frequency table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    ResponseTimes,
    Services,
    StatusCodes,
    ErrorsByService,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::ResponseTimes,
        Dimension::Services,
        Dimension::StatusCodes,
        Dimension::ErrorsByService,
    ];

    /// Dimensions shown as frequency tables; errors by service is chart data only.
    pub const TABULATED: [Dimension; 3] = [
        Dimension::ResponseTimes,
        Dimension::Services,
        Dimension::StatusCodes,
    ];

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Dimension::ResponseTimes => "Response Times (ms)",
            Dimension::Services => "Services Accessed",
            Dimension::StatusCodes => "Status Codes",
            Dimension::ErrorsByService => "Errors by Service",
        }
    }

    /// Header of the class column.
    #[must_use]
    pub fn class_header(self) -> &'static str {
        match self {
            Dimension::ResponseTimes => "Class",
            Dimension::Services | Dimension::ErrorsByService => "Service",
            Dimension::StatusCodes => "Code",
        }
    }

    #[must_use]
    pub fn is_numeric(self) -> bool {
        self == Dimension::ResponseTimes
    }
}

/// Frequency tables of every dimension of a batch.
#[derive(Debug, Clone, Serialize)]
pub struct FrequencyTables {
    pub response_times: FrequencyDistribution,
    pub services: FrequencyDistribution,
    pub status_codes: FrequencyDistribution,
    /// Failed events only.
    pub errors_by_service: FrequencyDistribution,
}

impl FrequencyTables {
    #[must_use]
    pub fn get(&self, dimension: Dimension) -> &FrequencyDistribution {
        match dimension {
            Dimension::ResponseTimes => &self.response_times,
            Dimension::Services => &self.services,
            Dimension::StatusCodes => &self.status_codes,
            Dimension::ErrorsByService => &self.errors_by_service,
        }
    }
}

/// Descriptive statistics and frequency tables of one event batch.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone as _, Utc};
/// use sysmetrics_analysis::{AnalysisConfig, EventAnalysis};
/// use sysmetrics_events::EventGenerator;
///
/// let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let events = EventGenerator::from_seed(1, start).generate(300);
/// let analysis = EventAnalysis::new(&events, &AnalysisConfig::default()).unwrap();
///
/// assert_eq!(analysis.total_events, 300);
/// assert_eq!(analysis.tables.response_times.len(), 12);
/// assert_eq!(analysis.tables.services.total(), 300);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct EventAnalysis {
    /// Summary of response times (ms).
    pub response_times: StatisticalSummary,
    pub total_events: usize,
    pub total_errors: usize,
    /// Failed events as a percentage of all events.
    pub error_rate: f64,
    pub dispersion: DispersionLevel,
    /// Service with the most failures; the first one seen wins a tie.
    pub most_problematic_service: Option<ServiceErrors>,
    pub tables: FrequencyTables,
}

impl EventAnalysis {
    /// Analyzes a batch of events.
    ///
    /// Frequency tables are built first, so an invalid bin count is reported even
    /// for batches too small to summarize.
    ///
    /// # Errors
    ///
    /// * [`AnalysisError::Frequency`] - if `config.response_time_bins` is zero
    /// * [`AnalysisError::Summary`] - if the batch holds fewer than two events
    #[expect(clippy::cast_precision_loss)]
    pub fn new(events: &[SystemEvent], config: &AnalysisConfig) -> Result<Self, AnalysisError> {
        let response_times = SystemEvent::response_times(events);

        let tables = FrequencyTables {
            response_times: FrequencyDistribution::numeric(
                &response_times,
                config.response_time_bins,
            )?,
            services: FrequencyDistribution::categorical(SystemEvent::services(events)),
            status_codes: FrequencyDistribution::categorical(SystemEvent::status_codes(events)),
            errors_by_service: FrequencyDistribution::categorical(SystemEvent::failed_services(
                events,
            )),
        };
        let summary = StatisticalSummary::new(response_times)?;

        let total_events = events.len();
        let total_errors = tables.errors_by_service.total();
        let error_rate = if total_events == 0 {
            0.0
        } else {
            total_errors as f64 / total_events as f64 * 100.0
        };
        let most_problematic_service = tables.errors_by_service.rows().first().and_then(|row| {
            Service::ALL
                .into_iter()
                .find(|service| service.to_string() == row.label)
                .map(|service| ServiceErrors {
                    service,
                    errors: row.fi,
                })
        });
        let dispersion = DispersionLevel::from_cv(summary.coefficient_of_variation, config);

        tracing::debug!(
            total_events,
            total_errors,
            mean = summary.mean,
            cv = summary.coefficient_of_variation,
            ?dispersion,
            "analyzed event batch"
        );

        Ok(Self {
            response_times: summary,
            total_events,
            total_errors,
            error_rate,
            dispersion,
            most_problematic_service,
            tables,
        })
    }

    /// Narrative interpretation of this analysis.
    #[must_use]
    pub fn report(&self) -> Report {
        Report::from_analysis(self)
    }
}
