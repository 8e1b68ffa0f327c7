//! CSV export of an analysis
//!
//! Writes one file per view of the batch into the output directory:
//!
//! - `dashboard.csv`: summary metrics and the narrative report
//! - `raw_events.csv`: every event
//! - `frequency_tables.csv`: response times, services and status codes
//! - `chart_data.csv`: response-time histogram, errors by service, status codes

use std::{borrow::Cow, fmt::Write as _, fs, path::PathBuf};

use anyhow::Context;
use chrono::SecondsFormat;
use sysmetrics_analysis::{Dimension, EventAnalysis};
use sysmetrics_events::SystemEvent;

use crate::{
    util::{self, AnalysisConfigArg, EventSourceArg},
    view,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ExportArg {
    #[command(flatten)]
    source: EventSourceArg,

    #[command(flatten)]
    config: AnalysisConfigArg,

    /// Directory receiving the CSV files
    #[arg(long)]
    output_dir: PathBuf,
}

pub(crate) fn run(arg: &ExportArg) -> anyhow::Result<()> {
    let events = arg.source.load()?;
    let config = arg.config.load()?;
    let analysis = util::analyze(&events, &config)?;

    let dir = &arg.output_dir;
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let files = [
        ("dashboard.csv", dashboard_csv(&analysis)?),
        ("raw_events.csv", raw_events_csv(&events)?),
        ("frequency_tables.csv", frequency_tables_csv(&analysis)?),
        ("chart_data.csv", chart_data_csv(&analysis)?),
    ];
    for (name, content) in files {
        let path = dir.join(name);
        fs::write(&path, content)
            .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
        println!("Saved {}", path.display());
    }

    Ok(())
}

fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

fn dashboard_csv(analysis: &EventAnalysis) -> anyhow::Result<String> {
    let mut csv = String::from("section,item,value\n");
    for (name, value) in view::summary_rows(analysis) {
        writeln!(&mut csv, "summary,{},{}", csv_field(name), csv_field(&value))
            .with_context(|| format!("Failed to write summary row {name}"))?;
    }

    let report = analysis.report();
    let mut report_rows = vec![("Interpretation".to_owned(), &report.interpretation)];
    report_rows.extend(
        report
            .patterns
            .iter()
            .enumerate()
            .map(|(i, pattern)| (format!("Pattern {}", i + 1), pattern)),
    );
    report_rows.push(("Suggestion".to_owned(), &report.suggestion));
    for (item, text) in report_rows {
        writeln!(&mut csv, "report,{},{}", csv_field(&item), csv_field(text))
            .with_context(|| format!("Failed to write report row {item}"))?;
    }
    Ok(csv)
}

fn raw_events_csv(events: &[SystemEvent]) -> anyhow::Result<String> {
    let mut csv = String::from("id,timestamp,service,response_time_ms,status_code,error\n");
    for e in events {
        writeln!(
            &mut csv,
            "{},{},{},{},{},{}",
            e.id,
            e.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            e.service,
            e.response_time_ms,
            e.status_code,
            e.error
        )
        .with_context(|| format!("Failed to write CSV data for event {}", e.id))?;
    }
    Ok(csv)
}

fn frequency_tables_csv(analysis: &EventAnalysis) -> anyhow::Result<String> {
    let mut csv = String::from("table,class,fi,fri,fri_percent,cumulative_percent\n");
    for dimension in Dimension::TABULATED {
        for row in analysis.tables.get(dimension) {
            writeln!(
                &mut csv,
                "{},{},{},{},{},{}",
                csv_field(dimension.title()),
                csv_field(&row.label),
                row.fi,
                view::format_fri(row),
                row.fri_percent,
                row.cumulative_percent
            )
            .with_context(|| format!("Failed to write {} row {}", dimension.title(), row.label))?;
        }
    }
    Ok(csv)
}

fn chart_data_csv(analysis: &EventAnalysis) -> anyhow::Result<String> {
    let tables = &analysis.tables;
    let charts = [
        ("histogram", tables.response_times.rows_in_bin_order()),
        ("errors_by_service", tables.errors_by_service.iter().collect()),
        ("status_codes", tables.status_codes.iter().collect()),
    ];

    let mut csv = String::from("chart,label,count\n");
    for (chart, rows) in charts {
        for row in rows {
            writeln!(&mut csv, "{chart},{},{}", csv_field(&row.label), row.fi)
                .with_context(|| format!("Failed to write {chart} row {}", row.label))?;
        }
    }
    Ok(csv)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone as _, Utc};
    use sysmetrics_analysis::AnalysisConfig;
    use sysmetrics_events::{Service, StatusCode};

    use super::*;

    fn events() -> Vec<SystemEvent> {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        vec![
            SystemEvent::new(1, ts, Service::Auth, 100, StatusCode::Ok),
            SystemEvent::new(2, ts, Service::Alert, 1500, StatusCode::InternalServerError),
            SystemEvent::new(3, ts, Service::Auth, 120, StatusCode::Unauthorized),
            SystemEvent::new(4, ts, Service::Alert, 1300, StatusCode::InternalServerError),
        ]
    }

    fn analysis() -> EventAnalysis {
        let config = AnalysisConfig {
            response_time_bins: 4,
            ..AnalysisConfig::default()
        };
        EventAnalysis::new(&events(), &config).unwrap()
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("auth-service"), "auth-service");
        assert_eq!(csv_field("a, b"), "\"a, b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_raw_events_csv() {
        let csv = raw_events_csv(&events()).unwrap();
        let lines = csv.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 5);
        assert_eq!(
            lines[2],
            "2,2024-05-01T12:00:00.000Z,alert-service,1500,500,true"
        );
    }

    #[test]
    fn test_frequency_tables_skip_errors_by_service() {
        let csv = frequency_tables_csv(&analysis()).unwrap();
        assert!(csv.lines().skip(1).all(|line| !line.starts_with("Errors")));
        assert!(csv.contains("Services Accessed,auth-service,2,0.5000,50.00%,50.00%"));
        assert!(csv.contains("Status Codes,500,2,0.5000,50.00%,50.00%"));
        // 4 bins + 2 services + 3 status codes
        assert_eq!(csv.lines().count(), 1 + 4 + 2 + 3);
    }

    #[test]
    fn test_chart_data_histogram_in_bin_order() {
        let csv = chart_data_csv(&analysis()).unwrap();
        let histogram = csv
            .lines()
            .filter(|line| line.starts_with("histogram,"))
            .collect::<Vec<_>>();
        assert_eq!(
            histogram,
            [
                "histogram,100.0 - 450.0,2",
                "histogram,450.0 - 800.0,0",
                "histogram,800.0 - 1150.0,0",
                "histogram,1150.0 - 1500.0,2",
            ]
        );
        assert!(csv.contains("errors_by_service,alert-service,2"));
        assert!(csv.contains("errors_by_service,auth-service,1"));
    }

    #[test]
    fn test_dashboard_csv_sections() {
        let csv = dashboard_csv(&analysis()).unwrap();
        assert!(csv.contains("summary,Total errors,3"));
        assert!(csv.contains("summary,Error rate,75.00%"));
        assert!(csv.contains("report,Pattern 2,The most problematic service was alert-service with 2 errors."));
        assert!(csv.lines().last().unwrap().starts_with("report,Suggestion,"));
    }
}
