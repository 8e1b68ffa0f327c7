use std::{fmt, path::PathBuf};

use sysmetrics_analysis::{Dimension, EventAnalysis};
use sysmetrics_stats::frequency::FrequencyDistribution;

use crate::{
    util::{self, AnalysisConfigArg, EventSourceArg, Output},
    view,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct AnalyzeArg {
    #[command(flatten)]
    source: EventSourceArg,

    #[command(flatten)]
    config: AnalysisConfigArg,

    /// Also write the full analysis as JSON to this path
    #[arg(long)]
    json: Option<PathBuf>,
}

pub(crate) fn run(arg: &AnalyzeArg) -> anyhow::Result<()> {
    let events = arg.source.load()?;
    let config = arg.config.load()?;
    let analysis = util::analyze(&events, &config)?;

    println!("System Event Analysis ({} events)", analysis.total_events);
    println!("==========================================\n");

    print_summary(&analysis);
    println!();

    println!("{}", analysis.report());

    for dimension in Dimension::TABULATED {
        println!();
        print_frequency_table(dimension, analysis.tables.get(dimension));
    }

    println!();
    println!("Response Time Histogram");
    print_histogram(
        analysis
            .tables
            .response_times
            .rows_in_bin_order()
            .into_iter()
            .map(|row| (&row.label, row.fi)),
    );

    if let Some(path) = &arg.json {
        Output::save_json(&analysis, Some(path.clone()))?;
    }

    Ok(())
}

fn print_summary(analysis: &EventAnalysis) {
    println!("Summary");
    println!("  {:<22} {:>16}", "Metric", "Value");
    println!("  {}", "-".repeat(39));
    for (name, value) in view::summary_rows(analysis) {
        println!("  {name:<22} {value:>16}");
    }
}

fn print_frequency_table(dimension: Dimension, dist: &FrequencyDistribution) {
    println!("{}", dimension.title());
    println!(
        "  {:<24} {:>6} {:>8} {:>9} {:>9}",
        dimension.class_header(),
        "fi",
        "fri",
        "fri%",
        "Fi%",
    );
    // label(24) + fi(6) + fri(8) + fri%(9) + Fi%(9) + spaces(4)
    println!("  {}", "-".repeat(60));
    for row in dist {
        println!(
            "  {:<24} {:>6} {:>8} {:>9} {:>9}",
            row.label,
            row.fi,
            view::format_fri(row),
            row.fri_percent,
            row.cumulative_percent,
        );
    }
    println!("  {:<24} {:>6}", "Total", dist.total());
}

fn print_histogram<I, S>(data: I)
where
    I: Iterator<Item = (S, usize)>,
    S: fmt::Display,
{
    let data = data.collect::<Vec<_>>();
    let max_count = data.iter().map(|(_, c)| *c).max().unwrap_or(0).max(1);
    let max_bar_width = 50;
    for (label, count) in &data {
        let bar_width = (count * max_bar_width) / max_count;
        println!("{:>20} | {:<5} {}", label, count, "#".repeat(bar_width));
    }
}
