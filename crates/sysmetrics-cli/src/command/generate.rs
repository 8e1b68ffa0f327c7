use std::path::PathBuf;

use chrono::{DateTime, Utc};
use sysmetrics_events::{DEFAULT_EVENT_COUNT, GeneratorConfig};

use crate::util::Output;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct GenerateArg {
    /// Number of events to generate
    #[arg(long, default_value_t = DEFAULT_EVENT_COUNT)]
    count: usize,

    /// Random seed for a reproducible batch
    #[arg(long)]
    seed: Option<u64>,

    /// Timestamp of the first event in RFC 3339 (defaults to now)
    #[arg(long)]
    start: Option<DateTime<Utc>>,

    /// Output file path (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &GenerateArg) -> anyhow::Result<()> {
    let GenerateArg {
        count,
        seed,
        start,
        output,
    } = arg;

    let config = GeneratorConfig {
        count: *count,
        seed: *seed,
        start: *start,
    };
    tracing::info!(count, ?seed, "generating events");
    let events = config.generate();

    let failed = events.iter().filter(|e| e.error).count();
    tracing::info!(count = events.len(), failed, "generated events");

    Output::save_json(&events, output.clone())?;
    Ok(())
}
