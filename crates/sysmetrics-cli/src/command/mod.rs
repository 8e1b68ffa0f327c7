use std::io;

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

use self::{
    analyze::AnalyzeArg, dashboard::DashboardArg, export::ExportArg, generate::GenerateArg,
};

mod analyze;
mod dashboard;
mod export;
mod generate;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(flatten)]
    log: LogArg,

    /// What to do with the events
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Generate a batch of synthetic system events as JSON
    Generate(#[clap(flatten)] GenerateArg),
    /// Print descriptive statistics, frequency tables and a report
    Analyze(#[clap(flatten)] AnalyzeArg),
    /// Export the analysis as CSV files
    Export(#[clap(flatten)] ExportArg),
    /// Explore the analysis in a terminal dashboard
    Dashboard(#[clap(flatten)] DashboardArg),
}

#[derive(Debug, Clone, Args)]
struct LogArg {
    /// Log more (-v: info, -vv: debug, -vvv: trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Log filter directives such as `debug` or `sysmetrics_stats=trace` (overrides -v)
    #[arg(long, global = true, value_name = "FILTER")]
    log_level: Option<String>,
}

impl LogArg {
    /// Installs a stderr subscriber so stdout stays free for tables and JSON.
    fn init_logging(&self) -> anyhow::Result<()> {
        let filter = match &self.log_level {
            Some(directives) => EnvFilter::try_new(directives)
                .with_context(|| format!("Invalid log filter: {directives}"))?,
            None => {
                let level = match self.verbose {
                    0 => LevelFilter::WARN,
                    1 => LevelFilter::INFO,
                    2 => LevelFilter::DEBUG,
                    _ => LevelFilter::TRACE,
                };
                EnvFilter::builder()
                    .with_default_directive(level.into())
                    .from_env_lossy()
            }
        };
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .with_target(false)
            .without_time()
            .init();
        Ok(())
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    args.log.init_logging()?;
    match args.mode {
        Mode::Generate(arg) => generate::run(&arg)?,
        Mode::Analyze(arg) => analyze::run(&arg)?,
        Mode::Export(arg) => export::run(&arg)?,
        Mode::Dashboard(arg) => dashboard::run(&arg)?,
    }
    Ok(())
}
