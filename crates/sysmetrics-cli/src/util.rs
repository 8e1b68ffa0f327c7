use std::{
    fs::File,
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use sysmetrics_analysis::{AnalysisConfig, EventAnalysis};
use sysmetrics_events::{DEFAULT_EVENT_COUNT, GeneratorConfig, SystemEvent};

#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = Output::from_output_path(output_path)?;
        output.write_json(value)
    }

    pub fn from_output_path(output_path: Option<PathBuf>) -> anyhow::Result<Self> {
        match output_path {
            Some(path) => Output::open(path),
            None => Ok(Output::stdout()),
        }
    }

    pub fn stdout() -> Self {
        Output::Stdout {
            writer: io::stdout().lock(),
        }
    }

    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    pub fn write_json<T>(&mut self, value: T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, &value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        writeln!(&mut *self).with_context(|| {
            format!(
                "Failed to write newline after JSON to {}",
                self.display_path()
            )
        })?;
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))?;
        tracing::info!(output = %self.display_path(), "wrote JSON");
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Where a command takes its events from: a JSON file written by `generate`,
/// or a batch generated on the fly.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EventSourceArg {
    /// Events JSON file (as written by `generate`)
    #[arg(long, conflicts_with_all = ["count", "seed"])]
    pub events: Option<PathBuf>,

    /// Number of events to generate when no events file is given
    #[arg(long, default_value_t = DEFAULT_EVENT_COUNT)]
    pub count: usize,

    /// Random seed for the generated batch
    #[arg(long)]
    pub seed: Option<u64>,
}

impl EventSourceArg {
    pub fn load(&self) -> anyhow::Result<Vec<SystemEvent>> {
        if let Some(path) = &self.events {
            tracing::info!(path = %path.display(), "loading events");
            let events: Vec<SystemEvent> = read_json_file("events", path)?;
            tracing::info!(count = events.len(), "loaded events");
            return Ok(events);
        }

        let config = GeneratorConfig {
            count: self.count,
            seed: self.seed,
            start: None,
        };
        tracing::info!(count = config.count, seed = ?config.seed, "generating events");
        Ok(config.generate())
    }
}

/// Analysis tuning, read from an optional config file and overridden by flags.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct AnalysisConfigArg {
    /// Analysis config JSON file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of response-time histogram bins (overrides the config file)
    #[arg(long)]
    pub bins: Option<usize>,
}

impl AnalysisConfigArg {
    pub fn load(&self) -> anyhow::Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => read_json_file("analysis config", path)?,
            None => AnalysisConfig::default(),
        };
        if let Some(bins) = self.bins {
            config.response_time_bins = bins;
        }
        tracing::debug!(?config, "analysis config");
        Ok(config)
    }
}

pub fn analyze(events: &[SystemEvent], config: &AnalysisConfig) -> anyhow::Result<EventAnalysis> {
    let analysis = EventAnalysis::new(events, config)
        .with_context(|| format!("Failed to analyze {} events", events.len()))?;
    if analysis.total_errors > 0 {
        tracing::info!(
            errors = analysis.total_errors,
            error_rate = analysis.error_rate,
            "failures present in batch"
        );
    }
    Ok(analysis)
}
