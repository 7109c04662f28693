use std::path::PathBuf;

use anyhow::Context;
use youtrend_dataset::{
    labeling::{DurationLabeler, LabelingConfig},
    loader::{DEFAULT_PATTERN, DatasetSource},
    normalize::ColumnNormalizer,
    record::{LabeledRecord, Observation},
};

use crate::{
    config::{Config, LabelingArg},
    util::Output,
};

/// Where to read trending-list snapshots from.
#[derive(Debug, Clone, Default, clap::Args)]
pub(super) struct SnapshotArg {
    /// Directory containing snapshot CSV files
    #[arg(long, conflicts_with = "files")]
    pub dir: Option<PathBuf>,
    /// File name pattern of snapshot files inside `--dir`
    #[arg(long, default_value = DEFAULT_PATTERN)]
    pub pattern: String,
    /// Explicit snapshot files (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub files: Vec<PathBuf>,
}

impl SnapshotArg {
    pub(super) fn source(&self) -> Option<DatasetSource> {
        match &self.dir {
            Some(dir) => Some(DatasetSource::directory(dir, self.pattern.as_str())),
            None if !self.files.is_empty() => Some(DatasetSource::files(&self.files)),
            None => None,
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct LabelArg {
    #[command(flatten)]
    snapshots: SnapshotArg,
    #[command(flatten)]
    labeling: LabelingArg,
    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output CSV path (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &LabelArg) -> anyhow::Result<()> {
    let config = Config::load(arg.config.as_deref())?;
    let labeling = arg.labeling.resolve(&config.labeling);
    let source = arg
        .snapshots
        .source()
        .context("Either --dir or --files is required")?;

    let records = label_snapshots(&source, labeling)?;
    let trending = records.iter().filter(|r| r.is_trend).count();
    tracing::info!(
        records = records.len(),
        trending,
        censored = records.len() - trending,
        "labeled snapshots"
    );

    Output::save_csv(&LabeledRecord::to_frame(&records), arg.output.clone())
}

/// Loads, normalizes and labels a snapshot corpus.
pub(super) fn label_snapshots(
    source: &DatasetSource,
    labeling: LabelingConfig,
) -> anyhow::Result<Vec<LabeledRecord>> {
    let frame = source.load().context("Failed to load snapshots")?;
    let frame = ColumnNormalizer::default()
        .normalized(frame)
        .context("Failed to normalize snapshots")?;
    let observations = Observation::from_frame(&frame).context("Invalid snapshot schema")?;
    let records = DurationLabeler::new(labeling)
        .label(observations)
        .context("Failed to label snapshots")?;
    Ok(records)
}
