use std::path::PathBuf;

use anyhow::Context;
use youtrend_dataset::encoding::{EncoderInput, FeatureEncoder, FittedEncoding};

use crate::{
    command::label::{self, SnapshotArg},
    config::{Config, LabelingArg},
    util::Output,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EncodeArg {
    /// Labeled training table CSV (as written by `label`)
    #[arg(long)]
    table: Option<PathBuf>,
    /// Label snapshots instead of reading a training table
    #[command(flatten)]
    snapshots: SnapshotArg,
    #[command(flatten)]
    labeling: LabelingArg,
    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output path of the feature-engineered training table CSV
    #[arg(long)]
    output: PathBuf,
    /// Output path of the encoder artifact JSON
    #[arg(long, default_value = "encoder.json")]
    encoder_output: PathBuf,
}

pub(crate) fn run(arg: &EncodeArg) -> anyhow::Result<()> {
    let fitted = fit(arg)?;

    let frame = fitted
        .table
        .to_frame()
        .context("Failed to build training table")?;
    Output::save_csv(&frame, Some(arg.output.clone()))?;
    Output::save_json(&fitted.artifact, Some(arg.encoder_output.clone()))?;
    tracing::info!(
        rows = fitted.table.len(),
        categories = fitted.artifact.vocabulary.len(),
        table = %arg.output.display(),
        encoder = %arg.encoder_output.display(),
        "saved training table"
    );

    println!("Model features:");
    for feature in &fitted.model_features {
        println!("  {feature}");
    }
    Ok(())
}

fn fit(arg: &EncodeArg) -> anyhow::Result<FittedEncoding> {
    let records = match arg.snapshots.source() {
        Some(source) => {
            let config = Config::load(arg.config.as_deref())?;
            let labeling = arg.labeling.resolve(&config.labeling);
            Some(label::label_snapshots(&source, labeling)?)
        }
        None => None,
    };
    let input = EncoderInput::from_parts(arg.table.clone(), records)?;
    let fitted = FeatureEncoder::default()
        .fit(input)
        .context("Failed to encode training table")?;
    Ok(fitted)
}
