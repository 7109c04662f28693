use std::path::PathBuf;

use chrono::{DateTime, Utc};
use youtrend_dataset::video::RawVideoRecord;
use youtrend_predict::{
    context::{DirectoryVideoSource, PredictionContext},
    curve::CurvePoint,
};

use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PredictArg {
    /// Fitted model JSON file
    #[arg(long)]
    model: PathBuf,
    /// Encoder artifact JSON file (as written by `encode`)
    #[arg(long)]
    encoder: PathBuf,
    /// Video id or link, resolved in `--videos-dir`
    #[arg(required_unless_present = "record", conflicts_with = "record")]
    pub video: Option<String>,
    /// Directory of `<videoId>.json` raw video records
    #[arg(long, default_value = ".")]
    videos_dir: PathBuf,
    /// Raw video record JSON file
    #[arg(long)]
    record: Option<PathBuf>,
    /// Evaluation instant (RFC 3339, defaults to now)
    #[arg(long, conflicts_with = "curve")]
    at: Option<DateTime<Utc>>,
    /// Sample the survival curve instead of a single probability
    #[arg(long)]
    pub curve: bool,
    /// Curve start instant (RFC 3339, defaults to publication)
    #[arg(long, requires = "curve")]
    start: Option<DateTime<Utc>>,
    /// Curve span in days
    #[arg(long, default_value_t = 30.0)]
    pub span: f64,
    /// Days between curve samples
    #[arg(long, default_value_t = 1.0)]
    pub gap: f64,
    /// Write the curve as JSON to this path instead of printing a table
    #[arg(long, requires = "curve")]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &PredictArg) -> anyhow::Result<()> {
    let context = PredictionContext::load(&arg.model, &arg.encoder)?;
    let record = arg
        .record
        .as_ref()
        .map(|path| util::read_json_file::<RawVideoRecord, _>("video record", path))
        .transpose()?;
    let source = DirectoryVideoSource::new(&arg.videos_dir);
    let video_ref = arg.video.as_deref().unwrap_or_default();

    if arg.curve {
        let curve = match &record {
            Some(record) => context.predict_curve(record, arg.start, arg.span, arg.gap)?,
            None => context.predict_curve_from_source(
                &source, video_ref, arg.start, arg.span, arg.gap,
            )?,
        };
        match &arg.output {
            Some(path) => Output::save_json(&curve, Some(path.clone()))?,
            None => print_curve(&curve),
        }
    } else {
        let probability = match &record {
            Some(record) => context.predict(record, arg.at)?,
            None => context.predict_from_source(&source, video_ref, arg.at)?,
        };
        println!("P(not trending yet) = {probability:.4}");
    }
    Ok(())
}

fn print_curve(curve: &[CurvePoint]) {
    println!("  {:>6} {:>12} {:>12}", "Step", "Days", "P(survive)");
    println!("  {}", "-".repeat(32));
    for point in curve {
        println!(
            "  {:>6} {:>12.2} {:>12.4}",
            point.step, point.elapsed_days, point.probability
        );
    }
}
