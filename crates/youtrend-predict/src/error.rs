use std::path::PathBuf;

use chrono::{DateTime, Utc};
use youtrend_dataset::encoding::EncodeError;

use crate::{context::FetchError, model::ModelError};

/// Failure of one prediction request.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum PredictError {
    #[display("video has no value for required feature '{feature}'")]
    MissingFeature { feature: &'static str },
    #[display("evaluation instant {at} is before the publication instant {published_at}")]
    EvaluationBeforePublish {
        published_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    #[display("invalid curve: span {span_days} days with a gap of {gap_days} days")]
    InvalidCurve { span_days: f64, gap_days: f64 },
    #[display("data for video '{video_ref}' is unavailable")]
    DataUnavailable {
        video_ref: String,
        source: FetchError,
    },
    #[display("expected one video record, found {found}")]
    RecordCount { found: usize },
    #[display("failed to open encoder artifact {}", path.display())]
    ArtifactIo {
        path: PathBuf,
        source: std::io::Error,
    },
    #[display("failed to parse encoder artifact {}", path.display())]
    ArtifactJson {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[from]
    #[display("{_0}")]
    Model(ModelError),
    #[from]
    #[display("{_0}")]
    Encode(EncodeError),
}
