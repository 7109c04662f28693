//! Prediction entry points
//!
//! A [`PredictionContext`] holds the fitted model and the encoder artifact. It
//! is built once at startup and passed by reference to every request; nothing
//! in it is mutated by a prediction, so it can be shared between threads
//! behind a plain `&` or an `Arc`.
//!
//! ```no_run
//! use youtrend_predict::context::{DirectoryVideoSource, PredictionContext};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let context = PredictionContext::load("model.json", "encoder.json")?;
//! let source = DirectoryVideoSource::new("videos");
//! let probability =
//!     context.predict_from_source(&source, "https://www.youtube.com/watch?v=ABC123", None)?;
//! println!("P(not trending yet) = {probability:.3}");
//! # Ok(())
//! # }
//! ```

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use youtrend_dataset::{
    encoding::{EncodedVideo, EncoderArtifact, FeatureEncoder},
    video::{RawVideoRecord, video_id_from_link},
};

use crate::{
    PredictError,
    curve::{CurvePoint, trend_curve},
    model::SurvivalModel,
    preprocess::PredictionPreprocessor,
    survival::survival_function,
};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum FetchError {
    #[display("video link '{link}' not recognized")]
    UnrecognizedLink { link: String },
    #[display("invalid video id '{video_id}'")]
    InvalidVideoId { video_id: String },
    #[display("no record for video '{video_id}'")]
    NotFound { video_id: String },
    #[display("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[display("failed to parse {}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Resolves a video reference (id or link) into its raw attributes.
///
/// Implementations own their transport, timeouts and retries.
pub trait VideoSource {
    fn fetch(&self, video_ref: &str) -> Result<RawVideoRecord, FetchError>;
}

/// Reads `<videoId>.json` files from a directory.
#[derive(Debug, Clone)]
pub struct DirectoryVideoSource {
    dir: PathBuf,
}

impl DirectoryVideoSource {
    pub fn new<P>(dir: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self { dir: dir.into() }
    }

    fn video_id(video_ref: &str) -> Result<String, FetchError> {
        let video_ref = video_ref.trim();
        let video_id = if video_ref.contains("://") {
            video_id_from_link(video_ref).ok_or_else(|| FetchError::UnrecognizedLink {
                link: video_ref.to_owned(),
            })?
        } else {
            video_ref.to_owned()
        };
        let valid = !video_id.is_empty()
            && video_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(FetchError::InvalidVideoId { video_id });
        }
        Ok(video_id)
    }
}

impl VideoSource for DirectoryVideoSource {
    fn fetch(&self, video_ref: &str) -> Result<RawVideoRecord, FetchError> {
        let video_id = Self::video_id(video_ref)?;
        let path = self.dir.join(format!("{video_id}.json"));
        if !path.is_file() {
            return Err(FetchError::NotFound { video_id });
        }
        let file = File::open(&path).map_err(|source| FetchError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|source| FetchError::Json { path, source })
    }
}

#[derive(Debug, Clone)]
pub struct PredictionContext {
    model: SurvivalModel,
    artifact: EncoderArtifact,
    encoder: FeatureEncoder,
    preprocessor: PredictionPreprocessor,
}

impl PredictionContext {
    #[must_use]
    pub fn new(model: SurvivalModel, artifact: EncoderArtifact) -> Self {
        let preprocessor = PredictionPreprocessor::new(artifact.scaling);
        Self {
            model,
            artifact,
            encoder: FeatureEncoder::default(),
            preprocessor,
        }
    }

    /// Loads the model and encoder artifact JSON files.
    pub fn load<M, E>(model_path: M, encoder_path: E) -> Result<Self, PredictError>
    where
        M: AsRef<Path>,
        E: AsRef<Path>,
    {
        let model = SurvivalModel::load(model_path)?;
        let path = encoder_path.as_ref();
        let file = File::open(path).map_err(|source| PredictError::ArtifactIo {
            path: path.to_owned(),
            source,
        })?;
        let artifact: EncoderArtifact = serde_json::from_reader(BufReader::new(file))
            .map_err(|source| PredictError::ArtifactJson {
                path: path.to_owned(),
                source,
            })?;
        tracing::info!(
            categories = artifact.vocabulary.len(),
            "loaded prediction context"
        );
        Ok(Self::new(model, artifact))
    }

    #[must_use]
    pub fn model(&self) -> &SurvivalModel {
        &self.model
    }

    #[must_use]
    pub fn artifact(&self) -> &EncoderArtifact {
        &self.artifact
    }

    /// Normalizes and encodes one raw record.
    pub fn encode(&self, video: &RawVideoRecord) -> Result<EncodedVideo, PredictError> {
        let frame = video.clone().into_frame();
        let mut encoded = self
            .encoder
            .apply_frame(&frame, &self.artifact.vocabulary)?;
        if encoded.len() != 1 {
            return Err(PredictError::RecordCount {
                found: encoded.len(),
            });
        }
        Ok(encoded.remove(0))
    }

    /// Probability that `video` has not entered the trending list at `at`
    /// (default: now).
    pub fn predict(
        &self,
        video: &RawVideoRecord,
        at: Option<DateTime<Utc>>,
    ) -> Result<f64, PredictError> {
        let encoded = self.encode(video)?;
        let at = at.unwrap_or_else(Utc::now);
        let prepared = self.preprocessor.prepare(&encoded, at)?;
        let probability = survival_function(&self.model, &prepared.covariates, prepared.elapsed_days)?;
        tracing::debug!(
            video_id = %encoded.video_id,
            elapsed_days = prepared.elapsed_days,
            probability,
            "predicted survival"
        );
        Ok(probability)
    }

    pub fn predict_curve(
        &self,
        video: &RawVideoRecord,
        start: Option<DateTime<Utc>>,
        span_days: f64,
        gap_days: f64,
    ) -> Result<Vec<CurvePoint>, PredictError> {
        let encoded = self.encode(video)?;
        let covariates = self.preprocessor.covariates(&encoded)?;
        trend_curve(
            &self.model,
            &covariates,
            encoded.published_at,
            start,
            span_days,
            gap_days,
        )
    }

    pub fn predict_from_source<S>(
        &self,
        source: &S,
        video_ref: &str,
        at: Option<DateTime<Utc>>,
    ) -> Result<f64, PredictError>
    where
        S: VideoSource + ?Sized,
    {
        let video = fetch(source, video_ref)?;
        self.predict(&video, at)
    }

    pub fn predict_curve_from_source<S>(
        &self,
        source: &S,
        video_ref: &str,
        start: Option<DateTime<Utc>>,
        span_days: f64,
        gap_days: f64,
    ) -> Result<Vec<CurvePoint>, PredictError>
    where
        S: VideoSource + ?Sized,
    {
        let video = fetch(source, video_ref)?;
        self.predict_curve(&video, start, span_days, gap_days)
    }
}

fn fetch<S>(source: &S, video_ref: &str) -> Result<RawVideoRecord, PredictError>
where
    S: VideoSource + ?Sized,
{
    source.fetch(video_ref).map_err(|source| {
        tracing::warn!(video_ref, error = %source, "video data unavailable");
        PredictError::DataUnavailable {
            video_ref: video_ref.to_owned(),
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, fs, thread};

    use chrono::{TimeDelta, TimeZone};
    use youtrend_dataset::encoding::{CategoryVocabulary, FeatureRange, FeatureScaling};

    use crate::model::{Coefficients, Covariates, ModelError, ModelFamily};

    use super::*;

    fn model() -> SurvivalModel {
        SurvivalModel {
            family: ModelFamily::Weibull,
            primary: Coefficients {
                intercept: 0.8,
                weights: BTreeMap::from([
                    ("creatorSubscriberNumber".to_owned(), -1.0),
                    ("videoLengthSeconds".to_owned(), 0.4),
                    ("videoCat_Music".to_owned(), -0.3),
                ]),
            },
            ancillary: Coefficients {
                intercept: 0.1,
                weights: BTreeMap::new(),
            },
        }
    }

    fn artifact() -> EncoderArtifact {
        EncoderArtifact {
            vocabulary: CategoryVocabulary::fit(["Comedy", "Music"]).unwrap(),
            scaling: FeatureScaling {
                creator_subscribers: FeatureRange {
                    min: 0.0,
                    max: 2_000_000.0,
                },
                length_seconds: FeatureRange {
                    min: 0.0,
                    max: 1_000.0,
                },
            },
        }
    }

    fn raw(category: &str) -> RawVideoRecord {
        serde_json::from_value(serde_json::json!({
            "videoId": "ABC123",
            "videoExactPublishDate": "2024-03-04T10:00:00Z",
            "videoLengthSeconds": "PT8M20S",
            "videoCategory": category,
            "creatorSubscriberNumber": "1M",
        }))
        .unwrap()
    }

    fn published_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_predict() {
        let context = PredictionContext::new(model(), artifact());

        let at_publish = context.predict(&raw("Music"), Some(published_at())).unwrap();
        assert_eq!(at_publish, 1.0);

        let at = published_at() + TimeDelta::days(2);
        let probability = context.predict(&raw("Music"), Some(at)).unwrap();
        let covariates = [
            ("creatorSubscriberNumber", 0.5),
            ("videoLengthSeconds", 0.5),
            ("videoCat_Comedy", 0.0),
            ("videoCat_Music", 1.0),
        ]
        .into_iter()
        .collect::<Covariates>();
        let expected = survival_function(&model(), &covariates, 2.0).unwrap();
        assert!((probability - expected).abs() < 1e-12);

        let unknown = context.predict(&raw("Sports"), Some(at)).unwrap();
        assert!((0.0..=1.0).contains(&unknown));
        assert!(unknown != probability);

        let now = context.predict(&raw("Music"), None).unwrap();
        assert!((0.0..=1.0).contains(&now));
    }

    #[test]
    fn test_predict_errors_fail_only_the_request() {
        let context = PredictionContext::new(model(), artifact());
        let err = context
            .predict(&raw("Music"), Some(published_at() - TimeDelta::hours(1)))
            .unwrap_err();
        assert!(matches!(err, PredictError::EvaluationBeforePublish { .. }));

        let mut video = raw("Music");
        video.creator_subscriber_number = None;
        let err = context.predict(&video, Some(published_at())).unwrap_err();
        assert!(matches!(err, PredictError::MissingFeature { .. }));

        let mut model = model();
        model.primary.weights.insert("videoCat_Gaming".to_owned(), 1.0);
        let context = PredictionContext::new(model, artifact());
        let err = context
            .predict(&raw("Music"), Some(published_at() + TimeDelta::days(1)))
            .unwrap_err();
        assert!(matches!(
            err,
            PredictError::Model(ModelError::MissingCovariate { .. })
        ));
    }

    #[test]
    fn test_predict_curve() {
        let context = PredictionContext::new(model(), artifact());
        let curve = context
            .predict_curve(&raw("Music"), None, 10.0, 0.5)
            .unwrap();
        assert_eq!(curve.len(), 20);
        assert_eq!(curve[0].step, 1);
        assert_eq!(curve[19].elapsed_days, 10.0);

        let at = published_at() + TimeDelta::days(3);
        let point = context.predict(&raw("Music"), Some(at)).unwrap();
        assert!((curve[5].probability - point).abs() < 1e-12);
    }

    #[test]
    fn test_directory_source() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("ABC123.json"),
            serde_json::to_string(&raw("Comedy")).unwrap(),
        )
        .unwrap();
        let source = DirectoryVideoSource::new(dir.path());
        let context = PredictionContext::new(model(), artifact());

        let from_link = context
            .predict_from_source(&source, "https://youtu.be/ABC123", Some(published_at()))
            .unwrap();
        assert_eq!(from_link, 1.0);

        let curve = context
            .predict_curve_from_source(&source, "ABC123", None, 3.0, 1.0)
            .unwrap();
        assert_eq!(curve.len(), 3);

        for video_ref in ["missing", "../ABC123", "https://example.com/x"] {
            let err = context
                .predict_from_source(&source, video_ref, None)
                .unwrap_err();
            assert!(
                matches!(err, PredictError::DataUnavailable { .. }),
                "{video_ref}"
            );
        }
    }

    #[test]
    fn test_load() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("model.json");
        let encoder_path = dir.path().join("encoder.json");
        fs::write(&model_path, serde_json::to_string(&model()).unwrap()).unwrap();
        fs::write(&encoder_path, serde_json::to_string(&artifact()).unwrap()).unwrap();

        let context = PredictionContext::load(&model_path, &encoder_path).unwrap();
        assert_eq!(context.model(), &model());
        assert_eq!(context.artifact(), &artifact());

        let err = PredictionContext::load(&model_path, dir.path().join("none.json")).unwrap_err();
        assert!(matches!(err, PredictError::ArtifactIo { .. }));
    }

    #[test]
    fn test_context_is_shared_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PredictionContext>();

        let context = PredictionContext::new(model(), artifact());
        let expected = (1..=8)
            .map(|days| {
                context
                    .predict(&raw("Music"), Some(published_at() + TimeDelta::days(days)))
                    .unwrap()
            })
            .collect::<Vec<_>>();

        let concurrent = thread::scope(|s| {
            let handles = (1..=8)
                .map(|days| {
                    let context = &context;
                    s.spawn(move || {
                        context
                            .predict(&raw("Music"), Some(published_at() + TimeDelta::days(days)))
                            .unwrap()
                    })
                })
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .collect::<Vec<_>>()
        });
        assert_eq!(concurrent, expected);
    }
}
