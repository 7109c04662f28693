//! Feature encoding for the duration model
//!
//! [`FeatureEncoder::fit`] turns labeled records into a [`TrainingTable`] and
//! learns an [`EncoderArtifact`]: the category vocabulary and the scaling
//! ranges of the continuous features. The artifact is persisted next to the
//! fitted model and reused unchanged by [`FeatureEncoder::apply`] when a
//! single video is encoded for prediction.
//!
//! # One-hot columns
//!
//! Each vocabulary entry gets one column named `videoCat_<label>`, where the
//! label has `" & "` replaced by `_and_`, spaces replaced by `_`, and is
//! capitalized:
//!
//! ```
//! use youtrend_dataset::encoding::category_column_name;
//!
//! assert_eq!(
//!     category_column_name("Film & Animation"),
//!     "videoCat_Film_and_animation"
//! );
//! assert_eq!(category_column_name("Music"), "videoCat_Music");
//! ```
//!
//! A category absent from the vocabulary encodes as all zeros.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Datelike as _, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::{
    frame::{Cell, Frame, FrameError, SchemaError},
    normalize::{ColumnNormalizer, NormalizeError},
    record::{LabeledRecord, SECONDS_PER_DAY, columns, day_name},
    video::VideoRecord,
};

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum EncodeError {
    #[display("no input: provide either a training table file or labeled records")]
    NoInput,
    #[display("ambiguous input: provide a training table file or labeled records, not both")]
    AmbiguousInput,
    #[display("input has no rows")]
    EmptyInput,
    #[display("training table file {} does not exist", path.display())]
    MissingFile { path: PathBuf },
    #[display("column '{column}' has no value to learn a scaling range from")]
    MissingScalingValues { column: &'static str },
    #[display("categories '{first}' and '{second}' share the one-hot column '{column}'")]
    CategoryCollision {
        column: String,
        first: String,
        second: String,
    },
    #[from]
    #[display("{_0}")]
    Frame(FrameError),
    #[from]
    #[display("{_0}")]
    Normalize(NormalizeError),
    #[from]
    #[display("{_0}")]
    Schema(SchemaError),
}

/// Column name of the one-hot indicator for `label`.
#[must_use]
pub fn category_column_name(label: &str) -> String {
    let label = label.replace(" & ", "_and_");
    let label = label.trim().replace(' ', "_");
    let mut chars = label.chars();
    let capitalized = match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect::<String>(),
        None => String::new(),
    };
    format!("videoCat_{capitalized}")
}

/// Sorted, deduplicated category labels learned from a training table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryVocabulary {
    categories: Vec<String>,
}

impl CategoryVocabulary {
    /// Learns the vocabulary. Labels are trimmed; empty labels are ignored.
    ///
    /// Fails when two distinct labels map to the same one-hot column name,
    /// e.g. `"Music"` and `"music"`.
    pub fn fit<'a, I>(labels: I) -> Result<Self, EncodeError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let categories = labels
            .into_iter()
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .map(str::to_owned)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect::<Vec<_>>();

        let mut columns = BTreeMap::new();
        for category in &categories {
            let column = category_column_name(category);
            if let Some(first) = columns.insert(column.clone(), category) {
                return Err(EncodeError::CategoryCollision {
                    column,
                    first: first.clone(),
                    second: category.clone(),
                });
            }
        }
        Ok(Self { categories })
    }

    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// One-hot column names, in vocabulary order.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        self.categories
            .iter()
            .map(|c| category_column_name(c))
            .collect()
    }

    #[must_use]
    pub fn position(&self, label: &str) -> Option<usize> {
        self.categories
            .binary_search_by(|c| c.as_str().cmp(label.trim()))
            .ok()
    }

    /// One-hot vector of `category`; all zeros when unknown or missing.
    #[must_use]
    pub fn encode(&self, category: Option<&str>) -> Vec<f64> {
        let mut one_hot = vec![0.0; self.len()];
        if let Some(idx) = category.and_then(|c| self.position(c)) {
            one_hot[idx] = 1.0;
        }
        one_hot
    }
}

/// Observed `(min, max)` of a continuous feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRange {
    pub min: f64,
    pub max: f64,
}

impl FeatureRange {
    /// Range of the finite values, or `None` when there are none.
    pub fn fit<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |range, v| match range {
                None => Some(Self { min: v, max: v }),
                Some(Self { min, max }) => Some(Self {
                    min: min.min(v),
                    max: max.max(v),
                }),
            })
    }

    /// Min-max scaling clamped at 0 only: values above `max` scale past 1.
    ///
    /// A degenerate range scales everything to 0.
    ///
    /// ```
    /// use youtrend_dataset::encoding::FeatureRange;
    ///
    /// let range = FeatureRange { min: 2.0, max: 4.0 };
    /// let scaled = [1.0, 2.0, 3.0, 4.0, 5.0].map(|x| range.scale(x));
    /// assert_eq!(scaled, [0.0, 0.0, 0.5, 1.0, 1.5]);
    /// ```
    #[must_use]
    pub fn scale(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        ((value - self.min) / span).max(0.0)
    }
}

/// Scaling ranges of the continuous model features.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureScaling {
    pub creator_subscribers: FeatureRange,
    pub length_seconds: FeatureRange,
}

/// Everything learned at fit time that apply mode needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderArtifact {
    pub vocabulary: CategoryVocabulary,
    pub scaling: FeatureScaling,
}

/// A labeled record with its derived model features.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingRecord {
    pub labeled: LabeledRecord,
    pub day_of_week: Weekday,
    pub video_length_days: Option<f64>,
    pub time_to_trend_days: f64,
    pub one_hot: Vec<f64>,
}

impl TrainingRecord {
    #[must_use]
    pub fn day_name(&self) -> &'static str {
        day_name(self.day_of_week)
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.labeled.observation.category.as_deref()
    }

    /// Right-censored: first seen outside the reliable window.
    #[must_use]
    pub fn is_censored(&self) -> bool {
        !self.labeled.is_trend
    }
}

/// The feature-engineered training table.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingTable {
    pub category_columns: Vec<String>,
    pub records: Vec<TrainingRecord>,
}

impl TrainingTable {
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Training table columns followed by the derived ones.
    #[expect(clippy::cast_possible_truncation)]
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        let labeled = self
            .records
            .iter()
            .map(|r| r.labeled.clone())
            .collect::<Vec<_>>();
        let mut frame = LabeledRecord::to_frame(&labeled);

        frame.set_column(
            columns::DAY_OF_WEEK,
            self.records
                .iter()
                .map(|r| Cell::from(r.day_name()))
                .collect(),
        )?;
        frame.set_column(
            columns::VIDEO_LENGTH_DAYS,
            self.records
                .iter()
                .map(|r| r.video_length_days.map_or(Cell::Null, Cell::Float))
                .collect(),
        )?;
        frame.set_column(
            columns::TIME_TO_TREND_DAYS,
            self.records
                .iter()
                .map(|r| Cell::Float(r.time_to_trend_days))
                .collect(),
        )?;
        for (idx, name) in self.category_columns.iter().enumerate() {
            frame.set_column(
                name.as_str(),
                self.records
                    .iter()
                    .map(|r| Cell::Integer(r.one_hot[idx] as i64))
                    .collect(),
            )?;
        }
        Ok(frame)
    }
}

/// Result of fit mode.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedEncoding {
    pub table: TrainingTable,
    /// Columns handed to the survival-model fit: duration, event indicator,
    /// continuous covariates and one-hot columns.
    pub model_features: Vec<String>,
    pub artifact: EncoderArtifact,
}

/// Where fit mode reads labeled records from.
#[derive(Debug, Clone, PartialEq)]
pub enum EncoderInput {
    /// A training table CSV file; its stored labels are reused.
    File(PathBuf),
    Records(Vec<LabeledRecord>),
}

impl EncoderInput {
    /// Exactly one of `file` and `records` must be given.
    pub fn from_parts(
        file: Option<PathBuf>,
        records: Option<Vec<LabeledRecord>>,
    ) -> Result<Self, EncodeError> {
        match (file, records) {
            (None, None) => Err(EncodeError::NoInput),
            (Some(_), Some(_)) => Err(EncodeError::AmbiguousInput),
            (Some(file), None) => Ok(Self::File(file)),
            (None, Some(records)) => Ok(Self::Records(records)),
        }
    }
}

/// A single video encoded for prediction. Carries no label.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedVideo {
    pub video_id: String,
    pub published_at: DateTime<Utc>,
    pub length_seconds: Option<i64>,
    pub creator_subscribers: Option<i64>,
    pub day_of_week: Weekday,
    /// `(column name, indicator)` in vocabulary order.
    pub one_hot: Vec<(String, f64)>,
}

#[derive(Debug, Clone, Default)]
pub struct FeatureEncoder {
    normalizer: ColumnNormalizer,
}

impl FeatureEncoder {
    #[must_use]
    pub fn new(normalizer: ColumnNormalizer) -> Self {
        Self { normalizer }
    }

    /// Reads and normalizes a training table file.
    pub fn read_training_table(&self, path: &Path) -> Result<Vec<LabeledRecord>, EncodeError> {
        if !path.is_file() {
            return Err(EncodeError::MissingFile {
                path: path.to_owned(),
            });
        }
        let mut frame = Frame::read_csv(path)?;
        frame.drop_unnamed_index();
        self.normalizer.normalize(&mut frame)?;
        Ok(LabeledRecord::from_frame(&frame)?)
    }

    /// Fit mode: builds the training table and learns the encoder artifact.
    #[expect(clippy::cast_precision_loss)]
    pub fn fit(&self, input: EncoderInput) -> Result<FittedEncoding, EncodeError> {
        let labeled = match input {
            EncoderInput::File(path) => self.read_training_table(&path)?,
            EncoderInput::Records(records) => records,
        };
        if labeled.is_empty() {
            return Err(EncodeError::EmptyInput);
        }

        let vocabulary = CategoryVocabulary::fit(
            labeled
                .iter()
                .filter_map(|r| r.observation.category.as_deref()),
        )?;
        let scaling = FeatureScaling {
            creator_subscribers: FeatureRange::fit(
                labeled
                    .iter()
                    .filter_map(|r| r.observation.creator_subscribers)
                    .map(|v| v as f64),
            )
            .ok_or(EncodeError::MissingScalingValues {
                column: columns::SUBSCRIBERS,
            })?,
            length_seconds: FeatureRange::fit(
                labeled
                    .iter()
                    .filter_map(|r| r.observation.length_seconds)
                    .map(|v| v as f64),
            )
            .ok_or(EncodeError::MissingScalingValues {
                column: columns::LENGTH_SECONDS,
            })?,
        };

        let records = labeled
            .into_iter()
            .map(|labeled| {
                let obs = &labeled.observation;
                TrainingRecord {
                    day_of_week: obs.published_at.weekday(),
                    video_length_days: obs
                        .length_seconds
                        .map(|s| s as f64 / SECONDS_PER_DAY),
                    time_to_trend_days: labeled.time_to_trend_days(),
                    one_hot: vocabulary.encode(obs.category.as_deref()),
                    labeled,
                }
            })
            .collect::<Vec<_>>();

        let category_columns = vocabulary.column_names();
        let model_features = [
            columns::TIME_TO_TREND_DAYS,
            columns::IS_TREND,
            columns::SUBSCRIBERS,
            columns::LENGTH_SECONDS,
        ]
        .into_iter()
        .map(str::to_owned)
        .chain(category_columns.iter().cloned())
        .collect();

        tracing::debug!(
            rows = records.len(),
            categories = vocabulary.len(),
            "fitted feature encoder"
        );
        Ok(FittedEncoding {
            table: TrainingTable {
                category_columns,
                records,
            },
            model_features,
            artifact: EncoderArtifact {
                vocabulary,
                scaling,
            },
        })
    }

    /// Apply mode for one video.
    #[must_use]
    pub fn apply(&self, video: &VideoRecord, vocabulary: &CategoryVocabulary) -> EncodedVideo {
        if let Some(category) = video.category.as_deref()
            && vocabulary.position(category).is_none()
        {
            tracing::warn!(
                video_id = %video.video_id,
                category,
                "category not seen at fit time"
            );
        }
        let one_hot = vocabulary
            .column_names()
            .into_iter()
            .zip(vocabulary.encode(video.category.as_deref()))
            .collect();
        EncodedVideo {
            video_id: video.video_id.clone(),
            published_at: video.published_at,
            length_seconds: video.length_seconds,
            creator_subscribers: video.creator_subscribers,
            day_of_week: video.published_at.weekday(),
            one_hot,
        }
    }

    /// Apply mode for every row of a raw frame.
    pub fn apply_frame(
        &self,
        frame: &Frame,
        vocabulary: &CategoryVocabulary,
    ) -> Result<Vec<EncodedVideo>, EncodeError> {
        if frame.is_empty() {
            return Err(EncodeError::EmptyInput);
        }
        let frame = self.normalizer.normalized(frame.clone())?;
        let videos = VideoRecord::from_frame(&frame)?;
        Ok(videos
            .iter()
            .map(|video| self.apply(video, vocabulary))
            .collect())
    }
}
