//! Data pipeline of the YouTrend duration model
//!
//! This crate turns scraped trending-list snapshots into the labeled,
//! feature-engineered training table consumed by an external survival-model
//! fit, and encodes single videos the same way at prediction time.
//!
//! # Training Workflow
//!
//! 1. **Load Snapshots** ([`loader::DatasetSource`]): Read and concatenate snapshot CSV files
//! 2. **Normalize** ([`normalize::ColumnNormalizer`]): Canonical instants, counts and booleans
//! 3. **Extract Records** ([`record::Observation`]): Typed rows, failing on schema errors
//! 4. **Label** ([`labeling::DurationLabeler`]): Time-to-trend and censoring indicator
//! 5. **Encode** ([`encoding::FeatureEncoder`]): Day of week, day durations, category one-hot,
//!    plus the persisted [`encoding::EncoderArtifact`]
//!
//! # Prediction Workflow
//!
//! 1. **Raw Record** ([`video::RawVideoRecord`]): Attributes supplied by the fetch collaborator
//! 2. **Normalize** ([`normalize::ColumnNormalizer`]): Same canonicalization as training
//! 3. **Apply Encoding** ([`encoding::FeatureEncoder::apply`]): One-hot with the learned vocabulary
//!
//! # Example
//!
//! ```
//! use youtrend_dataset::{
//!     frame::Frame,
//!     labeling::{DurationLabeler, Frequency, LabelingConfig},
//!     normalize::ColumnNormalizer,
//!     record::Observation,
//! };
//!
//! let csv = "\
//! videoId,videoExactPublishDate,scanTimeStamp,creatorSubscriberNumber,videoLengthSeconds,videoCategory,isCreatorVerified
//! video1,2022-01-01 12:00:00,1641139200,800,212,Comedy,True
//! video1,2022-01-01 12:00:00,1641225600,800,212,Comedy,True
//! video2,2022-01-02 12:00:00,1641225600,1.8M,61,Music,False
//! ";
//! let frame = Frame::from_csv_reader(csv::Reader::from_reader(csv.as_bytes()))?;
//! let frame = ColumnNormalizer::default().normalized(frame)?;
//! let observations = Observation::from_frame(&frame)?;
//!
//! let labeler = DurationLabeler::new(LabelingConfig {
//!     frequency: Frequency::Day,
//!     delay: 1.0,
//! });
//! let labeled = labeler.label(observations)?;
//! assert_eq!(
//!     labeled.iter().map(|r| r.is_trend).collect::<Vec<_>>(),
//!     [true, true, false]
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod encoding;
pub mod frame;
pub mod labeling;
pub mod loader;
pub mod normalize;
pub mod numeric;
pub mod record;
pub mod video;
