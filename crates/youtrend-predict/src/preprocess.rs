//! Prediction-time covariates
//!
//! An [`EncodedVideo`] becomes the covariate vector of the fitted model: the
//! continuous features are rescaled with the ranges learned at fit time and
//! the category one-hot columns are passed through.

use chrono::{DateTime, Utc};
use youtrend_dataset::{
    encoding::EncodedVideo,
    record::{SECONDS_PER_DAY, columns, elapsed_seconds},
};

pub use youtrend_dataset::encoding::{FeatureRange, FeatureScaling};

use crate::{PredictError, model::Covariates};

/// A video ready for evaluation at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedVideo {
    pub elapsed_days: f64,
    pub covariates: Covariates,
}

/// Fractional days from `published_at` to `at`.
pub fn elapsed_days(published_at: DateTime<Utc>, at: DateTime<Utc>) -> Result<f64, PredictError> {
    if at < published_at {
        return Err(PredictError::EvaluationBeforePublish { published_at, at });
    }
    Ok(elapsed_seconds(published_at, at) / SECONDS_PER_DAY)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionPreprocessor {
    scaling: FeatureScaling,
}

impl PredictionPreprocessor {
    #[must_use]
    pub fn new(scaling: FeatureScaling) -> Self {
        Self { scaling }
    }

    /// Scaled continuous features followed by the one-hot columns.
    #[expect(clippy::cast_precision_loss)]
    pub fn covariates(&self, video: &EncodedVideo) -> Result<Covariates, PredictError> {
        let subscribers = video
            .creator_subscribers
            .ok_or(PredictError::MissingFeature {
                feature: columns::SUBSCRIBERS,
            })?;
        let length = video.length_seconds.ok_or(PredictError::MissingFeature {
            feature: columns::LENGTH_SECONDS,
        })?;

        let mut covariates = Covariates::new();
        covariates.insert(
            columns::SUBSCRIBERS,
            self.scaling.creator_subscribers.scale(subscribers as f64),
        );
        covariates.insert(
            columns::LENGTH_SECONDS,
            self.scaling.length_seconds.scale(length as f64),
        );
        for (name, value) in &video.one_hot {
            covariates.insert(name.as_str(), *value);
        }
        Ok(covariates)
    }

    pub fn prepare(
        &self,
        video: &EncodedVideo,
        at: DateTime<Utc>,
    ) -> Result<PreparedVideo, PredictError> {
        Ok(PreparedVideo {
            elapsed_days: elapsed_days(video.published_at, at)?,
            covariates: self.covariates(video)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone, Weekday};

    use super::*;

    fn scaling() -> FeatureScaling {
        FeatureScaling {
            creator_subscribers: FeatureRange { min: 2.0, max: 4.0 },
            length_seconds: FeatureRange {
                min: 60.0,
                max: 660.0,
            },
        }
    }

    fn video() -> EncodedVideo {
        EncodedVideo {
            video_id: "v".into(),
            published_at: Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap(),
            length_seconds: Some(360),
            creator_subscribers: Some(5),
            day_of_week: Weekday::Mon,
            one_hot: vec![
                ("videoCat_Comedy".into(), 0.0),
                ("videoCat_Music".into(), 1.0),
            ],
        }
    }

    #[test]
    fn test_scaling_clamps_lower_bound_only() {
        let range = scaling().creator_subscribers;
        let scaled = [1.0, 2.0, 3.0, 4.0, 5.0].map(|x| range.scale(x));
        assert_eq!(scaled, [0.0, 0.0, 0.5, 1.0, 1.5]);
    }

    #[test]
    fn test_degenerate_range_scales_to_zero() {
        let range = FeatureRange { min: 3.0, max: 3.0 };
        assert_eq!(range.scale(3.0), 0.0);
        assert_eq!(range.scale(100.0), 0.0);
    }

    #[test]
    fn test_prepare() {
        let video = video();
        let at = video.published_at + TimeDelta::hours(36);
        let prepared = PredictionPreprocessor::new(scaling())
            .prepare(&video, at)
            .unwrap();

        assert_eq!(prepared.elapsed_days, 1.5);
        assert_eq!(prepared.covariates.get("creatorSubscriberNumber"), Some(1.5));
        assert_eq!(prepared.covariates.get("videoLengthSeconds"), Some(0.5));
        assert_eq!(prepared.covariates.get("videoCat_Music"), Some(1.0));
        assert_eq!(prepared.covariates.get("videoCat_Comedy"), Some(0.0));
        assert_eq!(prepared.covariates.len(), 4);
    }

    #[test]
    fn test_missing_feature() {
        let mut video = video();
        video.length_seconds = None;
        let err = PredictionPreprocessor::new(scaling())
            .prepare(&video, video.published_at)
            .unwrap_err();
        assert!(matches!(
            err,
            PredictError::MissingFeature { feature } if feature == "videoLengthSeconds"
        ));
    }

    #[test]
    fn test_evaluation_before_publish() {
        let video = video();
        let err = PredictionPreprocessor::new(scaling())
            .prepare(&video, video.published_at - TimeDelta::seconds(1))
            .unwrap_err();
        assert!(matches!(err, PredictError::EvaluationBeforePublish { .. }));
        assert_eq!(elapsed_days(video.published_at, video.published_at).unwrap(), 0.0);
    }
}
