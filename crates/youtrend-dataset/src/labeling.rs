//! Time-to-trend labeling
//!
//! Every video is labeled with the first scan instant it was seen on the
//! trending list. Whether that first sighting counts as an observed event
//! depends on the reliable observation window of the whole corpus:
//!
//! ```text
//! start = min(publish instant)
//! end   = max(scan instant) - delay * frequency
//! isTrend = start <= firstTrendingTime <= end
//! ```
//!
//! Videos first seen after `end` are right-censored: they may have trended
//! just before the scraper stopped, or just after, and the corpus cannot tell.

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::record::{LabeledRecord, Observation, elapsed_seconds};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum LabelError {
    #[display("cannot label an empty corpus")]
    EmptyCorpus,
    #[display("invalid labeling delay {delay}")]
    InvalidDelay { delay: f64 },
    #[display(
        "video '{video_id}' was first seen trending {seconds} seconds after publication; time-to-trend must be positive"
    )]
    NonPositiveTimeToTrend { video_id: String, seconds: f64 },
}

/// Unit of the labeling delay.
#[derive(
    Default,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::FromStr,
)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    #[display("hour")]
    Hour,
    #[display("day")]
    Day,
}

impl Frequency {
    #[must_use]
    pub const fn seconds(self) -> f64 {
        match self {
            Self::Hour => 3_600.0,
            Self::Day => 86_400.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelingConfig {
    pub frequency: Frequency,
    pub delay: f64,
}

impl Default for LabelingConfig {
    fn default() -> Self {
        Self {
            frequency: Frequency::Hour,
            delay: 1.5,
        }
    }
}

impl LabelingConfig {
    /// The delay as a duration.
    #[expect(clippy::cast_possible_truncation)]
    pub fn delay_duration(&self) -> Result<TimeDelta, LabelError> {
        let millis = self.delay * self.frequency.seconds() * 1_000.0;
        if !millis.is_finite() || millis < 0.0 || millis > 1e15 {
            return Err(LabelError::InvalidDelay { delay: self.delay });
        }
        Ok(TimeDelta::milliseconds(millis.round() as i64))
    }
}

/// The reliable observation window of a corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CensoringWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl CensoringWindow {
    pub fn from_observations(
        observations: &[Observation],
        config: &LabelingConfig,
    ) -> Result<Self, LabelError> {
        let start = observations
            .iter()
            .map(|obs| obs.published_at)
            .min()
            .ok_or(LabelError::EmptyCorpus)?;
        let last_scan = observations
            .iter()
            .map(|obs| obs.scanned_at)
            .max()
            .ok_or(LabelError::EmptyCorpus)?;
        Ok(Self {
            start,
            end: last_scan - config.delay_duration()?,
        })
    }

    /// Whether `instant` lies inside the window, bounds included.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

#[derive(Debug, Clone, Default)]
pub struct DurationLabeler {
    config: LabelingConfig,
}

impl DurationLabeler {
    #[must_use]
    pub fn new(config: LabelingConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &LabelingConfig {
        &self.config
    }

    /// Labels a whole corpus. Output rows are in input order.
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use youtrend_dataset::{
    ///     labeling::{DurationLabeler, LabelingConfig},
    ///     record::Observation,
    /// };
    ///
    /// let observation = Observation {
    ///     video_id: "abc".into(),
    ///     published_at: Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap(),
    ///     scanned_at: Utc.with_ymd_and_hms(2022, 1, 1, 6, 0, 0).unwrap(),
    ///     creator_subscribers: Some(1_000),
    ///     length_seconds: Some(60),
    ///     category: Some("Music".into()),
    ///     is_creator_verified: false,
    /// };
    /// let labeled = DurationLabeler::new(LabelingConfig::default())
    ///     .label(vec![observation])
    ///     .unwrap();
    /// assert_eq!(labeled[0].time_to_trend_seconds, 21_600.0);
    /// // the only sighting is inside the 1.5 hour end margin
    /// assert!(!labeled[0].is_trend);
    /// ```
    pub fn label(&self, observations: Vec<Observation>) -> Result<Vec<LabeledRecord>, LabelError> {
        let window = CensoringWindow::from_observations(&observations, &self.config)?;

        let mut first_seen = HashMap::<&str, DateTime<Utc>>::new();
        for obs in &observations {
            first_seen
                .entry(obs.video_id.as_str())
                .and_modify(|first| *first = (*first).min(obs.scanned_at))
                .or_insert(obs.scanned_at);
        }
        let first_seen = first_seen
            .into_iter()
            .map(|(id, first)| (id.to_owned(), first))
            .collect::<HashMap<_, _>>();

        let records = observations
            .into_iter()
            .map(|observation| {
                let first_trending_time = first_seen[&observation.video_id];
                let seconds = elapsed_seconds(observation.published_at, first_trending_time);
                if seconds <= 0.0 {
                    return Err(LabelError::NonPositiveTimeToTrend {
                        video_id: observation.video_id,
                        seconds,
                    });
                }
                Ok(LabeledRecord {
                    observation,
                    first_trending_time,
                    time_to_trend_seconds: seconds,
                    is_trend: window.contains(first_trending_time),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            rows = records.len(),
            videos = first_seen.len(),
            trending = records.iter().filter(|r| r.is_trend).count(),
            window_start = %window.start,
            window_end = %window.end,
            "labeled corpus"
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn observation(id: &str, published_at: DateTime<Utc>, scan_epoch: i64) -> Observation {
        Observation {
            video_id: id.to_owned(),
            published_at,
            scanned_at: DateTime::from_timestamp(scan_epoch, 0).unwrap(),
            creator_subscribers: Some(1_000),
            length_seconds: Some(120),
            category: Some("Comedy".to_owned()),
            is_creator_verified: false,
        }
    }

    fn boundary_corpus() -> Vec<Observation> {
        let first_publish = Utc.with_ymd_and_hms(2022, 1, 1, 12, 0, 0).unwrap();
        let second_publish = Utc.with_ymd_and_hms(2022, 1, 2, 12, 0, 0).unwrap();
        vec![
            observation("video1", first_publish, 1_641_139_200),
            observation("video1", first_publish, 1_641_225_600),
            observation("video2", second_publish, 1_641_225_600),
        ]
    }

    #[test]
    fn test_window_boundary_splits_equal_durations() {
        let labeler = DurationLabeler::new(LabelingConfig {
            frequency: Frequency::Day,
            delay: 1.0,
        });
        let labeled = labeler.label(boundary_corpus()).unwrap();

        let is_trend = labeled.iter().map(|r| r.is_trend).collect::<Vec<_>>();
        assert_eq!(is_trend, [true, true, false]);
        for record in &labeled {
            assert_eq!(record.time_to_trend_seconds, 100_800.0);
        }
        assert_eq!(labeled[2].observation.video_id, "video2");
    }

    #[test]
    fn test_first_trending_time_is_broadcast() {
        let labeled = DurationLabeler::default().label(boundary_corpus()).unwrap();
        let first = DateTime::from_timestamp(1_641_139_200, 0).unwrap();
        assert_eq!(labeled[0].first_trending_time, first);
        assert_eq!(labeled[1].first_trending_time, first);
        assert_eq!(
            labeled[2].first_trending_time,
            DateTime::from_timestamp(1_641_225_600, 0).unwrap()
        );
    }

    #[test]
    fn test_window() {
        let window = CensoringWindow::from_observations(
            &boundary_corpus(),
            &LabelingConfig::default(),
        )
        .unwrap();
        assert_eq!(window.start, Utc.with_ymd_and_hms(2022, 1, 1, 12, 0, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2022, 1, 3, 14, 30, 0).unwrap());
        assert!(window.contains(window.start));
        assert!(window.contains(window.end));
        assert!(!window.contains(window.end + TimeDelta::seconds(1)));
    }

    #[test]
    fn test_empty_corpus() {
        let err = DurationLabeler::default().label(vec![]).unwrap_err();
        assert!(matches!(err, LabelError::EmptyCorpus));
    }

    #[test]
    fn test_non_positive_time_to_trend_is_rejected() {
        let published = DateTime::from_timestamp(1_641_139_200, 0).unwrap();
        let corpus = vec![observation("early", published, 1_641_139_200)];
        let err = DurationLabeler::default().label(corpus).unwrap_err();
        assert!(matches!(
            err,
            LabelError::NonPositiveTimeToTrend { ref video_id, .. } if video_id == "early"
        ));
    }

    #[test]
    fn test_invalid_delay() {
        let config = LabelingConfig {
            frequency: Frequency::Hour,
            delay: -1.0,
        };
        let err = DurationLabeler::new(config).label(boundary_corpus()).unwrap_err();
        assert!(matches!(err, LabelError::InvalidDelay { .. }));
    }

    #[test]
    fn test_config_from_json_uses_defaults() {
        let config: LabelingConfig = serde_json::from_str(r#"{"frequency": "day"}"#).unwrap();
        assert_eq!(config.frequency, Frequency::Day);
        assert_eq!(config.delay, 1.5);
        assert_eq!("Day".parse::<Frequency>().unwrap(), Frequency::Day);
        assert_eq!(Frequency::Hour.to_string(), "hour");
    }
}
