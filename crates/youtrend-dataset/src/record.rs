//! Typed records of the duration-model pipeline
//!
//! ```text
//! Frame (normalized)
//!     ↓ Observation::from_frame
//! Observation      one row per (scan, video)
//!     ↓ DurationLabeler
//! LabeledRecord    + firstTrendingTime, timeToTrendSeconds, isTrend
//!     ↓ FeatureEncoder::fit
//! TrainingRecord   + dayOfWeek, day durations, category one-hot
//! ```

use chrono::{DateTime, Utc, Weekday};

use crate::frame::{Cell, Frame, SchemaError};

/// Column names shared with the scraper output and the training table file.
pub mod columns {
    pub const VIDEO_ID: &str = "videoId";
    pub const PUBLISH_DATE: &str = "videoExactPublishDate";
    pub const SCAN_TIMESTAMP: &str = "scanTimeStamp";
    pub const SUBSCRIBERS: &str = "creatorSubscriberNumber";
    pub const LENGTH_SECONDS: &str = "videoLengthSeconds";
    pub const CATEGORY: &str = "videoCategory";
    pub const CREATOR_VERIFIED: &str = "isCreatorVerified";
    pub const FIRST_TRENDING_TIME: &str = "firstTrendingTime";
    pub const IS_TREND: &str = "isTrend";
    pub const TIME_TO_TREND_SECONDS: &str = "timeToTrendSeconds";
    pub const DAY_OF_WEEK: &str = "dayOfWeek";
    pub const VIDEO_LENGTH_DAYS: &str = "videoLengthDays";
    pub const TIME_TO_TREND_DAYS: &str = "timeToTrendDays";
}

pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Fractional seconds from `from` to `to`, negative when `to` is earlier.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn elapsed_seconds(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 1_000.0
}

/// One sighting of one video in one trending-list snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub video_id: String,
    pub published_at: DateTime<Utc>,
    pub scanned_at: DateTime<Utc>,
    pub creator_subscribers: Option<i64>,
    pub length_seconds: Option<i64>,
    pub category: Option<String>,
    pub is_creator_verified: bool,
}

/// An [`Observation`] with its time-to-trend label.
///
/// `first_trending_time` is an aggregate over every observation of the same
/// video, so records are only produced by labeling a whole corpus at once.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledRecord {
    pub observation: Observation,
    pub first_trending_time: DateTime<Utc>,
    pub time_to_trend_seconds: f64,
    pub is_trend: bool,
}

/// Columns every snapshot must carry.
pub const OBSERVATION_COLUMNS: [&str; 7] = [
    columns::VIDEO_ID,
    columns::PUBLISH_DATE,
    columns::SCAN_TIMESTAMP,
    columns::SUBSCRIBERS,
    columns::LENGTH_SECONDS,
    columns::CATEGORY,
    columns::CREATOR_VERIFIED,
];

/// Columns a training table file must carry.
pub const TRAINING_TABLE_COLUMNS: [&str; 10] = [
    columns::VIDEO_ID,
    columns::PUBLISH_DATE,
    columns::SUBSCRIBERS,
    columns::LENGTH_SECONDS,
    columns::CATEGORY,
    columns::CREATOR_VERIFIED,
    columns::SCAN_TIMESTAMP,
    columns::FIRST_TRENDING_TIME,
    columns::IS_TREND,
    columns::TIME_TO_TREND_SECONDS,
];

/// Column positions resolved once per frame.
pub(crate) struct ColumnReader<'a> {
    frame: &'a Frame,
}

impl<'a> ColumnReader<'a> {
    pub(crate) fn new(frame: &'a Frame) -> Self {
        Self { frame }
    }

    pub(crate) fn require(&self, name: &'static str) -> Result<Column, SchemaError> {
        Ok(Column {
            name,
            idx: self.frame.require_column(name)?,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Column {
    name: &'static str,
    idx: usize,
}

impl Column {
    fn invalid(self, row: usize, expected: &'static str, found: &Cell) -> SchemaError {
        SchemaError::InvalidCell {
            column: self.name.to_owned(),
            row,
            expected,
            found: found.kind(),
        }
    }

    pub(crate) fn text(self, row: usize, cells: &[Cell]) -> Result<String, SchemaError> {
        match &cells[self.idx] {
            Cell::Text(s) => Ok(s.clone()),
            Cell::Integer(v) => Ok(v.to_string()),
            other => Err(self.invalid(row, "text", other)),
        }
    }

    pub(crate) fn opt_text(self, row: usize, cells: &[Cell]) -> Result<Option<String>, SchemaError> {
        match &cells[self.idx] {
            Cell::Null => Ok(None),
            _ => self.text(row, cells).map(Some),
        }
    }

    pub(crate) fn instant(self, row: usize, cells: &[Cell]) -> Result<DateTime<Utc>, SchemaError> {
        let cell = &cells[self.idx];
        cell.as_instant()
            .ok_or_else(|| self.invalid(row, "instant", cell))
    }

    pub(crate) fn opt_integer(self, row: usize, cells: &[Cell]) -> Result<Option<i64>, SchemaError> {
        match &cells[self.idx] {
            Cell::Null => Ok(None),
            Cell::Integer(v) => Ok(Some(*v)),
            other => Err(self.invalid(row, "integer", other)),
        }
    }

    pub(crate) fn float(self, row: usize, cells: &[Cell]) -> Result<f64, SchemaError> {
        let cell = &cells[self.idx];
        cell.as_f64().ok_or_else(|| self.invalid(row, "number", cell))
    }

    pub(crate) fn bool_or_false(self, row: usize, cells: &[Cell]) -> Result<bool, SchemaError> {
        match &cells[self.idx] {
            Cell::Null => Ok(false),
            Cell::Bool(v) => Ok(*v),
            other => Err(self.invalid(row, "bool", other)),
        }
    }

    pub(crate) fn bool(self, row: usize, cells: &[Cell]) -> Result<bool, SchemaError> {
        let cell = &cells[self.idx];
        cell.as_bool().ok_or_else(|| self.invalid(row, "bool", cell))
    }
}

struct ObservationColumns {
    video_id: Column,
    published_at: Column,
    scanned_at: Column,
    subscribers: Column,
    length_seconds: Column,
    category: Column,
    creator_verified: Column,
}

impl ObservationColumns {
    fn resolve(frame: &Frame) -> Result<Self, SchemaError> {
        let reader = ColumnReader::new(frame);
        Ok(Self {
            video_id: reader.require(columns::VIDEO_ID)?,
            published_at: reader.require(columns::PUBLISH_DATE)?,
            scanned_at: reader.require(columns::SCAN_TIMESTAMP)?,
            subscribers: reader.require(columns::SUBSCRIBERS)?,
            length_seconds: reader.require(columns::LENGTH_SECONDS)?,
            category: reader.require(columns::CATEGORY)?,
            creator_verified: reader.require(columns::CREATOR_VERIFIED)?,
        })
    }

    fn read(&self, row: usize, cells: &[Cell]) -> Result<Observation, SchemaError> {
        Ok(Observation {
            video_id: self.video_id.text(row, cells)?,
            published_at: self.published_at.instant(row, cells)?,
            scanned_at: self.scanned_at.instant(row, cells)?,
            creator_subscribers: self.subscribers.opt_integer(row, cells)?,
            length_seconds: self.length_seconds.opt_integer(row, cells)?,
            category: self.category.opt_text(row, cells)?,
            is_creator_verified: self.creator_verified.bool_or_false(row, cells)?,
        })
    }
}

impl Observation {
    /// Extracts observations from a normalized frame.
    ///
    /// Fails on the first missing column or non-canonical cell: a corpus with a
    /// broken schema is rejected as a whole.
    pub fn from_frame(frame: &Frame) -> Result<Vec<Self>, SchemaError> {
        let cols = ObservationColumns::resolve(frame)?;
        frame
            .rows()
            .enumerate()
            .map(|(row, cells)| cols.read(row, cells))
            .collect()
    }
}

impl LabeledRecord {
    /// Extracts labeled records from a normalized training table, keeping the
    /// stored labels as they are.
    pub fn from_frame(frame: &Frame) -> Result<Vec<Self>, SchemaError> {
        let cols = ObservationColumns::resolve(frame)?;
        let reader = ColumnReader::new(frame);
        let first_trending = reader.require(columns::FIRST_TRENDING_TIME)?;
        let is_trend = reader.require(columns::IS_TREND)?;
        let time_to_trend = reader.require(columns::TIME_TO_TREND_SECONDS)?;

        frame
            .rows()
            .enumerate()
            .map(|(row, cells)| -> Result<Self, SchemaError> {
                Ok(Self {
                    observation: cols.read(row, cells)?,
                    first_trending_time: first_trending.instant(row, cells)?,
                    time_to_trend_seconds: time_to_trend.float(row, cells)?,
                    is_trend: is_trend.bool(row, cells)?,
                })
            })
            .collect()
    }

    /// Builds a frame with the [`TRAINING_TABLE_COLUMNS`] layout.
    #[must_use]
    pub fn to_frame(records: &[Self]) -> Frame {
        let mut frame = Frame::new(TRAINING_TABLE_COLUMNS);
        for record in records {
            let obs = &record.observation;
            frame
                .push_row(vec![
                    Cell::from(obs.video_id.as_str()),
                    Cell::from(obs.published_at),
                    Cell::from(obs.creator_subscribers),
                    Cell::from(obs.length_seconds),
                    Cell::from(obs.category.as_deref()),
                    Cell::from(obs.is_creator_verified),
                    Cell::from(obs.scanned_at),
                    Cell::from(record.first_trending_time),
                    Cell::from(record.is_trend),
                    Cell::from(record.time_to_trend_seconds),
                ])
                .expect("row matches training table layout");
        }
        frame
    }

    #[must_use]
    pub fn time_to_trend_days(&self) -> f64 {
        self.time_to_trend_seconds / SECONDS_PER_DAY
    }
}

/// English day name, as used in the `dayOfWeek` column.
#[must_use]
pub fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
