//! Single-video records supplied at prediction time
//!
//! The fetch collaborator resolves a video link into a [`RawVideoRecord`]
//! (publish date, duration, resolved category label and counts). The record is
//! turned into a one-row [`Frame`] so it goes through the same
//! [`ColumnNormalizer`](crate::normalize::ColumnNormalizer) as the training
//! corpus before [`VideoRecord`]s are extracted.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    frame::{Cell, Frame, SchemaError},
    record::{ColumnReader, columns},
};

/// A count as returned by the platform API: either a number or display text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CountValue {
    Number(i64),
    Text(String),
}

impl CountValue {
    fn to_cell(&self) -> Cell {
        match self {
            Self::Number(n) => Cell::Integer(*n),
            Self::Text(s) => Cell::from(s.as_str()),
        }
    }
}

/// A video length: seconds, or an ISO-8601 duration such as `PT3M45S`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LengthValue {
    Seconds(i64),
    Text(String),
}

impl LengthValue {
    fn to_cell(&self) -> Cell {
        match self {
            Self::Seconds(n) => Cell::Integer(*n),
            Self::Text(s) => match parse_iso8601_duration(s) {
                Some(seconds) => Cell::Integer(seconds),
                None => Cell::from(s.as_str()),
            },
        }
    }
}

/// Per-video attributes as produced by the fetch collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVideoRecord {
    pub video_id: String,
    #[serde(default, alias = "Titre")]
    pub title: Option<String>,
    pub video_exact_publish_date: String,
    #[serde(default)]
    pub video_length_seconds: Option<LengthValue>,
    #[serde(default)]
    pub video_category: Option<String>,
    #[serde(default)]
    pub creator_subscriber_number: Option<CountValue>,
    #[serde(default)]
    pub exact_view_number: Option<CountValue>,
    #[serde(default)]
    pub number_likes: Option<CountValue>,
    #[serde(default)]
    pub number_of_comments: Option<CountValue>,
    #[serde(default)]
    pub is_creator_verified: Option<bool>,
}

impl RawVideoRecord {
    /// Builds a one-row frame with the snapshot column names.
    #[must_use]
    pub fn into_frame(self) -> Frame {
        let count = |value: Option<&CountValue>| value.map_or(Cell::Null, CountValue::to_cell);
        let mut frame = Frame::new([
            columns::VIDEO_ID,
            columns::PUBLISH_DATE,
            columns::LENGTH_SECONDS,
            columns::CATEGORY,
            columns::SUBSCRIBERS,
            "exactViewNumber",
            "numberLikes",
            "numberOfComments",
            columns::CREATOR_VERIFIED,
        ]);
        let row = vec![
            Cell::from(self.video_id.as_str()),
            Cell::from(self.video_exact_publish_date.as_str()),
            self.video_length_seconds
                .as_ref()
                .map_or(Cell::Null, LengthValue::to_cell),
            Cell::from(self.video_category.as_deref()),
            count(self.creator_subscriber_number.as_ref()),
            count(self.exact_view_number.as_ref()),
            count(self.number_likes.as_ref()),
            count(self.number_of_comments.as_ref()),
            self.is_creator_verified.map_or(Cell::Null, Cell::Bool),
        ];
        frame
            .push_row(row)
            .expect("row matches raw video layout");
        frame
    }
}

/// The attributes of one video needed for prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoRecord {
    pub video_id: String,
    pub published_at: DateTime<Utc>,
    pub creator_subscribers: Option<i64>,
    pub length_seconds: Option<i64>,
    pub category: Option<String>,
}

impl VideoRecord {
    /// Extracts records from a normalized frame.
    pub fn from_frame(frame: &Frame) -> Result<Vec<Self>, SchemaError> {
        let reader = ColumnReader::new(frame);
        let video_id = reader.require(columns::VIDEO_ID)?;
        let published_at = reader.require(columns::PUBLISH_DATE)?;
        let subscribers = reader.require(columns::SUBSCRIBERS)?;
        let length_seconds = reader.require(columns::LENGTH_SECONDS)?;
        let category = reader.require(columns::CATEGORY)?;

        frame
            .rows()
            .enumerate()
            .map(|(row, cells)| -> Result<Self, SchemaError> {
                Ok(Self {
                    video_id: video_id.text(row, cells)?,
                    published_at: published_at.instant(row, cells)?,
                    creator_subscribers: subscribers.opt_integer(row, cells)?,
                    length_seconds: length_seconds.opt_integer(row, cells)?,
                    category: category.opt_text(row, cells)?,
                })
            })
            .collect()
    }
}

static DURATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$")
        .expect("valid duration pattern")
});

/// Converts an ISO-8601 duration as used by the platform API into seconds.
///
/// ```
/// use youtrend_dataset::video::parse_iso8601_duration;
///
/// assert_eq!(parse_iso8601_duration("PT1H2M3S"), Some(3_723));
/// assert_eq!(parse_iso8601_duration("PT3M45S"), Some(225));
/// assert_eq!(parse_iso8601_duration("3:45"), None);
/// ```
#[must_use]
pub fn parse_iso8601_duration(text: &str) -> Option<i64> {
    let captures = DURATION_PATTERN.captures(text.trim())?;
    let part = |idx: usize| -> Option<i64> {
        captures
            .get(idx)
            .map_or(Some(0), |m| m.as_str().parse().ok())
    };
    let seconds = part(1)?
        .checked_mul(86_400)?
        .checked_add(part(2)?.checked_mul(3_600)?)?
        .checked_add(part(3)?.checked_mul(60)?)?
        .checked_add(part(4)?)?;
    Some(seconds)
}

/// Extracts the video id from a watch, short-link or shorts URL.
///
/// ```
/// use youtrend_dataset::video::video_id_from_link;
///
/// assert_eq!(
///     video_id_from_link("https://www.youtube.com/watch?v=ABC123").as_deref(),
///     Some("ABC123")
/// );
/// assert_eq!(video_id_from_link("https://youtu.be/XYZ").as_deref(), Some("XYZ"));
/// assert_eq!(video_id_from_link("https://example.com/watch?v=ABC123"), None);
/// ```
#[must_use]
pub fn video_id_from_link(link: &str) -> Option<String> {
    let url = Url::parse(link.trim()).ok()?;
    let host = url.host_str()?;
    let segments = url
        .path_segments()
        .map(|s| s.filter(|s| !s.is_empty()).collect::<Vec<_>>())
        .unwrap_or_default();

    let id = match host {
        "youtu.be" => segments.first().copied().map(str::to_owned),
        "www.youtube.com" | "youtube.com" | "m.youtube.com" => match segments.as_slice() {
            ["watch"] => url
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned()),
            ["shorts" | "embed" | "live", id, ..] => Some((*id).to_owned()),
            _ => None,
        },
        _ => None,
    };
    if id.is_none() {
        tracing::warn!(link, "video link not recognized");
    }
    id.filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use crate::normalize::ColumnNormalizer;

    use super::*;

    const RAW_JSON: &str = r#"{
        "videoId": "ABC123",
        "Titre": "Example Video Title",
        "videoExactPublishDate": "2022-01-01T12:00:00Z",
        "videoLengthSeconds": "PT3M45S",
        "videoCategory": "Film & Animation",
        "creatorSubscriberNumber": "1.8M",
        "exactViewNumber": 1000,
        "numberLikes": "12"
    }"#;

    #[test]
    fn test_raw_record_to_video_record() {
        let raw: RawVideoRecord = serde_json::from_str(RAW_JSON).unwrap();
        assert_eq!(raw.title.as_deref(), Some("Example Video Title"));
        assert_eq!(raw.number_of_comments, None);

        let frame = ColumnNormalizer::default()
            .normalized(raw.into_frame())
            .unwrap();
        let records = VideoRecord::from_frame(&frame).unwrap();
        assert_eq!(
            records,
            [VideoRecord {
                video_id: "ABC123".into(),
                published_at: Utc.with_ymd_and_hms(2022, 1, 1, 12, 0, 0).unwrap(),
                creator_subscribers: Some(1_800_000),
                length_seconds: Some(225),
                category: Some("Film & Animation".into()),
            }]
        );
        assert_eq!(frame.get(0, "exactViewNumber"), Some(&Cell::Integer(1_000)));
    }

    #[test]
    fn test_length_in_seconds() {
        let raw: RawVideoRecord = serde_json::from_str(
            r#"{"videoId": "x", "videoExactPublishDate": "2022-01-01", "videoLengthSeconds": 61}"#,
        )
        .unwrap();
        let frame = raw.into_frame();
        assert_eq!(frame.get(0, columns::LENGTH_SECONDS), Some(&Cell::Integer(61)));
        assert_eq!(frame.get(0, columns::SUBSCRIBERS), Some(&Cell::Null));
    }

    #[test]
    fn test_durations() {
        assert_eq!(parse_iso8601_duration("PT45S"), Some(45));
        assert_eq!(parse_iso8601_duration("PT2H"), Some(7_200));
        assert_eq!(parse_iso8601_duration("P1DT1S"), Some(86_401));
        assert_eq!(parse_iso8601_duration("P0D"), Some(0));
        assert_eq!(parse_iso8601_duration(""), None);
        assert_eq!(parse_iso8601_duration("PT1.5S"), None);
    }

    #[test]
    fn test_video_links() {
        for (link, expected) in [
            ("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s", Some("dQw4w9WgXcQ")),
            ("https://youtube.com/shorts/abcDEF", Some("abcDEF")),
            ("https://youtu.be/abcDEF?si=xyz", Some("abcDEF")),
            ("https://www.youtube.com/channel/UC123", None),
            ("https://www.youtube.com/watch", None),
            ("not a link", None),
        ] {
            assert_eq!(video_id_from_link(link).as_deref(), expected, "{link}");
        }
    }
}
