//! Canonicalization of snapshot columns
//!
//! Snapshot files store the publish date as ISO-8601 text, the scan instant as
//! epoch seconds and counts as display strings (`"1.2K"`). [`ColumnNormalizer`]
//! rewrites those cells into [`Cell::Instant`], [`Cell::Integer`] and
//! [`Cell::Bool`] so that typed records can be extracted.
//!
//! Normalization is idempotent: cells already in canonical form are left as
//! they are, so a frame may be normalized any number of times.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::{
    frame::{Cell, Frame},
    numeric::parse_count,
    record::columns,
};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum NormalizeError {
    #[display("column '{column}' row {row}: cannot parse '{value}' as an instant")]
    InvalidInstant {
        column: String,
        row: usize,
        value: String,
    },
    #[display("column '{column}' row {row}: cannot parse '{value}' as a boolean")]
    InvalidBool {
        column: String,
        row: usize,
        value: String,
    },
}

/// How an instant column is stored in snapshot files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstantEncoding {
    /// ISO-8601 text (`2022-01-01 12:00:00`, `2022-01-01T12:00:00Z`, ...).
    Iso8601,
    /// Seconds since the Unix epoch.
    EpochSeconds,
}

#[derive(Debug, Clone)]
pub struct ColumnNormalizer {
    instant_columns: Vec<(String, InstantEncoding)>,
    count_marker: String,
    numeric_columns: Vec<String>,
    bool_columns: Vec<String>,
}

impl Default for ColumnNormalizer {
    fn default() -> Self {
        Self {
            instant_columns: vec![
                (columns::PUBLISH_DATE.to_owned(), InstantEncoding::Iso8601),
                (columns::SCAN_TIMESTAMP.to_owned(), InstantEncoding::EpochSeconds),
                (columns::FIRST_TRENDING_TIME.to_owned(), InstantEncoding::Iso8601),
            ],
            count_marker: "number".to_owned(),
            numeric_columns: vec![
                columns::LENGTH_SECONDS.to_owned(),
                columns::TIME_TO_TREND_SECONDS.to_owned(),
            ],
            bool_columns: vec![
                columns::CREATOR_VERIFIED.to_owned(),
                columns::IS_TREND.to_owned(),
            ],
        }
    }
}

impl ColumnNormalizer {
    /// Whether `name` holds a display-formatted count (`creatorSubscriberNumber`,
    /// `numberLikes`, ...).
    #[must_use]
    pub fn is_count_column(&self, name: &str) -> bool {
        name.to_lowercase().contains(&self.count_marker)
    }

    /// Normalizes every known column present in `frame`. Absent columns are
    /// skipped.
    pub fn normalize(&self, frame: &mut Frame) -> Result<(), NormalizeError> {
        for (name, encoding) in &self.instant_columns {
            if let Some(idx) = frame.column_index(name) {
                for (row, cell) in frame.column_cells_mut(idx).enumerate() {
                    normalize_instant(cell, *encoding).map_err(|value| {
                        NormalizeError::InvalidInstant {
                            column: name.clone(),
                            row,
                            value,
                        }
                    })?;
                }
            }
        }

        let numeric = frame
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, name)| self.is_count_column(name) || self.numeric_columns.contains(name))
            .map(|(idx, name)| (idx, name.clone(), self.numeric_columns.contains(name)))
            .collect::<Vec<_>>();
        for (idx, name, exact) in numeric {
            let degraded = frame
                .column_cells_mut(idx)
                .map(|cell| if exact { normalize_number(cell) } else { normalize_count(cell) })
                .filter(|degraded| *degraded)
                .count();
            if degraded > 0 {
                tracing::warn!(column = %name, degraded, "unparseable counts replaced by null");
            }
        }

        for name in &self.bool_columns {
            if let Some(idx) = frame.column_index(name) {
                for (row, cell) in frame.column_cells_mut(idx).enumerate() {
                    normalize_bool(cell).map_err(|value| NormalizeError::InvalidBool {
                        column: name.clone(),
                        row,
                        value,
                    })?;
                }
            }
        }

        Ok(())
    }

    /// Like [`Self::normalize`], consuming and returning the frame.
    pub fn normalized(&self, mut frame: Frame) -> Result<Frame, NormalizeError> {
        self.normalize(&mut frame)?;
        Ok(frame)
    }
}

/// Parses ISO-8601 text into a UTC instant.
///
/// Text without an offset is taken as UTC; a bare date is midnight UTC.
///
/// ```
/// use youtrend_dataset::normalize::parse_iso_instant;
///
/// let a = parse_iso_instant("2022-01-01 12:00:00").unwrap();
/// let b = parse_iso_instant("2022-01-01T13:00:00+01:00").unwrap();
/// assert_eq!(a, b);
/// ```
#[must_use]
pub fn parse_iso_instant(text: &str) -> Option<DateTime<Utc>> {
    const OFFSET_FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S%.f%:z",
        "%Y-%m-%d %H:%M:%S%.f%z",
        "%Y-%m-%dT%H:%M:%S%.f%:z",
        "%Y-%m-%dT%H:%M:%S%.f%z",
    ];
    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];

    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.to_utc());
    }
    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(text, fmt).ok())
    {
        return Some(dt.to_utc());
    }
    if let Some(dt) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
    {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[expect(clippy::cast_possible_truncation)]
fn instant_from_epoch(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9).round() as u32;
    DateTime::from_timestamp(whole as i64, nanos.min(999_999_999))
}

fn parse_epoch_text(text: &str) -> Option<DateTime<Utc>> {
    text.trim().parse::<f64>().ok().and_then(instant_from_epoch)
}

#[expect(clippy::cast_precision_loss)]
fn normalize_instant(cell: &mut Cell, encoding: InstantEncoding) -> Result<(), String> {
    let parsed = match cell {
        Cell::Null | Cell::Instant(_) => return Ok(()),
        Cell::Integer(v) => instant_from_epoch(*v as f64),
        Cell::Float(v) => instant_from_epoch(*v),
        Cell::Text(text) => match encoding {
            InstantEncoding::Iso8601 => {
                parse_iso_instant(text).or_else(|| parse_epoch_text(text))
            }
            InstantEncoding::EpochSeconds => {
                parse_epoch_text(text).or_else(|| parse_iso_instant(text))
            }
        },
        Cell::Bool(_) => None,
    };
    match parsed {
        Some(instant) => {
            *cell = Cell::Instant(instant);
            Ok(())
        }
        None => Err(cell.to_string()),
    }
}

/// Returns `true` when a non-null value had to be replaced by null.
#[expect(clippy::cast_possible_truncation)]
fn normalize_count(cell: &mut Cell) -> bool {
    let parsed = match cell {
        Cell::Null | Cell::Integer(_) => return false,
        Cell::Float(v) if v.is_finite() => Some(v.round() as i64),
        Cell::Text(text) => parse_count(text),
        Cell::Float(_) | Cell::Bool(_) | Cell::Instant(_) => None,
    };
    let degraded = parsed.is_none();
    *cell = Cell::from(parsed);
    degraded
}

/// Like [`normalize_count`], but plain decimal text keeps its fraction.
#[expect(clippy::cast_possible_truncation)]
fn normalize_number(cell: &mut Cell) -> bool {
    if let Cell::Text(text) = cell
        && let Ok(value) = text.trim().parse::<f64>()
        && value.is_finite()
    {
        *cell = if value.fract() == 0.0 && value.abs() < 9e15 {
            Cell::Integer(value as i64)
        } else {
            Cell::Float(value)
        };
        return false;
    }
    match cell {
        Cell::Float(_) => false,
        _ => normalize_count(cell),
    }
}

fn normalize_bool(cell: &mut Cell) -> Result<(), String> {
    let parsed = match cell {
        Cell::Null | Cell::Bool(_) => return Ok(()),
        Cell::Integer(0) => Some(false),
        Cell::Integer(1) => Some(true),
        Cell::Text(text) => match text.trim().to_lowercase().as_str() {
            "true" | "1" | "1.0" | "yes" => Some(true),
            "false" | "0" | "0.0" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    };
    match parsed {
        Some(value) => {
            *cell = Cell::Bool(value);
            Ok(())
        }
        None => Err(cell.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn raw_frame() -> Frame {
        let data = "\
videoExactPublishDate,scanTimeStamp,numberLikes,exactViewNumber,numberOfComments,creatorSubscriberNumber,videoLengthSeconds,isCreatorVerified
2022-01-01 12:00:00,1641062400,1.2K,1000,500,800,212,True
2022-02-01 15:30:00,1643750700,3.5M,2.2M,1K,1.8M,61,False
";
        Frame::from_csv_reader(csv::Reader::from_reader(data.as_bytes())).unwrap()
    }

    #[test]
    fn test_normalizes_known_columns() {
        let frame = ColumnNormalizer::default().normalized(raw_frame()).unwrap();

        assert_eq!(
            frame.get(0, columns::PUBLISH_DATE),
            Some(&Cell::Instant(
                Utc.with_ymd_and_hms(2022, 1, 1, 12, 0, 0).unwrap()
            ))
        );
        assert_eq!(
            frame.get(0, columns::SCAN_TIMESTAMP),
            Some(&Cell::Instant(
                Utc.with_ymd_and_hms(2022, 1, 1, 18, 40, 0).unwrap()
            ))
        );
        assert_eq!(frame.get(0, "numberLikes"), Some(&Cell::Integer(1_200)));
        assert_eq!(frame.get(1, "numberLikes"), Some(&Cell::Integer(3_500_000)));
        assert_eq!(frame.get(1, "exactViewNumber"), Some(&Cell::Integer(2_200_000)));
        assert_eq!(frame.get(1, "numberOfComments"), Some(&Cell::Integer(1_000)));
        assert_eq!(
            frame.get(1, columns::SUBSCRIBERS),
            Some(&Cell::Integer(1_800_000))
        );
        assert_eq!(frame.get(0, columns::LENGTH_SECONDS), Some(&Cell::Integer(212)));
        assert_eq!(frame.get(0, columns::CREATOR_VERIFIED), Some(&Cell::Bool(true)));
        assert_eq!(frame.get(1, columns::CREATOR_VERIFIED), Some(&Cell::Bool(false)));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let normalizer = ColumnNormalizer::default();
        let once = normalizer.normalized(raw_frame()).unwrap();
        let twice = normalizer.normalized(once.clone()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_malformed_count_becomes_null() {
        let mut frame = Frame::new(["creatorSubscriberNumber"]);
        frame.push_row(vec![Cell::from("hidden")]).unwrap();
        frame.push_row(vec![Cell::Float(12.6)]).unwrap();
        let frame = ColumnNormalizer::default().normalized(frame).unwrap();
        assert_eq!(frame.get(0, columns::SUBSCRIBERS), Some(&Cell::Null));
        assert_eq!(frame.get(1, columns::SUBSCRIBERS), Some(&Cell::Integer(13)));
    }

    #[test]
    fn test_explicit_numeric_columns_keep_fractions() {
        let mut frame = Frame::new([columns::TIME_TO_TREND_SECONDS, columns::LENGTH_SECONDS]);
        frame
            .push_row(vec![Cell::from("100800.5"), Cell::from("212")])
            .unwrap();
        frame
            .push_row(vec![Cell::from("1.2K"), Cell::from("n/a")])
            .unwrap();
        let frame = ColumnNormalizer::default().normalized(frame).unwrap();
        assert_eq!(
            frame.get(0, columns::TIME_TO_TREND_SECONDS),
            Some(&Cell::Float(100_800.5))
        );
        assert_eq!(frame.get(0, columns::LENGTH_SECONDS), Some(&Cell::Integer(212)));
        assert_eq!(
            frame.get(1, columns::TIME_TO_TREND_SECONDS),
            Some(&Cell::Integer(1_200))
        );
        assert_eq!(frame.get(1, columns::LENGTH_SECONDS), Some(&Cell::Null));
    }

    #[test]
    fn test_count_column_detection_is_case_insensitive() {
        let normalizer = ColumnNormalizer::default();
        assert!(normalizer.is_count_column("numberLikes"));
        assert!(normalizer.is_count_column("creatorSubscriberNumber"));
        assert!(normalizer.is_count_column("NUMBER_OF_SHARES"));
        assert!(!normalizer.is_count_column("videoTitle"));
    }

    #[test]
    fn test_invalid_publish_date_is_an_error() {
        let mut frame = Frame::new([columns::PUBLISH_DATE]);
        frame.push_row(vec![Cell::from("yesterday")]).unwrap();
        let err = ColumnNormalizer::default().normalized(frame).unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidInstant { row: 0, .. }));
    }

    #[test]
    fn test_fractional_epoch() {
        let mut frame = Frame::new([columns::SCAN_TIMESTAMP]);
        frame.push_row(vec![Cell::from("1641139200.5")]).unwrap();
        let frame = ColumnNormalizer::default().normalized(frame).unwrap();
        let expected = DateTime::from_timestamp(1_641_139_200, 500_000_000).unwrap();
        assert_eq!(frame.get(0, columns::SCAN_TIMESTAMP), Some(&Cell::Instant(expected)));
    }

    #[test]
    fn test_iso_variants() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 5, 8, 30, 0).unwrap();
        for text in [
            "2024-03-05T08:30:00Z",
            "2024-03-05 08:30:00",
            "2024-03-05T08:30:00",
            "2024-03-05 09:30:00+01:00",
            "2024-03-05T08:30:00.000000Z",
            "2024-03-05 08:30",
        ] {
            assert_eq!(parse_iso_instant(text), Some(expected), "{text}");
        }
        assert_eq!(
            parse_iso_instant("2024-03-05"),
            Some(Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_iso_instant("05/03/2024"), None);
    }

    #[test]
    fn test_text_instant_written_back_reparses() {
        let mut frame = Frame::new([columns::SCAN_TIMESTAMP]);
        frame
            .push_row(vec![Cell::from("2022-01-02T16:00:00Z")])
            .unwrap();
        let frame = ColumnNormalizer::default().normalized(frame).unwrap();
        assert_eq!(
            frame.get(0, columns::SCAN_TIMESTAMP),
            Some(&Cell::Instant(
                Utc.with_ymd_and_hms(2022, 1, 2, 16, 0, 0).unwrap()
            ))
        );
    }
}
