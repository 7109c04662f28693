//! Parsing of human-formatted counts
//!
//! Scraped pages display counts the way a person reads them: `"1.2K"`,
//! `"3.5M"`, `"12,345"`. This module turns those strings into integers.
//!
//! Malformed values never abort a batch: they become `None`.
//!
//! ```
//! use youtrend_dataset::numeric::parse_count;
//!
//! assert_eq!(parse_count("4.5K"), Some(4_500));
//! assert_eq!(parse_count(" 1.2M "), Some(1_200_000));
//! assert_eq!(parse_count("12,345"), Some(12_345));
//! assert_eq!(parse_count("abc"), None);
//! ```

use std::sync::LazyLock;

use regex::Regex;

static COUNT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)([km]?)").expect("valid count pattern"));

/// Parses one human-formatted count.
///
/// Whitespace is trimmed, thousands separators are removed and the value is
/// lower-cased before searching for `<number>[k|m]`. The suffix multiplies the
/// number by 1 000 or 1 000 000 and the result is rounded to the nearest integer.
#[expect(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
#[must_use]
pub fn parse_count(value: &str) -> Option<i64> {
    let normalized = value.trim().replace(',', "").to_lowercase();
    let captures = COUNT_PATTERN.captures(&normalized)?;
    let number = captures[1].parse::<f64>().ok()?;
    let multiplier = match captures.get(2).map(|m| m.as_str()) {
        Some("k") => 1e3,
        Some("m") => 1e6,
        _ => 1.0,
    };
    let scaled = (number * multiplier).round();
    if !scaled.is_finite() || scaled > i64::MAX as f64 {
        return None;
    }
    Some(scaled as i64)
}

/// Parses a sequence of human-formatted counts, element by element.
///
/// ```
/// use youtrend_dataset::numeric::parse_counts;
///
/// let parsed = parse_counts(["abc", "4.5K", "1.2M"]);
/// assert_eq!(parsed, vec![None, Some(4_500), Some(1_200_000)]);
/// ```
pub fn parse_counts<I, S>(values: I) -> Vec<Option<i64>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values.into_iter().map(|v| parse_count(v.as_ref())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_integers() {
        assert_eq!(parse_count("800"), Some(800));
        assert_eq!(parse_count("0"), Some(0));
        assert_eq!(parse_count("1,234,567"), Some(1_234_567));
    }

    #[test]
    fn test_suffixes_are_case_insensitive() {
        assert_eq!(parse_count("1K"), Some(1_000));
        assert_eq!(parse_count("1k"), Some(1_000));
        assert_eq!(parse_count("3.5M"), Some(3_500_000));
        assert_eq!(parse_count("3.5m"), Some(3_500_000));
        assert_eq!(parse_count("1.8M"), Some(1_800_000));
    }

    #[test]
    fn test_rounds_to_nearest() {
        assert_eq!(parse_count("1.2346K"), Some(1_235));
        assert_eq!(parse_count("2.5"), Some(3));
    }

    #[test]
    fn test_embedded_in_text() {
        assert_eq!(parse_count("  2.2M views"), Some(2_200_000));
        assert_eq!(parse_count("subscribers: 15K"), Some(15_000));
    }

    #[test]
    fn test_malformed_values_are_none() {
        assert_eq!(parse_count(""), None);
        assert_eq!(parse_count("   "), None);
        assert_eq!(parse_count("abc"), None);
        assert_eq!(parse_count("K"), None);
    }

    #[test]
    fn test_parse_counts_keeps_positions() {
        let parsed = parse_counts(vec!["1K".to_string(), "n/a".to_string(), "7".to_string()]);
        assert_eq!(parsed, vec![Some(1_000), None, Some(7)]);
    }
}
