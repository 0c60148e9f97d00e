//! Timestamp normalization
//!
//! Watch-history exports changed their time encoding across versions and
//! locales without carrying a version marker, so the format is inferred by
//! trying an ordered list of parser strategies and keeping the first success:
//!
//! 1. Generic (RFC 3339, RFC 2822, dash-delimited ISO variants)
//! 2. ISO-8601 with fractional seconds and a trailing `Z`
//! 3. Slash-delimited `YYYY/MM/DD HH:MM:SS`
//! 4. Abbreviated month `Mon DD, YYYY HH:MM:SS`

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;
use tracing::trace;

use crate::types::{NormalizedTime, TimestampFormat};

/// A timestamp matched none of the known formats.
///
/// Non-fatal: the pipeline carries the record with empty time-derived fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unable to convert '{input}' to datetime")]
pub struct TimestampParseError {
    pub input: String,
}

/// One way of turning text into a timestamp
pub trait TimestampStrategy {
    /// The format this strategy recognizes
    fn format(&self) -> TimestampFormat;

    /// Parse already-trimmed text, returning `None` when it does not match
    fn parse(&self, text: &str) -> Option<NormalizedTime>;
}

const GENERIC_OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

const GENERIC_NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Flexible parser for the common ISO/RFC shapes
pub struct GenericStrategy;

impl TimestampStrategy for GenericStrategy {
    fn format(&self) -> TimestampFormat {
        TimestampFormat::Generic
    }

    fn parse(&self, text: &str) -> Option<NormalizedTime> {
        let format = self.format();

        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(from_offset_datetime(dt, format));
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
            return Some(from_offset_datetime(dt, format));
        }
        for pattern in GENERIC_OFFSET_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(text, pattern) {
                return Some(from_offset_datetime(dt, format));
            }
        }
        for pattern in GENERIC_NAIVE_FORMATS {
            if let Ok(local) = NaiveDateTime::parse_from_str(text, pattern) {
                return Some(from_naive(local, None, format));
            }
        }

        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .map(|date| from_naive(date.and_time(NaiveTime::MIN), None, format))
    }
}

/// `2023-05-14T10:15:30.000Z`
pub struct IsoZuluStrategy;

impl TimestampStrategy for IsoZuluStrategy {
    fn format(&self) -> TimestampFormat {
        TimestampFormat::IsoZulu
    }

    fn parse(&self, text: &str) -> Option<NormalizedTime> {
        NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.fZ")
            .ok()
            .map(|local| from_naive(local, Some(0), self.format()))
    }
}

/// `2023/05/14 10:15:30`
pub struct SlashDelimitedStrategy;

impl TimestampStrategy for SlashDelimitedStrategy {
    fn format(&self) -> TimestampFormat {
        TimestampFormat::SlashDelimited
    }

    fn parse(&self, text: &str) -> Option<NormalizedTime> {
        NaiveDateTime::parse_from_str(text, "%Y/%m/%d %H:%M:%S")
            .ok()
            .map(|local| from_naive(local, None, self.format()))
    }
}

/// `May 14, 2023 10:15:30`
pub struct AbbreviatedMonthStrategy;

impl TimestampStrategy for AbbreviatedMonthStrategy {
    fn format(&self) -> TimestampFormat {
        TimestampFormat::AbbreviatedMonth
    }

    fn parse(&self, text: &str) -> Option<NormalizedTime> {
        NaiveDateTime::parse_from_str(text, "%b %d, %Y %H:%M:%S")
            .ok()
            .map(|local| from_naive(local, None, self.format()))
    }
}

fn from_offset_datetime(dt: DateTime<FixedOffset>, format: TimestampFormat) -> NormalizedTime {
    from_naive(dt.naive_local(), Some(dt.offset().local_minus_utc()), format)
}

fn from_naive(
    local: NaiveDateTime,
    utc_offset_seconds: Option<i32>,
    format: TimestampFormat,
) -> NormalizedTime {
    NormalizedTime {
        local,
        utc_offset_seconds,
        format,
    }
}

/// Ordered list of strategies, evaluated until the first one succeeds
pub struct TimestampNormalizer {
    strategies: Vec<Box<dyn TimestampStrategy>>,
}

impl Default for TimestampNormalizer {
    fn default() -> Self {
        Self::new(vec![
            Box::new(GenericStrategy),
            Box::new(IsoZuluStrategy),
            Box::new(SlashDelimitedStrategy),
            Box::new(AbbreviatedMonthStrategy),
        ])
    }
}

impl TimestampNormalizer {
    /// Create a normalizer with a custom strategy order
    pub fn new(strategies: Vec<Box<dyn TimestampStrategy>>) -> Self {
        Self { strategies }
    }

    /// Formats tried, in order
    pub fn formats(&self) -> Vec<TimestampFormat> {
        self.strategies.iter().map(|s| s.format()).collect()
    }

    /// Normalize a timestamp string.
    ///
    /// Surrounding whitespace is ignored. Never panics; an unrecognized string
    /// yields [`TimestampParseError`].
    pub fn normalize(&self, text: &str) -> Result<NormalizedTime, TimestampParseError> {
        let trimmed = text.trim();

        let parsed = self.strategies.iter().find_map(|strategy| strategy.parse(trimmed));

        match parsed {
            Some(time) => {
                trace!(input = text, format = time.format.as_str(), "normalized timestamp");
                Ok(time)
            }
            None => Err(TimestampParseError {
                input: text.to_string(),
            }),
        }
    }
}

/// Normalize a single timestamp with the default strategy order
pub fn normalize_timestamp(text: &str) -> Result<NormalizedTime, TimestampParseError> {
    TimestampNormalizer::default().normalize(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use pretty_assertions::assert_eq;

    fn assert_instant(time: &NormalizedTime) {
        assert_eq!(
            (
                time.local.year(),
                time.local.month(),
                time.local.day(),
                time.local.hour(),
                time.local.minute(),
                time.local.second()
            ),
            (2023, 5, 14, 10, 15, 30)
        );
    }

    #[test]
    fn test_known_formats_normalize_to_same_instant() {
        let normalizer = TimestampNormalizer::default();

        for input in [
            "2023-05-14T10:15:30.000Z",
            "2023/05/14 10:15:30",
            "May 14, 2023 10:15:30",
            "2023-05-14 10:15:30",
        ] {
            let time = normalizer.normalize(input).unwrap();
            assert_instant(&time);
        }
    }

    #[test]
    fn test_unparseable_is_an_error_value() {
        let result = normalize_timestamp("not-a-date");
        assert_eq!(
            result,
            Err(TimestampParseError {
                input: "not-a-date".to_string()
            })
        );
        assert!(normalize_timestamp("").is_err());
    }

    #[test]
    fn test_matching_strategy_is_recorded() {
        let normalizer = TimestampNormalizer::default();

        let zulu = normalizer.normalize("2023-05-14T10:15:30.000Z").unwrap();
        assert_eq!(zulu.format, TimestampFormat::Generic);
        assert_eq!(zulu.utc_offset_seconds, Some(0));

        let slash = normalizer.normalize("2023/05/14 10:15:30").unwrap();
        assert_eq!(slash.format, TimestampFormat::SlashDelimited);
        assert_eq!(slash.utc_offset_seconds, None);

        let month = normalizer.normalize("May 14, 2023 10:15:30").unwrap();
        assert_eq!(month.format, TimestampFormat::AbbreviatedMonth);
    }

    #[test]
    fn test_individual_strategies() {
        let zulu = IsoZuluStrategy.parse("2023-05-14T10:15:30.123Z").unwrap();
        assert_instant(&zulu);
        assert_eq!(zulu.local.nanosecond(), 123_000_000);
        assert!(IsoZuluStrategy.parse("2023/05/14 10:15:30").is_none());

        assert_instant(&SlashDelimitedStrategy.parse("2023/05/14 10:15:30").unwrap());
        assert!(SlashDelimitedStrategy.parse("2023-05-14 10:15:30").is_none());

        assert_instant(&AbbreviatedMonthStrategy.parse("May 14, 2023 10:15:30").unwrap());
        assert!(AbbreviatedMonthStrategy.parse("14 May 2023 10:15:30").is_none());
    }

    #[test]
    fn test_generic_keeps_wall_clock_and_offset() {
        let time = GenericStrategy.parse("2023-05-14T10:15:30+02:00").unwrap();
        assert_instant(&time);
        assert_eq!(time.utc_offset_seconds, Some(7200));

        let date_only = GenericStrategy.parse("2023-05-14").unwrap();
        assert_eq!(date_only.local.hour(), 0);
        assert_eq!(date_only.local.day(), 14);
    }

    #[test]
    fn test_whitespace_is_ignored() {
        let time = normalize_timestamp("  2023/05/14 10:15:30\n").unwrap();
        assert_instant(&time);
    }

    #[test]
    fn test_custom_order_changes_winner() {
        let normalizer =
            TimestampNormalizer::new(vec![Box::new(IsoZuluStrategy), Box::new(GenericStrategy)]);
        assert_eq!(
            normalizer.formats(),
            vec![TimestampFormat::IsoZulu, TimestampFormat::Generic]
        );

        let time = normalizer.normalize("2023-05-14T10:15:30.000Z").unwrap();
        assert_eq!(time.format, TimestampFormat::IsoZulu);
    }
}
