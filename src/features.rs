//! Feature derivation
//!
//! This module derives analysis features from a cleaned record and its
//! normalized timestamp:
//! - Calendar components (day, month, year, hour, minute, second)
//! - Time-of-day bucket
//! - Season
//! - Weekend flag

use crate::normalizer::TimestampParseError;
use crate::types::{AnalysisRecord, CleanedRecord, NormalizedTime, Season, TimeOfDay};

/// Bucket an hour of the day.
///
/// Anything outside 6..24 (including negative or out-of-range values) is Night.
pub fn time_of_day(hour: i64) -> TimeOfDay {
    match hour {
        6..=11 => TimeOfDay::Morning,
        12..=17 => TimeOfDay::Afternoon,
        18..=23 => TimeOfDay::Evening,
        _ => TimeOfDay::Night,
    }
}

/// Map a month number to its season. Invalid months fall into Winter.
pub fn season(month: i64) -> Season {
    match month {
        3..=5 => Season::Spring,
        6..=8 => Season::Summer,
        9..=11 => Season::Autumn,
        _ => Season::Winter,
    }
}

/// Saturday (5) and Sunday (6) with Monday = 0
pub fn is_weekend(weekday_index: i64) -> bool {
    matches!(weekday_index, 5 | 6)
}

/// Feature deriver for building analysis records
pub struct FeatureDeriver;

impl FeatureDeriver {
    /// Derive all features for one record from its normalization outcome
    pub fn derive(
        record: CleanedRecord,
        time: Result<NormalizedTime, TimestampParseError>,
    ) -> AnalysisRecord {
        let CleanedRecord { title, extra, .. } = record;

        match time {
            Ok(time) => AnalysisRecord {
                title,
                extra,
                time: Some(time),
                day: Some(time.day()),
                month: Some(time.month()),
                year: Some(time.year()),
                hour: Some(time.hour()),
                minute: Some(time.minute()),
                second: Some(time.second()),
                time_of_day: Some(time_of_day(i64::from(time.hour()))),
                season: Some(season(i64::from(time.month()))),
                weekend: Some(is_weekend(i64::from(time.weekday_index()))),
            },
            Err(_) => AnalysisRecord {
                title,
                extra,
                time: None,
                day: None,
                month: None,
                year: None,
                hour: None,
                minute: None,
                second: None,
                time_of_day: None,
                season: None,
                weekend: None,
            },
        }
    }
}
