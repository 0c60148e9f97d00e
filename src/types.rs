//! Core types for the tubestat pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: raw export records, cleaned records, normalized timestamps and the
//! finished analysis table.

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// One entry of a watch-history export, attributes as they occur in the file.
///
/// Attributes the pipeline does not know about are preserved in `extra` so the
/// persisted partition keeps everything the export contained. Known attributes
/// are kept as raw JSON values: a wrongly typed `header` or `time` only affects
/// its own record. An attribute written as `null` is still present
/// (`Some(Value::Null)`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Category label ("YouTube", "YouTube Music", ...)
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub header: Option<Value>,
    /// Free-text description, usually prefixed with "Watched"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,
    /// Timestamp in one of several textual encodings
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub time: Option<Value>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub details: Option<Value>,
    #[serde(
        rename = "activityControls",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub activity_controls: Option<Value>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub products: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawRecord {
    /// The header when it is a string
    pub fn header_str(&self) -> Option<&str> {
        self.header.as_ref().and_then(Value::as_str)
    }

    /// The title when it is a string
    pub fn title_str(&self) -> Option<&str> {
        self.title.as_ref().and_then(Value::as_str)
    }
}

/// Any value under a key that exists, `null` included
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// A record with the irrelevant attributes dropped and the title normalized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanedRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub time: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<CleanedRecord> for RawRecord {
    fn from(record: CleanedRecord) -> Self {
        RawRecord {
            title: record.title.map(Value::String),
            time: record.time,
            extra: record.extra,
            ..Default::default()
        }
    }
}

/// Which parser strategy recognized a timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampFormat {
    /// RFC 3339 / RFC 2822 / dash-delimited ISO variants
    Generic,
    /// `2023-05-14T10:15:30.000Z`
    IsoZulu,
    /// `2023/05/14 10:15:30`
    SlashDelimited,
    /// `May 14, 2023 10:15:30`
    AbbreviatedMonth,
}

impl TimestampFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimestampFormat::Generic => "generic",
            TimestampFormat::IsoZulu => "iso_zulu",
            TimestampFormat::SlashDelimited => "slash_delimited",
            TimestampFormat::AbbreviatedMonth => "abbreviated_month",
        }
    }
}

/// A successfully parsed timestamp.
///
/// `local` holds the wall-clock fields exactly as written in the export;
/// `utc_offset_seconds` is set when the text carried an explicit offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedTime {
    pub local: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc_offset_seconds: Option<i32>,
    pub format: TimestampFormat,
}

impl NormalizedTime {
    pub fn year(&self) -> i32 {
        self.local.year()
    }

    pub fn month(&self) -> u32 {
        self.local.month()
    }

    pub fn day(&self) -> u32 {
        self.local.day()
    }

    pub fn hour(&self) -> u32 {
        self.local.hour()
    }

    pub fn minute(&self) -> u32 {
        self.local.minute()
    }

    pub fn second(&self) -> u32 {
        self.local.second()
    }

    /// Weekday with Monday = 0 through Sunday = 6
    pub fn weekday_index(&self) -> u32 {
        self.local.weekday().num_days_from_monday()
    }
}

/// Coarse time-of-day bucket derived from the hour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    pub const ALL: [TimeOfDay; 4] = [
        TimeOfDay::Morning,
        TimeOfDay::Afternoon,
        TimeOfDay::Evening,
        TimeOfDay::Night,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "Morning",
            TimeOfDay::Afternoon => "Afternoon",
            TimeOfDay::Evening => "Evening",
            TimeOfDay::Night => "Night",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Meteorological season (northern hemisphere) derived from the month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Autumn, Season::Winter];

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Autumn => "Autumn",
            Season::Winter => "Winter",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One analysis-ready row.
///
/// Every time-derived field is `None` when the record's timestamp could not
/// be normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    pub time: Option<NormalizedTime>,
    pub day: Option<u32>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub hour: Option<u32>,
    pub minute: Option<u32>,
    pub second: Option<u32>,
    pub time_of_day: Option<TimeOfDay>,
    pub season: Option<Season>,
    pub weekend: Option<bool>,
}

/// A record whose timestamp matched none of the known formats
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampIssue {
    /// Position of the record in the cleaned table
    pub index: usize,
    /// The text that failed to parse, or the JSON of a non-string `time`
    pub raw: Option<String>,
    pub error: String,
}

/// Summary of a single pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub run_id: String,
    /// Records read from the export (only set by a full run)
    pub total_records: Option<usize>,
    pub youtube_records: Option<usize>,
    pub music_records: Option<usize>,
    pub excluded_records: Option<usize>,
    /// Records in the analysis table
    pub analyzed_records: usize,
    /// Successful parses per timestamp strategy
    pub formats: BTreeMap<String, usize>,
    pub unparseable_timestamps: Vec<TimestampIssue>,
}

impl PipelineReport {
    pub fn new() -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            total_records: None,
            youtube_records: None,
            music_records: None,
            excluded_records: None,
            analyzed_records: 0,
            formats: BTreeMap::new(),
            unparseable_timestamps: Vec::new(),
        }
    }

    pub fn unparseable_count(&self) -> usize {
        self.unparseable_timestamps.len()
    }
}

impl Default for PipelineReport {
    fn default() -> Self {
        Self::new()
    }
}

/// The finished, analysis-ready dataset handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisTable {
    pub records: Vec<AnalysisRecord>,
    pub report: PipelineReport,
}

impl AnalysisTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_raw_record_keeps_unknown_fields() {
        let value = json!({
            "header": "YouTube",
            "title": "Watched Rust in 100 seconds",
            "titleUrl": "https://www.youtube.com/watch?v=5C_HPTJg5ek",
            "time": "2023-05-14T10:15:30.000Z",
            "products": ["YouTube"],
            "activityControls": ["YouTube watch history"]
        });

        let record: RawRecord = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(record.header_str(), Some("YouTube"));
        assert!(record.details.is_none());
        assert_eq!(
            record.extra.get("titleUrl"),
            Some(&json!("https://www.youtube.com/watch?v=5C_HPTJg5ek"))
        );

        // Writing it back must not lose or rename anything
        assert_eq!(serde_json::to_value(&record).unwrap(), value);
    }

    #[test]
    fn test_null_and_non_string_attributes_are_kept() {
        let value = json!({
            "header": 5,
            "title": ["not", "text"],
            "time": 1684059330,
            "details": null
        });

        let record: RawRecord = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(record.header, Some(json!(5)));
        assert_eq!(record.header_str(), None);
        assert_eq!(record.title_str(), None);
        assert_eq!(record.time, Some(json!(1684059330)));
        assert_eq!(record.details, Some(Value::Null));
        assert_eq!(record.products, None);

        assert_eq!(serde_json::to_value(&record).unwrap(), value);
    }

    #[test]
    fn test_normalized_time_components() {
        let local = NaiveDateTime::parse_from_str("2023-05-14 10:15:30", "%Y-%m-%d %H:%M:%S")
            .unwrap();
        let time = NormalizedTime {
            local,
            utc_offset_seconds: None,
            format: TimestampFormat::SlashDelimited,
        };

        assert_eq!(time.year(), 2023);
        assert_eq!(time.month(), 5);
        assert_eq!(time.day(), 14);
        assert_eq!(time.hour(), 10);
        assert_eq!(time.minute(), 15);
        assert_eq!(time.second(), 30);
        // 2023-05-14 was a Sunday
        assert_eq!(time.weekday_index(), 6);
    }

    #[test]
    fn test_categories_serialize_as_labels() {
        assert_eq!(serde_json::to_value(TimeOfDay::Evening).unwrap(), json!("Evening"));
        assert_eq!(serde_json::to_value(Season::Autumn).unwrap(), json!("Autumn"));
        assert_eq!(TimeOfDay::Night.to_string(), "Night");
    }
}
