//! Field cleaning
//!
//! Drops the attributes that carry nothing for analysis and strips the
//! "Watched" marker from titles.

use tracing::debug;

use crate::error::AnalysisError;
use crate::types::{CleanedRecord, RawRecord};

/// Attributes removed from every record, in the order they are checked
pub const DROP_FIELDS: [&str; 4] = ["details", "activityControls", "products", "header"];

/// Marker text deleted from titles
pub const TITLE_MARKER: &str = "Watched";

/// Cleaner for turning raw records into cleaned records
pub struct FieldCleaner;

impl FieldCleaner {
    /// Clean a whole table of records.
    ///
    /// A drop field counts as present when at least one record carries it. If
    /// any of [`DROP_FIELDS`] is absent from the table the call fails with
    /// [`AnalysisError::Schema`] and nothing is cleaned.
    pub fn clean(records: Vec<RawRecord>) -> Result<Vec<CleanedRecord>, AnalysisError> {
        if let Some(field) = first_missing_field(&records) {
            return Err(AnalysisError::schema(field));
        }

        let cleaned: Vec<CleanedRecord> = records.into_iter().map(clean_record).collect();
        debug!(records = cleaned.len(), "cleaned records");
        Ok(cleaned)
    }
}

fn first_missing_field(records: &[RawRecord]) -> Option<&'static str> {
    DROP_FIELDS.into_iter().find(|field| {
        !records.iter().any(|record| match *field {
            "details" => record.details.is_some(),
            "activityControls" => record.activity_controls.is_some(),
            "products" => record.products.is_some(),
            "header" => record.header.is_some(),
            _ => false,
        })
    })
}

fn clean_record(record: RawRecord) -> CleanedRecord {
    // A non-text title has no marker to strip and is not kept as a title
    CleanedRecord {
        title: record.title_str().map(strip_marker),
        time: record.time,
        extra: record.extra,
    }
}

/// Delete every occurrence of [`TITLE_MARKER`]
pub fn strip_marker(title: &str) -> String {
    title.replace(TITLE_MARKER, "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn make_raw(title: &str) -> RawRecord {
        serde_json::from_value(json!({
            "header": "YouTube",
            "title": title,
            "titleUrl": "https://www.youtube.com/watch?v=abc",
            "time": "2023-05-14T10:15:30.000Z",
            "details": [{ "name": "From Google Ads" }],
            "products": ["YouTube"],
            "activityControls": ["YouTube watch history"]
        }))
        .unwrap()
    }

    #[test]
    fn test_clean_drops_fields_and_strips_title() {
        let cleaned = FieldCleaner::clean(vec![make_raw("Watched Rust in 100 seconds")]).unwrap();

        assert_eq!(cleaned.len(), 1);
        let record = &cleaned[0];
        assert_eq!(record.title.as_deref(), Some(" Rust in 100 seconds"));
        assert_eq!(record.time, Some(json!("2023-05-14T10:15:30.000Z")));

        let value = serde_json::to_value(record).unwrap();
        for field in DROP_FIELDS {
            assert!(value.get(field).is_none(), "{field} should be dropped");
        }
        assert_eq!(value["titleUrl"], json!("https://www.youtube.com/watch?v=abc"));
    }

    #[test]
    fn test_every_marker_occurrence_is_removed() {
        assert_eq!(
            strip_marker("Watched: Watched Movies Review"),
            ":  Movies Review"
        );
        assert_eq!(strip_marker("Nothing to see"), "Nothing to see");
    }

    #[test]
    fn test_missing_field_is_named() {
        let mut record = make_raw("Watched something");
        record.products = None;

        let err = FieldCleaner::clean(vec![record]).unwrap_err();
        match err {
            AnalysisError::Schema { field } => assert_eq!(field, "products"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_field_present_on_any_record_is_enough() {
        let with_details = make_raw("Watched an ad");
        let mut without_details = make_raw("Watched a video");
        without_details.details = None;

        let cleaned = FieldCleaner::clean(vec![with_details, without_details]).unwrap();
        assert_eq!(cleaned.len(), 2);
    }

    #[test]
    fn test_null_drop_field_counts_as_present() {
        let record: RawRecord = serde_json::from_value(json!({
            "header": "YouTube",
            "title": "Watched with null details",
            "time": "2023-05-14T10:15:30.000Z",
            "details": null,
            "products": ["YouTube"],
            "activityControls": ["YouTube watch history"]
        }))
        .unwrap();

        let cleaned = FieldCleaner::clean(vec![record]).unwrap();
        assert_eq!(cleaned[0].title.as_deref(), Some(" with null details"));
        assert!(serde_json::to_value(&cleaned[0]).unwrap().get("details").is_none());
    }

    #[test]
    fn test_non_text_title_is_dropped() {
        let mut record = make_raw("unused");
        record.title = Some(json!(42));

        let cleaned = FieldCleaner::clean(vec![record]).unwrap();
        assert_eq!(cleaned[0].title, None);
    }

    #[test]
    fn test_recleaning_fails() {
        let cleaned = FieldCleaner::clean(vec![make_raw("Watched twice")]).unwrap();
        let again: Vec<RawRecord> = cleaned.into_iter().map(RawRecord::from).collect();

        let err = FieldCleaner::clean(again).unwrap_err();
        assert!(matches!(err, AnalysisError::Schema { ref field } if field == "details"));
    }

    #[test]
    fn test_empty_table_fails() {
        let err = FieldCleaner::clean(Vec::new()).unwrap_err();
        assert_eq!(err.to_string(), "Missing required field: details");
    }
}
