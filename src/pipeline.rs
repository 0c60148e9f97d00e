//! Pipeline orchestration
//!
//! This module provides the public API for tubestat.
//! It orchestrates the full pipeline from a watch-history export to the
//! analysis table consumed by the views.

use std::path::Path;

use serde_json::Value;
use tracing::{info, warn};

use crate::cleaner::FieldCleaner;
use crate::config::PipelineConfig;
use crate::error::AnalysisError;
use crate::features::FeatureDeriver;
use crate::loader::{extract_and_save, read_records};
use crate::normalizer::{TimestampNormalizer, TimestampParseError};
use crate::types::{AnalysisTable, PipelineReport, RawRecord, TimestampIssue};

/// Run the whole export-then-analyze flow.
///
/// Pipeline stages:
/// 1. Loader - read the export, partition by header, persist the YouTube partition
/// 2. Loader - read the persisted YouTube partition back
/// 3. FieldCleaner - drop irrelevant attributes, strip title marker
/// 4. TimestampNormalizer - parse each record's time
/// 5. FeatureDeriver - calendar components and categorical features
///
/// Any loader or cleaner failure aborts the run; no partial table is returned.
///
/// # Example
/// ```ignore
/// let table = run(&PipelineConfig::default())?;
/// println!("{} rows", table.len());
/// ```
pub fn run(config: &PipelineConfig) -> Result<AnalysisTable, AnalysisError> {
    let partitions = extract_and_save(config)?;

    let mut table = process_history_file(&config.youtube_output)?;
    table.report.total_records = Some(partitions.total());
    table.report.youtube_records = Some(partitions.youtube.len());
    table.report.music_records = Some(partitions.youtube_music.len());
    table.report.excluded_records = Some(partitions.excluded);

    Ok(table)
}

/// Analyze a file of already-partitioned records
pub fn process_history_file(path: &Path) -> Result<AnalysisTable, AnalysisError> {
    HistoryProcessor::new().process_file(path)
}

/// Analyze in-memory records (clean, normalize, derive)
pub fn process_records(records: Vec<RawRecord>) -> Result<AnalysisTable, AnalysisError> {
    HistoryProcessor::new().process(records)
}

/// Processor holding the timestamp strategy order used for a run.
///
/// Use this when the default strategy order needs to be replaced.
pub struct HistoryProcessor {
    normalizer: TimestampNormalizer,
}

impl Default for HistoryProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryProcessor {
    /// Create a processor with the default strategy order
    pub fn new() -> Self {
        Self {
            normalizer: TimestampNormalizer::default(),
        }
    }

    /// Create a processor with a specific normalizer
    pub fn with_normalizer(normalizer: TimestampNormalizer) -> Self {
        Self { normalizer }
    }

    /// Read records from `path` and analyze them
    pub fn process_file(&self, path: &Path) -> Result<AnalysisTable, AnalysisError> {
        let records = read_records(path)?;
        self.process(records)
    }

    /// Clean, normalize and derive features for every record
    pub fn process(&self, records: Vec<RawRecord>) -> Result<AnalysisTable, AnalysisError> {
        let cleaned = FieldCleaner::clean(records)?;

        let mut report = PipelineReport::new();
        let mut rows = Vec::with_capacity(cleaned.len());

        for (index, record) in cleaned.into_iter().enumerate() {
            let (time, raw) = match &record.time {
                Some(Value::String(text)) => (self.normalizer.normalize(text), Some(text.clone())),
                Some(other) => {
                    let input = other.to_string();
                    (
                        Err(TimestampParseError {
                            input: input.clone(),
                        }),
                        Some(input),
                    )
                }
                None => (
                    Err(TimestampParseError {
                        input: String::new(),
                    }),
                    None,
                ),
            };

            match &time {
                Ok(parsed) => {
                    *report
                        .formats
                        .entry(parsed.format.as_str().to_string())
                        .or_insert(0) += 1;
                }
                Err(e) => {
                    let error = if record.time.is_some() {
                        e.to_string()
                    } else {
                        "Missing time field".to_string()
                    };
                    warn!(index, %error, "timestamp not normalized");
                    report.unparseable_timestamps.push(TimestampIssue { index, raw, error });
                }
            }

            rows.push(FeatureDeriver::derive(record, time));
        }

        report.analyzed_records = rows.len();
        if report.unparseable_count() > 0 {
            warn!(
                count = report.unparseable_count(),
                "records carried without time features"
            );
        }
        info!(records = rows.len(), run_id = %report.run_id, "analysis table ready");

        Ok(AnalysisTable {
            records: rows,
            report,
        })
    }
}
