//! Error types for tubestat

use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors that abort a pipeline run.
///
/// Per-record timestamp failures are not represented here; see
/// [`crate::normalizer::TimestampParseError`].
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to decode '{}': {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("Missing required field: {field}")]
    Schema { field: String },

    #[error("Failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

impl AnalysisError {
    pub(crate) fn schema(field: &str) -> Self {
        AnalysisError::Schema {
            field: field.to_string(),
        }
    }
}
