//! tubestat - watch-history analysis engine
//!
//! tubestat turns a watch-history export into an analysis-ready table through
//! a deterministic pipeline: category partitioning → field cleaning →
//! timestamp normalization → feature derivation. Five chart views are computed
//! over the finished table.
//!
//! ## Modules
//!
//! - **Pipeline**: load, clean, normalize and derive ([`pipeline`])
//! - **Views**: read-only chart datasets and a text renderer ([`views`])

pub mod cleaner;
pub mod config;
pub mod error;
pub mod features;
pub mod loader;
pub mod logging;
pub mod normalizer;
pub mod pipeline;
pub mod types;
pub mod views;

pub use config::PipelineConfig;
pub use error::AnalysisError;
pub use normalizer::{normalize_timestamp, TimestampNormalizer, TimestampParseError};
pub use pipeline::{process_history_file, process_records, run, HistoryProcessor};
pub use types::{AnalysisRecord, AnalysisTable, PipelineReport};

/// tubestat version embedded in run summaries
pub const TUBESTAT_VERSION: &str = env!("CARGO_PKG_VERSION");
