//! Export loading and category partitioning
//!
//! Reads the watch-history export, splits it by the `header` category and
//! persists the YouTube partition.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::error::AnalysisError;
use crate::types::RawRecord;

/// Header value of regular YouTube entries
pub const YOUTUBE_HEADER: &str = "YouTube";

/// Header value of YouTube Music entries
pub const YOUTUBE_MUSIC_HEADER: &str = "YouTube Music";

/// Records split by category
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partitions {
    pub youtube: Vec<RawRecord>,
    pub youtube_music: Vec<RawRecord>,
    /// Records whose header matched neither category
    pub excluded: usize,
}

impl Partitions {
    pub fn total(&self) -> usize {
        self.youtube.len() + self.youtube_music.len() + self.excluded
    }
}

/// Read a file holding a JSON array of records.
///
/// A missing or unreadable file is an [`AnalysisError::Read`]; content that is
/// not UTF-8 or not an array of objects is an [`AnalysisError::Decode`].
pub fn read_records(path: &Path) -> Result<Vec<RawRecord>, AnalysisError> {
    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == ErrorKind::InvalidData {
            AnalysisError::Decode {
                path: path.to_path_buf(),
                reason: "file is not valid UTF-8".to_string(),
            }
        } else {
            AnalysisError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let records: Vec<RawRecord> =
        serde_json::from_str(&content).map_err(|e| AnalysisError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    debug!(path = %path.display(), records = records.len(), "read records");
    Ok(records)
}

/// Split records by exact header value
pub fn partition(records: Vec<RawRecord>) -> Partitions {
    let mut partitions = Partitions::default();

    for record in records {
        match record.header_str() {
            Some(YOUTUBE_HEADER) => partitions.youtube.push(record),
            Some(YOUTUBE_MUSIC_HEADER) => partitions.youtube_music.push(record),
            _ => {
                debug!(header = ?record.header, "excluding record");
                partitions.excluded += 1;
            }
        }
    }

    partitions
}

/// Write records as a two-space indented JSON array, replacing any existing file
pub fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<(), AnalysisError> {
    let write_error = |source| AnalysisError::Write {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(write_error)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records).map_err(|e| {
        if e.is_io() {
            write_error(e.into())
        } else {
            AnalysisError::Encode(e)
        }
    })?;
    writer.flush().map_err(write_error)?;
    Ok(())
}

/// Read the export, partition it and persist the YouTube partition.
///
/// The YouTube Music partition is only written when
/// [`PipelineConfig::persist_music`] is set. Every output is first written next
/// to its destination and moved into place once all of them succeeded, so a
/// failed write leaves no output behind.
pub fn extract_and_save(config: &PipelineConfig) -> Result<Partitions, AnalysisError> {
    let records = read_records(&config.input)?;
    let partitions = partition(records);

    let mut outputs = vec![(config.youtube_output.as_path(), partitions.youtube.as_slice())];
    if config.persist_music {
        outputs.push((
            config.music_output.as_path(),
            partitions.youtube_music.as_slice(),
        ));
    } else if !partitions.youtube_music.is_empty() {
        warn!(
            records = partitions.youtube_music.len(),
            path = %config.music_output.display(),
            "YouTube Music partition not persisted"
        );
    }
    persist_all(&outputs)?;

    info!(
        youtube = partitions.youtube.len(),
        youtube_music = partitions.youtube_music.len(),
        excluded = partitions.excluded,
        "extraction completed"
    );
    Ok(partitions)
}

fn persist_all(outputs: &[(&Path, &[RawRecord])]) -> Result<(), AnalysisError> {
    let mut staged: Vec<PathBuf> = Vec::with_capacity(outputs.len());

    for (path, records) in outputs {
        let partial = staging_path(path);
        let written = write_records(&partial, *records);
        staged.push(partial);
        if let Err(e) = written {
            discard(&staged);
            return Err(e);
        }
    }

    for (partial, (path, _)) in staged.iter().zip(outputs) {
        fs::rename(partial, path).map_err(|source| {
            discard(&staged);
            AnalysisError::Write {
                path: path.to_path_buf(),
                source,
            }
        })?;
        debug!(path = %path.display(), "output written");
    }

    Ok(())
}

/// Sibling path an output is staged under
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

fn discard(staged: &[PathBuf]) {
    for partial in staged {
        // Already renamed or never created
        let _ = fs::remove_file(partial);
    }
}
