//! Run configuration
//!
//! A [`PipelineConfig`] is built once per invocation and passed explicitly to
//! the loader and the orchestrator.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default watch-history export path
pub const DEFAULT_INPUT: &str = "watch-history.json";

/// Default destination of the YouTube partition
pub const DEFAULT_YOUTUBE_OUTPUT: &str = "youtube_data.json";

/// Default destination of the YouTube Music partition
pub const DEFAULT_MUSIC_OUTPUT: &str = "youtube_music_data.json";

/// File locations and switches for a single pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Watch-history export to read
    pub input: PathBuf,
    /// Where the YouTube partition is written
    pub youtube_output: PathBuf,
    /// Where the YouTube Music partition would be written
    pub music_output: PathBuf,
    /// Also write the YouTube Music partition (off by default)
    #[serde(default)]
    pub persist_music: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            youtube_output: PathBuf::from(DEFAULT_YOUTUBE_OUTPUT),
            music_output: PathBuf::from(DEFAULT_MUSIC_OUTPUT),
            persist_music: false,
        }
    }
}

impl PipelineConfig {
    /// Default file names resolved inside `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            input: dir.join(DEFAULT_INPUT),
            youtube_output: dir.join(DEFAULT_YOUTUBE_OUTPUT),
            music_output: dir.join(DEFAULT_MUSIC_OUTPUT),
            persist_music: false,
        }
    }
}
