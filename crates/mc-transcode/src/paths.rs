//! Output path conventions for stream files.

use mc_core::config::PathsConfig;
use mc_core::{ProfileId, StreamType};
use std::path::{Path, PathBuf};

/// Cache and data roots under which every profile gets a `streams/<id>`
/// directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamPaths {
    cache_dir: PathBuf,
    data_dir: PathBuf,
}

impl StreamPaths {
    pub fn new(cache_dir: impl Into<PathBuf>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            data_dir: data_dir.into(),
        }
    }

    pub fn from_config(config: &PathsConfig) -> Self {
        Self::new(&config.cache_dir, &config.data_dir)
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// `<cache>/streams/<id>`
    pub fn stream_dir(&self, id: ProfileId) -> PathBuf {
        self.cache_dir.join("streams").join(id.to_string())
    }

    /// External segment list written by the segment muxer.
    pub fn segment_list(&self, id: ProfileId) -> PathBuf {
        self.stream_dir(id).join("segments.txt")
    }

    /// Numbered segment file pattern.
    pub fn segment_pattern(&self, id: ProfileId) -> PathBuf {
        self.stream_dir(id).join("%d")
    }

    pub fn segment(&self, id: ProfileId, name: &str) -> PathBuf {
        self.stream_dir(id).join(name)
    }

    /// `<cache>/streams/<id>/<segment>-<type>-<index>`
    pub fn corrected_segment(
        &self,
        id: ProfileId,
        name: &str,
        stream_type: StreamType,
        index: usize,
    ) -> PathBuf {
        self.stream_dir(id).join(format!("{name}-{stream_type}-{index}"))
    }

    /// `<data>/streams/<id>/playlist.mpd`
    pub fn manifest(&self, id: ProfileId) -> PathBuf {
        self.data_dir
            .join("streams")
            .join(id.to_string())
            .join("playlist.mpd")
    }
}
