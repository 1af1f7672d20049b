//! Source media descriptors as produced by the cataloguing subsystem.
//!
//! Descriptors are immutable once built. Bitrates are in kbit/s.

use mc_core::MediaType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Pixel dimensions of a video frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether either dimension is larger than the corresponding dimension
    /// of `bound`.
    pub fn exceeds(&self, bound: &Resolution) -> bool {
        self.width > bound.width || self.height > bound.height
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A playable media item and its streams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceMedia {
    pub path: PathBuf,
    pub media_type: MediaType,
    /// Overall bitrate of the file.
    #[serde(default)]
    pub bitrate: Option<u32>,
    #[serde(default)]
    pub video: Option<VideoStream>,
    #[serde(default)]
    pub audio: Vec<AudioStream>,
    #[serde(default)]
    pub subtitles: Vec<SubtitleStream>,
}

impl SourceMedia {
    pub fn is_video(&self) -> bool {
        self.media_type == MediaType::Video
    }

    pub fn is_audio(&self) -> bool {
        self.media_type == MediaType::Audio
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoStream {
    pub codec: String,
    #[serde(default)]
    pub bitrate: Option<u32>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl VideoStream {
    /// Frame size, when both dimensions are known.
    pub fn resolution(&self) -> Option<Resolution> {
        Some(Resolution::new(self.width?, self.height?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioStream {
    pub codec: String,
    #[serde(default)]
    pub bitrate: Option<u32>,
    #[serde(default)]
    pub sample_rate: Option<u32>,
    /// Channel layout as reported by the prober ("stereo", "5.1(side)", "6").
    #[serde(default)]
    pub configuration: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleStream {
    pub format: String,
    #[serde(default)]
    pub forced: bool,
    /// Stream index within the container.
    #[serde(default)]
    pub index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exceeds_on_either_dimension() {
        let bound = Resolution::new(1280, 720);
        assert!(Resolution::new(1920, 720).exceeds(&bound));
        assert!(Resolution::new(1280, 800).exceeds(&bound));
        assert!(!Resolution::new(1280, 720).exceeds(&bound));
        assert!(!Resolution::new(640, 360).exceeds(&bound));
    }

    #[test]
    fn resolution_requires_both_dimensions() {
        let mut stream = VideoStream {
            codec: "h264".into(),
            bitrate: None,
            width: Some(1920),
            height: None,
        };
        assert_eq!(stream.resolution(), None);
        stream.height = Some(1080);
        assert_eq!(stream.resolution(), Some(Resolution::new(1920, 1080)));
    }

    #[test]
    fn deserialize_minimal_audio_item() {
        let source: SourceMedia = serde_json::from_str(
            r#"{
                "path": "/music/track.flac",
                "media_type": "audio",
                "audio": [{ "codec": "flac", "sample_rate": 44100, "configuration": "stereo" }]
            }"#,
        )
        .unwrap();
        assert!(source.is_audio());
        assert!(source.video.is_none());
        assert_eq!(source.audio.len(), 1);
        assert!(source.subtitles.is_empty());
    }
}
