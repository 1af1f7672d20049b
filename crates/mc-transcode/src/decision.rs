//! Per-stream transcode decisions produced by negotiation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::source::Resolution;

/// Target for one stream: pass through untouched, or convert to a codec.
///
/// Serializes as the bare string `"copy"` or the codec name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum CodecChoice {
    Copy,
    Convert(String),
}

impl CodecChoice {
    pub fn is_copy(&self) -> bool {
        matches!(self, Self::Copy)
    }

    /// Target codec, or `None` for a stream copy.
    pub fn codec(&self) -> Option<&str> {
        match self {
            Self::Copy => None,
            Self::Convert(codec) => Some(codec.as_str()),
        }
    }
}

impl fmt::Display for CodecChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Copy => write!(f, "copy"),
            Self::Convert(codec) => write!(f, "{codec}"),
        }
    }
}

impl From<String> for CodecChoice {
    fn from(s: String) -> Self {
        if s == "copy" {
            Self::Copy
        } else {
            Self::Convert(s)
        }
    }
}

impl From<CodecChoice> for String {
    fn from(choice: CodecChoice) -> Self {
        choice.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoDecision {
    pub codec: CodecChoice,
    /// Output frame size; `None` keeps the native resolution.
    pub resolution: Option<Resolution>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioDecision {
    pub codec: CodecChoice,
    /// Concrete encoder for a converted stream.
    pub encoder: Option<String>,
    /// Encoder quality parameter (`-q:a`).
    pub quality: Option<i32>,
    /// Output sample rate when the source rate must be lowered.
    pub sample_rate: Option<u32>,
    /// Reduce to two channels.
    pub downmix: bool,
}

impl AudioDecision {
    pub fn copy() -> Self {
        Self {
            codec: CodecChoice::Copy,
            encoder: None,
            quality: None,
            sample_rate: None,
            downmix: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleDecision {
    pub codec: CodecChoice,
    /// Burn into the video image instead of delivering as a track.
    pub hardcode: bool,
}

/// Every decision for one profile, index-aligned with the source streams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionSet {
    pub video: Option<VideoDecision>,
    pub audio: Vec<AudioDecision>,
    pub subtitles: Vec<SubtitleDecision>,
    /// Resolved tier index after clamping to the source.
    pub quality: u8,
    /// Resolved container format.
    pub format: String,
    pub audio_track: Option<usize>,
    pub subtitle_track: Option<usize>,
}

impl DecisionSet {
    /// Whether the video stream is re-encoded.
    pub fn converts_video(&self) -> bool {
        self.video.as_ref().is_some_and(|v| !v.codec.is_copy())
    }

    /// Whether every stream is copied untouched.
    pub fn is_passthrough(&self) -> bool {
        !self.converts_video()
            && self.audio.iter().all(|a| a.codec.is_copy() && !a.downmix)
            && self
                .subtitles
                .iter()
                .all(|s| s.codec.is_copy() && !s.hardcode)
    }

    /// Decision for the selected subtitle track, if one is selected.
    pub fn selected_subtitle(&self) -> Option<&SubtitleDecision> {
        self.subtitle_track.and_then(|i| self.subtitles.get(i))
    }
}
