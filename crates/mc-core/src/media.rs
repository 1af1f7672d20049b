//! Media-domain enums for item types, stream types, quality tiers and
//! profile kinds.
//!
//! All enums serialize in snake_case and implement `Display` manually for
//! consistent string representation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// MediaType
// ---------------------------------------------------------------------------

/// Kind of catalogued media element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Audio,
    Video,
    /// A directory aggregating other elements; never directly playable.
    Directory,
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Audio => write!(f, "audio"),
            Self::Video => write!(f, "video"),
            Self::Directory => write!(f, "directory"),
        }
    }
}

// ---------------------------------------------------------------------------
// StreamType
// ---------------------------------------------------------------------------

/// Type of media stream within a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamType {
    Video,
    Audio,
    Subtitle,
}

impl fmt::Display for StreamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => write!(f, "video"),
            Self::Audio => write!(f, "audio"),
            Self::Subtitle => write!(f, "subtitle"),
        }
    }
}

impl FromStr for StreamType {
    type Err = crate::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "video" => Ok(Self::Video),
            "audio" => Ok(Self::Audio),
            "subtitle" => Ok(Self::Subtitle),
            other => Err(crate::Error::Validation(format!(
                "unknown stream type '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// VideoQuality
// ---------------------------------------------------------------------------

/// Video quality tiers, lowest first. The discriminant is the tier index
/// used by clients and segment requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoQuality {
    VeryLow = 0,
    Low = 1,
    Medium = 2,
    High = 3,
    VeryHigh = 4,
    Ultra = 5,
}

impl VideoQuality {
    /// All tiers in ascending order.
    pub const ALL: [VideoQuality; 6] = [
        Self::VeryLow,
        Self::Low,
        Self::Medium,
        Self::High,
        Self::VeryHigh,
        Self::Ultra,
    ];

    /// Tier for a numeric index, if one exists.
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    /// Tier for a numeric index, saturating at [`VideoQuality::Ultra`].
    pub fn from_index_saturating(index: u8) -> Self {
        Self::from_index(index).unwrap_or(Self::Ultra)
    }

    /// Numeric tier index.
    pub fn index(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for VideoQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VeryLow => write!(f, "very_low"),
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::VeryHigh => write!(f, "very_high"),
            Self::Ultra => write!(f, "ultra"),
        }
    }
}

// ---------------------------------------------------------------------------
// AudioQuality
// ---------------------------------------------------------------------------

/// Audio quality tiers, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioQuality {
    Low = 0,
    Medium = 1,
    High = 2,
    VeryHigh = 3,
    Lossless = 4,
}

impl AudioQuality {
    /// All tiers in ascending order.
    pub const ALL: [AudioQuality; 5] = [
        Self::Low,
        Self::Medium,
        Self::High,
        Self::VeryHigh,
        Self::Lossless,
    ];

    /// Tier for a numeric index, if one exists.
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    /// Numeric tier index.
    pub fn index(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for AudioQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::VeryHigh => write!(f, "very_high"),
            Self::Lossless => write!(f, "lossless"),
        }
    }
}

// ---------------------------------------------------------------------------
// ProfileKind
// ---------------------------------------------------------------------------

/// How a transcode profile delivers its stream.
///
/// - **File**: the source is served as-is (direct play); nothing to stop.
/// - **Transcode**: an external transcoder process is associated with the
///   profile and must be terminated when the profile is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    File,
    #[default]
    Transcode,
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Transcode => write!(f, "transcode"),
        }
    }
}
