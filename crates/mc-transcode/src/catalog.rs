//! Stream descriptor catalog: static reference tables for quality tiers,
//! codec support and codec/container mappings.
//!
//! Every membership test goes through [`normalize_codec`], so `PCM_S16LE`,
//! `pcm_s24le` and `pcm` all compare equal.

use mc_core::{AudioQuality, VideoQuality};

use crate::source::{Resolution, VideoStream};

/// Bitrate and resolution ceiling for one video quality tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoTier {
    pub quality: VideoQuality,
    pub resolution: Resolution,
    /// Maximum bitrate in kbit/s.
    pub max_bitrate: u32,
}

const VIDEO_TIERS: [VideoTier; 6] = [
    VideoTier {
        quality: VideoQuality::VeryLow,
        resolution: Resolution::new(426, 240),
        max_bitrate: 500,
    },
    VideoTier {
        quality: VideoQuality::Low,
        resolution: Resolution::new(640, 360),
        max_bitrate: 1000,
    },
    VideoTier {
        quality: VideoQuality::Medium,
        resolution: Resolution::new(854, 480),
        max_bitrate: 1500,
    },
    VideoTier {
        quality: VideoQuality::High,
        resolution: Resolution::new(1280, 720),
        max_bitrate: 4000,
    },
    VideoTier {
        quality: VideoQuality::VeryHigh,
        resolution: Resolution::new(1920, 1080),
        max_bitrate: 8000,
    },
    VideoTier {
        quality: VideoQuality::Ultra,
        resolution: Resolution::new(3840, 2160),
        max_bitrate: 20000,
    },
];

/// Audio tier used for the audio streams of a video item, indexed by video tier.
const VIDEO_AUDIO_QUALITY: [AudioQuality; 6] = [
    AudioQuality::Low,
    AudioQuality::Low,
    AudioQuality::Medium,
    AudioQuality::High,
    AudioQuality::High,
    AudioQuality::VeryHigh,
];

/// Per-channel bitrate ceiling (kbit/s) by audio tier; `None` is unbounded.
const AUDIO_CHANNEL_BITRATE: [Option<u32>; 5] = [Some(48), Some(64), Some(96), Some(160), None];

/// Default sample-rate ceiling by audio tier.
const AUDIO_SAMPLE_RATE: [u32; 5] = [44_100, 44_100, 48_000, 48_000, 192_000];

const TRANSCODABLE_VIDEO: &[&str] = &["h264", "vp8"];

const TRANSCODABLE_AUDIO: &[&str] = &["aac", "ac3", "eac3", "mp3", "vorbis", "opus", "flac", "pcm"];

const LOSSLESS_AUDIO: &[&str] = &["flac", "pcm", "alac", "dsd"];

const TEXT_SUBTITLES: &[&str] = &["subrip", "webvtt", "ass", "ssa", "mov_text"];

const PICTURE_SUBTITLES: &[&str] = &["dvd_subtitle", "dvb_subtitle", "hdmv_pgs_subtitle"];

/// Codec every text subtitle converts to.
pub const TEXT_SUBTITLE_CODEC: &str = "webvtt";

const CONTAINERS: &[(&str, &[&str])] = &[
    (
        "hls",
        &["h264", "hevc", "aac", "ac3", "eac3", "mp3", "webvtt"],
    ),
    (
        "dash",
        &["h264", "hevc", "vp8", "vp9", "av1", "aac", "ac3", "eac3", "opus", "vorbis", "webvtt"],
    ),
    (
        "matroska",
        &[
            "h264", "hevc", "vp8", "vp9", "av1", "mpeg2video", "mpeg4", "aac", "ac3", "eac3", "dts",
            "truehd", "mp3", "vorbis", "opus", "flac", "pcm", "alac", "subrip", "ass", "ssa",
            "webvtt", "dvd_subtitle", "dvb_subtitle", "hdmv_pgs_subtitle",
        ],
    ),
    ("webm", &["vp8", "vp9", "av1", "vorbis", "opus", "webvtt"]),
    (
        "mp4",
        &["h264", "hevc", "av1", "mpeg4", "aac", "ac3", "eac3", "mp3", "alac", "flac", "opus", "mov_text"],
    ),
    (
        "mpegts",
        &["h264", "hevc", "mpeg2video", "aac", "ac3", "eac3", "mp3", "dvb_subtitle"],
    ),
    ("adts", &["aac"]),
    ("mp3", &["mp3"]),
    ("ogg", &["vorbis", "opus", "flac"]),
    ("flac", &["flac"]),
    ("wav", &["pcm"]),
    ("ac3", &["ac3"]),
    ("eac3", &["eac3"]),
    ("ipod", &["aac", "alac"]),
];

/// Canonical lowercase codec name.
pub fn normalize_codec(codec: &str) -> String {
    let lower = codec.trim().to_ascii_lowercase();
    if lower.starts_with("pcm_") {
        return "pcm".into();
    }
    if lower.starts_with("dsd_") {
        return "dsd".into();
    }
    match lower.as_str() {
        "h265" | "x265" | "hvc1" => "hevc".into(),
        "avc" | "avc1" | "x264" => "h264".into(),
        "ac-3" => "ac3".into(),
        "e-ac-3" | "ec-3" => "eac3".into(),
        "srt" => "subrip".into(),
        "vtt" => "webvtt".into(),
        "pgssub" => "hdmv_pgs_subtitle".into(),
        "dvdsub" => "dvd_subtitle".into(),
        "dvbsub" => "dvb_subtitle".into(),
        _ => lower,
    }
}

/// Canonical lowercase container format name.
pub fn normalize_format(format: &str) -> String {
    let lower = format.trim().to_ascii_lowercase();
    match lower.as_str() {
        "mkv" => "matroska".into(),
        "ts" => "mpegts".into(),
        "aac" => "adts".into(),
        "m4a" => "ipod".into(),
        _ => lower,
    }
}

/// Whether `codec` appears in `list`, comparing normalized names.
pub fn contains_codec<S: AsRef<str>>(list: &[S], codec: &str) -> bool {
    let wanted = normalize_codec(codec);
    list.iter().any(|c| normalize_codec(c.as_ref()) == wanted)
}

/// Parse a channel layout description into a channel count.
///
/// Unknown or absent layouts are treated as stereo.
pub fn channel_count(configuration: Option<&str>) -> u32 {
    let Some(raw) = configuration else {
        return 2;
    };
    let layout = raw.trim().to_ascii_lowercase();
    let layout = layout.split('(').next().unwrap_or_default().trim();

    match layout {
        "mono" => return 1,
        "stereo" | "downmix" => return 2,
        "quad" => return 4,
        _ => {}
    }

    if let Some((front, lfe)) = layout.split_once('.') {
        if let (Ok(front), Ok(lfe)) = (front.parse::<u32>(), lfe.parse::<u32>()) {
            return front + lfe;
        }
    }

    layout
        .split_whitespace()
        .next()
        .and_then(|n| n.parse::<u32>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(2)
}

/// Static reference tables consumed by negotiation and synthesis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Catalog {
    _private: (),
}

impl Catalog {
    /// The built-in tables.
    pub const fn standard() -> Self {
        Self { _private: () }
    }

    // -- video ---------------------------------------------------------------

    pub fn video_tier(&self, quality: VideoQuality) -> &'static VideoTier {
        &VIDEO_TIERS[usize::from(quality.index())]
    }

    /// Highest tier the source itself reaches.
    ///
    /// With known dimensions a tier is reached when either dimension is at
    /// least the tier's. Otherwise the bitrate decides; a source with neither
    /// is not limited.
    pub fn highest_video_quality(
        &self,
        video: &VideoStream,
        fallback_bitrate: Option<u32>,
    ) -> VideoQuality {
        if let Some(res) = video.resolution() {
            return VIDEO_TIERS
                .iter()
                .rev()
                .find(|t| res.width >= t.resolution.width || res.height >= t.resolution.height)
                .map_or(VideoQuality::VeryLow, |t| t.quality);
        }

        match video.bitrate.or(fallback_bitrate) {
            Some(bitrate) => VIDEO_TIERS
                .iter()
                .rev()
                .find(|t| bitrate >= t.max_bitrate)
                .map_or(VideoQuality::VeryLow, |t| t.quality),
            None => VideoQuality::Ultra,
        }
    }

    /// Output frame size for a tier: the source fitted into the tier box with
    /// aspect ratio kept and even dimensions. Never larger than the source.
    pub fn video_resolution(
        &self,
        quality: VideoQuality,
        source: Option<Resolution>,
    ) -> Resolution {
        let bound = self.video_tier(quality).resolution;
        let Some(src) = source.filter(|r| r.width > 0 && r.height > 0) else {
            return bound;
        };
        if !src.exceeds(&bound) {
            return src;
        }

        let (sw, sh) = (u64::from(src.width), u64::from(src.height));
        let (bw, bh) = (u64::from(bound.width), u64::from(bound.height));
        let (w, h) = if sw * bh > sh * bw {
            (bw, sh * bw / sw)
        } else {
            (sw * bh / sh, bh)
        };

        let even = |v: u64| (u32::try_from(v).unwrap_or(u32::MAX) & !1).max(2);
        Resolution::new(even(w), even(h))
    }

    pub fn is_transcodable_video(&self, codec: &str) -> bool {
        contains_codec(TRANSCODABLE_VIDEO, codec)
    }

    /// Software encoder for a logical video codec.
    pub fn video_encoder(&self, codec: &str) -> String {
        match normalize_codec(codec).as_str() {
            "h264" => "libx264".into(),
            "hevc" => "libx265".into(),
            "vp8" => "libvpx".into(),
            other => other.into(),
        }
    }

    // -- audio ---------------------------------------------------------------

    pub fn audio_quality_for_video(&self, quality: VideoQuality) -> AudioQuality {
        VIDEO_AUDIO_QUALITY[usize::from(quality.index())]
    }

    /// Bitrate ceiling for a stream with `channels` channels, if bounded.
    pub fn audio_bitrate_ceiling(&self, quality: AudioQuality, channels: u32) -> Option<u32> {
        AUDIO_CHANNEL_BITRATE[usize::from(quality.index())].map(|per| per * channels)
    }

    pub fn default_max_sample_rate(&self, quality: AudioQuality) -> u32 {
        AUDIO_SAMPLE_RATE[usize::from(quality.index())]
    }

    pub fn is_transcodable_audio(&self, codec: &str) -> bool {
        contains_codec(TRANSCODABLE_AUDIO, codec)
    }

    pub fn is_lossless(&self, codec: &str) -> bool {
        contains_codec(LOSSLESS_AUDIO, codec)
    }

    /// Direct-stream-digital family, exempt from sample-rate ceilings.
    pub fn is_dsd(&self, codec: &str) -> bool {
        normalize_codec(codec) == "dsd"
    }

    /// Highest sample rate the codec can carry.
    pub fn max_sample_rate(&self, codec: &str) -> u32 {
        match normalize_codec(codec).as_str() {
            "mp3" | "opus" | "ac3" | "eac3" => 48_000,
            "aac" => 96_000,
            _ => 192_000,
        }
    }

    /// Encoder for a logical audio codec.
    pub fn audio_encoder(&self, codec: &str) -> String {
        match normalize_codec(codec).as_str() {
            "mp3" => "libmp3lame".into(),
            "vorbis" => "libvorbis".into(),
            "opus" => "libopus".into(),
            "pcm" => "pcm_s16le".into(),
            other => other.into(),
        }
    }

    /// Encoder quality parameter (`-q:a`) for a codec at a tier, where the
    /// encoder supports one.
    pub fn audio_quality_param(&self, codec: &str, quality: AudioQuality) -> Option<i32> {
        let idx = usize::from(quality.index());
        match normalize_codec(codec).as_str() {
            "mp3" => Some([6, 4, 2, 0, 0][idx]),
            "vorbis" => Some([3, 5, 7, 9, 10][idx]),
            _ => None,
        }
    }

    /// Container an audio-only stream of this codec is delivered in.
    pub fn format_for_audio_codec(&self, codec: &str) -> &'static str {
        match normalize_codec(codec).as_str() {
            "aac" => "adts",
            "mp3" => "mp3",
            "vorbis" | "opus" => "ogg",
            "flac" => "flac",
            "pcm" => "wav",
            "ac3" => "ac3",
            "eac3" => "eac3",
            "alac" => "ipod",
            _ => "matroska",
        }
    }

    // -- subtitles -----------------------------------------------------------

    pub fn is_text_subtitle(&self, format: &str) -> bool {
        contains_codec(TEXT_SUBTITLES, format)
    }

    pub fn is_picture_subtitle(&self, format: &str) -> bool {
        contains_codec(PICTURE_SUBTITLES, format)
    }

    // -- containers ----------------------------------------------------------

    fn container(&self, format: &str) -> Option<&'static [&'static str]> {
        let format = normalize_format(format);
        CONTAINERS
            .iter()
            .find(|(name, _)| *name == format)
            .map(|(_, codecs)| *codecs)
    }

    pub fn is_known_format(&self, format: &str) -> bool {
        self.container(format).is_some()
    }

    /// Whether the container can carry the codec. Unknown containers carry
    /// nothing.
    pub fn format_supports(&self, format: &str, codec: &str) -> bool {
        self.container(format)
            .is_some_and(|codecs| contains_codec(codecs, codec))
    }
}
