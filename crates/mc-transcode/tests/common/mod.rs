//! Shared fixtures for mc-transcode integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use mc_core::MediaType;
use mc_transcode::{
    AcceleratorKind, AudioStream, Backend, CapabilityProfile, Catalog, HardwareAccelerator,
    SourceMedia, StreamPaths, SubtitleStream, Synthesizer, TranscodeProfile, VideoStream,
};

pub const FFMPEG: &str = "/usr/bin/ffmpeg";
pub const CACHE: &str = "/var/cache/mediacast";
pub const DATA: &str = "/var/lib/mediacast";

/// 1080p / 8 Mbps H.264 movie with one stereo AAC track.
pub fn movie() -> SourceMedia {
    SourceMedia {
        path: PathBuf::from("/media/movies/feature.mkv"),
        media_type: MediaType::Video,
        bitrate: Some(8192),
        video: Some(VideoStream {
            codec: "h264".into(),
            bitrate: Some(8000),
            width: Some(1920),
            height: Some(1080),
        }),
        audio: vec![AudioStream {
            codec: "aac".into(),
            bitrate: Some(192),
            sample_rate: Some(48_000),
            configuration: Some("stereo".into()),
        }],
        subtitles: Vec::new(),
    }
}

/// The movie with a forced picture subtitle and a text subtitle.
pub fn movie_with_subtitles() -> SourceMedia {
    SourceMedia {
        subtitles: vec![
            SubtitleStream {
                format: "subrip".into(),
                forced: false,
                index: 2,
            },
            SubtitleStream {
                format: "hdmv_pgs_subtitle".into(),
                forced: true,
                index: 3,
            },
        ],
        ..movie()
    }
}

/// Stereo FLAC track.
pub fn flac_song() -> SourceMedia {
    SourceMedia {
        path: PathBuf::from("/media/music/track01.flac"),
        media_type: MediaType::Audio,
        bitrate: Some(1000),
        video: None,
        audio: vec![AudioStream {
            codec: "flac".into(),
            bitrate: Some(1000),
            sample_rate: Some(44_100),
            configuration: Some("stereo".into()),
        }],
        subtitles: Vec::new(),
    }
}

/// HLS client asking for the 720p tier without direct play.
pub fn hls_client(quality: u8) -> CapabilityProfile {
    CapabilityProfile {
        client: Some("generic".into()),
        quality: Some(quality),
        codecs: vec!["h264".into(), "aac".into(), "webvtt".into()],
        direct_play: false,
        format: Some("hls".into()),
        ..Default::default()
    }
}

pub fn vaapi() -> HardwareAccelerator {
    HardwareAccelerator::new(
        AcceleratorKind::Vaapi,
        Some(PathBuf::from("/dev/dri/renderD128")),
    )
}

pub fn cuda() -> HardwareAccelerator {
    HardwareAccelerator::new(AcceleratorKind::Cuda, None)
}

pub fn synthesizer(accelerators: Vec<HardwareAccelerator>) -> Synthesizer {
    let backend = Backend::new(PathBuf::from(FFMPEG)).with_accelerators(accelerators);
    Synthesizer::new(Arc::new(backend), StreamPaths::new(CACHE, DATA))
}

pub fn profile(source: SourceMedia, caps: CapabilityProfile) -> TranscodeProfile {
    TranscodeProfile::negotiate(source, caps, &Catalog::standard())
        .expect("negotiation should succeed")
}
