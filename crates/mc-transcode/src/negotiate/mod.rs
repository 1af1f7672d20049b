//! Capability negotiation.
//!
//! Each stage is a pure function of the source descriptor, the capability
//! profile and the catalog. [`negotiate`] runs them in order, feeding the
//! clamped video tier into audio and the resolved container into subtitles.

mod audio;
mod subtitle;
mod video;

pub use audio::{negotiate_audio, AudioOutcome};
pub use subtitle::{negotiate_subtitles, SubtitleOutcome};
pub use video::{negotiate_video, VideoOutcome};

use mc_core::{Error, MediaType, Result};

use crate::capability::CapabilityProfile;
use crate::catalog::{normalize_format, Catalog};
use crate::decision::DecisionSet;
use crate::source::SourceMedia;

/// Container used when neither the client nor any audio stream fixes one.
const FALLBACK_FORMAT: &str = "matroska";

/// Compute the full decision set for a source and client.
pub fn negotiate(
    source: &SourceMedia,
    caps: &CapabilityProfile,
    catalog: &Catalog,
) -> Result<DecisionSet> {
    if source.media_type == MediaType::Directory {
        return Err(Error::Validation(format!(
            "{} is a directory and cannot be streamed",
            source.path.display()
        )));
    }
    if let Some(format) = caps.format.as_deref() {
        if !catalog.is_known_format(format) {
            return Err(Error::Validation(format!("unknown container format '{format}'")));
        }
    }

    let mut working = caps.clone();

    let video = negotiate_video(source, &working, catalog)?;
    if let Some(quality) = video.quality {
        working.quality = Some(quality.index());
    }

    let audio = negotiate_audio(source, &working, catalog)?;
    working.format = audio.format;

    let subtitles = negotiate_subtitles(source, &working, catalog)?;

    let quality = working.quality.ok_or_else(|| Error::missing("quality"))?;
    let format = working
        .format
        .as_deref()
        .map_or_else(|| FALLBACK_FORMAT.to_string(), normalize_format);

    tracing::debug!(
        path = %source.path.display(),
        quality,
        format = %format,
        video = ?video.decision.as_ref().map(|v| v.codec.to_string()),
        audio_streams = audio.decisions.len(),
        subtitle_streams = subtitles.decisions.len(),
        "negotiation complete"
    );

    Ok(DecisionSet {
        video: video.decision,
        audio: audio.decisions,
        subtitles: subtitles.decisions,
        quality,
        format,
        audio_track: audio.audio_track,
        subtitle_track: subtitles.subtitle_track,
    })
}

/// Whether delivering the item to this client needs any conversion.
pub fn requires_transcode(
    source: &SourceMedia,
    caps: &CapabilityProfile,
    catalog: &Catalog,
) -> Result<bool> {
    negotiate(source, caps, catalog).map(|decisions| !decisions.is_passthrough())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::CodecChoice;
    use crate::source::{AudioStream, Resolution, SubtitleStream, VideoStream};
    use std::path::PathBuf;

    fn movie() -> SourceMedia {
        SourceMedia {
            path: PathBuf::from("/media/movie.mkv"),
            media_type: MediaType::Video,
            bitrate: Some(8500),
            video: Some(VideoStream {
                codec: "h264".into(),
                bitrate: Some(8000),
                width: Some(1920),
                height: Some(1080),
            }),
            audio: vec![AudioStream {
                codec: "ac3".into(),
                bitrate: Some(448),
                sample_rate: Some(48_000),
                configuration: Some("5.1".into()),
            }],
            subtitles: vec![SubtitleStream {
                format: "dvd_subtitle".into(),
                forced: true,
                index: 2,
            }],
        }
    }

    fn caps() -> CapabilityProfile {
        CapabilityProfile {
            quality: Some(3),
            codecs: vec!["h264".into(), "aac".into(), "webvtt".into()],
            format: Some("hls".into()),
            ..Default::default()
        }
    }

    #[test]
    fn full_negotiation() {
        let set = negotiate(&movie(), &caps(), &Catalog::standard()).unwrap();

        let video = set.video.as_ref().unwrap();
        assert_eq!(video.codec, CodecChoice::Convert("h264".into()));
        assert_eq!(video.resolution, Some(Resolution::new(1280, 720)));

        assert_eq!(set.audio.len(), 1);
        assert!(set.audio[0].downmix);
        assert_eq!(set.audio[0].codec, CodecChoice::Convert("aac".into()));

        assert_eq!(set.subtitles.len(), 1);
        assert!(set.subtitles[0].hardcode);
        assert_eq!(set.subtitle_track, Some(0));
        assert_eq!(set.audio_track, Some(0));
        assert_eq!(set.quality, 3);
        assert_eq!(set.format, "hls");
    }

    #[test]
    fn clamped_quality_is_recorded() {
        let mut c = caps();
        c.quality = Some(5);
        let set = negotiate(&movie(), &c, &Catalog::standard()).unwrap();
        assert_eq!(set.quality, 4);
    }

    #[test]
    fn audio_item_format_is_inferred() {
        let source = SourceMedia {
            path: PathBuf::from("/music/song.flac"),
            media_type: MediaType::Audio,
            bitrate: Some(900),
            video: None,
            audio: vec![AudioStream {
                codec: "flac".into(),
                bitrate: Some(900),
                sample_rate: Some(44_100),
                configuration: Some("stereo".into()),
            }],
            subtitles: Vec::new(),
        };
        let c = CapabilityProfile {
            quality: Some(4),
            codecs: vec!["flac".into()],
            ..Default::default()
        };
        let set = negotiate(&source, &c, &Catalog::standard()).unwrap();
        assert!(set.is_passthrough());
        assert_eq!(set.format, "flac");
        assert!(!requires_transcode(&source, &c, &Catalog::standard()).unwrap());
    }

    #[test]
    fn directories_are_rejected() {
        let mut source = movie();
        source.media_type = MediaType::Directory;
        let err = negotiate(&source, &caps(), &Catalog::standard()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn unknown_container_is_rejected() {
        let mut c = caps();
        c.format = Some("flv".into());
        let err = negotiate(&movie(), &c, &Catalog::standard()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn negotiation_is_deterministic() {
        let catalog = Catalog::standard();
        let a = negotiate(&movie(), &caps(), &catalog).unwrap();
        let b = negotiate(&movie(), &caps(), &catalog).unwrap();
        assert_eq!(a, b);
        assert!(requires_transcode(&movie(), &caps(), &catalog).unwrap());
    }
}
