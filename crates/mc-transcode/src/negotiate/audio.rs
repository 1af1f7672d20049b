use mc_core::{AudioQuality, Error, Result, StreamType, VideoQuality};

use crate::capability::CapabilityProfile;
use crate::catalog::{channel_count, contains_codec, normalize_codec, Catalog};
use crate::decision::{AudioDecision, CodecChoice};
use crate::source::{AudioStream, SourceMedia};

/// Result of audio negotiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioOutcome {
    /// One decision per source audio stream, in order.
    pub decisions: Vec<AudioDecision>,
    /// Container format, inferred from the first audio codec when unset.
    pub format: Option<String>,
    pub audio_track: Option<usize>,
}

/// Decide copy or conversion for every audio stream.
pub fn negotiate_audio(
    source: &SourceMedia,
    caps: &CapabilityProfile,
    catalog: &Catalog,
) -> Result<AudioOutcome> {
    let requested = caps.quality.ok_or_else(|| Error::missing("quality"))?;
    if caps.codecs.is_empty() {
        return Err(Error::missing("codecs"));
    }
    if caps.format.is_none() && source.is_video() {
        return Err(Error::missing("format"));
    }

    let tier = if source.is_audio() {
        AudioQuality::from_index(requested).unwrap_or(AudioQuality::Lossless)
    } else {
        catalog.audio_quality_for_video(VideoQuality::from_index_saturating(requested))
    };
    let max_sample_rate = caps
        .max_sample_rate
        .unwrap_or_else(|| catalog.default_max_sample_rate(tier));

    let mut format = caps.format.clone();
    let mut decisions = Vec::with_capacity(source.audio.len());

    for (index, stream) in source.audio.iter().enumerate() {
        let decision = if needs_conversion(source, stream, caps, catalog, tier, max_sample_rate, format.as_deref()) {
            convert(source, stream, index, caps, catalog, tier, max_sample_rate, format.as_deref())?
        } else {
            tracing::debug!(index, codec = %stream.codec, "audio stream copied");
            AudioDecision::copy()
        };

        if format.is_none() {
            let codec = decision.codec.codec().unwrap_or(&stream.codec);
            format = Some(catalog.format_for_audio_codec(codec).to_string());
        }
        decisions.push(decision);
    }

    let audio_track = caps
        .audio_track
        .or_else(|| (!source.audio.is_empty()).then_some(0));

    Ok(AudioOutcome {
        decisions,
        format,
        audio_track,
    })
}

fn needs_conversion(
    source: &SourceMedia,
    stream: &AudioStream,
    caps: &CapabilityProfile,
    catalog: &Catalog,
    tier: AudioQuality,
    max_sample_rate: u32,
    format: Option<&str>,
) -> bool {
    let channels = channel_count(stream.configuration.as_deref());

    let accepted = if channels > 2 {
        caps.mch_codecs
            .as_ref()
            .is_some_and(|mch| contains_codec(mch, &stream.codec))
    } else {
        contains_codec(&caps.codecs, &stream.codec)
    };
    if !accepted {
        return true;
    }

    if stream.sample_rate.is_some_and(|sr| sr > max_sample_rate) && !catalog.is_dsd(&stream.codec) {
        return true;
    }

    if !caps.direct_play && source.is_audio() {
        let bitrate = source.bitrate.or(stream.bitrate);
        if let (Some(bitrate), Some(ceiling)) = (bitrate, catalog.audio_bitrate_ceiling(tier, channels)) {
            if bitrate > ceiling {
                return true;
            }
        }
    }

    match format {
        Some(format) => !catalog.format_supports(format, &stream.codec),
        None => !catalog.is_transcodable_audio(&stream.codec),
    }
}

#[allow(clippy::too_many_arguments)]
fn convert(
    source: &SourceMedia,
    stream: &AudioStream,
    index: usize,
    caps: &CapabilityProfile,
    catalog: &Catalog,
    tier: AudioQuality,
    max_sample_rate: u32,
    format: Option<&str>,
) -> Result<AudioDecision> {
    let channels = channel_count(stream.configuration.as_deref());
    let mut codecs = caps.codecs.clone();
    let mut mch_codecs = caps.mch_codecs.clone();

    if source.is_audio()
        && (tier == AudioQuality::Lossless || caps.direct_play)
        && catalog.is_lossless(&stream.codec)
    {
        prefer_lossless(&mut codecs, catalog);
        if let Some(mch) = mch_codecs.as_mut() {
            prefer_lossless(mch, catalog);
        }
    }

    let usable = |codec: &String| {
        catalog.is_transcodable_audio(codec) && format.map_or(true, |f| catalog.format_supports(f, codec))
    };

    let mut downmix = false;
    let mut chosen = None;
    if channels > 2 {
        chosen = mch_codecs.as_ref().and_then(|mch| mch.iter().find(|c| usable(c)));
        downmix = chosen.is_none();
    }
    let codec = chosen
        .or_else(|| codecs.iter().find(|c| usable(c)))
        .map(|c| normalize_codec(c))
        .ok_or_else(|| Error::no_viable_codec(StreamType::Audio, index))?;

    let ceiling = max_sample_rate.min(catalog.max_sample_rate(&codec));
    let sample_rate = stream
        .sample_rate
        .filter(|&sr| sr > ceiling)
        .map(|_| ceiling);

    tracing::debug!(
        index,
        from = %stream.codec,
        to = %codec,
        downmix,
        sample_rate = ?sample_rate,
        "audio stream converted"
    );

    Ok(AudioDecision {
        encoder: Some(catalog.audio_encoder(&codec)),
        quality: catalog.audio_quality_param(&codec, tier),
        sample_rate,
        downmix,
        codec: CodecChoice::Convert(codec),
    })
}

/// Move lossless codecs to the front, keeping relative order otherwise.
fn prefer_lossless(codecs: &mut [String], catalog: &Catalog) {
    codecs.sort_by_key(|c| !catalog.is_lossless(c));
}

#[cfg(test)]
mod tests {
    use super::*;
    use mc_core::MediaType;
    use std::path::PathBuf;

    fn stream(codec: &str, sample_rate: u32, layout: &str) -> AudioStream {
        AudioStream {
            codec: codec.into(),
            bitrate: None,
            sample_rate: Some(sample_rate),
            configuration: Some(layout.into()),
        }
    }

    fn audio_item(streams: Vec<AudioStream>) -> SourceMedia {
        SourceMedia {
            path: PathBuf::from("/music/track"),
            media_type: MediaType::Audio,
            bitrate: None,
            video: None,
            audio: streams,
            subtitles: Vec::new(),
        }
    }

    fn video_item(streams: Vec<AudioStream>) -> SourceMedia {
        SourceMedia {
            media_type: MediaType::Video,
            ..audio_item(streams)
        }
    }

    fn caps(quality: u8, codecs: &[&str]) -> CapabilityProfile {
        CapabilityProfile {
            quality: Some(quality),
            codecs: codecs.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn lossless_flac_is_copied_and_format_inferred() {
        let src = audio_item(vec![stream("flac", 44_100, "stereo")]);
        let out = negotiate_audio(&src, &caps(4, &["flac", "mp3"]), &Catalog::standard()).unwrap();
        assert_eq!(out.decisions, vec![AudioDecision::copy()]);
        assert_eq!(out.format.as_deref(), Some("flac"));
        assert_eq!(out.audio_track, Some(0));
    }

    #[test]
    fn unacceptable_codec_is_converted_with_quality() {
        let src = audio_item(vec![stream("flac", 44_100, "stereo")]);
        let out = negotiate_audio(&src, &caps(2, &["mp3"]), &Catalog::standard()).unwrap();
        let d = &out.decisions[0];
        assert_eq!(d.codec, CodecChoice::Convert("mp3".into()));
        assert_eq!(d.encoder.as_deref(), Some("libmp3lame"));
        assert_eq!(d.quality, Some(2));
        assert_eq!(d.sample_rate, None);
        assert_eq!(out.format.as_deref(), Some("mp3"));
    }

    #[test]
    fn lossless_source_prefers_lossless_targets() {
        let src = audio_item(vec![stream("alac", 44_100, "stereo")]);
        let out = negotiate_audio(&src, &caps(4, &["mp3", "flac"]), &Catalog::standard()).unwrap();
        assert_eq!(out.decisions[0].codec, CodecChoice::Convert("flac".into()));

        let out = negotiate_audio(&src, &caps(1, &["mp3", "flac"]), &Catalog::standard()).unwrap();
        assert_eq!(out.decisions[0].codec, CodecChoice::Convert("mp3".into()));
    }

    #[test]
    fn sample_rate_capped_by_codec() {
        let src = audio_item(vec![stream("flac", 96_000, "stereo")]);
        let mut c = caps(4, &["mp3"]);
        c.max_sample_rate = Some(96_000);
        let out = negotiate_audio(&src, &c, &Catalog::standard()).unwrap();
        assert_eq!(out.decisions[0].sample_rate, Some(48_000));
    }

    #[test]
    fn high_sample_rate_forces_conversion_except_dsd() {
        let catalog = Catalog::standard();
        let mut c = caps(4, &["flac", "dsd"]);
        c.max_sample_rate = Some(48_000);
        c.format = Some("matroska".into());

        let out = negotiate_audio(&audio_item(vec![stream("flac", 96_000, "stereo")]), &c, &catalog)
            .unwrap();
        assert_eq!(out.decisions[0].codec, CodecChoice::Convert("flac".into()));
        assert_eq!(out.decisions[0].sample_rate, Some(48_000));

        c.format = None;
        c.codecs = vec!["dsd_lsbf".into(), "flac".into()];
        let out = negotiate_audio(&audio_item(vec![stream("dsd_lsbf", 2_822_400, "stereo")]), &c, &catalog)
            .unwrap();
        // DSD is not transcodable, so an unset container still forces a
        // conversion; the sample rate alone would not.
        assert_eq!(out.decisions[0].codec, CodecChoice::Convert("flac".into()));
    }

    #[test]
    fn bitrate_ceiling_applies_to_audio_items_only() {
        let catalog = Catalog::standard();
        let mut s = stream("mp3", 44_100, "stereo");
        s.bitrate = Some(320);
        let mut c = caps(1, &["mp3"]);
        c.format = Some("mp3".into());

        let out = negotiate_audio(&audio_item(vec![s.clone()]), &c, &catalog).unwrap();
        assert!(!out.decisions[0].codec.is_copy());

        c.direct_play = true;
        let out = negotiate_audio(&audio_item(vec![s.clone()]), &c, &catalog).unwrap();
        assert!(out.decisions[0].codec.is_copy());

        c.direct_play = false;
        c.codecs = vec!["mp3".into()];
        c.format = Some("matroska".into());
        let out = negotiate_audio(&video_item(vec![s]), &c, &catalog).unwrap();
        assert!(out.decisions[0].codec.is_copy());
    }

    #[test]
    fn multichannel_without_match_downmixes() {
        let src = video_item(vec![stream("dts", 48_000, "5.1(side)")]);
        let mut c = caps(3, &["aac", "mp3"]);
        c.mch_codecs = Some(vec!["truehd".into()]);
        c.format = Some("hls".into());
        let out = negotiate_audio(&src, &c, &Catalog::standard()).unwrap();
        let d = &out.decisions[0];
        assert!(d.downmix);
        assert_eq!(d.codec, CodecChoice::Convert("aac".into()));
        assert_eq!(out.format.as_deref(), Some("hls"));
    }

    #[test]
    fn multichannel_with_match_keeps_channels() {
        let src = video_item(vec![stream("dts", 48_000, "5.1")]);
        let mut c = caps(3, &["aac"]);
        c.mch_codecs = Some(vec!["eac3".into(), "ac3".into()]);
        c.format = Some("hls".into());
        let out = negotiate_audio(&src, &c, &Catalog::standard()).unwrap();
        let d = &out.decisions[0];
        assert!(!d.downmix);
        assert_eq!(d.codec, CodecChoice::Convert("eac3".into()));
    }

    #[test]
    fn multichannel_copied_when_listed() {
        let src = video_item(vec![stream("ac3", 48_000, "5.1")]);
        let mut c = caps(3, &["aac"]);
        c.mch_codecs = Some(vec!["ac3".into()]);
        c.format = Some("hls".into());
        let out = negotiate_audio(&src, &c, &Catalog::standard()).unwrap();
        assert!(out.decisions[0].codec.is_copy());
    }

    #[test]
    fn exhausted_search_is_no_viable_codec() {
        let src = video_item(vec![stream("dts", 48_000, "stereo"), stream("truehd", 48_000, "stereo")]);
        let mut c = caps(3, &["dts"]);
        c.format = Some("matroska".into());
        let err = negotiate_audio(&src, &c, &Catalog::standard()).unwrap_err();
        assert!(matches!(
            err,
            Error::NoViableCodec {
                stream: StreamType::Audio,
                index: 1
            }
        ));
    }

    #[test]
    fn item_bitrate_takes_precedence_over_stream_bitrate() {
        let catalog = Catalog::standard();
        let mut s = stream("mp3", 44_100, "stereo");
        s.bitrate = Some(96);
        let mut src = audio_item(vec![s]);
        src.bitrate = Some(320);
        let mut c = caps(1, &["mp3"]);
        c.format = Some("mp3".into());

        let out = negotiate_audio(&src, &c, &catalog).unwrap();
        assert!(!out.decisions[0].codec.is_copy());

        src.bitrate = None;
        let out = negotiate_audio(&src, &c, &catalog).unwrap();
        assert!(out.decisions[0].codec.is_copy());
    }

    #[test]
    fn missing_format_for_video_item() {
        let src = video_item(vec![stream("aac", 48_000, "stereo")]);
        let err = negotiate_audio(&src, &caps(3, &["aac"]), &Catalog::standard()).unwrap_err();
        assert!(matches!(err, Error::MissingInput { field: "format" }));
    }

    #[test]
    fn explicit_audio_track_is_kept() {
        let src = audio_item(vec![stream("mp3", 44_100, "stereo"), stream("mp3", 44_100, "stereo")]);
        let mut c = caps(2, &["mp3"]);
        c.audio_track = Some(1);
        let out = negotiate_audio(&src, &c, &Catalog::standard()).unwrap();
        assert_eq!(out.audio_track, Some(1));
        assert_eq!(out.decisions.len(), 2);
    }
}
