use mc_core::{Error, Result, StreamType, VideoQuality};

use crate::capability::CapabilityProfile;
use crate::catalog::{contains_codec, normalize_codec, Catalog};
use crate::decision::{CodecChoice, VideoDecision};
use crate::source::SourceMedia;

/// Result of video negotiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoOutcome {
    /// `None` when the source has no video stream.
    pub decision: Option<VideoDecision>,
    /// Requested tier clamped to what the source reaches.
    pub quality: Option<VideoQuality>,
}

/// Decide whether the video stream is copied or converted.
///
/// The requested tier is clamped down to the highest tier the source
/// reaches, never up. A target resolution is only set when direct play is
/// disabled.
pub fn negotiate_video(
    source: &SourceMedia,
    caps: &CapabilityProfile,
    catalog: &Catalog,
) -> Result<VideoOutcome> {
    let requested = caps.quality.ok_or_else(|| Error::missing("quality"))?;
    if caps.codecs.is_empty() {
        return Err(Error::missing("codecs"));
    }
    let format = caps.format.as_deref();
    if format.is_none() && source.is_video() {
        return Err(Error::missing("format"));
    }

    let Some(video) = source.video.as_ref() else {
        return Ok(VideoOutcome {
            decision: None,
            quality: None,
        });
    };

    let highest = catalog.highest_video_quality(video, source.bitrate);
    let quality = VideoQuality::from_index_saturating(requested).min(highest);
    let tier = catalog.video_tier(quality);
    // The item's overall rate covers every stream the client will receive.
    let bitrate = source.bitrate.or(video.bitrate);
    let resolution = video.resolution();

    let over_client_bitrate = matches!(
        (bitrate, caps.max_bitrate),
        (Some(b), Some(max)) if b > max
    );
    let over_tier = bitrate.is_some_and(|b| b > tier.max_bitrate)
        || resolution.is_some_and(|r| r.exceeds(&tier.resolution));

    let mut transcode = !contains_codec(&caps.codecs, &video.codec)
        || over_client_bitrate
        || (!caps.direct_play && over_tier);

    if let Some(format) = format {
        if !catalog.format_supports(format, &video.codec) {
            transcode = true;
        }
    }

    if !transcode {
        tracing::debug!(codec = %video.codec, quality = %quality, "video stream copied");
        return Ok(VideoOutcome {
            decision: Some(VideoDecision {
                codec: CodecChoice::Copy,
                resolution: None,
            }),
            quality: Some(quality),
        });
    }

    let codec = caps
        .codecs
        .iter()
        .find(|c| {
            catalog.is_transcodable_video(c) && format.map_or(true, |f| catalog.format_supports(f, c))
        })
        .ok_or_else(|| Error::no_viable_codec(StreamType::Video, 0))?;

    let target = (!caps.direct_play).then(|| catalog.video_resolution(quality, resolution));

    tracing::debug!(
        from = %video.codec,
        to = %codec,
        quality = %quality,
        resolution = ?target,
        "video stream converted"
    );

    Ok(VideoOutcome {
        decision: Some(VideoDecision {
            codec: CodecChoice::Convert(normalize_codec(codec)),
            resolution: target,
        }),
        quality: Some(quality),
    })
}
