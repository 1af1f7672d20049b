//! Per-segment correction commands for adaptive streaming.

use mc_core::{StreamType, VideoQuality};
use serde::{Deserialize, Serialize};

use crate::backend::HardwareAccelerator;
use crate::decision::CodecChoice;
use crate::profile::TranscodeProfile;
use crate::source::Resolution;

use super::encode::{push_decode, push_video_encode};
use super::{CommandBuilder, CommandVariant, Synthesizer};

/// Codec every re-encoded video segment is produced in.
const SEGMENT_VIDEO_CODEC: &str = "h264";

/// Container for re-muxed segments.
const SEGMENT_FORMAT: &str = "mpegts";

/// Client that needs audio segments in the codec's own container.
const CODEC_CONTAINER_CLIENT: &str = "chromecast";

/// A request to correct one intermediate segment.
///
/// `index` is a video tier for video segments and a track index for audio
/// and subtitle segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentRequest {
    pub segment: Option<String>,
    pub stream_type: Option<StreamType>,
    pub index: Option<usize>,
}

impl SegmentRequest {
    pub fn new(segment: impl Into<String>, stream_type: StreamType, index: usize) -> Self {
        Self {
            segment: Some(segment.into()),
            stream_type: Some(stream_type),
            index: Some(index),
        }
    }
}

impl Synthesizer {
    /// Command variants for correcting one segment of a negotiated profile.
    ///
    /// Returns `None` when the segment name, profile, type or index is
    /// missing: there is nothing to do. Video segments are re-encoded only
    /// when the requested tier differs from the negotiated one or a
    /// subtitle must be burned in; only then are accelerator variants
    /// produced.
    pub fn segment_command(
        &self,
        request: &SegmentRequest,
        profile: Option<&TranscodeProfile>,
    ) -> Option<Vec<CommandVariant>> {
        let segment = request.segment.as_deref().filter(|s| !s.is_empty())?;
        let stream_type = request.stream_type?;
        let index = request.index?;
        let profile = profile?;

        let variants: Vec<_> = match stream_type {
            StreamType::Video => {
                let plan = VideoSegmentPlan::new(self, profile, index);
                self.slots(plan.reencode)
                    .into_iter()
                    .map(|accel| self.build_video_segment(profile, segment, index, &plan, accel))
                    .collect()
            }
            StreamType::Audio => vec![self.build_audio_segment(profile, segment, index)],
            StreamType::Subtitle => vec![self.build_subtitle_segment(profile, segment, index)],
        };

        tracing::debug!(
            profile_id = %profile.id(),
            segment,
            stream_type = %stream_type,
            index,
            variants = variants.len(),
            "segment command synthesized"
        );
        Some(variants)
    }

    fn build_video_segment(
        &self,
        profile: &TranscodeProfile,
        segment: &str,
        index: usize,
        plan: &VideoSegmentPlan,
        accel: Option<&HardwareAccelerator>,
    ) -> CommandVariant {
        let id = profile.id();
        let decisions = profile.decisions();
        let mut b = CommandBuilder::new(&self.backend.transcoder);

        if plan.reencode {
            push_decode(&mut b, accel, SEGMENT_VIDEO_CODEC, plan.overlay.is_some());
        }
        b.input(&self.paths.segment(id, segment));

        if decisions.video.is_some() {
            // A selected subtitle stays in the segment's default stream set.
            if decisions.selected_subtitle().is_none() {
                b.param("-map", "0:v").flag("-sn");
            }
            if plan.reencode {
                push_video_encode(
                    &mut b,
                    &self.catalog,
                    accel,
                    SEGMENT_VIDEO_CODEC,
                    plan.resolution,
                    plan.overlay,
                );
            } else {
                b.param("-c:v", "copy");
            }
            b.param("-f", SEGMENT_FORMAT);
        }

        self.finish_segment(b, profile, segment, StreamType::Video, index, accel)
    }

    fn build_audio_segment(
        &self,
        profile: &TranscodeProfile,
        segment: &str,
        index: usize,
    ) -> CommandVariant {
        let decisions = profile.decisions();
        let mut b = CommandBuilder::new(&self.backend.transcoder);
        b.input(&self.paths.segment(profile.id(), segment));

        if index < decisions.audio.len() {
            b.param("-map", format!("0:a:{index}")).param("-c:a", "copy");
        }

        let format = if profile.capabilities().is_client(CODEC_CONTAINER_CLIENT) {
            let codec = match decisions.audio.get(index).map(|a| &a.codec) {
                Some(CodecChoice::Convert(codec)) => Some(codec.as_str()),
                _ => profile.source().audio.get(index).map(|s| s.codec.as_str()),
            };
            codec.map_or(SEGMENT_FORMAT, |c| self.catalog.format_for_audio_codec(c))
        } else {
            SEGMENT_FORMAT
        };
        b.param("-f", format);

        self.finish_segment(b, profile, segment, StreamType::Audio, index, None)
    }

    fn build_subtitle_segment(
        &self,
        profile: &TranscodeProfile,
        segment: &str,
        index: usize,
    ) -> CommandVariant {
        let mut b = CommandBuilder::new(&self.backend.transcoder);
        b.input(&self.paths.segment(profile.id(), segment));

        if index < profile.decisions().subtitles.len() {
            b.param("-map", format!("0:s:{index}"));
        }
        b.param("-c:s", "webvtt").param("-f", "webvtt");

        self.finish_segment(b, profile, segment, StreamType::Subtitle, index, None)
    }

    fn finish_segment(
        &self,
        mut b: CommandBuilder,
        profile: &TranscodeProfile,
        segment: &str,
        stream_type: StreamType,
        index: usize,
        accel: Option<&HardwareAccelerator>,
    ) -> CommandVariant {
        let output = self
            .paths
            .corrected_segment(profile.id(), segment, stream_type, index);
        b.flag("-copyts").output(output.to_string_lossy());
        b.finish(accel)
    }
}

/// What a video segment correction has to do.
struct VideoSegmentPlan {
    reencode: bool,
    resolution: Option<Resolution>,
    /// Subtitle stream to burn in.
    overlay: Option<usize>,
}

impl VideoSegmentPlan {
    fn new(synth: &Synthesizer, profile: &TranscodeProfile, index: usize) -> Self {
        let decisions = profile.decisions();
        let requested = VideoQuality::from_index_saturating(u8::try_from(index).unwrap_or(u8::MAX));

        let overlay = decisions
            .selected_subtitle()
            .filter(|s| s.hardcode)
            .and(decisions.subtitle_track);

        let retier = requested.index() != decisions.quality;
        let reencode = decisions.video.is_some() && (retier || overlay.is_some());

        // At the negotiated tier the segment already has its target size.
        let resolution = (reencode && retier).then(|| {
            let native = profile.source().video.as_ref().and_then(|v| v.resolution());
            synth.catalog.video_resolution(requested, native)
        });

        Self {
            reencode,
            resolution,
            overlay: overlay.filter(|_| reencode),
        }
    }
}
