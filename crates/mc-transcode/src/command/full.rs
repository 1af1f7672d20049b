//! Full-file transcode commands.

use crate::backend::HardwareAccelerator;
use crate::decision::CodecChoice;
use crate::profile::TranscodeProfile;

use super::encode::{push_decode, push_video_encode};
use super::{CommandBuilder, CommandVariant, Synthesizer};

impl Synthesizer {
    /// Command variants for transcoding the whole item.
    ///
    /// Converting video yields one variant per accelerator, in backend
    /// order, followed by a software variant; anything else yields a single
    /// software variant. Repeated calls produce identical output.
    pub fn full_command(&self, profile: &TranscodeProfile) -> Vec<CommandVariant> {
        let convert = profile.decisions().converts_video();
        let variants: Vec<_> = self
            .slots(convert)
            .into_iter()
            .map(|accel| self.build_full(profile, accel))
            .collect();

        tracing::debug!(
            profile_id = %profile.id(),
            variants = variants.len(),
            format = %profile.decisions().format,
            "full command synthesized"
        );
        variants
    }

    fn build_full(
        &self,
        profile: &TranscodeProfile,
        accel: Option<&HardwareAccelerator>,
    ) -> CommandVariant {
        let decisions = profile.decisions();
        let source = profile.source();
        let id = profile.id();

        let mut b = CommandBuilder::new(&self.backend.transcoder);
        b.param("-ss", profile.capabilities().offset);

        if let Some(video) = &decisions.video {
            if let CodecChoice::Convert(codec) = &video.codec {
                push_decode(&mut b, accel, codec, false);
            }
            b.input(&source.path);

            for index in 0..decisions.subtitles.len() {
                b.param("-map", format!("0:s:{index}")).param("-c:s", "copy");
            }

            b.param("-map", "0:v");
            match &video.codec {
                CodecChoice::Copy => {
                    b.param("-c:v", "copy");
                }
                CodecChoice::Convert(codec) => {
                    push_video_encode(&mut b, &self.catalog, accel, codec, video.resolution, None);
                }
            }
        }

        if !decisions.audio.is_empty() {
            if !b.has_input() {
                b.input(&source.path);
            }
            b.param("-strict", "experimental");

            for (index, audio) in decisions.audio.iter().enumerate() {
                b.param("-map", format!("0:a:{index}"));
                match &audio.codec {
                    CodecChoice::Copy => {
                        b.param("-c:a", "copy");
                    }
                    CodecChoice::Convert(codec) => {
                        let encoder = audio
                            .encoder
                            .clone()
                            .unwrap_or_else(|| self.catalog.audio_encoder(codec));
                        b.param("-c:a", encoder);
                    }
                }
                if let Some(quality) = audio.quality {
                    b.param("-q:a", quality);
                }
                if audio.downmix {
                    b.param("-ac", 2).param("-clev", "3dB").param("-slev", "-3dB");
                }
                if let Some(rate) = audio.sample_rate {
                    b.param("-ar", rate);
                }
            }
        }

        if !b.has_input() {
            b.input(&source.path);
        }

        let offset = profile.capabilities().offset;
        match decisions.format.as_str() {
            "hls" => {
                let segment_format = if decisions.video.is_some() {
                    "matroska"
                } else {
                    "mpegts"
                };
                b.param("-f", "segment")
                    .param("-segment_time", self.segment_duration)
                    .param("-segment_format", segment_format);
                if offset > 0 {
                    b.param("-segment_start_number", offset / self.segment_duration)
                        .param("-initial_offset", offset);
                }
                b.param("-segment_list", self.paths.segment_list(id).display())
                    .param("-segment_list_type", "flat")
                    .output(self.paths.segment_pattern(id).to_string_lossy());
            }
            "dash" => {
                if decisions.video.is_some() {
                    b.param("-flags", "-global_header");
                }
                b.param("-f", "dash")
                    .output(self.paths.manifest(id).to_string_lossy());
            }
            format => {
                b.param("-f", format).output("-");
            }
        }

        b.finish(accel)
    }
}
