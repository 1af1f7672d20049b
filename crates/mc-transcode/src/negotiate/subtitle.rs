use mc_core::{Error, Result};

use crate::capability::CapabilityProfile;
use crate::catalog::{contains_codec, normalize_codec, Catalog, TEXT_SUBTITLE_CODEC};
use crate::decision::{CodecChoice, SubtitleDecision};
use crate::source::SourceMedia;

/// Result of subtitle negotiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleOutcome {
    /// One decision per source subtitle stream, in order.
    pub decisions: Vec<SubtitleDecision>,
    /// Selected track: the caller's choice, else the first forced stream.
    pub subtitle_track: Option<usize>,
}

/// Decide delivery for every subtitle stream.
///
/// Text formats the client cannot take become WebVTT; picture formats are
/// burned into the video. Unrecognised formats pass through.
pub fn negotiate_subtitles(
    source: &SourceMedia,
    caps: &CapabilityProfile,
    catalog: &Catalog,
) -> Result<SubtitleOutcome> {
    if caps.quality.is_none() {
        return Err(Error::missing("quality"));
    }
    if caps.codecs.is_empty() {
        return Err(Error::missing("codecs"));
    }

    let decisions = source
        .subtitles
        .iter()
        .map(|sub| {
            let accepted = contains_codec(&caps.codecs, &sub.format)
                && caps
                    .format
                    .as_deref()
                    .map_or(true, |f| catalog.format_supports(f, &sub.format));

            let decision = if accepted {
                SubtitleDecision {
                    codec: CodecChoice::Copy,
                    hardcode: false,
                }
            } else if catalog.is_text_subtitle(&sub.format) {
                SubtitleDecision {
                    codec: CodecChoice::Convert(TEXT_SUBTITLE_CODEC.into()),
                    hardcode: false,
                }
            } else if catalog.is_picture_subtitle(&sub.format) {
                SubtitleDecision {
                    codec: CodecChoice::Convert(normalize_codec(&sub.format)),
                    hardcode: true,
                }
            } else {
                SubtitleDecision {
                    codec: CodecChoice::Copy,
                    hardcode: false,
                }
            };

            tracing::debug!(
                index = sub.index,
                format = %sub.format,
                codec = %decision.codec,
                hardcode = decision.hardcode,
                "subtitle stream negotiated"
            );
            decision
        })
        .collect();

    let subtitle_track = caps
        .subtitle_track
        .or_else(|| source.subtitles.iter().position(|s| s.forced));

    Ok(SubtitleOutcome {
        decisions,
        subtitle_track,
    })
}
