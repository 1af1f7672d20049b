//! Client capability profiles.

use mc_core::SessionId;
use serde::{Deserialize, Serialize};

/// What a client can play, as advertised when a stream is requested.
///
/// `quality` is a tier index: a video tier for video items, an audio tier
/// for audio items. Bitrates are in kbit/s and `offset` is in seconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilityProfile {
    pub session_id: Option<SessionId>,
    /// Client identifier ("chromecast", "generic", ...).
    pub client: Option<String>,
    pub quality: Option<u8>,
    /// Acceptable codecs, most preferred first.
    pub codecs: Vec<String>,
    /// Acceptable multichannel audio codecs, most preferred first.
    pub mch_codecs: Option<Vec<String>>,
    pub max_bitrate: Option<u32>,
    pub max_sample_rate: Option<u32>,
    pub direct_play: bool,
    /// Target container format; may be left for negotiation to resolve.
    pub format: Option<String>,
    pub offset: u32,
    pub audio_track: Option<usize>,
    pub subtitle_track: Option<usize>,
}

impl CapabilityProfile {
    /// Whether the profile names the given client, ignoring case.
    pub fn is_client(&self, name: &str) -> bool {
        self.client
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_deserializes() {
        let caps: CapabilityProfile = serde_json::from_str("{}").unwrap();
        assert!(caps.codecs.is_empty());
        assert!(!caps.direct_play);
        assert_eq!(caps.offset, 0);
    }

    #[test]
    fn client_match_ignores_case() {
        let caps = CapabilityProfile {
            client: Some("Chromecast".into()),
            ..Default::default()
        };
        assert!(caps.is_client("chromecast"));
        assert!(!CapabilityProfile::default().is_client("chromecast"));
    }
}
