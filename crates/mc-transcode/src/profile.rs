//! Transcode profiles: a source, a client and their frozen decisions.

use chrono::{DateTime, Utc};
use mc_core::{ProfileId, ProfileKind, Result};
use serde::Serialize;

use crate::capability::CapabilityProfile;
use crate::catalog::Catalog;
use crate::decision::DecisionSet;
use crate::negotiate;
use crate::source::SourceMedia;

/// Per-session record pairing a source and a capability profile with the
/// decisions negotiated for them.
///
/// Only [`TranscodeProfile::negotiate`] builds one, so the decisions are
/// computed exactly once and never change. A client whose capabilities
/// change gets a new profile.
#[derive(Debug, Clone, Serialize)]
pub struct TranscodeProfile {
    id: ProfileId,
    kind: ProfileKind,
    source: SourceMedia,
    capabilities: CapabilityProfile,
    decisions: DecisionSet,
    created_at: DateTime<Utc>,
}

impl TranscodeProfile {
    /// Negotiate decisions for the source and client and wrap them in a new
    /// profile.
    ///
    /// The profile is a direct file when the client allows direct play and
    /// every stream is copied untouched; otherwise it is an active transcode.
    pub fn negotiate(
        source: SourceMedia,
        capabilities: CapabilityProfile,
        catalog: &Catalog,
    ) -> Result<Self> {
        let decisions = negotiate::negotiate(&source, &capabilities, catalog)?;
        let kind = if capabilities.direct_play && decisions.is_passthrough() {
            ProfileKind::File
        } else {
            ProfileKind::Transcode
        };

        let profile = Self {
            id: ProfileId::new(),
            kind,
            source,
            capabilities,
            decisions,
            created_at: Utc::now(),
        };
        tracing::debug!(profile_id = %profile.id, kind = %profile.kind, "profile negotiated");
        Ok(profile)
    }

    pub fn id(&self) -> ProfileId {
        self.id
    }

    pub fn kind(&self) -> ProfileKind {
        self.kind
    }

    pub fn source(&self) -> &SourceMedia {
        &self.source
    }

    pub fn capabilities(&self) -> &CapabilityProfile {
        &self.capabilities
    }

    pub fn decisions(&self) -> &DecisionSet {
        &self.decisions
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
