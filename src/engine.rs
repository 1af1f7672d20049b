//! Wiring between the negotiator, the registry, the synthesizer and the
//! runner.
//!
//! One [`Engine`] is built at startup and shared by every session.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use mc_av::TranscodeRunner;
use mc_core::config::Config;
use mc_core::ProfileId;
use mc_transcode::{
    Backend, CapabilityProfile, Catalog, CommandVariant, ProfileRegistry, SegmentRequest,
    SourceMedia, StreamPaths, Synthesizer, TranscodeProfile,
};
use serde::de::DeserializeOwned;

/// Shared transcode state.
pub struct Engine {
    catalog: Catalog,
    synthesizer: Synthesizer,
    registry: ProfileRegistry,
    runner: Arc<TranscodeRunner>,
    default_client: String,
}

impl Engine {
    /// Discover the transcoder and build the engine around it.
    pub fn from_config(config: &Config) -> Result<Self> {
        let backend = mc_av::discover_backend(&config.transcode)
            .context("Failed to discover a transcoder backend")?;
        Ok(Self::with_backend(config, backend))
    }

    pub fn with_backend(config: &Config, backend: Backend) -> Self {
        let runner = Arc::new(TranscodeRunner::new());
        let synthesizer = Synthesizer::new(Arc::new(backend), StreamPaths::from_config(&config.paths))
            .with_segment_duration(config.transcode.segment_duration_secs);

        Self {
            catalog: Catalog::standard(),
            synthesizer,
            registry: ProfileRegistry::new(runner.clone()),
            runner,
            default_client: config.sessions.default_client.clone(),
        }
    }

    pub fn backend(&self) -> &Backend {
        self.synthesizer.backend()
    }

    pub fn registry(&self) -> &ProfileRegistry {
        &self.registry
    }

    /// Negotiate a profile for the source and client and register it.
    pub fn open(
        &self,
        source: SourceMedia,
        mut capabilities: CapabilityProfile,
    ) -> Result<Arc<TranscodeProfile>> {
        if capabilities.client.is_none() {
            capabilities.client = Some(self.default_client.clone());
        }
        let profile = TranscodeProfile::negotiate(source, capabilities, &self.catalog)
            .context("Negotiation failed")?;
        Ok(self.registry.add(profile)?)
    }

    /// Remove a profile, stopping its transcoder if one is running.
    pub fn close(&self, id: ProfileId) -> Result<()> {
        self.registry.remove(id)?;
        Ok(())
    }

    pub fn plan(&self, profile: &TranscodeProfile) -> Vec<CommandVariant> {
        self.synthesizer.full_command(profile)
    }

    pub fn plan_segment(
        &self,
        request: &SegmentRequest,
        profile: &TranscodeProfile,
    ) -> Option<Vec<CommandVariant>> {
        self.synthesizer.segment_command(request, Some(profile))
    }

    /// Create the profile's output directories and run its variants until
    /// one succeeds or the profile is closed.
    ///
    /// A profile that is no longer registered is not started.
    pub async fn run(&self, profile: &TranscodeProfile) -> Result<mc_av::RunOutcome> {
        let id = profile.id();
        self.registry
            .get(id)
            .with_context(|| format!("Profile {id} is closed"))?;

        let paths = self.synthesizer.paths();
        for dir in [paths.stream_dir(profile.id()), parent_or_self(&paths.manifest(profile.id()))] {
            tokio::fs::create_dir_all(&dir)
                .await
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }

        let variants = self.plan(profile);
        tracing::info!(
            profile_id = %profile.id(),
            variants = variants.len(),
            "Starting transcode"
        );
        let outcome = self
            .runner
            .run_while(id, &variants, || self.registry.get(id).is_ok())
            .await?;
        Ok(outcome)
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("backend", self.backend())
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

fn parent_or_self(path: &Path) -> PathBuf {
    path.parent().map_or_else(|| path.to_path_buf(), Path::to_path_buf)
}

/// Read and deserialize a JSON document.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))
}
