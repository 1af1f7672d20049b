//! Runs synthesized command variants with accelerator fallback.
//!
//! Variants are tried in order; the first one that exits successfully wins.
//! Each running profile holds a [`CancellationToken`] in a [`DashMap`] so
//! that removing the profile from the registry stops its process.

use dashmap::DashMap;
use mc_core::{Error, ProfileId, Result};
use mc_transcode::{CommandVariant, HardwareAccelerator, ProcessControl};
use tokio_util::sync::CancellationToken;

use crate::command::ToolCommand;

/// The variant that completed successfully.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Position of the variant in the list that was run.
    pub variant: usize,
    pub accelerator: Option<HardwareAccelerator>,
}

/// Executes command variants for profiles and tracks the live ones.
///
/// Processes run until they exit or their profile is stopped.
#[derive(Debug, Default)]
pub struct TranscodeRunner {
    active: DashMap<ProfileId, CancellationToken>,
}

impl TranscodeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self, id: ProfileId) -> bool {
        self.active.contains_key(&id)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Run `variants` for profile `id`, falling back to the next variant
    /// whenever one fails.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if `variants` is empty.
    /// - [`Error::Conflict`] if the profile already has a running process.
    /// - [`Error::Cancelled`] if the profile was stopped; later variants are
    ///   not attempted.
    /// - [`Error::Tool`] if every variant failed.
    pub async fn run(&self, id: ProfileId, variants: &[CommandVariant]) -> Result<RunOutcome> {
        self.run_while(id, variants, || true).await
    }

    /// Like [`run`](Self::run), but gives up before spawning anything when
    /// `is_open` reports the profile gone.
    ///
    /// `is_open` is checked after the profile's token is registered, so a
    /// [`ProcessControl::end_process`] racing with the start either makes the
    /// check fail or cancels the token.
    ///
    /// # Errors
    ///
    /// As [`run`](Self::run); [`Error::Cancelled`] when `is_open` is false.
    pub async fn run_while(
        &self,
        id: ProfileId,
        variants: &[CommandVariant],
        is_open: impl FnOnce() -> bool,
    ) -> Result<RunOutcome> {
        if variants.is_empty() {
            return Err(Error::Validation("no command variants to run".into()));
        }

        let token = CancellationToken::new();
        match self.active.entry(id) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                return Err(Error::Conflict(format!("profile {id} is already running")));
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(token.clone());
            }
        }

        if !is_open() {
            self.active.remove(&id);
            tracing::debug!(profile_id = %id, "profile closed before transcode started");
            return Err(Error::Cancelled(format!("profile {id} is closed")));
        }

        let result = self.try_variants(id, variants, &token).await;
        self.active.remove(&id);
        result
    }

    async fn try_variants(
        &self,
        id: ProfileId,
        variants: &[CommandVariant],
        token: &CancellationToken,
    ) -> Result<RunOutcome> {
        let mut last_error = None;

        for (index, variant) in variants.iter().enumerate() {
            let mut args = variant.to_args().into_iter();
            let Some(program) = args.next() else {
                continue;
            };

            let mut cmd = ToolCommand::new(program);
            cmd.args(args).cancel_on(token.clone());

            let accel = variant
                .accelerator
                .as_ref()
                .map_or_else(|| "software".to_string(), ToString::to_string);
            tracing::debug!(profile_id = %id, variant = index, accelerator = %accel, "starting transcode");

            match cmd.execute().await {
                Ok(_) => {
                    tracing::info!(profile_id = %id, variant = index, accelerator = %accel, "transcode finished");
                    return Ok(RunOutcome {
                        variant: index,
                        accelerator: variant.accelerator.clone(),
                    });
                }
                Err(e @ Error::Cancelled(_)) => {
                    tracing::info!(profile_id = %id, "transcode stopped");
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(
                        profile_id = %id,
                        variant = index,
                        accelerator = %accel,
                        error = %e,
                        "transcode variant failed"
                    );
                    last_error = Some(e);
                }
            }
        }

        let detail = last_error.map_or_else(|| "no runnable variant".to_string(), |e| e.to_string());
        Err(Error::tool(
            "transcoder",
            format!("all {} variants failed; last: {detail}", variants.len()),
        ))
    }
}

impl ProcessControl for TranscodeRunner {
    fn end_process(&self, id: ProfileId) {
        if let Some((_, token)) = self.active.remove(&id) {
            tracing::debug!(profile_id = %id, "stopping transcode");
            token.cancel();
        }
    }
}
