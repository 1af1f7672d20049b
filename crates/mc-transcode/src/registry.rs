//! In-memory registry of active transcode profiles.
//!
//! All operations are serialized through a single [`parking_lot::Mutex`].
//! Removal takes the entry out under the lock and signals process
//! termination after releasing it, so each profile is terminated at most
//! once and a slow terminator never blocks other sessions.

use std::collections::HashMap;
use std::sync::Arc;

use mc_core::{Error, ProfileId, ProfileKind, Result};
use parking_lot::Mutex;

use crate::profile::TranscodeProfile;

/// Stops the external process associated with a profile.
pub trait ProcessControl: Send + Sync {
    fn end_process(&self, id: ProfileId);
}

/// Shared collection of live profiles keyed by id.
pub struct ProfileRegistry {
    profiles: Mutex<HashMap<ProfileId, Arc<TranscodeProfile>>>,
    control: Arc<dyn ProcessControl>,
}

impl ProfileRegistry {
    pub fn new(control: Arc<dyn ProcessControl>) -> Self {
        Self {
            profiles: Mutex::new(HashMap::new()),
            control,
        }
    }

    /// Register a profile. Ids are unique; a second add with the same id is
    /// a conflict.
    pub fn add(&self, profile: TranscodeProfile) -> Result<Arc<TranscodeProfile>> {
        let id = profile.id();
        let profile = Arc::new(profile);
        {
            let mut profiles = self.profiles.lock();
            if profiles.contains_key(&id) {
                return Err(Error::Conflict(format!("profile {id} already registered")));
            }
            profiles.insert(id, Arc::clone(&profile));
        }
        tracing::info!(profile_id = %id, kind = %profile.kind(), "profile added");
        Ok(profile)
    }

    pub fn get(&self, id: ProfileId) -> Result<Arc<TranscodeProfile>> {
        self.profiles
            .lock()
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found("profile", id))
    }

    /// Remove a profile, terminating its process if it is an active
    /// transcode.
    pub fn remove(&self, id: ProfileId) -> Result<Arc<TranscodeProfile>> {
        let removed = self.profiles.lock().remove(&id);
        let profile = removed.ok_or_else(|| Error::not_found("profile", id))?;

        if profile.kind() == ProfileKind::Transcode {
            self.control.end_process(id);
        }
        tracing::info!(profile_id = %id, kind = %profile.kind(), "profile removed");
        Ok(profile)
    }

    pub fn len(&self) -> usize {
        self.profiles.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.lock().is_empty()
    }

    /// Ids of every registered profile, in no particular order.
    pub fn ids(&self) -> Vec<ProfileId> {
        self.profiles.lock().keys().copied().collect()
    }
}

impl std::fmt::Debug for ProfileRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileRegistry")
            .field("profiles", &self.len())
            .finish_non_exhaustive()
    }
}
