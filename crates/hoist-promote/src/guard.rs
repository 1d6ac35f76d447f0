//! Deletion guard — the active build is never removable.

use thiserror::Error;
use tracing::info;

use hoist_core::valid_version;
use hoist_store::{ActivePointer, ArtifactStore, StoreError};

/// Why a deletion was refused (or failed).
#[derive(Debug, Error)]
pub enum DeleteError {
    #[error("invalid version {0:?}")]
    InvalidVersion(String),

    #[error("cannot delete the active build {0}")]
    ActiveConflict(String),

    #[error("build {0} not found")]
    NotFound(String),

    #[error(transparent)]
    Store(StoreError),
}

/// Gatekeeper for artifact removal.
///
/// All removal paths go through here; the raw `ArtifactStore::remove`
/// is never exposed to the API.
#[derive(Debug, Clone)]
pub struct DeletionGuard {
    store: ArtifactStore,
    pointer: ActivePointer,
}

impl DeletionGuard {
    pub fn new(store: ArtifactStore, pointer: ActivePointer) -> Self {
        Self { store, pointer }
    }

    /// Remove `version` from the store unless it is active. Irreversible.
    ///
    /// Checks run in order: version shape, active conflict, existence.
    /// Nothing is mutated unless all three pass.
    pub fn delete(&self, version: &str) -> Result<(), DeleteError> {
        if !valid_version(version) {
            return Err(DeleteError::InvalidVersion(version.to_string()));
        }
        if self.pointer.get().as_deref() == Some(version) {
            return Err(DeleteError::ActiveConflict(version.to_string()));
        }
        if !self.store.exists(version) {
            return Err(DeleteError::NotFound(version.to_string()));
        }
        self.store.remove(version).map_err(|e| match e {
            StoreError::NotFound(v) => DeleteError::NotFound(v),
            other => DeleteError::Store(other),
        })?;
        info!(%version, "build deleted");
        Ok(())
    }

    /// Retention pass: drop all but the `keep` newest builds, never
    /// the active one. Returns the removed versions.
    pub fn prune(&self, keep: usize) -> Result<Vec<String>, StoreError> {
        let active = self.pointer.get();
        self.store.prune(keep, active.as_deref())
    }
}
