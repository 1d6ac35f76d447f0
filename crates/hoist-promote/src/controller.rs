//! Promotion controller — drives the activate-restart-verify sequence.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use hoist_core::valid_version;
use hoist_health::{PollOutcome, PollPolicy, Probe, poll_until_reachable};
use hoist_store::{ActivePointer, ArtifactStore, StoreError};
use hoist_supervise::{RestartOutcome, Supervisor};

/// Outcome of a promotion whose pointer commit succeeded.
///
/// `verified` distinguishes "confirmed healthy" from "restarted but
/// not yet answering" — both are successful promotions.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PromotionReport {
    pub version: String,
    pub verified: bool,
    pub message: String,
}

/// Failures detected before the pointer commit. Nothing observable has
/// been promoted when one of these is returned.
#[derive(Debug, Error)]
pub enum PromoteError {
    #[error("invalid version {0:?}")]
    InvalidVersion(String),

    #[error("build {0} not found")]
    NotFound(String),

    #[error("staging failed: {0}")]
    Stage(StoreError),

    #[error("active pointer commit failed: {0}")]
    Commit(StoreError),
}

/// Orchestrates the promotion workflow for a single supervised service.
#[derive(Clone)]
pub struct PromotionController {
    store: ArtifactStore,
    pointer: ActivePointer,
    binary_path: PathBuf,
    supervisor: Arc<dyn Supervisor>,
    probe: Arc<dyn Probe>,
    policy: PollPolicy,
}

impl PromotionController {
    pub fn new(
        store: ArtifactStore,
        pointer: ActivePointer,
        binary_path: impl Into<PathBuf>,
        supervisor: Arc<dyn Supervisor>,
        probe: Arc<dyn Probe>,
        policy: PollPolicy,
    ) -> Self {
        Self {
            store,
            pointer,
            binary_path: binary_path.into(),
            supervisor,
            probe,
            policy,
        }
    }

    /// Promote `version` to be the running build.
    ///
    /// Steps, each a hard precondition for the next:
    /// 1. validate + existence check — no mutation on failure;
    /// 2. stage into the live binary path (copy, chmod, digest verify);
    /// 3. commit the active pointer — the promotion is now logically
    ///    done regardless of what follows;
    /// 4. request a supervisor restart (observed, never fatal);
    /// 5. poll health up to the bound; first success verifies.
    pub async fn promote(&self, version: &str) -> Result<PromotionReport, PromoteError> {
        if !valid_version(version) {
            return Err(PromoteError::InvalidVersion(version.to_string()));
        }
        if !self.store.exists(version) {
            return Err(PromoteError::NotFound(version.to_string()));
        }

        info!(%version, "promotion started");

        self.store
            .stage(version, &self.binary_path)
            .map_err(|e| match e {
                StoreError::NotFound(v) => PromoteError::NotFound(v),
                StoreError::InvalidVersion(v) => PromoteError::InvalidVersion(v),
                other => PromoteError::Stage(other),
            })?;

        self.pointer.set(version).map_err(PromoteError::Commit)?;

        match self.supervisor.restart().await {
            RestartOutcome::Restarted => {}
            RestartOutcome::Failed { reason } => {
                // The pointer is already committed; the poll below is
                // the arbiter of whether the service came back.
                warn!(%version, %reason, "supervisor reported restart failure");
            }
            RestartOutcome::TimedOut => {
                warn!(%version, "supervisor restart timed out");
            }
        }

        let report = match poll_until_reachable(self.probe.as_ref(), self.policy).await {
            PollOutcome::Reachable { attempt, snapshot } => {
                info!(%version, attempt, uptime_secs = snapshot.uptime_secs, "promotion verified");
                PromotionReport {
                    version: version.to_string(),
                    verified: true,
                    message: "OK".to_string(),
                }
            }
            PollOutcome::Exhausted { attempts } => {
                warn!(%version, attempts, "promotion unverified — service never became reachable");
                PromotionReport {
                    version: version.to_string(),
                    verified: false,
                    message: "Restarted but health check not yet passing".to_string(),
                }
            }
        };

        Ok(report)
    }
}
