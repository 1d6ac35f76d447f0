//! hoist-api — REST API for build management.
//!
//! Provides axum route handlers over the artifact store, the promotion
//! workflow, and the supervisor boundary.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/api/v1/builds` | List archived builds |
//! | DELETE | `/api/v1/builds/{version}` | Delete an inactive build |
//! | POST | `/api/v1/builds/prune` | Drop all but the newest builds |
//! | GET | `/api/v1/status` | Active version + live health |
//! | GET | `/api/v1/services` | Supervisor status table |
//! | POST | `/api/v1/promote` | Promote a build and verify |
//! | POST | `/api/v1/restart` | Bare restart + single probe |

pub mod handlers;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post};

use hoist_health::Probe;
use hoist_promote::{DeletionGuard, PromotionController};
use hoist_store::{ActivePointer, ArtifactStore};
use hoist_supervise::{Supervisor, SupervisorCtl};

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub store: ArtifactStore,
    pub pointer: ActivePointer,
    pub controller: PromotionController,
    pub guard: DeletionGuard,
    pub probe: Arc<dyn Probe>,
    pub supervisor: Arc<dyn Supervisor>,
    /// Production supervisorctl handle, used for the status table.
    pub supervisorctl: SupervisorCtl,
    /// Default number of builds a prune keeps.
    pub retain: usize,
    /// How long a bare restart is given before its single probe.
    pub restart_settle: Duration,
}

/// Build the complete API router.
pub fn build_router(state: ApiState) -> Router {
    let api_routes = Router::new()
        .route("/builds", get(handlers::list_builds))
        .route("/builds/{version}", axum::routing::delete(handlers::delete_build))
        .route("/builds/prune", post(handlers::prune_builds))
        .route("/status", get(handlers::status))
        .route("/services", get(handlers::list_services))
        .route("/promote", post(handlers::promote))
        .route("/restart", post(handlers::restart))
        .with_state(state);

    Router::new().nest("/api/v1", api_routes)
}
