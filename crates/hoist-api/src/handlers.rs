//! REST API handlers.
//!
//! Each handler composes the store, pointer, prober, and workflow and
//! returns the wire shapes the admin dashboard consumes. Precondition
//! failures map to 400/404/409; everything past the pointer commit is
//! reported as success with a message.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use tracing::error;

use hoist_promote::{DeleteError, PromoteError};

use crate::ApiState;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn error_response(msg: impl Into<String>, status: StatusCode) -> impl IntoResponse {
    (
        status,
        Json(ErrorBody {
            error: msg.into(),
        }),
    )
}

// ── Builds ─────────────────────────────────────────────────────────

/// GET /api/v1/builds
pub async fn list_builds(State(state): State<ApiState>) -> impl IntoResponse {
    let active = state.pointer.get();
    match state.store.list(active.as_deref()) {
        Ok(builds) => Json(serde_json::json!({
            "builds": builds,
            "active_version": active.unwrap_or_default(),
        }))
        .into_response(),
        Err(e) => {
            error!(error = %e, "build listing failed");
            error_response(e.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response()
        }
    }
}

/// DELETE /api/v1/builds/{version}
pub async fn delete_build(
    State(state): State<ApiState>,
    Path(version): Path<String>,
) -> impl IntoResponse {
    match state.guard.delete(&version) {
        Ok(()) => Json(serde_json::json!({ "ok": true, "deleted": version })).into_response(),
        Err(DeleteError::InvalidVersion(_)) => {
            error_response("version required", StatusCode::BAD_REQUEST).into_response()
        }
        Err(DeleteError::ActiveConflict(_)) => {
            error_response("Cannot delete the active build", StatusCode::CONFLICT).into_response()
        }
        Err(DeleteError::NotFound(v)) => {
            error_response(format!("Build {v} not found"), StatusCode::NOT_FOUND).into_response()
        }
        Err(DeleteError::Store(e)) => {
            error!(error = %e, %version, "delete failed");
            error_response(e.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response()
        }
    }
}

/// Prune request body.
#[derive(Deserialize, Default)]
pub struct PruneRequest {
    /// Builds to keep; defaults to the configured retention.
    pub keep: Option<usize>,
}

/// POST /api/v1/builds/prune
pub async fn prune_builds(
    State(state): State<ApiState>,
    body: Option<Json<PruneRequest>>,
) -> impl IntoResponse {
    let keep = body
        .and_then(|Json(req)| req.keep)
        .unwrap_or(state.retain);
    match state.guard.prune(keep) {
        Ok(removed) => Json(serde_json::json!({ "ok": true, "removed": removed })).into_response(),
        Err(e) => {
            error!(error = %e, keep, "prune failed");
            error_response(e.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response()
        }
    }
}

// ── Status ─────────────────────────────────────────────────────────

/// GET /api/v1/status response.
#[derive(Serialize)]
struct StatusResponse {
    active_version: String,
    healthy: bool,
    uptime_secs: u64,
    build_count: usize,
}

/// GET /api/v1/status
pub async fn status(State(state): State<ApiState>) -> impl IntoResponse {
    let snapshot = state.probe.probe().await;
    let active_version = state.pointer.get().unwrap_or_default();
    let build_count = state
        .store
        .list(None)
        .map(|builds| builds.len())
        .unwrap_or(0);

    Json(StatusResponse {
        active_version,
        healthy: snapshot.reachable,
        uptime_secs: snapshot.uptime_secs,
        build_count,
    })
}

/// GET /api/v1/services
pub async fn list_services(State(state): State<ApiState>) -> impl IntoResponse {
    let services = state.supervisorctl.status().await;
    Json(serde_json::json!({ "services": services }))
}

// ── Promotion ──────────────────────────────────────────────────────

/// Promote request body.
#[derive(Deserialize)]
pub struct PromoteRequest {
    #[serde(default)]
    pub version: String,
}

/// POST /api/v1/promote
pub async fn promote(
    State(state): State<ApiState>,
    Json(req): Json<PromoteRequest>,
) -> impl IntoResponse {
    if req.version.is_empty() {
        return error_response("version required", StatusCode::BAD_REQUEST).into_response();
    }

    match state.controller.promote(&req.version).await {
        Ok(report) => Json(serde_json::json!({
            "ok": true,
            "message": report.message,
        }))
        .into_response(),
        Err(PromoteError::InvalidVersion(_)) => {
            error_response("version required", StatusCode::BAD_REQUEST).into_response()
        }
        Err(PromoteError::NotFound(v)) => {
            error_response(format!("Build {v} not found"), StatusCode::NOT_FOUND).into_response()
        }
        Err(e @ (PromoteError::Stage(_) | PromoteError::Commit(_))) => {
            error!(error = %e, version = %req.version, "promotion failed");
            error_response(e.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response()
        }
    }
}

/// POST /api/v1/restart
///
/// Unconditional restart trigger; waits a settle delay, then takes a
/// single probe. Always 200 — the caller reads `healthy`.
pub async fn restart(State(state): State<ApiState>) -> impl IntoResponse {
    let outcome = state.supervisor.restart().await;
    tokio::time::sleep(state.restart_settle).await;
    let snapshot = state.probe.probe().await;

    Json(serde_json::json!({
        "ok": true,
        "healthy": snapshot.reachable,
        "restart": outcome,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;

    use hoist_core::HealthSnapshot;
    use hoist_health::{BoxFuture, PollPolicy, Probe};
    use hoist_promote::{DeletionGuard, PromotionController};
    use hoist_store::{ActivePointer, ArtifactStore};
    use hoist_supervise::{RestartOutcome, Supervisor, SupervisorCtl};

    struct ScriptedProbe {
        calls: AtomicU32,
        reachable_after: u32,
    }

    impl ScriptedProbe {
        fn reachable_after(n: u32) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
                reachable_after: n,
            })
        }

        fn never() -> Arc<Self> {
            Self::reachable_after(u32::MAX)
        }
    }

    impl Probe for ScriptedProbe {
        fn probe(&self) -> BoxFuture<'_, HealthSnapshot> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            let snapshot = if n >= self.reachable_after {
                HealthSnapshot::reachable(42)
            } else {
                HealthSnapshot::unreachable()
            };
            Box::pin(async move { snapshot })
        }
    }

    struct FakeSupervisor;

    impl Supervisor for FakeSupervisor {
        fn restart(&self) -> hoist_supervise::BoxFuture<'_, RestartOutcome> {
            Box::pin(async { RestartOutcome::Restarted })
        }
    }

    fn api_state(dir: &TempDir, builds: &[&str], probe: Arc<ScriptedProbe>) -> ApiState {
        for version in builds {
            fs::write(dir.path().join(format!("{version}.bin")), version.as_bytes()).unwrap();
        }
        let store = ArtifactStore::new(dir.path());
        let pointer = ActivePointer::in_dir(dir.path());
        let supervisor: Arc<dyn Supervisor> = Arc::new(FakeSupervisor);
        let probe: Arc<dyn Probe> = probe;

        let controller = PromotionController::new(
            store.clone(),
            pointer.clone(),
            dir.path().join("live-binary"),
            supervisor.clone(),
            probe.clone(),
            PollPolicy {
                interval: Duration::from_millis(1),
                max_attempts: 15,
            },
        );
        let guard = DeletionGuard::new(store.clone(), pointer.clone());

        ApiState {
            store,
            pointer,
            controller,
            guard,
            probe,
            supervisor,
            supervisorctl: SupervisorCtl::new("hoist-test", "unix:///tmp/hoist-test-none.sock"),
            retain: 20,
            restart_settle: Duration::ZERO,
        }
    }

    async fn json_body(resp: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn status_with_no_pointer_set() {
        let dir = TempDir::new().unwrap();
        let state = api_state(&dir, &["2024-01-01", "2024-02-01"], ScriptedProbe::never());

        let resp = status(State(state)).await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = json_body(resp).await;
        assert_eq!(body["active_version"], "");
        assert_eq!(body["healthy"], false);
        assert_eq!(body["uptime_secs"], 0);
        assert_eq!(body["build_count"], 2);
    }

    #[tokio::test]
    async fn list_builds_sorted_with_active_flag() {
        let dir = TempDir::new().unwrap();
        let state = api_state(&dir, &["2024-01-01", "2024-02-01"], ScriptedProbe::never());
        state.pointer.set("2024-01-01").unwrap();

        let resp = list_builds(State(state)).await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = json_body(resp).await;
        assert_eq!(body["active_version"], "2024-01-01");
        let builds = body["builds"].as_array().unwrap();
        assert_eq!(builds.len(), 2);
        assert_eq!(builds[0]["version"], "2024-02-01");
        assert_eq!(builds[0]["active"], false);
        assert_eq!(builds[1]["version"], "2024-01-01");
        assert_eq!(builds[1]["active"], true);
        assert!(builds[0]["size"].is_u64());
        assert!(builds[0]["timestamp"].is_u64());
    }

    #[tokio::test]
    async fn promote_reachable_on_third_attempt() {
        let dir = TempDir::new().unwrap();
        let state = api_state(
            &dir,
            &["2024-01-01", "2024-02-01"],
            ScriptedProbe::reachable_after(3),
        );

        let resp = promote(
            State(state.clone()),
            Json(PromoteRequest {
                version: "2024-02-01".to_string(),
            }),
        )
        .await
        .into_response();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = json_body(resp).await;
        assert_eq!(body["ok"], true);
        assert_eq!(body["message"], "OK");
        assert_eq!(state.pointer.get(), Some("2024-02-01".to_string()));
    }

    #[tokio::test]
    async fn promote_never_healthy_still_ok_with_degraded_message() {
        let dir = TempDir::new().unwrap();
        let state = api_state(&dir, &["2024-02-01"], ScriptedProbe::never());

        let resp = promote(
            State(state.clone()),
            Json(PromoteRequest {
                version: "2024-02-01".to_string(),
            }),
        )
        .await
        .into_response();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = json_body(resp).await;
        assert_eq!(body["ok"], true);
        assert_eq!(body["message"], "Restarted but health check not yet passing");
        assert_eq!(state.pointer.get(), Some("2024-02-01".to_string()));
    }

    #[tokio::test]
    async fn promote_missing_version_is_bad_request() {
        let dir = TempDir::new().unwrap();
        let state = api_state(&dir, &["2024-02-01"], ScriptedProbe::never());

        let resp = promote(State(state), Json(PromoteRequest { version: String::new() }))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn promote_unknown_version_is_not_found() {
        let dir = TempDir::new().unwrap();
        let state = api_state(&dir, &["2024-02-01"], ScriptedProbe::never());

        let resp = promote(
            State(state.clone()),
            Json(PromoteRequest {
                version: "2024-09-09".to_string(),
            }),
        )
        .await
        .into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(state.pointer.get(), None);
    }

    #[tokio::test]
    async fn delete_active_build_is_conflict() {
        let dir = TempDir::new().unwrap();
        let state = api_state(
            &dir,
            &["2024-01-01", "2024-02-01"],
            ScriptedProbe::reachable_after(1),
        );

        // Promote, then try to delete the promoted version.
        promote(
            State(state.clone()),
            Json(PromoteRequest {
                version: "2024-02-01".to_string(),
            }),
        )
        .await
        .into_response();

        let resp = delete_build(State(state), Path("2024-02-01".to_string()))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert!(dir.path().join("2024-02-01.bin").exists());
    }

    #[tokio::test]
    async fn delete_inactive_build_succeeds() {
        let dir = TempDir::new().unwrap();
        let state = api_state(&dir, &["2024-01-01", "2024-02-01"], ScriptedProbe::never());
        state.pointer.set("2024-02-01").unwrap();

        let resp = delete_build(State(state.clone()), Path("2024-01-01".to_string()))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::OK);

        let builds = state.store.list(None).unwrap();
        assert_eq!(builds.len(), 1);
        assert_eq!(builds[0].version, "2024-02-01");
    }

    #[tokio::test]
    async fn delete_unknown_build_is_not_found() {
        let dir = TempDir::new().unwrap();
        let state = api_state(&dir, &[], ScriptedProbe::never());

        let resp = delete_build(State(state), Path("2024-09-09".to_string()))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn restart_reports_single_probe_result() {
        let dir = TempDir::new().unwrap();
        let state = api_state(&dir, &[], ScriptedProbe::reachable_after(1));

        let resp = restart(State(state)).await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = json_body(resp).await;
        assert_eq!(body["ok"], true);
        assert_eq!(body["healthy"], true);
    }

    #[tokio::test]
    async fn prune_honors_request_keep() {
        let dir = TempDir::new().unwrap();
        let state = api_state(
            &dir,
            &["2024-01-01", "2024-02-01", "2024-03-01"],
            ScriptedProbe::never(),
        );
        state.pointer.set("2024-01-01").unwrap();

        let resp = prune_builds(State(state.clone()), Some(Json(PruneRequest { keep: Some(1) })))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = json_body(resp).await;
        assert_eq!(body["removed"], serde_json::json!(["2024-02-01"]));

        let versions: Vec<String> = state
            .store
            .list(None)
            .unwrap()
            .into_iter()
            .map(|b| b.version)
            .collect();
        assert_eq!(versions, vec!["2024-03-01", "2024-01-01"]);
    }

    #[tokio::test]
    async fn services_table_reads_empty_without_supervisor() {
        let dir = TempDir::new().unwrap();
        let state = api_state(&dir, &[], ScriptedProbe::never());

        let resp = list_services(State(state)).await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = json_body(resp).await;
        assert!(body["services"].as_array().unwrap().is_empty());
    }
}
