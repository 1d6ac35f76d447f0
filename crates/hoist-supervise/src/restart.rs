//! Service restart via the external process supervisor.

use std::time::Duration;

use serde::Serialize;
use tokio::process::Command;
use tracing::{info, warn};

/// Boxed future for dyn-compatible async capability traits.
pub type BoxFuture<'a, T> = std::pin::Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Outcome of a restart request.
///
/// A `Failed` or `TimedOut` restart is observed, not fatal: slow
/// supervisors are indistinguishable from broken ones here, and the
/// verification poll decides what actually happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RestartOutcome {
    Restarted,
    Failed { reason: String },
    TimedOut,
}

/// Capability to restart the supervised service.
pub trait Supervisor: Send + Sync {
    fn restart(&self) -> BoxFuture<'_, RestartOutcome>;
}

/// Production supervisor backed by `supervisorctl`.
#[derive(Debug, Clone)]
pub struct SupervisorCtl {
    pub(crate) service: String,
    pub(crate) socket: String,
    timeout: Duration,
}

impl SupervisorCtl {
    /// Control the named service over the given supervisor socket.
    pub fn new(service: impl Into<String>, socket: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            socket: socket.into(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Override the restart command bound.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn run_restart(&self) -> RestartOutcome {
        let result = tokio::time::timeout(
            self.timeout,
            Command::new("supervisorctl")
                .args(["-s", &self.socket, "restart", &self.service])
                .output(),
        )
        .await;

        match result {
            Err(_) => {
                warn!(service = %self.service, timeout = ?self.timeout, "supervisor restart timed out");
                RestartOutcome::TimedOut
            }
            Ok(Err(e)) => {
                warn!(service = %self.service, error = %e, "supervisorctl could not be run");
                RestartOutcome::Failed {
                    reason: e.to_string(),
                }
            }
            Ok(Ok(output)) => {
                if output.status.success() {
                    info!(service = %self.service, "supervisor restart issued");
                    RestartOutcome::Restarted
                } else {
                    let reason = String::from_utf8_lossy(&output.stderr).trim().to_string();
                    warn!(service = %self.service, %reason, "supervisor restart failed");
                    RestartOutcome::Failed { reason }
                }
            }
        }
    }
}

impl Supervisor for SupervisorCtl {
    fn restart(&self) -> BoxFuture<'_, RestartOutcome> {
        Box::pin(self.run_restart())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn restart_against_dead_socket_is_not_restarted() {
        let ctl = SupervisorCtl::new(
            "hoist-test-nonexistent",
            "unix:///tmp/hoist-test-nonexistent.sock",
        )
        .with_timeout(Duration::from_secs(5));

        let outcome = ctl.restart().await;
        assert_ne!(outcome, RestartOutcome::Restarted);
    }

    #[test]
    fn outcome_serializes_tagged() {
        let json = serde_json::to_string(&RestartOutcome::TimedOut).unwrap();
        assert_eq!(json, r#"{"outcome":"timed_out"}"#);

        let json = serde_json::to_string(&RestartOutcome::Failed {
            reason: "no such process".to_string(),
        })
        .unwrap();
        assert!(json.contains("no such process"));
    }
}
