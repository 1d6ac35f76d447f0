//! Supervisor status table.
//!
//! `supervisorctl status` prints one line per program:
//!
//! ```text
//! feather                          RUNNING   pid 1234, uptime 2:03:04
//! hoistd                           RUNNING   pid 1240, uptime 2:03:01
//! worker                           STOPPED   Not started
//! ```

use serde::Serialize;
use tokio::process::Command;
use tracing::debug;

use crate::restart::SupervisorCtl;

/// One row of the supervisor's status table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceInfo {
    pub name: String,
    pub state: String,
    pub pid: Option<String>,
    pub uptime: Option<String>,
}

/// Parse `supervisorctl status` output. Malformed lines are skipped.
pub fn parse_status(text: &str) -> Vec<ServiceInfo> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 2 {
                return None;
            }
            let name = parts[0].to_string();
            let state = parts[1].to_string();
            let pid = parts
                .iter()
                .position(|&p| p == "pid")
                .and_then(|i| parts.get(i + 1))
                .map(|p| p.trim_end_matches(',').to_string());
            let uptime = parts
                .iter()
                .position(|&p| p == "uptime")
                .and_then(|i| parts.get(i + 1))
                .map(|u| u.to_string());
            Some(ServiceInfo {
                name,
                state,
                pid,
                uptime,
            })
        })
        .collect()
}

impl SupervisorCtl {
    /// Current status of every supervised program.
    ///
    /// An unreachable supervisor reads as an empty table, never an error.
    pub async fn status(&self) -> Vec<ServiceInfo> {
        let output = Command::new("supervisorctl")
            .args(["-s", &self.socket, "status"])
            .output()
            .await;

        match output {
            Ok(out) => parse_status(&String::from_utf8_lossy(&out.stdout)),
            Err(e) => {
                debug!(error = %e, "supervisorctl status unavailable");
                Vec::new()
            }
        }
    }
}
