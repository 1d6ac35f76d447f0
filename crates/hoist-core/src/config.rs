//! hoist.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HoistConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

/// The supervised service and its live binary location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Name of the program under the process supervisor.
    pub name: String,
    /// Path the active build is staged to.
    pub binary_path: PathBuf,
    /// Supervisor control socket.
    pub supervisor_socket: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "feather".to_string(),
            binary_path: PathBuf::from("/usr/local/bin/feather"),
            supervisor_socket: "unix:///tmp/supervisor.sock".to_string(),
        }
    }
}

/// Where build artifacts live and how many to retain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding `<version>.bin` artifacts and the active file.
    pub builds_dir: PathBuf,
    /// Number of builds kept by a prune pass.
    pub retain: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            builds_dir: PathBuf::from("/usr/local/bin/feather-builds"),
            retain: 20,
        }
    }
}

/// Health endpoint probing and post-restart verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Address of the running service (host:port).
    pub address: String,
    /// HTTP path of the health endpoint.
    pub endpoint: String,
    /// Timeout per probe, in seconds.
    pub timeout_secs: u64,
    /// Seconds between verification probes after a promotion.
    pub poll_interval_secs: u64,
    /// Number of verification probes before giving up.
    pub poll_attempts: u32,
    /// Seconds to let the service settle after a bare restart.
    pub restart_settle_secs: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            address: "localhost:4850".to_string(),
            endpoint: "/health".to_string(),
            timeout_secs: 3,
            poll_interval_secs: 1,
            poll_attempts: 15,
            restart_settle_secs: 2,
        }
    }
}

/// REST API listener.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { port: 4860 }
    }
}

impl HoistConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: HoistConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
