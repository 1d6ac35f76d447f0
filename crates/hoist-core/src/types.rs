//! Domain types shared across the hoist crates.
//!
//! These types cross the boundary between the store, the promotion
//! workflow, and the REST API, so they all serialize to/from JSON.

use serde::{Deserialize, Serialize};

/// Opaque version identifier for a build artifact.
pub type VersionId = String;

// ── Build artifacts ────────────────────────────────────────────────

/// One immutable versioned build file in the store.
///
/// Serializes with the wire names the dashboard expects
/// (`size`, `timestamp`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildArtifact {
    /// Version identifier, derived from the on-disk file stem.
    pub version: VersionId,
    /// Byte length at last observation.
    #[serde(rename = "size")]
    pub size_bytes: u64,
    /// Unix timestamp (seconds) of the file's last modification.
    #[serde(rename = "timestamp")]
    pub modified_at: u64,
    /// True iff this version equals the current active pointer.
    pub active: bool,
}

/// Whether `version` is usable as an artifact identifier.
///
/// Versions name files directly under the builds directory, so they
/// must be non-empty and must not contain path separators or traverse
/// upward.
pub fn valid_version(version: &str) -> bool {
    !version.is_empty()
        && version != "."
        && version != ".."
        && !version.contains('/')
        && !version.contains('\\')
}

// ── Health ─────────────────────────────────────────────────────────

/// Point-in-time reachability/uptime observation of the running service.
///
/// Produced fresh on every probe; never cached. Any probe failure —
/// transport error, timeout, non-2xx, unparseable body — collapses to
/// `unreachable()`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthSnapshot {
    pub reachable: bool,
    /// Uptime reported by the service; 0 when unreachable.
    pub uptime_secs: u64,
}

impl HealthSnapshot {
    pub fn reachable(uptime_secs: u64) -> Self {
        Self {
            reachable: true,
            uptime_secs,
        }
    }

    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            uptime_secs: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_rejects_separators() {
        assert!(valid_version("2024-02-01"));
        assert!(valid_version("v1.2.3"));
        assert!(!valid_version(""));
        assert!(!valid_version("a/b"));
        assert!(!valid_version("a\\b"));
        assert!(!valid_version(".."));
        assert!(!valid_version("."));
    }

    #[test]
    fn snapshot_constructors() {
        let up = HealthSnapshot::reachable(42);
        assert!(up.reachable);
        assert_eq!(up.uptime_secs, 42);

        let down = HealthSnapshot::unreachable();
        assert!(!down.reachable);
        assert_eq!(down.uptime_secs, 0);
    }

    #[test]
    fn artifact_serializes() {
        let artifact = BuildArtifact {
            version: "2024-02-01".to_string(),
            size_bytes: 1024,
            modified_at: 1700000000,
            active: true,
        };
        let json = serde_json::to_string(&artifact).unwrap();
        let back: BuildArtifact = serde_json::from_str(&json).unwrap();
        assert_eq!(back, artifact);
    }
}
