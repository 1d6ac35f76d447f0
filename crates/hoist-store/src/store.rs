//! ArtifactStore — filesystem-backed enumeration and mutation of builds.
//!
//! Artifacts are `<version>.bin` files directly under the builds
//! directory. They are produced externally and never mutated here;
//! the store only observes them, stages one into the live binary
//! path, or removes them.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use hoist_core::{BuildArtifact, valid_version};

use crate::error::{StoreError, StoreResult};

/// Convert any `Display` error into a `StoreError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StoreError::$variant(e.to_string())
    };
}

const ARTIFACT_EXT: &str = "bin";

/// Handle to a builds directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Create a handle to the given builds directory.
    ///
    /// The directory does not have to exist yet; a missing directory
    /// reads as an empty store.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Builds directory this store reads from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the builds directory if it is missing.
    pub fn ensure_dir(&self) -> StoreResult<()> {
        fs::create_dir_all(&self.root).map_err(map_err!(Scan))?;
        Ok(())
    }

    /// On-disk path of an artifact. The caller must have validated `version`.
    pub fn artifact_path(&self, version: &str) -> PathBuf {
        self.root.join(format!("{version}.{ARTIFACT_EXT}"))
    }

    /// Whether an artifact with this version exists.
    pub fn exists(&self, version: &str) -> bool {
        valid_version(version) && self.artifact_path(version).is_file()
    }

    /// List all artifacts, newest first by version string (descending).
    ///
    /// `active` marks the matching artifact. A missing or empty builds
    /// directory yields an empty list, never an error; entries whose
    /// metadata cannot be read are skipped.
    pub fn list(&self, active: Option<&str>) -> StoreResult<Vec<BuildArtifact>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Scan(e.to_string())),
        };

        let mut builds = Vec::new();
        for entry in entries {
            let entry = entry.map_err(map_err!(Scan))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(ARTIFACT_EXT) {
                continue;
            }
            let Some(version) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let meta = match entry.metadata() {
                Ok(meta) => meta,
                Err(e) => {
                    warn!(%version, error = %e, "skipping unreadable artifact");
                    continue;
                }
            };

            builds.push(BuildArtifact {
                version: version.to_string(),
                size_bytes: meta.len(),
                modified_at: unix_mtime(&meta),
                active: Some(version) == active,
            });
        }

        builds.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(builds)
    }

    /// Stage an artifact into the live binary path.
    ///
    /// Copies the artifact over `dest`, marks it executable, and
    /// verifies the written copy against the source by SHA-256 digest.
    /// Returns the byte length staged. The caller commits the active
    /// pointer only after this returns `Ok`.
    pub fn stage(&self, version: &str, dest: &Path) -> StoreResult<u64> {
        if !valid_version(version) {
            return Err(StoreError::InvalidVersion(version.to_string()));
        }
        let src = self.artifact_path(version);
        if !src.is_file() {
            return Err(StoreError::NotFound(version.to_string()));
        }

        let bytes = fs::copy(&src, dest).map_err(map_err!(Copy))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(dest, fs::Permissions::from_mode(0o755))
                .map_err(map_err!(Copy))?;
        }

        let src_digest = file_digest(&src)?;
        let dest_digest = file_digest(dest)?;
        if src_digest != dest_digest {
            return Err(StoreError::Verify(format!(
                "{version}: source {src_digest} != staged {dest_digest}"
            )));
        }

        info!(%version, dest = %dest.display(), bytes, digest = %dest_digest, "staged artifact");
        Ok(bytes)
    }

    /// Remove an artifact from the store. Irreversible.
    ///
    /// This is the raw unlink; the active-version check lives in the
    /// deletion guard, which is the only caller outside tests.
    pub fn remove(&self, version: &str) -> StoreResult<()> {
        if !valid_version(version) {
            return Err(StoreError::InvalidVersion(version.to_string()));
        }
        let path = self.artifact_path(version);
        if !path.is_file() {
            return Err(StoreError::NotFound(version.to_string()));
        }
        fs::remove_file(&path).map_err(map_err!(Remove))?;
        info!(%version, "artifact removed");
        Ok(())
    }

    /// Remove all but the `keep` newest artifacts, never the active one.
    ///
    /// Returns the removed versions, newest first.
    pub fn prune(&self, keep: usize, active: Option<&str>) -> StoreResult<Vec<String>> {
        let builds = self.list(active)?;
        let mut removed = Vec::new();
        for build in builds.iter().skip(keep) {
            if build.active {
                debug!(version = %build.version, "prune skipping active artifact");
                continue;
            }
            self.remove(&build.version)?;
            removed.push(build.version.clone());
        }
        if !removed.is_empty() {
            info!(kept = keep, count = removed.len(), "pruned old artifacts");
        }
        Ok(removed)
    }
}

/// SHA-256 digest of a file, hex-encoded.
fn file_digest(path: &Path) -> StoreResult<String> {
    let mut file = fs::File::open(path).map_err(map_err!(Copy))?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher).map_err(map_err!(Copy))?;
    Ok(hex::encode(hasher.finalize()))
}

fn unix_mtime(meta: &fs::Metadata) -> u64 {
    meta.modified()
        .ok()
        .and_then(|t| t.duration_since(SystemTime::UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
