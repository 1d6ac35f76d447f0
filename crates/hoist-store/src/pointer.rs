//! ActivePointer — the single durable designation of the promoted version.
//!
//! One trimmed version string in `<builds_dir>/active`. The promotion
//! workflow is the sole writer; every query path reads it. A missing
//! or empty file means no promotion has ever occurred.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};

const POINTER_FILE: &str = "active";

/// Handle to the active pointer file.
#[derive(Debug, Clone)]
pub struct ActivePointer {
    path: PathBuf,
}

impl ActivePointer {
    /// Pointer file living inside a builds directory.
    pub fn in_dir(builds_dir: &Path) -> Self {
        Self {
            path: builds_dir.join(POINTER_FILE),
        }
    }

    /// Currently promoted version, or `None` if unset.
    ///
    /// A missing or unreadable file reads as "no active version",
    /// never as an error.
    pub fn get(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let version = content.trim();
                if version.is_empty() {
                    None
                } else {
                    Some(version.to_string())
                }
            }
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    debug!(error = %e, path = %self.path.display(), "pointer unreadable");
                }
                None
            }
        }
    }

    /// Durably set the pointer, immediately visible to subsequent `get`s.
    ///
    /// Written to a sibling temp file and renamed into place so readers
    /// observe either the old or the new value, never a torn write.
    pub fn set(&self, version: &str) -> StoreResult<()> {
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, version).map_err(|e| StoreError::Pointer(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| StoreError::Pointer(e.to_string()))?;
        info!(%version, "active pointer set");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn unset_pointer_reads_none() {
        let dir = TempDir::new().unwrap();
        let pointer = ActivePointer::in_dir(dir.path());
        assert_eq!(pointer.get(), None);
    }

    #[test]
    fn empty_file_reads_none() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("active"), "  \n").unwrap();
        let pointer = ActivePointer::in_dir(dir.path());
        assert_eq!(pointer.get(), None);
    }

    #[test]
    fn set_is_visible_immediately() {
        let dir = TempDir::new().unwrap();
        let pointer = ActivePointer::in_dir(dir.path());

        pointer.set("2024-02-01").unwrap();
        assert_eq!(pointer.get(), Some("2024-02-01".to_string()));

        pointer.set("2024-03-01").unwrap();
        assert_eq!(pointer.get(), Some("2024-03-01".to_string()));
    }

    #[test]
    fn get_trims_trailing_newline() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("active"), "2024-02-01\n").unwrap();
        let pointer = ActivePointer::in_dir(dir.path());
        assert_eq!(pointer.get(), Some("2024-02-01".to_string()));
    }

    #[test]
    fn set_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let pointer = ActivePointer::in_dir(dir.path());
        pointer.set("v1").unwrap();
        assert!(!dir.path().join("active.tmp").exists());
    }
}
