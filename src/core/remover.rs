//! # Remover Module
//!
//! Deletes files the user picked from a cluster.
//!
//! Each path is handled independently: a failure is recorded and the
//! remaining files are still processed. Nothing is ever deleted that the
//! caller did not list explicitly.

use crate::error::DeleteError;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Outcome of a deletion batch
#[derive(Debug, Default)]
pub struct DeletionReport {
    /// Files that were removed
    pub deleted: Vec<PathBuf>,
    /// Files that could not be removed, with the reason
    pub failed: Vec<(PathBuf, DeleteError)>,
}

impl DeletionReport {
    /// Whether every requested file was removed
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Remove one file
pub fn delete_file(path: &Path) -> Result<(), DeleteError> {
    fs::remove_file(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => DeleteError::NotFound {
            path: path.to_path_buf(),
        },
        ErrorKind::PermissionDenied => DeleteError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => DeleteError::Io {
            path: path.to_path_buf(),
            source,
        },
    })
}

/// Remove every file in `paths`, continuing past failures
pub fn delete_files(paths: &[PathBuf]) -> DeletionReport {
    let mut report = DeletionReport::default();

    for path in paths {
        match delete_file(path) {
            Ok(()) => {
                info!(path = %path.display(), "Deleted file");
                report.deleted.push(path.clone());
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to delete file");
                report.failed.push((path.clone(), e));
            }
        }
    }

    report
}
