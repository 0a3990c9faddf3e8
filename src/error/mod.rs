//! # Error Module
//!
//! Error types for the near-duplicate finder.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, values, what went wrong
//! - **Isolate per-file failures** - only a directory that cannot be
//!   listed aborts a detection run

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum DuplicateFinderError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Hashing error: {0}")]
    Hash(#[from] HashError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Deletion error: {0}")]
    Delete(#[from] DeleteError),
}

impl DuplicateFinderError {
    /// Whether this error means the input directory could not be listed
    pub fn is_directory_access(&self) -> bool {
        matches!(self, DuplicateFinderError::Scan(_))
    }
}

/// Errors that occur while listing the input directory
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Classify an I/O error raised while opening `path`
    pub fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => ScanError::DirectoryNotFound { path },
            std::io::ErrorKind::PermissionDenied => ScanError::PermissionDenied { path },
            _ => ScanError::ReadDirectory { path, source },
        }
    }

    /// The path that could not be listed
    pub fn path(&self) -> &PathBuf {
        match self {
            ScanError::DirectoryNotFound { path }
            | ScanError::NotADirectory { path }
            | ScanError::PermissionDenied { path }
            | ScanError::ReadDirectory { path, .. } => path,
        }
    }
}

/// Errors that occur while fingerprinting a single image
#[derive(Error, Debug)]
pub enum HashError {
    #[error("Failed to decode image {path}: {reason}")]
    DecodeError { path: PathBuf, reason: String },

    #[error("Image is empty or corrupted: {path}")]
    EmptyImage { path: PathBuf },

    #[error("Hash computation failed: {0}")]
    ComputationFailed(String),

    #[error("Failed to open image file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Invalid detection parameters
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid threshold: {value} (must be strictly between 0 and 1)")]
    InvalidThreshold { value: f64 },

    #[error("Invalid hash size: {value} (must be between 1 and 256)")]
    InvalidHashSize { value: u32 },

    #[error("Invalid band count: {bands} (must be between 1 and {bits}, the fingerprint length)")]
    InvalidBands { bands: usize, bits: usize },
}

/// Errors that occur while removing a file
#[derive(Error, Debug)]
pub enum DeleteError {
    #[error("File not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Permission denied deleting: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to delete {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, DuplicateFinderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_error_includes_path() {
        let error = ScanError::DirectoryNotFound {
            path: PathBuf::from("/photos/vacation"),
        };
        let message = error.to_string();
        assert!(message.contains("/photos/vacation"));
    }

    #[test]
    fn scan_error_classifies_io_kinds() {
        let not_found = ScanError::from_io(
            PathBuf::from("/missing"),
            std::io::Error::from(std::io::ErrorKind::NotFound),
        );
        assert!(matches!(not_found, ScanError::DirectoryNotFound { .. }));

        let denied = ScanError::from_io(
            PathBuf::from("/locked"),
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(denied, ScanError::PermissionDenied { .. }));
        assert_eq!(denied.path(), &PathBuf::from("/locked"));
    }

    #[test]
    fn hash_error_includes_path() {
        let error = HashError::DecodeError {
            path: PathBuf::from("/photos/broken.jpg"),
            reason: "invalid JPEG".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("/photos/broken.jpg"));
        assert!(message.contains("invalid JPEG"));
    }

    #[test]
    fn config_error_names_limit() {
        let error = ConfigError::InvalidBands { bands: 100, bits: 64 };
        let message = error.to_string();
        assert!(message.contains("100"));
        assert!(message.contains("64"));
    }

    #[test]
    fn only_scan_errors_are_directory_access() {
        let scan: DuplicateFinderError = ScanError::DirectoryNotFound {
            path: PathBuf::from("/x"),
        }
        .into();
        let config: DuplicateFinderError = ConfigError::InvalidHashSize { value: 0 }.into();

        assert!(scan.is_directory_access());
        assert!(!config.is_directory_access());
    }
}
