//! # Scanner Module
//!
//! Lists the files of the input directory.
//!
//! The listing is a point-in-time snapshot. Only the root directory is
//! required to be readable; unreadable subdirectories of a recursive walk
//! are reported as warnings and skipped.
//!
//! ## Example
//! ```rust,ignore
//! use near_dup_finder::core::scanner::{FileScanner, ScanConfig, WalkDirScanner};
//!
//! let scanner = WalkDirScanner::new(ScanConfig { recursive: true, ..Default::default() });
//! let listing = scanner.scan(Path::new("/home/me/Pictures"))?;
//! ```

mod filter;
mod walker;

pub use filter::FileFilter;
pub use walker::{ScanConfig, WalkDirScanner};

use crate::error::ScanError;
use crate::events::EventSender;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A file discovered in the input directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFile {
    /// Path to the file
    pub path: PathBuf,
    /// File size in bytes (0 if metadata was unavailable)
    pub size: u64,
}

/// Result of listing a directory
#[derive(Debug)]
pub struct ScanResult {
    /// Discovered files, ordered by path
    pub files: Vec<ImageFile>,
    /// Subdirectories that could not be read (non-fatal)
    pub warnings: Vec<ScanError>,
}

/// Lists candidate files under a root directory
pub trait FileScanner: Send + Sync {
    /// List files, failing only if `root` itself cannot be opened
    fn scan(&self, root: &Path) -> Result<ScanResult, ScanError>;

    /// Same as [`FileScanner::scan`] with progress reporting
    fn scan_with_events(&self, root: &Path, events: &EventSender)
        -> Result<ScanResult, ScanError>;
}
