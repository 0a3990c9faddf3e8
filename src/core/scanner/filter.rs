//! File filtering logic for the scanner.

use std::collections::HashSet;
use std::path::Path;

/// Decides which directory entries become fingerprinting candidates.
///
/// By default every regular file is a candidate: whether it is an image is
/// decided by the decoder, not by its name.
#[derive(Debug, Clone)]
pub struct FileFilter {
    /// Lowercase extensions to accept (`None` = accept all)
    extensions: Option<HashSet<String>>,
    /// Whether to include hidden files and directories
    include_hidden: bool,
}

impl FileFilter {
    /// Accept every file, hidden ones included
    pub fn new() -> Self {
        Self {
            extensions: None,
            include_hidden: true,
        }
    }

    /// Include or skip hidden files (starting with .)
    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Only accept files with one of these extensions (case-insensitive)
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = Some(
            extensions
                .into_iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
        );
        self
    }

    /// Check if a file should be fingerprinted
    pub fn should_include(&self, path: &Path) -> bool {
        if !self.include_hidden && is_hidden(path) {
            return false;
        }

        match &self.extensions {
            None => true,
            Some(allowed) => path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| allowed.contains(&e.to_lowercase()))
                .unwrap_or(false),
        }
    }

    /// Check if the walker should enter a subdirectory
    pub fn should_descend(&self, dir: &Path) -> bool {
        self.include_hidden || !is_hidden(dir)
    }
}

impl Default for FileFilter {
    fn default() -> Self {
        Self::new()
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}
