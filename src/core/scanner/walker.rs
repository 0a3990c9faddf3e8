//! Directory walking implementation using walkdir.

use super::{filter::FileFilter, FileScanner, ImageFile, ScanResult};
use crate::error::ScanError;
use crate::events::{null_sender, Event, EventSender, ScanEvent};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Configuration for the directory scanner
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Descend into subfolders
    pub recursive: bool,
    /// Descend into symlinked directories (symlinked files are always listed)
    pub follow_symlinks: bool,
    /// Whether to include hidden files and directories
    pub include_hidden: bool,
    /// Extensions to restrict the listing to (None = every file)
    pub extensions: Option<Vec<String>>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            recursive: false,
            follow_symlinks: false,
            include_hidden: true,
            extensions: None,
        }
    }
}

/// Scanner implementation using the walkdir crate
pub struct WalkDirScanner {
    config: ScanConfig,
    filter: FileFilter,
}

impl WalkDirScanner {
    /// Create a new scanner with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        let mut filter = FileFilter::new().with_hidden(config.include_hidden);

        if let Some(ref extensions) = config.extensions {
            filter = filter.with_extensions(extensions.clone());
        }

        Self { config, filter }
    }

    /// Fail fast if the root cannot be listed at all
    fn open_root(root: &Path) -> Result<(), ScanError> {
        let metadata =
            fs::metadata(root).map_err(|e| ScanError::from_io(root.to_path_buf(), e))?;

        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory {
                path: root.to_path_buf(),
            });
        }

        fs::read_dir(root).map_err(|e| ScanError::from_io(root.to_path_buf(), e))?;
        Ok(())
    }
}

impl FileScanner for WalkDirScanner {
    fn scan(&self, root: &Path) -> Result<ScanResult, ScanError> {
        self.scan_with_events(root, &null_sender())
    }

    fn scan_with_events(
        &self,
        root: &Path,
        events: &EventSender,
    ) -> Result<ScanResult, ScanError> {
        Self::open_root(root)?;

        events.send(Event::Scan(ScanEvent::Started {
            path: root.to_path_buf(),
            recursive: self.config.recursive,
        }));

        let mut walker = WalkDir::new(root)
            .min_depth(1)
            .follow_links(self.config.follow_symlinks);

        if !self.config.recursive {
            walker = walker.max_depth(1);
        }

        let mut files = Vec::new();
        let mut warnings = Vec::new();

        let entries = walker
            .into_iter()
            .filter_entry(|e| !e.file_type().is_dir() || self.filter.should_descend(e.path()));

        for entry_result in entries {
            match entry_result {
                Ok(entry) => {
                    // Symlinks count when their target is a regular file
                    let target = if entry.path_is_symlink() {
                        fs::metadata(entry.path()).ok()
                    } else {
                        entry.metadata().ok()
                    };
                    let is_file = match &target {
                        Some(metadata) => metadata.is_file(),
                        None => entry.file_type().is_file(),
                    };
                    if !is_file || !self.filter.should_include(entry.path()) {
                        continue;
                    }

                    let size = target.map(|m| m.len()).unwrap_or(0);
                    files.push(ImageFile {
                        path: entry.into_path(),
                        size,
                    });
                }
                Err(e) => {
                    let path = e.path().map(|p| p.to_path_buf()).unwrap_or_default();
                    let error = match e.into_io_error() {
                        Some(io) => ScanError::from_io(path.clone(), io),
                        None => ScanError::ReadDirectory {
                            path: path.clone(),
                            source: std::io::Error::other("filesystem loop detected"),
                        },
                    };

                    warn!(path = %path.display(), error = %error, "skipping unreadable entry");
                    events.send(Event::Scan(ScanEvent::Error {
                        path,
                        message: error.to_string(),
                    }));
                    warnings.push(error);
                }
            }
        }

        files.sort_by(|a, b| a.path.as_os_str().cmp(b.path.as_os_str()));

        debug!(
            root = %root.display(),
            files = files.len(),
            warnings = warnings.len(),
            "directory listed"
        );
        events.send(Event::Scan(ScanEvent::Completed {
            total_files: files.len(),
        }));

        Ok(ScanResult { files, warnings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn create_file(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(b"content").unwrap();
        path
    }

    #[test]
    fn scan_empty_directory_returns_empty_vec() {
        let temp_dir = TempDir::new().unwrap();
        let scanner = WalkDirScanner::new(ScanConfig::default());

        let result = scanner.scan(temp_dir.path()).unwrap();

        assert!(result.files.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn scan_lists_every_file_regardless_of_extension() {
        let temp_dir = TempDir::new().unwrap();
        create_file(temp_dir.path(), "photo.jpg");
        create_file(temp_dir.path(), "notes.txt");

        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(temp_dir.path()).unwrap();

        assert_eq!(result.files.len(), 2);
        assert_eq!(result.files[0].size, 7);
    }

    #[test]
    fn scan_results_are_sorted_by_path() {
        let temp_dir = TempDir::new().unwrap();
        create_file(temp_dir.path(), "c.png");
        create_file(temp_dir.path(), "a.png");
        create_file(temp_dir.path(), "b.png");

        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(temp_dir.path()).unwrap();

        let names: Vec<_> = result
            .files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.png", "b.png", "c.png"]);
    }

    #[test]
    fn non_recursive_scan_ignores_subfolders() {
        let temp_dir = TempDir::new().unwrap();
        let subdir = temp_dir.path().join("subdir");
        fs::create_dir(&subdir).unwrap();
        create_file(temp_dir.path(), "root.png");
        create_file(&subdir, "nested.png");

        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(temp_dir.path()).unwrap();

        assert_eq!(result.files.len(), 1);
        assert!(result.files[0].path.ends_with("root.png"));
    }

    #[test]
    fn recursive_scan_traverses_nested_directories() {
        let temp_dir = TempDir::new().unwrap();
        let subdir = temp_dir.path().join("subdir");
        fs::create_dir(&subdir).unwrap();
        create_file(temp_dir.path(), "root.png");
        create_file(&subdir, "nested.png");

        let config = ScanConfig {
            recursive: true,
            ..Default::default()
        };
        let result = WalkDirScanner::new(config).scan(temp_dir.path()).unwrap();

        assert_eq!(result.files.len(), 2);
    }

    #[test]
    fn hidden_directories_skipped_when_configured() {
        let temp_dir = TempDir::new().unwrap();
        let hidden = temp_dir.path().join(".cache");
        fs::create_dir(&hidden).unwrap();
        create_file(&hidden, "thumb.png");
        create_file(temp_dir.path(), "visible.png");

        let config = ScanConfig {
            recursive: true,
            include_hidden: false,
            ..Default::default()
        };
        let result = WalkDirScanner::new(config).scan(temp_dir.path()).unwrap();

        assert_eq!(result.files.len(), 1);
        assert!(result.files[0].path.ends_with("visible.png"));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_files_are_listed() {
        let temp_dir = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let target = create_file(outside.path(), "target.png");
        std::os::unix::fs::symlink(&target, temp_dir.path().join("link.png")).unwrap();
        create_file(temp_dir.path(), "real.png");

        let result = WalkDirScanner::new(ScanConfig::default())
            .scan(temp_dir.path())
            .unwrap();

        let names: Vec<_> = result
            .files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["link.png", "real.png"]);
        assert_eq!(result.files[0].size, 7);
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_is_not_listed() {
        let temp_dir = TempDir::new().unwrap();
        std::os::unix::fs::symlink(
            temp_dir.path().join("gone.png"),
            temp_dir.path().join("dangling.png"),
        )
        .unwrap();

        let result = WalkDirScanner::new(ScanConfig::default())
            .scan(temp_dir.path())
            .unwrap();

        assert!(result.files.is_empty());
    }

    #[test]
    fn scan_nonexistent_directory_fails() {
        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(Path::new("/nonexistent/path/12345"));

        assert!(matches!(result, Err(ScanError::DirectoryNotFound { .. })));
    }

    #[test]
    fn scan_of_a_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let file = create_file(temp_dir.path(), "photo.png");

        let result = WalkDirScanner::new(ScanConfig::default()).scan(&file);

        assert!(matches!(result, Err(ScanError::NotADirectory { .. })));
    }
}
