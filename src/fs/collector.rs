//! Enumeration of downloaded files under a profile directory.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::fs::paths::relative_display;

/// A file written by the download step and picked up for processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    /// Absolute (or root-joined) path on disk.
    pub path: PathBuf,

    /// Path relative to the profile directory, `/`-separated.
    pub relative_path: String,

    /// Lowercase extension without the dot.
    pub extension: String,

    /// Size in bytes at discovery time.
    pub size: u64,

    pub discovered_at: DateTime<Local>,
}

impl DownloadedFile {
    /// Whether this file is a JSON metadata sidecar.
    pub fn is_sidecar(&self) -> bool {
        self.extension == "json"
    }
}

/// Scans a profile directory for files matching an extension allow-list.
#[derive(Debug, Clone)]
pub struct FileCollector {
    root: PathBuf,
    extensions: Vec<String>,
    excluded: Vec<PathBuf>,
}

impl FileCollector {
    /// Create a collector for `root` accepting the given extensions.
    pub fn new(root: impl Into<PathBuf>, extensions: &[String]) -> Self {
        Self {
            root: root.into(),
            extensions: extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
            excluded: Vec::new(),
        }
    }

    /// Never yield this path, even if its extension matches.
    ///
    /// Paths are compared after resolving `.`, `..` and symlinks, so the same
    /// file spelled differently is still excluded.
    pub fn exclude(mut self, path: impl Into<PathBuf>) -> Self {
        self.excluded.push(path.into());
        self
    }

    /// Start a scan. Each call walks the directory again from the top.
    ///
    /// Entries are visited depth-first, sorted by file name at every level, so
    /// the order is stable across runs on an unchanged tree.
    pub fn collect(&self) -> Result<CollectedFiles<'_>> {
        if !self.root.is_dir() {
            return Err(Error::DirectoryNotFound(self.root.clone()));
        }

        Ok(CollectedFiles {
            collector: self,
            resolved_root: resolve(&self.root),
            excluded: self.excluded.iter().map(|p| resolve(p)).collect(),
            walker: WalkDir::new(&self.root).sort_by_file_name().into_iter(),
        })
    }
}

/// Canonical form of `path`. A file that does not exist yet is resolved
/// through its parent directory.
fn resolve(path: &Path) -> PathBuf {
    if let Ok(resolved) = path.canonicalize() {
        return resolved;
    }

    let Some(name) = path.file_name() else {
        return path.to_path_buf();
    };
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    parent
        .canonicalize()
        .map(|p| p.join(name))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Lazy sequence of collected files. Unreadable entries are yielded as errors.
pub struct CollectedFiles<'a> {
    collector: &'a FileCollector,
    resolved_root: PathBuf,
    excluded: Vec<PathBuf>,
    walker: walkdir::IntoIter,
}

impl CollectedFiles<'_> {
    fn accepts(&self, path: &Path) -> Option<String> {
        let resolved = match path.strip_prefix(&self.collector.root) {
            Ok(relative) => self.resolved_root.join(relative),
            Err(_) => path.to_path_buf(),
        };
        if self.excluded.contains(&resolved) {
            return None;
        }

        let ext = path.extension()?.to_str()?.to_lowercase();
        if self.collector.extensions.contains(&ext) {
            Some(ext)
        } else {
            None
        }
    }
}

impl Iterator for CollectedFiles<'_> {
    type Item = Result<DownloadedFile>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| self.collector.root.clone());
                    let message = e.to_string();
                    let source = e
                        .into_io_error()
                        .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, message));
                    return Some(Err(Error::FileUnreadable { path, source }));
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let Some(extension) = self.accepts(entry.path()) else {
                continue;
            };

            let size = match entry.metadata() {
                Ok(metadata) => metadata.len(),
                Err(e) => {
                    let path = entry.path().to_path_buf();
                    let message = e.to_string();
                    let source = e
                        .into_io_error()
                        .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, message));
                    return Some(Err(Error::FileUnreadable { path, source }));
                }
            };

            return Some(Ok(DownloadedFile {
                relative_path: relative_display(&self.collector.root, entry.path()),
                path: entry.into_path(),
                extension,
                size,
                discovered_at: Local::now(),
            }));
        }
    }
}
