//! Path and directory management.

use std::path::{Component, Path, PathBuf};

use crate::config::Config;
use crate::error::Result;
use crate::fs::naming::sanitize_path_component;

/// Sub-folder of a profile directory that receives downloaded posts.
pub const POSTS_FOLDER: &str = "posts";

/// Get the profile folder for a username under the configured base directory.
pub fn profile_folder(config: &Config, username: &str) -> Result<PathBuf> {
    let folder = sanitize_path_component(username)?;
    Ok(config.base_directory().join(folder))
}

/// Get the folder downloaded posts are written to.
pub fn posts_folder(profile_dir: &Path) -> PathBuf {
    profile_dir.join(POSTS_FOLDER)
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Path of `path` relative to `root`, always with `/` separators.
///
/// Falls back to the full path when `path` is not under `root`.
pub fn relative_display(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if parts.is_empty() {
        relative.display().to_string()
    } else {
        parts.join("/")
    }
}

/// Text file written next to a JSON sidecar: same base name, `.txt` extension.
pub fn sidecar_text_path(json_path: &Path) -> PathBuf {
    json_path.with_extension("txt")
}

/// Default directory for run logs: the parent of the profile directory.
pub fn default_log_directory(root: &Path) -> PathBuf {
    match root.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
