//! Filesystem module.
//!
//! Provides:
//! - Collection of downloaded files under a profile directory
//! - Path and directory management
//! - File name generation for run artifacts

pub mod collector;
pub mod naming;
pub mod paths;

pub use collector::{DownloadedFile, FileCollector};
pub use naming::{run_log_file_name, sanitize_path_component};
pub use paths::{
    default_log_directory, ensure_dir, posts_folder, profile_folder, relative_display,
    sidecar_text_path,
};
