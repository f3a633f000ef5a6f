//! Configuration structures and loading logic.

use crate::config::modes::HashAlgorithm;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub download: DownloadConfig,
}

/// Verification and cataloguing options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Digest algorithm written to the hash ledger.
    #[serde(default)]
    pub algorithm: HashAlgorithm,

    /// File extensions (without dot) that are collected and hashed.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Maximum number of files processed at the same time.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Seconds after which a single file operation is abandoned.
    #[serde(default = "default_file_timeout")]
    pub file_timeout_secs: u64,

    /// Name of the hash ledger file inside the profile directory.
    #[serde(default = "default_ledger_file_name")]
    pub ledger_file_name: String,

    /// Directory for run logs. Defaults to the parent of the profile directory.
    #[serde(default)]
    pub log_directory: Option<PathBuf>,

    /// Whether to show a progress bar while processing.
    #[serde(default = "default_true")]
    pub show_progress: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::default(),
            extensions: default_extensions(),
            workers: default_workers(),
            file_timeout_secs: default_file_timeout(),
            ledger_file_name: default_ledger_file_name(),
            log_directory: None,
            show_progress: true,
        }
    }
}

impl PipelineConfig {
    /// Normalize the allow-list to lowercase entries without a leading dot.
    pub fn normalize_extensions(&mut self) {
        let mut normalized: Vec<String> = Vec::with_capacity(self.extensions.len());
        for ext in &self.extensions {
            let ext = ext.trim().trim_start_matches('.').to_lowercase();
            if !ext.is_empty() && !normalized.contains(&ext) {
                normalized.push(ext);
            }
        }
        self.extensions = normalized;
    }
}

/// Options passed to the external downloader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Directory under which profile folders are created.
    #[serde(default)]
    pub base_directory: Option<PathBuf>,

    /// Name or path of the instaloader executable.
    #[serde(default = "default_executable")]
    pub executable: String,

    #[serde(default = "default_true")]
    pub download_pictures: bool,

    #[serde(default = "default_true")]
    pub download_videos: bool,

    #[serde(default = "default_true")]
    pub download_video_thumbnails: bool,

    #[serde(default)]
    pub download_geotags: bool,

    #[serde(default)]
    pub download_comments: bool,

    /// Whether to write JSON metadata sidecars.
    #[serde(default = "default_true")]
    pub save_metadata: bool,

    /// Number of additional attempts after a failed download.
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Seconds to wait between download attempts.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            base_directory: None,
            executable: default_executable(),
            download_pictures: true,
            download_videos: true,
            download_video_thumbnails: true,
            download_geotags: false,
            download_comments: false,
            save_metadata: true,
            retries: default_retries(),
            retry_delay_secs: default_retry_delay(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    ["jpg", "jpeg", "png", "webp", "mp4", "json"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_workers() -> usize {
    1
}

fn default_file_timeout() -> u64 {
    300
}

fn default_ledger_file_name() -> String {
    "hashes.txt".to_string()
}

fn default_executable() -> String {
    "instaloader".to_string()
}

fn default_true() -> bool {
    true
}

fn default_retries() -> u32 {
    2
}

fn default_retry_delay() -> u64 {
    30
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!("Configuration file not found: {}", path.display()))
            } else {
                Error::Io(e)
            }
        })?;

        let mut config: Config = toml::from_str(&content)?;
        config.pipeline.normalize_extensions();
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("No configuration at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Get the effective base directory for downloaded profiles.
    pub fn base_directory(&self) -> PathBuf {
        self.download
            .base_directory
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_file() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.pipeline.algorithm, HashAlgorithm::Md5);
        assert_eq!(config.pipeline.workers, 1);
        assert_eq!(config.pipeline.ledger_file_name, "hashes.txt");
        assert!(config.download.save_metadata);
        assert!(!config.download.download_geotags);
    }

    #[test]
    fn test_load_normalizes_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("insta-forensic.toml");
        fs::write(
            &path,
            "[pipeline]\nalgorithm = \"sha1\"\nextensions = [\".JPG\", \"mp4\", \"jpg\"]\nworkers = 4\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.pipeline.algorithm, HashAlgorithm::Sha1);
        assert_eq!(config.pipeline.extensions, vec!["jpg", "mp4"]);
        assert_eq!(config.pipeline.workers, 4);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(matches!(Config::load(&path), Err(Error::Config(_))));
        assert!(Config::load_or_default(&path).is_ok());
    }
}
