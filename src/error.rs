//! Error types for the insta-forensic application.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration value for '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    #[error("Invalid profile identifier: {0}")]
    InvalidProfile(String),

    // Pipeline errors
    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Cannot read {}: {source}", path.display())]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed metadata in {}: {source}", path.display())]
    MalformedMetadata {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cannot write {}: {source}", path.display())]
    OutputUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Hash algorithm mismatch for {path}: ledger uses {expected}, got {found}")]
    AlgorithmMismatch {
        path: String,
        expected: String,
        found: String,
    },

    #[error("Timed out after {secs}s processing {}", path.display())]
    Timeout { path: PathBuf, secs: u64 },

    #[error("Worker failed on {}: {message}", path.display())]
    Worker { path: PathBuf, message: String },

    #[error("Invalid run state transition: {0}")]
    StateTransition(String),

    #[error("Run cancelled by user")]
    Cancelled,

    // Download errors
    #[error("Download failed: {0}")]
    Download(String),

    #[error("instaloader not found. Please install it (pip install instaloader) and ensure it's in your PATH.")]
    DownloaderNotFound,

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    // URL parsing errors
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl Error {
    /// Whether this error only affects a single file and the batch may continue.
    pub fn is_per_item(&self) -> bool {
        matches!(
            self,
            Error::FileUnreadable { .. }
                | Error::MalformedMetadata { .. }
                | Error::OutputUnwritable { .. }
                | Error::AlgorithmMismatch { .. }
                | Error::Timeout { .. }
                | Error::Worker { .. }
        )
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Process exit codes.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const CONFIG_ERROR: i32 = 3;
    pub const DOWNLOAD_ERROR: i32 = 4;
    pub const RUN_FAILED: i32 = 5;
    pub const CANCELLED: i32 = 130;
}
