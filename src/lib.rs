//! insta-forensic - archive public Instagram profiles with integrity records.
//!
//! This library verifies and catalogues a downloaded profile directory.
//!
//! # Features
//!
//! - Optional download of a profile through `instaloader`, with retries
//! - MD5 or SHA1 hash ledger of every downloaded file
//! - Flattened text copies of JSON metadata sidecars
//! - Append-only, flush-on-write operation log per run
//! - Bounded parallel processing with per-file timeouts and cancellation
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use insta_forensic::{Config, OperationLog, Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(Path::new("insta-forensic.toml"))?;
//!     let log = Arc::new(OperationLog::open(Path::new("nasa_log.txt"))?);
//!
//!     let report = Pipeline::new("nasa", config.pipeline, log).run().await;
//!     println!("{}", report.state);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod fs;
pub mod hash;
pub mod metadata;
pub mod oplog;
pub mod output;
pub mod pipeline;

// Re-exports for convenience
pub use config::{Config, HashAlgorithm};
pub use download::{download_profile, DownloadRequest, InstaloaderDownloader, ProfileDownloader};
pub use error::{Error, Result};
pub use fs::{DownloadedFile, FileCollector};
pub use hash::{hash_file, HashLedger, HashRecord};
pub use metadata::{transcode_sidecar, MetadataDocument};
pub use oplog::{LogEntry, LogLevel, OperationLog};
pub use pipeline::{Pipeline, RunReport, RunState, RunStats};
