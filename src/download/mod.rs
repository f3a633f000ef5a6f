//! Download module: the external step that fills a profile directory.
//!
//! This module provides:
//! - The `ProfileDownloader` seam
//! - An implementation that drives the `instaloader` executable
//! - Retry sequencing and logging around a download

pub mod instaloader;
pub mod profile;

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::Result;

pub use instaloader::InstaloaderDownloader;
pub use profile::download_profile;

/// What to download and where to put it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    /// Instagram username.
    pub username: String,

    /// Directory posts and sidecars are written to.
    pub target_dir: PathBuf,
}

/// Something that populates a directory with a profile's posts.
///
/// One call is one attempt; retries are sequenced by [`download_profile`].
#[async_trait]
pub trait ProfileDownloader: Send + Sync {
    async fn download(&self, request: &DownloadRequest) -> Result<()>;
}
