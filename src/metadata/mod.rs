//! Metadata module.
//!
//! Converts JSON sidecars written by the downloader into flat, readable text.

pub mod transcode;

pub use transcode::{flatten, transcode_sidecar, MetadataDocument};
