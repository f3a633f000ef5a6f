//! Configuration module for insta-forensic.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - Hash algorithm selection
//! - Configuration validation and profile identifier parsing

pub mod loader;
pub mod modes;
pub mod validation;

pub use loader::{Config, DownloadConfig, PipelineConfig};
pub use modes::HashAlgorithm;
pub use validation::{parse_profile_username, validate_config};
