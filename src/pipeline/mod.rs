//! Verification and cataloguing pipeline.
//!
//! This module provides:
//! - Run state tracking and statistics
//! - The per-profile run driver (collect, hash, transcode)

pub mod run;
pub mod state;

pub use run::{Pipeline, RunReport};
pub use state::{RunState, RunStats};
