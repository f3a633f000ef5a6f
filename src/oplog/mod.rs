//! Operation log module.
//!
//! A single append-only log per run, shared by every pipeline stage.

pub mod entry;
pub mod sink;

pub use entry::{LogEntry, LogLevel};
pub use sink::OperationLog;
