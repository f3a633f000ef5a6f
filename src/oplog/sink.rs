//! Persistent, flush-on-write operation log.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Local};

use crate::error::Result;
use crate::oplog::entry::{LogEntry, LogLevel};

/// Append-only log file shared by all pipeline stages.
///
/// Writes are serialized through a mutex and flushed before `record` returns,
/// so a crash leaves every earlier entry on disk. Entries are mirrored to
/// `tracing` at the matching level.
#[derive(Debug)]
pub struct OperationLog {
    path: PathBuf,
    inner: Mutex<Sink>,
}

#[derive(Debug)]
struct Sink {
    file: File,
    last_timestamp: Option<DateTime<Local>>,
}

impl OperationLog {
    /// Open (or create) a log file in append mode.
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            inner: Mutex::new(Sink {
                file,
                last_timestamp: None,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write one entry and flush it.
    pub fn record(&self, level: LogLevel, message: impl Into<String>) -> Result<LogEntry> {
        let mut sink = self.lock();

        // Timestamps never go backwards, even if the wall clock does
        let now = Local::now();
        let timestamp = match sink.last_timestamp {
            Some(last) if last > now => last,
            _ => now,
        };

        let entry = LogEntry::new(timestamp, level, message.into());
        writeln!(sink.file, "{}", entry.format_line())?;
        sink.file.flush()?;
        sink.last_timestamp = Some(timestamp);

        match level {
            LogLevel::Debug => tracing::debug!("{}", entry.message),
            LogLevel::Info => tracing::info!("{}", entry.message),
            LogLevel::Warn => tracing::warn!("{}", entry.message),
            LogLevel::Error => tracing::error!("{}", entry.message),
        }

        Ok(entry)
    }

    pub fn debug(&self, message: impl Into<String>) -> Result<LogEntry> {
        self.record(LogLevel::Debug, message)
    }

    pub fn info(&self, message: impl Into<String>) -> Result<LogEntry> {
        self.record(LogLevel::Info, message)
    }

    pub fn warn(&self, message: impl Into<String>) -> Result<LogEntry> {
        self.record(LogLevel::Warn, message)
    }

    pub fn error(&self, message: impl Into<String>) -> Result<LogEntry> {
        self.record(LogLevel::Error, message)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Sink> {
        // Each entry is one write of a whole line; a poisoned sink is still consistent
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
