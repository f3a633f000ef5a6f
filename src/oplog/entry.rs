//! Log entry representation.

use chrono::{DateTime, Local};
use std::fmt;

/// Timestamp layout used in the log file.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// One line of the operation log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    pub fn new(timestamp: DateTime<Local>, level: LogLevel, message: String) -> Self {
        Self {
            timestamp,
            level,
            message,
        }
    }

    /// `[<timestamp>] <LEVEL>: <message>`
    pub fn format_line(&self) -> String {
        format!(
            "[{}] {}: {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.level,
            self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_line() {
        let ts = Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let entry = LogEntry::new(ts, LogLevel::Warn, "careful".to_string());
        assert_eq!(entry.format_line(), "[2024-01-02 03:04:05.000] WARN: careful");
    }

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Error > LogLevel::Warn);
        assert!(LogLevel::Debug < LogLevel::Info);
    }
}
