//! File name generation and sanitizing.

use chrono::{DateTime, Local};

use crate::error::{Error, Result};

/// Sanitize a path component (profile folder name) so it stays a single segment.
pub fn sanitize_path_component(name: &str) -> Result<String> {
    // Reject path traversal attempts
    if name.contains("..") {
        return Err(Error::InvalidProfile(format!(
            "Path traversal detected: '{}'",
            name
        )));
    }

    if name.contains('\0') {
        return Err(Error::InvalidProfile(format!(
            "Null bytes not allowed: '{}'",
            name
        )));
    }

    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.trim().is_empty() || sanitized == "." {
        return Err(Error::InvalidProfile(
            "Path component cannot be empty or whitespace-only".to_string(),
        ));
    }

    Ok(sanitized)
}

/// Name of the operation log for one run, e.g. `nasa_log_20240101_120000.txt`.
pub fn run_log_file_name(profile: &str, started_at: &DateTime<Local>) -> String {
    format!("{}_log_{}.txt", profile, started_at.format("%Y%m%d_%H%M%S"))
}
