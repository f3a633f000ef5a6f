//! Configuration validation logic.

use crate::config::loader::Config;
use crate::error::{Error, Result};
use regex::Regex;

/// Upper bound for concurrently processed files.
const MAX_WORKERS: usize = 64;

/// Instagram usernames: 1-30 chars of letters, digits, periods and underscores.
const USERNAME_PATTERN: &str = r"^[A-Za-z0-9._]{1,30}$";

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_extensions(&config.pipeline.extensions)?;
    validate_workers(config.pipeline.workers)?;
    validate_ledger_name(&config.pipeline.ledger_file_name)?;

    if config.pipeline.file_timeout_secs == 0 {
        return Err(Error::ConfigValidation {
            field: "file_timeout_secs".to_string(),
            message: "Timeout must be greater than zero".to_string(),
        });
    }

    if config.download.executable.trim().is_empty() {
        return Err(Error::ConfigValidation {
            field: "executable".to_string(),
            message: "Downloader executable cannot be empty".to_string(),
        });
    }

    Ok(())
}

/// Validate the extension allow-list.
pub fn validate_extensions(extensions: &[String]) -> Result<()> {
    if extensions.is_empty() {
        return Err(Error::ConfigValidation {
            field: "extensions".to_string(),
            message: "At least one file extension is required".to_string(),
        });
    }

    for ext in extensions {
        let ext = ext.trim_start_matches('.');
        if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::ConfigValidation {
                field: "extensions".to_string(),
                message: format!("Invalid extension '{}'", ext),
            });
        }
    }

    Ok(())
}

/// Validate the worker count.
pub fn validate_workers(workers: usize) -> Result<()> {
    if workers == 0 || workers > MAX_WORKERS {
        return Err(Error::ConfigValidation {
            field: "workers".to_string(),
            message: format!("Workers must be between 1 and {} (got {})", MAX_WORKERS, workers),
        });
    }
    Ok(())
}

/// The ledger must be a plain file name inside the profile directory.
pub fn validate_ledger_name(name: &str) -> Result<()> {
    if name.trim().is_empty() || name.contains('/') || name.contains('\\') || name == ".." {
        return Err(Error::ConfigValidation {
            field: "ledger_file_name".to_string(),
            message: format!("Ledger must be a plain file name (got '{}')", name),
        });
    }
    Ok(())
}

/// Extract the username from a profile URL or a bare username.
///
/// Accepts `https://www.instagram.com/<name>/`, `instagram.com/<name>` and `@name`.
pub fn parse_profile_username(input: &str) -> Result<String> {
    let input = input.trim();

    let candidate = if input.starts_with("http://") || input.starts_with("https://") {
        let url = url::Url::parse(input)?;
        let host = url.host_str().unwrap_or("");
        if !host.ends_with("instagram.com") {
            return Err(Error::InvalidProfile(format!(
                "Not an Instagram URL: {}",
                input
            )));
        }
        url.path_segments()
            .and_then(|mut segments| segments.find(|s| !s.is_empty()))
            .map(|s| s.to_string())
            .ok_or_else(|| Error::InvalidProfile(format!("No username in URL: {}", input)))?
    } else if let Some(rest) = input
        .strip_prefix("www.instagram.com/")
        .or_else(|| input.strip_prefix("instagram.com/"))
    {
        rest.trim_end_matches('/').to_string()
    } else {
        input.trim_start_matches('@').to_string()
    };

    let username_pattern = Regex::new(USERNAME_PATTERN).unwrap();
    if !username_pattern.is_match(&candidate) {
        return Err(Error::InvalidProfile(format!(
            "'{}' is not a valid Instagram username",
            candidate
        )));
    }

    // "." and ".." match the pattern but would resolve outside the profile folder
    if candidate.chars().all(|c| c == '.') {
        return Err(Error::InvalidProfile(format!(
            "'{}' is not a valid Instagram username",
            candidate
        )));
    }

    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_invalid_workers() {
        assert!(validate_workers(0).is_err());
        assert!(validate_workers(65).is_err());
        assert!(validate_workers(8).is_ok());
    }

    #[test]
    fn test_invalid_extensions() {
        assert!(validate_extensions(&[]).is_err());
        assert!(validate_extensions(&["j/pg".to_string()]).is_err());
        assert!(validate_extensions(&[".jpg".to_string(), "mp4".to_string()]).is_ok());
    }

    #[test]
    fn test_ledger_name() {
        assert!(validate_ledger_name("hashes.txt").is_ok());
        assert!(validate_ledger_name("../hashes.txt").is_err());
        assert!(validate_ledger_name("").is_err());
    }

    #[test]
    fn test_parse_profile_username_url() {
        assert_eq!(
            parse_profile_username("https://www.instagram.com/nasa/").unwrap(),
            "nasa"
        );
        assert_eq!(
            parse_profile_username("https://instagram.com/some.user_1?hl=en").unwrap(),
            "some.user_1"
        );
        assert_eq!(
            parse_profile_username("instagram.com/nasa/").unwrap(),
            "nasa"
        );
    }

    #[test]
    fn test_parse_profile_username_direct() {
        assert_eq!(parse_profile_username("@nasa").unwrap(), "nasa");
        assert_eq!(parse_profile_username("nasa").unwrap(), "nasa");
    }

    #[test]
    fn test_parse_profile_username_invalid() {
        assert!(parse_profile_username("https://example.com/nasa").is_err());
        assert!(parse_profile_username("https://www.instagram.com/").is_err());
        assert!(parse_profile_username("bad name").is_err());
        assert!(parse_profile_username("..").is_err());
    }
}
