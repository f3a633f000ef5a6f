//! `instaloader` command-line downloader.

use std::ffi::OsString;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::config::DownloadConfig;
use crate::download::{DownloadRequest, ProfileDownloader};
use crate::error::{Error, Result};

/// Runs the `instaloader` executable for one profile.
#[derive(Debug, Clone)]
pub struct InstaloaderDownloader {
    config: DownloadConfig,
}

impl InstaloaderDownloader {
    pub fn new(config: DownloadConfig) -> Self {
        Self { config }
    }

    /// Command-line arguments for a request.
    ///
    /// Sidecars are always written uncompressed so they can be transcoded. The
    /// username always follows `--` so it is never read as an option.
    pub fn build_args(&self, request: &DownloadRequest) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--dirname-pattern".into(),
            escape_pattern(&request.target_dir.to_string_lossy()).into(),
            "--no-compress-json".into(),
        ];

        if !self.config.download_pictures {
            args.push("--no-pictures".into());
        }
        if !self.config.download_videos {
            args.push("--no-videos".into());
        }
        if !self.config.download_video_thumbnails {
            args.push("--no-video-thumbnails".into());
        }
        if self.config.download_geotags {
            args.push("--geotags".into());
        }
        if self.config.download_comments {
            args.push("--comments".into());
        }
        if !self.config.save_metadata {
            args.push("--no-metadata-json".into());
        }

        args.push("--".into());
        args.push(request.username.clone().into());
        args
    }
}

#[async_trait]
impl ProfileDownloader for InstaloaderDownloader {
    async fn download(&self, request: &DownloadRequest) -> Result<()> {
        tracing::debug!(
            "Running {} for {}",
            self.config.executable,
            request.username
        );

        let status = Command::new(&self.config.executable)
            .args(self.build_args(request))
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::DownloaderNotFound
                } else {
                    Error::Io(e)
                }
            })?;

        if !status.success() {
            return Err(Error::Download(format!(
                "{} exited with {} for profile {}",
                self.config.executable, status, request.username
            )));
        }

        Ok(())
    }
}

/// instaloader treats `{...}` in directory patterns as placeholders.
fn escape_pattern(path: &str) -> String {
    path.replace('{', "{{").replace('}', "}}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn request() -> DownloadRequest {
        DownloadRequest {
            username: "nasa".to_string(),
            target_dir: PathBuf::from("/archive/nasa/posts"),
        }
    }

    #[test]
    fn test_default_args() {
        let downloader = InstaloaderDownloader::new(DownloadConfig::default());
        let args = downloader.build_args(&request());
        assert_eq!(
            args,
            vec![
                OsString::from("--dirname-pattern"),
                OsString::from("/archive/nasa/posts"),
                OsString::from("--no-compress-json"),
                OsString::from("--"),
                OsString::from("nasa"),
            ]
        );
    }

    #[test]
    fn test_content_selection_flags() {
        let config = DownloadConfig {
            download_videos: false,
            download_video_thumbnails: false,
            download_geotags: true,
            download_comments: true,
            save_metadata: false,
            ..DownloadConfig::default()
        };
        let args = InstaloaderDownloader::new(config).build_args(&request());
        for flag in [
            "--no-videos",
            "--no-video-thumbnails",
            "--geotags",
            "--comments",
            "--no-metadata-json",
        ] {
            assert!(args.contains(&OsString::from(flag)), "missing {}", flag);
        }
        assert!(!args.contains(&OsString::from("--no-pictures")));
        assert_eq!(args.last(), Some(&OsString::from("nasa")));
    }

    #[test]
    fn test_username_follows_separator() {
        let request = DownloadRequest {
            username: "-help".to_string(),
            target_dir: PathBuf::from("/archive/x/posts"),
        };
        let args = InstaloaderDownloader::new(DownloadConfig::default()).build_args(&request);
        let separator = args.iter().position(|a| a == "--").unwrap();
        assert_eq!(separator, args.len() - 2);
        assert_eq!(args[separator + 1], OsString::from("-help"));
    }

    #[test]
    fn test_escape_pattern() {
        assert_eq!(escape_pattern("/data/{odd}"), "/data/{{odd}}");
    }

    #[tokio::test]
    async fn test_missing_executable() {
        let config = DownloadConfig {
            executable: "definitely-not-instaloader-9f2c".to_string(),
            ..DownloadConfig::default()
        };
        let err = InstaloaderDownloader::new(config)
            .download(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DownloaderNotFound));
    }
}
