//! Profile download sequencing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::time::{sleep, Instant};

use crate::config::DownloadConfig;
use crate::download::{DownloadRequest, ProfileDownloader};
use crate::error::{Error, Result};
use crate::fs::paths::ensure_dir;
use crate::oplog::OperationLog;

/// Download a profile into `request.target_dir`, retrying failed attempts.
///
/// Makes up to `retries + 1` attempts with `retry_delay_secs` between them. A
/// missing downloader executable is not retried. Once `abort` is set no further
/// attempt starts and the call returns [`Error::Cancelled`].
pub async fn download_profile(
    downloader: &dyn ProfileDownloader,
    config: &DownloadConfig,
    request: &DownloadRequest,
    log: &OperationLog,
    abort: &AtomicBool,
) -> Result<()> {
    ensure_dir(&request.target_dir)?;

    log.info(format!(
        "Attempting to download profile: {}",
        request.username
    ))?;
    log.info(format!("Posts path: {}", request.target_dir.display()))?;

    let attempts = config.retries + 1;
    let mut attempt = 1;
    loop {
        if abort.load(Ordering::SeqCst) {
            return Err(Error::Cancelled);
        }

        match downloader.download(request).await {
            Ok(()) => {
                log.info(format!(
                    "Download completed for public profile {}",
                    request.username
                ))?;
                return Ok(());
            }
            // An interrupted downloader exits non-zero; report the interrupt instead
            Err(_) if abort.load(Ordering::SeqCst) => return Err(Error::Cancelled),
            Err(e) if attempt >= attempts || matches!(e, Error::DownloaderNotFound) => {
                return Err(e);
            }
            Err(e) => {
                log.warn(format!(
                    "Download attempt {}/{} failed: {}. Retrying in {} seconds...",
                    attempt, attempts, e, config.retry_delay_secs
                ))?;
                wait_unless_aborted(Duration::from_secs(config.retry_delay_secs), abort).await?;
                attempt += 1;
            }
        }
    }
}

/// Interval at which the abort flag is checked while waiting between attempts.
const ABORT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Sleep for `delay`, returning early with [`Error::Cancelled`] once `abort` is set.
async fn wait_unless_aborted(delay: Duration, abort: &AtomicBool) -> Result<()> {
    let deadline = Instant::now() + delay;
    loop {
        if abort.load(Ordering::SeqCst) {
            return Err(Error::Cancelled);
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(());
        }
        sleep((deadline - now).min(ABORT_POLL_INTERVAL)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::fs;
    use std::sync::atomic::AtomicU32;
    use std::sync::Arc;

    /// Fails a fixed number of times, then writes one post.
    struct FlakyDownloader {
        failures: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl ProfileDownloader for FlakyDownloader {
        async fn download(&self, request: &DownloadRequest) -> Result<()> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(Error::Download("rate limited".to_string()));
            }
            fs::write(request.target_dir.join("post.jpg"), b"X")?;
            Ok(())
        }
    }

    /// Simulates instaloader being interrupted by Ctrl-C.
    struct InterruptedDownloader {
        abort: Arc<AtomicBool>,
        calls: AtomicU32,
    }

    #[async_trait]
    impl ProfileDownloader for InterruptedDownloader {
        async fn download(&self, _request: &DownloadRequest) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.abort.store(true, Ordering::SeqCst);
            Err(Error::Download("instaloader exited with signal: 2".to_string()))
        }
    }

    struct MissingDownloader;

    #[async_trait]
    impl ProfileDownloader for MissingDownloader {
        async fn download(&self, _request: &DownloadRequest) -> Result<()> {
            Err(Error::DownloaderNotFound)
        }
    }

    fn setup() -> (tempfile::TempDir, DownloadRequest, OperationLog) {
        let dir = tempfile::tempdir().unwrap();
        let request = DownloadRequest {
            username: "nasa".to_string(),
            target_dir: dir.path().join("nasa").join("posts"),
        };
        let log = OperationLog::open(&dir.path().join("log.txt")).unwrap();
        (dir, request, log)
    }

    fn no_delay(retries: u32) -> DownloadConfig {
        DownloadConfig {
            retries,
            retry_delay_secs: 0,
            ..DownloadConfig::default()
        }
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let (_dir, request, log) = setup();
        let downloader = FlakyDownloader {
            failures: 2,
            calls: AtomicU32::new(0),
        };

        download_profile(
            &downloader,
            &no_delay(2),
            &request,
            &log,
            &AtomicBool::new(false),
        )
        .await
        .unwrap();

        assert_eq!(downloader.calls.load(Ordering::SeqCst), 3);
        assert!(request.target_dir.join("post.jpg").exists());

        let content = fs::read_to_string(log.path()).unwrap();
        assert_eq!(content.matches("] WARN: ").count(), 2);
        assert!(content.contains("Download completed for public profile nasa"));
    }

    #[tokio::test]
    async fn test_gives_up_after_retries() {
        let (_dir, request, log) = setup();
        let downloader = FlakyDownloader {
            failures: 5,
            calls: AtomicU32::new(0),
        };

        let err = download_profile(
            &downloader,
            &no_delay(1),
            &request,
            &log,
            &AtomicBool::new(false),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Download(_)));
        assert_eq!(downloader.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_missing_downloader_is_not_retried() {
        let (_dir, request, log) = setup();
        let err = download_profile(
            &MissingDownloader,
            &no_delay(3),
            &request,
            &log,
            &AtomicBool::new(false),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::DownloaderNotFound));
        // The target directory is prepared before the first attempt
        assert!(request.target_dir.is_dir());
    }

    #[tokio::test]
    async fn test_interrupt_stops_retries() {
        let (_dir, request, log) = setup();
        let abort = Arc::new(AtomicBool::new(false));
        let downloader = InterruptedDownloader {
            abort: Arc::clone(&abort),
            calls: AtomicU32::new(0),
        };

        let err = download_profile(&downloader, &no_delay(2), &request, &log, &abort)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Cancelled));
        assert_eq!(downloader.calls.load(Ordering::SeqCst), 1);
        let content = fs::read_to_string(log.path()).unwrap();
        assert!(!content.contains("] WARN: "));
    }

    #[tokio::test]
    async fn test_abort_during_retry_delay() {
        let (_dir, request, log) = setup();
        let abort = Arc::new(AtomicBool::new(false));
        let downloader = FlakyDownloader {
            failures: 5,
            calls: AtomicU32::new(0),
        };
        let config = DownloadConfig {
            retries: 3,
            retry_delay_secs: 30,
            ..DownloadConfig::default()
        };

        let flag = Arc::clone(&abort);
        tokio::spawn(async move {
            sleep(Duration::from_millis(50)).await;
            flag.store(true, Ordering::SeqCst);
        });

        let started = Instant::now();
        let err = download_profile(&downloader, &config, &request, &log, &abort)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Cancelled));
        assert_eq!(downloader.calls.load(Ordering::SeqCst), 1);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_aborted_before_start() {
        let (_dir, request, log) = setup();
        let downloader = FlakyDownloader {
            failures: 0,
            calls: AtomicU32::new(0),
        };

        let err = download_profile(
            &downloader,
            &no_delay(0),
            &request,
            &log,
            &AtomicBool::new(true),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Cancelled));
        assert_eq!(downloader.calls.load(Ordering::SeqCst), 0);
    }
}
