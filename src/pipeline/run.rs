//! Per-profile run driver.
//!
//! A run walks `PENDING -> COLLECTING -> HASHING -> TRANSCODING -> DONE`.
//! Per-file errors are logged and skipped; anything else ends the run in
//! `FAILED`. File work runs on blocking threads, at most `workers` at a time,
//! and results are recorded in discovery order so the ledger and the log have
//! a single writer.

use std::future;
use std::path::PathBuf;
use std::pin::pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, Stream, StreamExt};
use indicatif::ProgressBar;

use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::fs::paths::relative_display;
use crate::fs::{DownloadedFile, FileCollector};
use crate::hash::{hash_file, HashLedger, HashRecord};
use crate::metadata::{transcode_sidecar, MetadataDocument};
use crate::oplog::OperationLog;
use crate::pipeline::state::{RunState, RunStats};

/// Outcome of a finished run.
#[derive(Debug)]
pub struct RunReport {
    pub root: PathBuf,
    pub state: RunState,
    pub stats: RunStats,
    /// Set once the ledger has been created.
    pub ledger_path: Option<PathBuf>,
    pub log_path: PathBuf,
    /// The error that ended the run, if it failed.
    pub failure: Option<Error>,
}

impl RunReport {
    pub fn succeeded(&self) -> bool {
        self.state == RunState::Done
    }
}

/// Drives one run against one profile directory.
pub struct Pipeline {
    root: PathBuf,
    config: PipelineConfig,
    log: Arc<OperationLog>,
    abort: Arc<AtomicBool>,
    state: RunState,
    stats: RunStats,
    ledger_path: Option<PathBuf>,
    progress: Option<ProgressBar>,
}

impl Pipeline {
    pub fn new(root: impl Into<PathBuf>, config: PipelineConfig, log: Arc<OperationLog>) -> Self {
        Self {
            root: root.into(),
            config,
            log,
            abort: Arc::new(AtomicBool::new(false)),
            state: RunState::Pending,
            stats: RunStats::default(),
            ledger_path: None,
            progress: None,
        }
    }

    /// Report per-file progress on the given bar.
    pub fn with_progress(mut self, bar: ProgressBar) -> Self {
        self.progress = Some(bar);
        self
    }

    /// Token that stops scheduling new files once set to `true`.
    pub fn abort_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.abort)
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Location of the hash ledger for this run.
    pub fn ledger_file(&self) -> PathBuf {
        self.root.join(&self.config.ledger_file_name)
    }

    /// Run every stage and return the final report.
    pub async fn run(mut self) -> RunReport {
        let result = self.execute().await;
        self.finish(result)
    }

    async fn execute(&mut self) -> Result<()> {
        let files = self.collect()?;
        self.hash(&files).await?;
        self.transcode(&files).await?;
        Ok(())
    }

    /// COLLECTING: enumerate matching files under the root.
    pub fn collect(&mut self) -> Result<Vec<DownloadedFile>> {
        self.transition(RunState::Collecting)?;
        self.log
            .info(format!("Collecting files in {}", self.root.display()))?;

        let collector = FileCollector::new(&self.root, &self.config.extensions)
            .exclude(self.ledger_file())
            .exclude(self.log.path());

        let mut files = Vec::new();
        for item in collector.collect()? {
            match item {
                Ok(file) => {
                    self.stats.files_collected += 1;
                    self.stats.bytes_collected += file.size;
                    files.push(file);
                }
                Err(e) => {
                    self.stats.collect_failures += 1;
                    self.item_failed(&e)?;
                }
            }
        }

        self.log.info(format!(
            "Collected {} files ({} bytes)",
            files.len(),
            self.stats.bytes_collected
        ))?;
        Ok(files)
    }

    /// HASHING: digest every collected file into a fresh ledger.
    pub async fn hash(&mut self, files: &[DownloadedFile]) -> Result<()> {
        self.transition(RunState::Hashing)?;

        let algorithm = self.config.algorithm;
        let ledger_path = self.ledger_file();
        let mut ledger = HashLedger::create(&ledger_path, algorithm)?;
        self.ledger_path = Some(ledger_path);
        self.log.info(format!(
            "{} hashes will be saved in: {}",
            algorithm,
            ledger.path().display()
        ))?;

        self.start_progress(files.len(), "Hashing");
        let mut results = pin!(process_in_order(
            files,
            self.config.workers,
            self.file_timeout(),
            self.abort_handle(),
            move |file: &DownloadedFile| {
                let path = file.path.clone();
                move || hash_file(&path, algorithm)
            },
        ));

        while let Some((file, outcome)) = results.next().await {
            self.record_hash(&mut ledger, file, outcome)?;
            self.tick_progress();
        }
        self.finish_progress();

        if self.is_aborted() {
            return Err(Error::Cancelled);
        }

        self.log.info(format!(
            "Total {} hashes calculated and saved: {}",
            algorithm,
            ledger.len()
        ))?;
        Ok(())
    }

    fn record_hash(
        &mut self,
        ledger: &mut HashLedger,
        file: &DownloadedFile,
        outcome: Result<String>,
    ) -> Result<()> {
        let digest = match outcome {
            Ok(digest) => digest,
            Err(e) => {
                self.stats.hash_failures += 1;
                return self.item_failed(&e);
            }
        };

        let record = HashRecord::new(file.relative_path.clone(), self.config.algorithm, digest);
        match ledger.append(&record) {
            Ok(()) => {
                self.stats.files_hashed += 1;
                self.log.info(format!(
                    "Hash calculated and saved for: {} ({} {})",
                    record.relative_path, record.algorithm, record.digest
                ))?;
                Ok(())
            }
            Err(e) if e.is_per_item() => {
                self.stats.hash_failures += 1;
                self.item_failed(&e)
            }
            Err(e) => Err(e),
        }
    }

    /// TRANSCODING: convert every JSON sidecar to text.
    pub async fn transcode(&mut self, files: &[DownloadedFile]) -> Result<()> {
        self.transition(RunState::Transcoding)?;

        let sidecars: Vec<DownloadedFile> =
            files.iter().filter(|f| f.is_sidecar()).cloned().collect();
        self.log
            .info(format!("Converting {} metadata sidecars", sidecars.len()))?;

        self.start_progress(sidecars.len(), "Converting");
        let mut results = pin!(process_in_order(
            &sidecars,
            self.config.workers,
            self.file_timeout(),
            self.abort_handle(),
            |file: &DownloadedFile| {
                let path = file.path.clone();
                move || transcode_sidecar(&path)
            },
        ));

        while let Some((file, outcome)) = results.next().await {
            self.record_transcode(file, outcome)?;
            self.tick_progress();
        }
        self.finish_progress();

        if self.is_aborted() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }

    fn record_transcode(
        &mut self,
        file: &DownloadedFile,
        outcome: Result<MetadataDocument>,
    ) -> Result<()> {
        match outcome {
            Ok(document) => {
                self.stats.sidecars_transcoded += 1;
                self.log.info(format!(
                    "File {} converted to {} ({} fields)",
                    file.relative_path,
                    relative_display(&self.root, &document.text_path),
                    document.entries.len()
                ))?;
                Ok(())
            }
            Err(e) => {
                self.stats.transcode_failures += 1;
                self.item_failed(&e)
            }
        }
    }

    /// Close the run: `DONE` if `result` is ok, otherwise `FAILED` with one error entry.
    pub fn finish(mut self, result: Result<()>) -> RunReport {
        let failure = match result.and_then(|()| self.complete()) {
            Ok(()) => None,
            Err(e) => {
                self.fail(&e);
                Some(e)
            }
        };

        RunReport {
            root: self.root,
            state: self.state,
            stats: self.stats,
            ledger_path: self.ledger_path,
            log_path: self.log.path().to_path_buf(),
            failure,
        }
    }

    fn complete(&mut self) -> Result<()> {
        self.log.info(format!(
            "Run completed for {}: {} files hashed, {} sidecars converted, {} failures",
            self.root.display(),
            self.stats.files_hashed,
            self.stats.sidecars_transcoded,
            self.stats.total_failures()
        ))?;
        self.transition(RunState::Done)
    }

    fn fail(&mut self, error: &Error) {
        let reason = match error {
            Error::Cancelled => "cancelled".to_string(),
            other => other.to_string(),
        };
        let previous = std::mem::replace(&mut self.state, RunState::Failed(reason));

        if let Err(log_err) = self
            .log
            .error(format!("Run failed during {}: {}", previous, error))
        {
            tracing::error!("Could not write to operation log: {}", log_err);
        }
    }

    fn transition(&mut self, next: RunState) -> Result<()> {
        if !self.state.can_transition_to(&next) {
            return Err(Error::StateTransition(format!("{} -> {}", self.state, next)));
        }
        self.log
            .debug(format!("Run state: {} -> {}", self.state, next))?;
        self.state = next;
        Ok(())
    }

    /// Log a per-file error. Only a failing log write escapes.
    fn item_failed(&self, error: &Error) -> Result<()> {
        self.log.error(error.to_string())?;
        Ok(())
    }

    fn is_aborted(&self) -> bool {
        self.abort.load(Ordering::SeqCst)
    }

    fn file_timeout(&self) -> Duration {
        Duration::from_secs(self.config.file_timeout_secs)
    }

    fn start_progress(&self, len: usize, message: &'static str) {
        if let Some(bar) = &self.progress {
            bar.reset();
            bar.set_length(len as u64);
            bar.set_message(message);
        }
    }

    fn tick_progress(&self) {
        if let Some(bar) = &self.progress {
            bar.inc(1);
        }
    }

    fn finish_progress(&self) {
        if let Some(bar) = &self.progress {
            bar.finish_and_clear();
        }
    }
}

/// Run `make_task(file)` for each file on a blocking thread, at most `workers`
/// at once, yielding results in input order. Stops pulling new files once
/// `abort` is set; files already started still complete.
fn process_in_order<'a, T, F, G>(
    files: &'a [DownloadedFile],
    workers: usize,
    limit: Duration,
    abort: Arc<AtomicBool>,
    make_task: G,
) -> impl Stream<Item = (&'a DownloadedFile, Result<T>)> + 'a
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
    G: Fn(&DownloadedFile) -> F + 'a,
{
    stream::iter(files)
        .take_while(move |_| future::ready(!abort.load(Ordering::SeqCst)))
        .map(move |file| {
            let task = make_task(file);
            let path = file.path.clone();
            async move { (file, run_blocking(path, limit, task).await) }
        })
        .buffered(workers.max(1))
}

/// Run a blocking file operation with a deadline.
///
/// A blocking thread cannot be interrupted. After the deadline the file is
/// reported as failed and the thread is detached; it may still finish its
/// write later. A `.txt` left behind this way is rewritten by the next run.
async fn run_blocking<T, F>(path: PathBuf, limit: Duration, task: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    match tokio::time::timeout(limit, tokio::task::spawn_blocking(task)).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(Error::Worker {
            path,
            message: join_error.to_string(),
        }),
        Err(_) => Err(Error::Timeout {
            path,
            secs: limit.as_secs(),
        }),
    }
}
