//! Command-line argument definitions using clap.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::{Config, HashAlgorithm};

/// Instagram profile archiver CLI.
#[derive(Parser, Debug)]
#[command(
    name = "insta-forensic",
    version,
    about = "Verify and catalogue downloaded Instagram profiles",
    long_about = "Hashes every downloaded file into a ledger, converts JSON metadata sidecars \
                  to readable text and records each step in a per-run log.\n\n\
                  With --download, the profile is first fetched with instaloader."
)]
pub struct Args {
    /// Profile directory to process, or with --download a profile URL or username.
    pub profile: String,

    /// Fetch the profile with instaloader before processing.
    #[arg(long)]
    pub download: bool,

    /// Base directory for downloaded profiles (with --download).
    #[arg(short = 'd', long = "base-dir")]
    pub base_directory: Option<PathBuf>,

    /// Hash algorithm for the ledger.
    #[arg(short, long, value_enum)]
    pub algorithm: Option<AlgorithmArg>,

    /// File extensions to collect and hash, comma separated.
    #[arg(short, long, value_delimiter = ',')]
    pub extensions: Option<Vec<String>>,

    /// Number of files processed at the same time.
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Seconds before a single file operation is abandoned.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// File name of the hash ledger inside the profile directory.
    #[arg(long)]
    pub ledger: Option<String>,

    /// Directory for run logs (default: parent of the profile directory).
    #[arg(long = "log-dir", env = "INSTA_FORENSIC_LOG_DIR")]
    pub log_directory: Option<PathBuf>,

    /// Path to configuration file.
    #[arg(short, long, default_value = "insta-forensic.toml")]
    pub config: PathBuf,

    /// Hide the progress bar.
    #[arg(long, short)]
    pub quiet: bool,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,
}

/// CLI hash algorithm argument.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AlgorithmArg {
    Md5,
    Sha1,
}

impl From<AlgorithmArg> for HashAlgorithm {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::Md5 => HashAlgorithm::Md5,
            AlgorithmArg::Sha1 => HashAlgorithm::Sha1,
        }
    }
}

impl Args {
    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(&self, config: &mut Config) {
        if let Some(dir) = &self.base_directory {
            config.download.base_directory = Some(dir.clone());
        }

        if let Some(algorithm) = self.algorithm {
            config.pipeline.algorithm = algorithm.into();
        }

        if let Some(extensions) = &self.extensions {
            config.pipeline.extensions = extensions.clone();
            config.pipeline.normalize_extensions();
        }

        if let Some(workers) = self.workers {
            config.pipeline.workers = workers;
        }

        if let Some(timeout) = self.timeout {
            config.pipeline.file_timeout_secs = timeout;
        }

        if let Some(ledger) = &self.ledger {
            config.pipeline.ledger_file_name = ledger.clone();
        }

        if let Some(dir) = &self.log_directory {
            config.pipeline.log_directory = Some(dir.clone());
        }

        if self.quiet {
            config.pipeline.show_progress = false;
        }
    }
}
