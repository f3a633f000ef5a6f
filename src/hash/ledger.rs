//! Append-only hash ledger.
//!
//! One line per hashed file, `<relative_path>  <hex_digest>`, in the order the
//! records were appended. The algorithm is fixed for the whole ledger.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::config::HashAlgorithm;
use crate::error::{Error, Result};

/// Digest of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashRecord {
    pub relative_path: String,
    pub algorithm: HashAlgorithm,
    pub digest: String,
    pub computed_at: DateTime<Local>,
}

impl HashRecord {
    pub fn new(relative_path: String, algorithm: HashAlgorithm, digest: String) -> Self {
        Self {
            relative_path,
            algorithm,
            digest,
            computed_at: Local::now(),
        }
    }

    /// The line written to the ledger, without the trailing newline.
    pub fn ledger_line(&self) -> String {
        format!("{}  {}", self.relative_path, self.digest)
    }
}

/// Ledger file for one run.
#[derive(Debug)]
pub struct HashLedger {
    path: PathBuf,
    algorithm: HashAlgorithm,
    file: File,
    records: usize,
}

impl HashLedger {
    /// Create (or truncate) the ledger at `path`.
    pub fn create(path: &Path, algorithm: HashAlgorithm) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            algorithm,
            file,
            records: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records appended so far.
    pub fn len(&self) -> usize {
        self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records == 0
    }

    /// Append one record and flush it to disk before returning.
    ///
    /// Records from another algorithm, or whose digest length does not fit
    /// the ledger's algorithm, are rejected without touching the file.
    pub fn append(&mut self, record: &HashRecord) -> Result<()> {
        let found = if record.algorithm != self.algorithm {
            Some(record.algorithm.to_string())
        } else if record.digest.len() != self.algorithm.hex_len() {
            Some(format!("a {}-character digest", record.digest.len()))
        } else {
            None
        };

        if let Some(found) = found {
            return Err(Error::AlgorithmMismatch {
                path: record.relative_path.clone(),
                expected: self.algorithm.to_string(),
                found,
            });
        }

        writeln!(self.file, "{}", record.ledger_line())?;
        self.file.flush()?;
        self.records += 1;
        Ok(())
    }
}
