//! Hashing module.
//!
//! Provides:
//! - Chunked MD5/SHA1 file digests
//! - The append-only hash ledger

pub mod digest;
pub mod ledger;

pub use digest::hash_file;
pub use ledger::{HashLedger, HashRecord};
