//! File digests for integrity verification.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use md5::{Digest, Md5};
use sha1::Sha1;

use crate::config::HashAlgorithm;
use crate::error::{Error, Result};

/// Read size per chunk. Keeps memory flat for large videos.
const CHUNK_SIZE: usize = 8192;

/// Compute the lowercase hex digest of a file.
pub fn hash_file(path: &Path, algorithm: HashAlgorithm) -> Result<String> {
    match algorithm {
        HashAlgorithm::Md5 => hash_with(Md5::new(), path),
        HashAlgorithm::Sha1 => hash_with(Sha1::new(), path),
    }
}

fn hash_with<D: Digest>(mut hasher: D, path: &Path) -> Result<String> {
    let unreadable = |source| Error::FileUnreadable {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(unreadable)?;
    let mut buffer = [0u8; CHUNK_SIZE];

    loop {
        let bytes_read = file.read(&mut buffer).map_err(unreadable)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}
