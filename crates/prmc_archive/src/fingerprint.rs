//! Content fingerprints for incremental collection.
//!
//! The fingerprint is a lowercase hex SHA-256 of the archive bytes. It is
//! computed from a bounded read buffer so multi-hundred-megabyte archives
//! never need to be held in memory, and it depends on nothing but content:
//! renaming or touching a file leaves its fingerprint unchanged.

use std::fs::File;
use std::io::{self, Read};

use camino::Utf8Path;
use sha2::{Digest, Sha256};

use crate::error::Result;

/// Size of each read while hashing.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Hash everything `reader` yields.
pub fn fingerprint_reader<R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Hash the file at `path`.
pub fn fingerprint_file(path: &Utf8Path) -> Result<String> {
    let file = File::open(path.as_std_path())?;
    let hash = fingerprint_reader(file)?;
    tracing::debug!("sha256({}) = {}", path, hash);
    Ok(hash)
}
