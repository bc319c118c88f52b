//! SHA-256 content digests, lowercase hex.
//!
//! The store compares a payload digest against the file already sitting at a
//! candidate name; both sides go through these helpers so they agree.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Digest everything `reader` yields. Streams through the hasher, so memory
/// stays flat for large files.
pub fn sha256_reader<R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = Sha256::new();
    io::copy(&mut reader, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Digest of the file at `path`. I/O errors keep their original kind.
pub fn sha256_file(path: &Path) -> io::Result<String> {
    sha256_reader(File::open(path)?)
}

pub fn sha256_bytes(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}
