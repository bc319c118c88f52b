//! Filesystem port and its local-disk implementation.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::checksum;

/// Result of a no-clobber write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// Something already occupies the path; nothing was written.
    AlreadyExists,
}

/// Storage operations the content store and variant processor need.
pub trait StoragePort: Send + Sync {
    /// Create `dir` and any missing parents.
    fn ensure_dir(&self, dir: &Path) -> io::Result<()>;
    fn exists(&self, path: &Path) -> bool;
    /// SHA-256 (lowercase hex) of the file at `path`.
    fn digest(&self, path: &Path) -> io::Result<String>;
    /// Write `bytes` to `path` only if nothing exists there. The file appears
    /// fully written or not at all.
    fn write_new(&self, path: &Path, bytes: &[u8]) -> io::Result<WriteOutcome>;
    fn is_readable(&self, path: &Path) -> bool;
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// [`StoragePort`] over the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl StoragePort for LocalFs {
    fn ensure_dir(&self, dir: &Path) -> io::Result<()> {
        fs::create_dir_all(dir)?;
        if fs::metadata(dir)?.is_dir() {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::Other,
                format!("{} is not a directory", dir.display()),
            ))
        }
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn digest(&self, path: &Path) -> io::Result<String> {
        checksum::sha256_file(path)
    }

    fn write_new(&self, path: &Path, bytes: &[u8]) -> io::Result<WriteOutcome> {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::Builder::new()
            .prefix(".imgest-")
            .suffix(".part")
            .tempfile_in(dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        match tmp.persist_noclobber(path) {
            Ok(_) => Ok(WriteOutcome::Written),
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                Ok(WriteOutcome::AlreadyExists)
            }
            Err(e) => Err(e.error),
        }
    }

    fn is_readable(&self, path: &Path) -> bool {
        fs::File::open(path)
            .and_then(|f| f.metadata())
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }
}
