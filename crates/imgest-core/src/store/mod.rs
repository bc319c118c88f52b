//! Date-partitioned, de-duplicating content store.
//!
//! Files land at `root/YYYY/MM/<base><ext>`. When that name is taken, the
//! existing file's digest is compared with the payload's: equal content is
//! reused as-is, different content moves on to `1-<base>`, `2-<base>`, and so
//! on. De-duplication is scoped to one logical name; there is no global
//! content index.

mod error;
mod fs;
mod mime;

pub use error::StoreError;
pub use fs::{LocalFs, StoragePort, WriteOutcome};
pub use mime::extension_for_mime;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

use crate::checksum::sha256_bytes;
use crate::fetch::FetchedPayload;

/// Upper bound on counter-prefixed candidates tried for one name.
pub const MAX_NAME_CANDIDATES: u32 = 10_000;

/// Year/month subdirectory of the upload root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    pub year: i32,
    pub month: u32,
}

impl Partition {
    /// Partition for a document creation time (UTC).
    pub fn from_timestamp(at: DateTime<Utc>) -> Self {
        Self {
            year: at.year(),
            month: at.month(),
        }
    }

    /// `YYYY/MM`
    pub fn relative_dir(&self) -> String {
        format!("{:04}/{:02}", self.year, self.month)
    }
}

/// A file persisted under the upload root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredFile {
    /// Absolute path on disk.
    pub path: PathBuf,
    /// Path relative to the upload root, `/`-separated (`2025/11/cat.png`).
    pub relative_path: String,
    pub url: String,
    pub mime: String,
}

/// Persists fetched payloads through a [`StoragePort`].
pub struct ContentStore<'a> {
    storage: &'a dyn StoragePort,
    root: PathBuf,
    base_url: String,
}

impl<'a> ContentStore<'a> {
    pub fn new(storage: &'a dyn StoragePort, root: impl Into<PathBuf>, base_url: &str) -> Self {
        Self {
            storage,
            root: root.into(),
            base_url: base_url.to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist `payload` as `<base><ext>` in `partition`, reusing identical
    /// content already stored under that name. Consumes the payload; its
    /// scratch file is released on every path.
    pub fn store(
        &self,
        payload: FetchedPayload,
        partition: Partition,
        filename_base: &str,
    ) -> Result<StoredFile, StoreError> {
        let result = self.store_bytes(payload.bytes(), payload.mime(), partition, filename_base);
        payload.release();
        result
    }

    fn store_bytes(
        &self,
        bytes: &[u8],
        mime: &str,
        partition: Partition,
        base: &str,
    ) -> Result<StoredFile, StoreError> {
        let rel_dir = partition.relative_dir();
        let dir = self.root.join(&rel_dir);
        self.storage
            .ensure_dir(&dir)
            .map_err(|source| StoreError::DirectoryUnavailable {
                path: dir.clone(),
                source,
            })?;

        let digest = sha256_bytes(bytes);
        let ext = extension_for_mime(mime);

        for attempt in 0..MAX_NAME_CANDIDATES {
            let name = candidate_name(base, ext, attempt);
            let path = dir.join(&name);

            if self.storage.exists(&path) {
                if self.same_content(&path, &digest) {
                    tracing::debug!(path = %path.display(), "identical content already stored");
                    return Ok(self.stored_file(&path, &rel_dir, &name, mime));
                }
                continue;
            }

            match self.storage.write_new(&path, bytes) {
                Ok(WriteOutcome::Written) => {
                    if !self.storage.is_readable(&path) {
                        return Err(StoreError::WriteFailed {
                            path,
                            source: std::io::Error::new(
                                std::io::ErrorKind::NotFound,
                                "file not readable after write",
                            ),
                        });
                    }
                    tracing::info!(path = %path.display(), bytes = bytes.len(), "stored");
                    return Ok(self.stored_file(&path, &rel_dir, &name, mime));
                }
                // Another writer claimed the name between the check and the write.
                Ok(WriteOutcome::AlreadyExists) => {
                    if self.same_content(&path, &digest) {
                        return Ok(self.stored_file(&path, &rel_dir, &name, mime));
                    }
                }
                Err(source) => return Err(StoreError::WriteFailed { path, source }),
            }
        }

        Err(StoreError::NameExhausted {
            base: base.to_string(),
            attempts: MAX_NAME_CANDIDATES,
        })
    }

    fn same_content(&self, path: &Path, digest: &str) -> bool {
        match self.storage.digest(path) {
            Ok(existing) => existing == digest,
            Err(e) => {
                tracing::warn!(path = %path.display(), "cannot hash existing file: {e}");
                false
            }
        }
    }

    fn stored_file(&self, path: &Path, rel_dir: &str, name: &str, mime: &str) -> StoredFile {
        let relative_path = format!("{rel_dir}/{name}");
        StoredFile {
            path: path.to_path_buf(),
            url: public_url(&self.base_url, &relative_path),
            relative_path,
            mime: mime.to_string(),
        }
    }

    /// Build a [`StoredFile`] for a sibling of `original` named `name`.
    pub(crate) fn sibling(&self, original: &StoredFile, name: &str) -> StoredFile {
        let rel_dir = original
            .relative_path
            .rsplit_once('/')
            .map(|(dir, _)| dir)
            .unwrap_or("");
        let path = original
            .path
            .parent()
            .map(|p| p.join(name))
            .unwrap_or_else(|| PathBuf::from(name));
        self.stored_file(&path, rel_dir, name, &original.mime)
    }

    pub(crate) fn storage(&self) -> &dyn StoragePort {
        self.storage
    }
}

/// `<base><ext>` for the first attempt, `<n>-<base><ext>` afterwards.
fn candidate_name(base: &str, ext: &str, attempt: u32) -> String {
    if attempt == 0 {
        format!("{base}{ext}")
    } else {
        format!("{attempt}-{base}{ext}")
    }
}

/// Join `relative` onto `base_url`, percent-encoding as needed.
pub fn public_url(base_url: &str, relative: &str) -> String {
    let base = format!("{}/", base_url.trim_end_matches('/'));
    match url::Url::parse(&base).and_then(|b| b.join(relative)) {
        Ok(u) => u.to_string(),
        Err(_) => format!("{base}{relative}"),
    }
}
