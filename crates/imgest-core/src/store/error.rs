//! Content store error types.

use std::path::PathBuf;
use thiserror::Error;

/// Why a payload could not be persisted. The scratch file is released in
/// every case.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("upload directory {} unavailable: {source}", path.display())]
    DirectoryUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("writing {} failed: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Every counter-prefixed candidate was taken by different content.
    #[error("no free name for {base} after {attempts} candidates")]
    NameExhausted { base: String, attempts: u32 },
}
