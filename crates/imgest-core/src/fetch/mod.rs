//! Remote image retrieval and validation.
//!
//! One GET per request through an injected [`HttpTransport`]. The body is
//! spooled to a scratch file and its type is sniffed from the bytes; anything
//! that is not an image is rejected. The scratch file is owned by the returned
//! [`FetchedPayload`] and deleted when the payload is dropped, so every exit
//! path releases it.

mod curl_transport;
mod error;
mod sniff;
mod transport;

pub use curl_transport::CurlTransport;
pub use error::{FetchError, TransportError};
pub use sniff::sniff_image_mime;
pub use transport::{HttpResponse, HttpTransport};

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::url_model::normalize_scheme;

/// `Accept` header sent with every fetch.
pub const ACCEPT_IMAGES: &str = "image/*";

/// A validated image body plus the scratch file it was spooled to.
#[derive(Debug)]
pub struct FetchedPayload {
    bytes: Vec<u8>,
    mime: &'static str,
    scratch: NamedTempFile,
}

impl FetchedPayload {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Sniffed MIME type, always `image/*`.
    pub fn mime(&self) -> &'static str {
        self.mime
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn scratch_path(&self) -> &Path {
        self.scratch.path()
    }

    /// Delete the scratch file now. Dropping the payload does the same but
    /// swallows the error; this reports it.
    pub fn release(self) {
        let path = self.scratch.path().to_path_buf();
        if let Err(e) = self.scratch.close() {
            tracing::warn!(path = %path.display(), "failed to remove scratch file: {e}");
        }
    }
}

/// Fetches images through a transport, spooling bodies into `scratch_dir`
/// (system temp dir when `None`).
pub struct Fetcher<'a> {
    transport: &'a dyn HttpTransport,
    scratch_dir: Option<PathBuf>,
}

impl<'a> Fetcher<'a> {
    pub fn new(transport: &'a dyn HttpTransport, scratch_dir: Option<PathBuf>) -> Self {
        Self {
            transport,
            scratch_dir,
        }
    }

    /// Retrieve `url` and validate that it is an image.
    pub fn fetch(&self, url: &str) -> Result<FetchedPayload, FetchError> {
        let url = normalize_scheme(url);
        let url = url.as_ref();

        let response = self
            .transport
            .get(url, ACCEPT_IMAGES)
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        if response.status != 200 {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: response.status,
            });
        }
        if response.body.is_empty() {
            return Err(FetchError::EmptyBody {
                url: url.to_string(),
            });
        }

        let scratch = self.spool(&response.body)?;
        let Some(mime) = sniff_image_mime(&response.body) else {
            // Dropping `scratch` removes it.
            drop(scratch);
            return Err(FetchError::NotAnImage {
                url: url.to_string(),
            });
        };

        tracing::debug!(url, mime, bytes = response.body.len(), "fetched image");
        Ok(FetchedPayload {
            bytes: response.body,
            mime,
            scratch,
        })
    }

    fn spool(&self, body: &[u8]) -> std::io::Result<NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("imgest-").suffix(".tmp");
        let mut file = match &self.scratch_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(body)?;
        file.flush()?;
        Ok(file)
    }
}
