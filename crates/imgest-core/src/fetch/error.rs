//! Fetch error types.

use thiserror::Error;

/// Network-level failure reported by an [`HttpTransport`](super::HttpTransport).
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("timed out")]
    Timeout,
    /// DNS, connect, TLS, or mid-transfer connection failure.
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("more than {limit} redirects")]
    TooManyRedirects { limit: u32 },
    #[error("response body exceeds {limit} bytes")]
    TooLarge { limit: u64 },
    #[error("{0}")]
    Other(String),
}

/// Why a fetch produced no usable payload. None of these are retried.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("fetching {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: TransportError,
    },
    #[error("{url} returned HTTP {status}")]
    HttpStatus { url: String, status: u32 },
    #[error("{url} returned an empty body")]
    EmptyBody { url: String },
    #[error("{url} is not an image")]
    NotAnImage { url: String },
    #[error("scratch file: {0}")]
    Scratch(#[from] std::io::Error),
}
