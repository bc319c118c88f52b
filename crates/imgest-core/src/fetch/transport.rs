//! The network port used by the fetcher.

use super::error::TransportError;

/// Status and body of a completed GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status of the final response (after redirects).
    pub status: u32,
    pub body: Vec<u8>,
}

/// Performs one blocking GET. Implementations own timeout and redirect
/// handling and must not retry.
pub trait HttpTransport: Send + Sync {
    fn get(&self, url: &str, accept: &str) -> Result<HttpResponse, TransportError>;
}
