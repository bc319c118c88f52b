//! libcurl-backed [`HttpTransport`].

use std::cell::{Cell, RefCell};
use std::time::Duration;

use super::error::TransportError;
use super::transport::{HttpResponse, HttpTransport};
use crate::config::FetchConfig;

const USER_AGENT: &str = concat!("imgest/", env!("CARGO_PKG_VERSION"));

/// Single-attempt GET via the curl easy interface.
#[derive(Debug, Clone)]
pub struct CurlTransport {
    timeout: Duration,
    max_redirects: u32,
    max_body_bytes: u64,
}

impl CurlTransport {
    pub fn new(cfg: &FetchConfig) -> Self {
        Self {
            timeout: Duration::from_secs(cfg.timeout_secs.max(1)),
            max_redirects: cfg.max_redirects,
            max_body_bytes: cfg.max_body_bytes,
        }
    }

    fn perform(&self, url: &str, accept: &str) -> Result<HttpResponse, TransportError> {
        let body = RefCell::new(Vec::new());
        let too_large = Cell::new(false);
        let limit = self.max_body_bytes;

        let mut easy = curl::easy::Easy::new();
        easy.url(url).map_err(classify_curl_error)?;
        easy.get(true).map_err(classify_curl_error)?;
        easy.follow_location(self.max_redirects > 0)
            .map_err(classify_curl_error)?;
        easy.max_redirections(self.max_redirects)
            .map_err(classify_curl_error)?;
        easy.connect_timeout(self.timeout)
            .map_err(classify_curl_error)?;
        easy.timeout(self.timeout).map_err(classify_curl_error)?;
        easy.useragent(USER_AGENT).map_err(classify_curl_error)?;

        let mut list = curl::easy::List::new();
        list.append(&format!("Accept: {accept}"))
            .map_err(classify_curl_error)?;
        easy.http_headers(list).map_err(classify_curl_error)?;

        let performed = {
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| {
                    let mut buf = body.borrow_mut();
                    if (buf.len() + data.len()) as u64 > limit {
                        too_large.set(true);
                        return Ok(0); // abort transfer
                    }
                    buf.extend_from_slice(data);
                    Ok(data.len())
                })
                .map_err(classify_curl_error)?;
            transfer.perform()
        };

        if too_large.get() {
            return Err(TransportError::TooLarge { limit });
        }
        if let Err(e) = performed {
            if e.is_too_many_redirects() {
                return Err(TransportError::TooManyRedirects {
                    limit: self.max_redirects,
                });
            }
            return Err(classify_curl_error(e));
        }

        let status = easy.response_code().map_err(classify_curl_error)?;
        Ok(HttpResponse {
            status,
            body: body.into_inner(),
        })
    }
}

impl HttpTransport for CurlTransport {
    fn get(&self, url: &str, accept: &str) -> Result<HttpResponse, TransportError> {
        tracing::debug!(url, timeout_secs = self.timeout.as_secs(), "GET");
        self.perform(url, accept)
    }
}

/// Map a curl error onto the transport taxonomy.
pub(crate) fn classify_curl_error(e: curl::Error) -> TransportError {
    if e.is_operation_timedout() {
        return TransportError::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_ssl_connect_error()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
    {
        return TransportError::Connection(e.to_string());
    }
    TransportError::Other(e.to_string())
}
