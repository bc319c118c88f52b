//! Host and origin extraction.

use super::normalize_scheme;

/// Returns the lowercased host of `url`, or `None` if the URL cannot be parsed
/// or carries no host. Protocol-relative URLs are treated as `https:`.
pub fn host_of(url: &str) -> Option<String> {
    let parsed = url::Url::parse(&normalize_scheme(url)).ok()?;
    let host = parsed.host_str()?;
    if host.is_empty() {
        return None;
    }
    Some(host.to_ascii_lowercase())
}

/// Like [`host_of`], but a bare `host[:port][/path]` without a scheme is read
/// as `https://host`. Used for configured values (site origin, exclusion
/// entries) so they normalize exactly like fetched URLs: IDN hosts become
/// punycode and ports are dropped.
pub fn host_of_lenient(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if value.contains("://") || value.starts_with("//") {
        host_of(value)
    } else {
        host_of(&format!("https://{value}"))
    }
}

/// Lowercases `host` and strips one leading `www.` label.
pub fn normalize_host(host: &str) -> String {
    let lower = host.trim().trim_end_matches('.').to_ascii_lowercase();
    match lower.strip_prefix("www.") {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => lower,
    }
}

/// Scheme + host (+ explicit non-default port) of `url`, `www` preserved.
pub fn origin_of(url: &str) -> Option<String> {
    let parsed = url::Url::parse(&normalize_scheme(url)).ok()?;
    let host = parsed.host_str()?;
    Some(match parsed.port() {
        Some(port) => format!("{}://{}:{}", parsed.scheme(), host, port),
        None => format!("{}://{}", parsed.scheme(), host),
    })
}
