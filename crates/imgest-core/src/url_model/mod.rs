//! URL modeling: scheme normalization, host extraction, and filename hints.
//!
//! Everything here is pure string/URL work shared by the policy gate, the
//! fetcher, and the template resolver.

mod host;
mod path;
mod sanitize;

pub use host::{host_of, host_of_lenient, normalize_host, origin_of};
pub use path::{file_stem, filename_from_url_path};
pub use sanitize::{sanitize_alt_text, sanitize_filename};

use std::borrow::Cow;

/// Rewrites a protocol-relative URL (`//host/path`) to an explicit `https:` URL.
/// Any other input is returned unchanged.
pub fn normalize_scheme(url: &str) -> Cow<'_, str> {
    let trimmed = url.trim();
    if trimmed.starts_with("//") {
        Cow::Owned(format!("https:{trimmed}"))
    } else {
        Cow::Borrowed(trimmed)
    }
}
