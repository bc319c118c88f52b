//! Placeholder templates for filenames and alt text.
//!
//! Templates contain `%token%` placeholders replaced with values from a
//! [`TemplateContext`]. Substitution is a single left-to-right pass: resolved
//! values are never rescanned, and unknown tokens are copied through as-is.

mod context;
mod source;

pub use context::{DocumentContext, TemplateContext};
pub use source::{Clock, FixedClock, RandomTokens, SystemClock, TokenSource};

use crate::url_model::{sanitize_alt_text, sanitize_filename};

/// Expands every known placeholder in `template`.
pub fn resolve(template: &str, ctx: &TemplateContext) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(idx) = rest.find('%') {
        out.push_str(&rest[..idx]);
        rest = &rest[idx..];
        match ctx.match_at(rest) {
            Some((token, value)) => {
                out.push_str(value);
                rest = &rest[token.len()..];
            }
            None => {
                out.push('%');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Resolves a filename template to a sanitized, never-empty base name
/// (no extension).
pub fn resolve_filename(template: &str, ctx: &TemplateContext) -> String {
    let name = sanitize_filename(&resolve(template, ctx));
    if name.is_empty() {
        tracing::debug!(template, "filename template resolved empty, using fallback token");
        ctx.fallback().to_string()
    } else {
        name
    }
}

/// Resolves an alt-text template and sanitizes it for display. May be empty.
pub fn resolve_alt(template: &str, ctx: &TemplateContext) -> String {
    sanitize_alt_text(&resolve(template, ctx))
}
