//! `imgest preview` – resolve a template against the system clock.

use imgest_core::config::ImgestConfig;
use imgest_core::template::{self, DocumentContext, RandomTokens, SystemClock, TemplateContext};

pub fn run_preview(
    cfg: &ImgestConfig,
    pattern: &str,
    url: &str,
    alt: &str,
    document: DocumentContext,
    alt_mode: bool,
) {
    let ctx = TemplateContext::build(
        url,
        alt,
        &document,
        &cfg.site_origin,
        &SystemClock,
        &RandomTokens,
    );
    let resolved = if alt_mode {
        template::resolve_alt(pattern, &ctx)
    } else {
        template::resolve_filename(pattern, &ctx)
    };
    println!("{resolved}");
}
