//! Tests for check, preview and assets.

use super::parse;
use crate::cli::commands::check::verdict;
use crate::cli::{CliCommand, IngestOverrides};
use imgest_core::config::IngestConfig;

#[test]
fn cli_parse_check() {
    match parse(&["imgest", "check", "//cdn.example/a.png"]) {
        CliCommand::Check { url, exclude } => {
            assert_eq!(url, "//cdn.example/a.png");
            assert!(exclude.is_empty());
        }
        _ => panic!("expected Check"),
    }
}

#[test]
fn cli_parse_check_with_excludes() {
    match parse(&[
        "imgest",
        "check",
        "https://cdn.example/a.png",
        "--exclude",
        "cdn.example",
        "--exclude",
        "ads.example",
    ]) {
        CliCommand::Check { exclude, .. } => {
            assert_eq!(exclude, vec!["cdn.example", "ads.example"]);
        }
        _ => panic!("expected Check"),
    }
}

#[test]
fn check_verdict_honors_extra_excludes() {
    let overrides = IngestOverrides {
        exclude: vec!["cdn.example".to_string()],
        ..IngestOverrides::default()
    };
    let ingest = overrides.apply(&IngestConfig::default());
    let site = "https://mysite.example";

    assert_eq!(
        verdict(site, &ingest, "https://cdn.example/a.png"),
        "rejected: https://cdn.example/a.png (host cdn.example is excluded)"
    );
    assert_eq!(
        verdict(site, &IngestConfig::default(), "https://cdn.example/a.png"),
        "allowed: https://cdn.example/a.png (allowed)"
    );
}

#[test]
fn cli_parse_preview() {
    match parse(&[
        "imgest",
        "preview",
        "%post_name%-%filename%",
        "--url",
        "https://cdn.example/cat.png",
        "--slug",
        "hello",
    ]) {
        CliCommand::Preview {
            template,
            url,
            alt,
            document,
            alt_mode,
        } => {
            assert_eq!(template, "%post_name%-%filename%");
            assert_eq!(url, "https://cdn.example/cat.png");
            assert_eq!(alt, "");
            assert_eq!(document.slug, "hello");
            assert!(!alt_mode);
        }
        _ => panic!("expected Preview"),
    }
}

#[test]
fn cli_parse_preview_alt_mode() {
    match parse(&["imgest", "preview", "%image_alt%", "--alt", "x", "--alt-mode"]) {
        CliCommand::Preview { alt, alt_mode, .. } => {
            assert_eq!(alt, "x");
            assert!(alt_mode);
        }
        _ => panic!("expected Preview"),
    }
}

#[test]
fn document_args_default_created_to_now() {
    match parse(&["imgest", "preview", "%post_date%", "--post-id", "9"]) {
        CliCommand::Preview { document, .. } => {
            let before = chrono::Utc::now();
            let ctx = document.into_context();
            assert_eq!(ctx.id, 9);
            assert!(ctx.created_at >= before - chrono::Duration::seconds(5));
        }
        _ => panic!("expected Preview"),
    }
}

#[test]
fn cli_parse_assets() {
    assert!(matches!(parse(&["imgest", "assets"]), CliCommand::Assets));
}
