//! Tracing setup for the `imgest` binary.
//!
//! Events go to `$XDG_STATE_HOME/imgest/imgest.log` when that file can be
//! opened, otherwise to stderr. `RUST_LOG` overrides [`DEFAULT_FILTER`].

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Used when `RUST_LOG` is unset or unparseable.
pub const DEFAULT_FILTER: &str = "info,imgest=debug,imgest_core=debug";

/// Where log events end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    File(PathBuf),
    Stderr,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// `imgest.log` under the XDG state dir, creating the directory.
pub fn default_log_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("imgest")?;
    xdg_dirs
        .place_state_file("imgest.log")
        .context("create imgest state directory")
}

fn open_log_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))
}

/// Log to the XDG log file. Errors leave the global subscriber unset so the
/// caller can still fall back to [`init_logging_stderr`].
pub fn init_logging() -> Result<PathBuf> {
    let path = default_log_path()?;
    let file = open_log_file(&path)?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    tracing::info!("imgest logging initialized at {}", path.display());
    Ok(path)
}

pub fn init_logging_stderr() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

/// File logging if possible, stderr otherwise.
pub fn init() -> LogTarget {
    match init_logging() {
        Ok(path) => LogTarget::File(path),
        Err(e) => {
            init_logging_stderr();
            tracing::warn!("file logging unavailable, using stderr: {e:#}");
            LogTarget::Stderr
        }
    }
}
