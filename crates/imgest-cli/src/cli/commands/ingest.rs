//! `imgest ingest` – fetch and store one or more remote images.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use imgest_core::config::{ImgestConfig, IngestConfig};
use imgest_core::fetch::CurlTransport;
use imgest_core::registry::{AssetDb, SqliteRegistry};
use imgest_core::store::LocalFs;
use imgest_core::template::DocumentContext;
use imgest_core::{Ingester, IngestionRequest, IngestionResult, Site};
use serde::Serialize;
use tokio::sync::Semaphore;

/// Everything `ingest` needs besides the URLs.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub alt: String,
    pub document: DocumentContext,
    pub config: IngestConfig,
    pub jobs: usize,
    pub json: bool,
}

/// One line of `--json` output.
#[derive(Debug, Serialize)]
struct JsonLine<'a> {
    source: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'a IngestionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub async fn run_ingest(
    cfg: &ImgestConfig,
    db: AssetDb,
    urls: Vec<String>,
    opts: IngestOptions,
) -> Result<()> {
    let registry = SqliteRegistry::new(db, tokio::runtime::Handle::current());
    let ingester = Ingester::new(
        Site::from_config(cfg),
        Arc::new(CurlTransport::new(&cfg.fetch)),
        Arc::new(LocalFs),
        Arc::new(registry),
    );

    // Ingest and registry calls block; each runs on its own blocking thread.
    let permits = Arc::new(Semaphore::new(opts.jobs.max(1)));
    let mut handles = Vec::with_capacity(urls.len());
    for url in &urls {
        let permit = Arc::clone(&permits)
            .acquire_owned()
            .await
            .context("ingest worker pool closed")?;
        let ingester = ingester.clone();
        let req = IngestionRequest {
            url: url.clone(),
            alt_hint: opts.alt.clone(),
            document: opts.document.clone(),
            config: opts.config.clone(),
        };
        handles.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            ingester.ingest(&req)
        }));
    }

    let mut failed = 0usize;
    for (url, handle) in urls.iter().zip(handles) {
        let outcome = handle.await.context("ingest task panicked")?;
        match &outcome {
            Ok(_) => {}
            Err(e) => {
                failed += 1;
                tracing::warn!(url = %url, "ingest failed: {e}");
            }
        }
        if opts.json {
            let line = JsonLine {
                source: url,
                result: outcome.as_ref().ok(),
                error: outcome.as_ref().err().map(|e| e.to_string()),
            };
            println!("{}", serde_json::to_string(&line)?);
        } else {
            match outcome {
                Ok(r) => {
                    let registered = r.registration.id().unwrap_or("unregistered");
                    println!("{} -> {} [{}]", url, r.url, registered);
                }
                Err(e) => println!("{} failed: {}", url, e),
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} ingestions failed", failed, urls.len());
    }
    Ok(())
}
