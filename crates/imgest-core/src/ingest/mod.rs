//! The ingestion pipeline: policy gate → fetch → store → variant → registry.
//!
//! An [`Ingester`] holds only immutable site settings and shared ports, so one
//! instance can serve concurrent requests from many threads. Each request
//! carries its own [`IngestConfig`] snapshot.

mod error;

pub use error::IngestionError;

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::config::{ImgestConfig, IngestConfig};
use crate::fetch::{Fetcher, HttpTransport};
use crate::policy;
use crate::registry::{AssetRecord, AssetRegistry, RegistrationId};
use crate::store::{ContentStore, Partition, StoragePort};
use crate::template::{
    self, Clock, DocumentContext, RandomTokens, SystemClock, TemplateContext, TokenSource,
};
use crate::variant::VariantProcessor;

/// One attempt to fetch and store a single remote image.
#[derive(Debug, Clone)]
pub struct IngestionRequest {
    pub url: String,
    /// Raw alt text supplied by the caller (`%image_alt%`).
    pub alt_hint: String,
    pub document: DocumentContext,
    pub config: IngestConfig,
}

/// Outcome of handing the stored file to the asset registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "id", rename_all = "lowercase")]
pub enum Registration {
    Registered(RegistrationId),
    Unregistered,
}

impl Registration {
    pub fn id(&self) -> Option<&str> {
        match self {
            Registration::Registered(id) => Some(id.as_str()),
            Registration::Unregistered => None,
        }
    }
}

/// What a successful ingestion reports back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestionResult {
    pub url: String,
    pub path: PathBuf,
    pub relative_path: String,
    pub mime: String,
    pub registration: Registration,
    pub alt_text: String,
}

/// Where and as whom files are stored.
#[derive(Debug, Clone)]
pub struct Site {
    /// The site's own origin, used by the policy gate and `%url%`.
    pub origin: String,
    pub upload_root: PathBuf,
    pub base_url: String,
    pub scratch_dir: Option<PathBuf>,
}

impl Site {
    pub fn from_config(cfg: &ImgestConfig) -> Self {
        Self {
            origin: cfg.site_origin.clone(),
            upload_root: cfg.upload_root.clone(),
            base_url: cfg.base_url.clone(),
            scratch_dir: cfg.scratch_dir.clone(),
        }
    }
}

/// Runs ingestion requests against injected network, storage, and registry ports.
#[derive(Clone)]
pub struct Ingester {
    site: Site,
    transport: Arc<dyn HttpTransport>,
    storage: Arc<dyn StoragePort>,
    registry: Arc<dyn AssetRegistry>,
    clock: Arc<dyn Clock>,
    tokens: Arc<dyn TokenSource>,
}

impl Ingester {
    pub fn new(
        site: Site,
        transport: Arc<dyn HttpTransport>,
        storage: Arc<dyn StoragePort>,
        registry: Arc<dyn AssetRegistry>,
    ) -> Self {
        Self {
            site,
            transport,
            storage,
            registry,
            clock: Arc::new(SystemClock),
            tokens: Arc::new(RandomTokens),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_tokens(mut self, tokens: Arc<dyn TokenSource>) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn site(&self) -> &Site {
        &self.site
    }

    /// Token table for `req`, as used for its filename and alt text.
    pub fn template_context(&self, req: &IngestionRequest) -> TemplateContext {
        TemplateContext::build(
            &req.url,
            &req.alt_hint,
            &req.document,
            &self.site.origin,
            self.clock.as_ref(),
            self.tokens.as_ref(),
        )
    }

    /// Ingest one remote image.
    pub fn ingest(&self, req: &IngestionRequest) -> Result<IngestionResult, IngestionError> {
        let cfg = &req.config;

        let decision = policy::evaluate(&req.url, &self.site.origin, &cfg.excluded_domains);
        if !decision.allowed {
            tracing::debug!(url = %req.url, reason = %decision.reason, "policy rejected");
            return Err(IngestionError::PolicyRejected {
                url: req.url.clone(),
                reason: decision.reason,
            });
        }

        let ctx = self.template_context(req);
        let filename = template::resolve_filename(&cfg.filename_template, &ctx);
        let alt_text = template::resolve_alt(&cfg.alt_template, &ctx);

        let payload = Fetcher::new(self.transport.as_ref(), self.site.scratch_dir.clone())
            .fetch(&req.url)?;

        let store = ContentStore::new(
            self.storage.as_ref(),
            self.site.upload_root.clone(),
            &self.site.base_url,
        );
        let partition = Partition::from_timestamp(req.document.created_at);
        let stored = store.store(payload, partition, &filename)?;
        let stored =
            VariantProcessor::new(&store).maybe_resize(stored, cfg.max_width, cfg.max_height);

        let record = AssetRecord {
            path: stored.path.clone(),
            url: stored.url.clone(),
            mime: stored.mime.clone(),
            title: filename,
            alt_text: alt_text.clone(),
            parent_id: req.document.id,
            source_url: req.url.clone(),
        };
        let registration = match self.registry.register(&record) {
            Ok(id) => {
                tracing::info!(url = %stored.url, id = %id, "registered asset");
                Registration::Registered(id)
            }
            Err(e) => {
                tracing::warn!(url = %stored.url, "stored but not registered: {e}");
                Registration::Unregistered
            }
        };

        Ok(IngestionResult {
            url: stored.url,
            path: stored.path,
            relative_path: stored.relative_path,
            mime: stored.mime,
            registration,
            alt_text,
        })
    }
}

#[cfg(test)]
mod tests;
