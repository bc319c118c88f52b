//! CLI for the imgest remote image ingestion pipeline.

mod commands;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use imgest_core::config::{self, IngestConfig};
use imgest_core::registry::AssetDb;
use imgest_core::template::DocumentContext;

use commands::{run_assets, run_check, run_ingest, run_preview, IngestOptions};

/// Top-level CLI for imgest.
#[derive(Debug, Parser)]
#[command(name = "imgest")]
#[command(about = "imgest: copy remote images into a local upload tree", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch remote images and store them under the upload root.
    Ingest {
        /// Image URLs to ingest.
        #[arg(required = true, value_name = "URL")]
        urls: Vec<String>,

        /// Alt text hint (`%image_alt%`).
        #[arg(long, default_value = "")]
        alt: String,

        #[command(flatten)]
        document: DocumentArgs,

        #[command(flatten)]
        overrides: IngestOverrides,

        /// Run up to N ingestions concurrently.
        #[arg(long, default_value = "4", value_name = "N")]
        jobs: usize,

        /// Print one JSON object per URL instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Show whether a URL would be allowed by the download policy.
    Check {
        /// URL to evaluate.
        url: String,

        /// Additional excluded domain (repeatable), as with `ingest`.
        #[arg(long = "exclude", value_name = "DOMAIN")]
        exclude: Vec<String>,
    },

    /// Resolve a filename or alt-text template without fetching anything.
    Preview {
        /// Template, e.g. "%post_name%-%filename%".
        template: String,

        /// Source URL used for `%filename%`.
        #[arg(long, default_value = "")]
        url: String,

        /// Alt text hint (`%image_alt%`).
        #[arg(long, default_value = "")]
        alt: String,

        #[command(flatten)]
        document: DocumentArgs,

        /// Resolve as alt text instead of as a filename.
        #[arg(long)]
        alt_mode: bool,
    },

    /// List registered assets.
    Assets,
}

/// The document an image is ingested for.
#[derive(Debug, Clone, Args)]
pub struct DocumentArgs {
    /// Identifier of the originating document (`%post_id%`).
    #[arg(long, default_value = "0", value_name = "ID")]
    pub post_id: u64,

    /// Slug of the originating document (`%post_name%`).
    #[arg(long, default_value = "")]
    pub slug: String,

    /// Creation time of the document (RFC 3339). Defaults to now.
    #[arg(long, value_name = "RFC3339", value_parser = parse_created)]
    pub created: Option<DateTime<Utc>>,
}

impl DocumentArgs {
    pub fn into_context(self) -> DocumentContext {
        DocumentContext {
            id: self.post_id,
            slug: self.slug,
            created_at: self.created.unwrap_or_else(Utc::now),
        }
    }
}

/// Per-invocation overrides of the `[ingest]` config section.
#[derive(Debug, Clone, Default, Args)]
pub struct IngestOverrides {
    /// Maximum width of the stored image; larger images get a resized variant.
    #[arg(long, value_name = "PX")]
    pub max_width: Option<u32>,

    /// Maximum height of the stored image.
    #[arg(long, value_name = "PX")]
    pub max_height: Option<u32>,

    #[arg(long, value_name = "TEMPLATE")]
    pub filename_template: Option<String>,

    #[arg(long, value_name = "TEMPLATE")]
    pub alt_template: Option<String>,

    /// Additional excluded domain (repeatable).
    #[arg(long = "exclude", value_name = "DOMAIN")]
    pub exclude: Vec<String>,
}

impl IngestOverrides {
    /// The config's ingest snapshot with these flags applied on top.
    pub fn apply(self, base: &IngestConfig) -> IngestConfig {
        let mut cfg = base.clone();
        if let Some(w) = self.max_width {
            cfg.max_width = w;
        }
        if let Some(h) = self.max_height {
            cfg.max_height = h;
        }
        if let Some(t) = self.filename_template {
            cfg.filename_template = t;
        }
        if let Some(t) = self.alt_template {
            cfg.alt_template = t;
        }
        for domain in self.exclude {
            if !cfg.excluded_domains.is_empty() && !cfg.excluded_domains.ends_with('\n') {
                cfg.excluded_domains.push('\n');
            }
            cfg.excluded_domains.push_str(domain.trim());
            cfg.excluded_domains.push('\n');
        }
        cfg
    }
}

fn parse_created(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("invalid RFC 3339 timestamp {s:?}: {e}"))
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Ingest {
                urls,
                alt,
                document,
                overrides,
                jobs,
                json,
            } => {
                let db = AssetDb::open_default().await?;
                let opts = IngestOptions {
                    alt,
                    document: document.into_context(),
                    config: overrides.apply(&cfg.ingest),
                    jobs,
                    json,
                };
                run_ingest(&cfg, db, urls, opts).await?;
            }
            CliCommand::Check { url, exclude } => {
                let overrides = IngestOverrides {
                    exclude,
                    ..IngestOverrides::default()
                };
                run_check(&cfg.site_origin, &overrides.apply(&cfg.ingest), &url);
            }
            CliCommand::Preview {
                template,
                url,
                alt,
                document,
                alt_mode,
            } => run_preview(&cfg, &template, &url, &alt, document.into_context(), alt_mode),
            CliCommand::Assets => {
                let db = AssetDb::open_default().await?;
                run_assets(&db).await?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
