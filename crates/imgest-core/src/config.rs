use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Network parameters for the single GET per ingestion (optional `[fetch]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
    /// Redirect hops followed before giving up (0 disables following).
    pub max_redirects: u32,
    /// Bodies larger than this abort the transfer.
    pub max_body_bytes: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_redirects: 5,
            max_body_bytes: 32 * 1024 * 1024,
        }
    }
}

/// Per-call ingestion settings. A snapshot of this is passed into every
/// ingestion so concurrent calls may use different settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Newline-delimited hosts that are never fetched.
    pub excluded_domains: String,
    /// Resize bound in pixels; 0 leaves the axis unconstrained.
    pub max_width: u32,
    pub max_height: u32,
    pub filename_template: String,
    pub alt_template: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            excluded_domains: String::new(),
            max_width: 0,
            max_height: 0,
            filename_template: "%filename%".to_string(),
            alt_template: "%image_alt%".to_string(),
        }
    }
}

/// Global configuration loaded from `~/.config/imgest/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImgestConfig {
    /// The site's own origin; images hosted here are never re-downloaded.
    pub site_origin: String,
    /// Root of the date-partitioned upload tree.
    pub upload_root: PathBuf,
    /// Public URL that `upload_root` is served under.
    pub base_url: String,
    /// Where fetched bodies are spooled (system temp dir when unset).
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
}

impl Default for ImgestConfig {
    fn default() -> Self {
        let upload_root = xdg::BaseDirectories::with_prefix("imgest")
            .map(|dirs| dirs.get_data_home().join("uploads"))
            .unwrap_or_else(|_| PathBuf::from("uploads"));
        Self {
            site_origin: "http://localhost".to_string(),
            upload_root,
            base_url: "http://localhost/uploads".to_string(),
            scratch_dir: None,
            fetch: FetchConfig::default(),
            ingest: IngestConfig::default(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("imgest")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ImgestConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ImgestConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: ImgestConfig = toml::from_str(&data)?;
    Ok(cfg)
}
