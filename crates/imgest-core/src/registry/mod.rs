//! Asset registry port.
//!
//! The registry is the system of record that indexes finished files. The
//! pipeline only hands it a record and accepts an opaque identifier back; a
//! failure here never rolls back the stored file.

mod db;

pub use db::{AssetDb, AssetRow, SqliteRegistry};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// What the pipeline hands to the registry for one stored file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub path: PathBuf,
    pub url: String,
    pub mime: String,
    pub title: String,
    pub alt_text: String,
    /// Identifier of the document the asset was ingested for.
    pub parent_id: u64,
    pub source_url: String,
}

/// Opaque registry identifier.
pub type RegistrationId = String;

#[derive(Debug, Error)]
#[error("asset registration failed: {0}")]
pub struct RegistryError(pub String);

/// Indexes stored files.
pub trait AssetRegistry: Send + Sync {
    fn register(&self, record: &AssetRecord) -> Result<RegistrationId, RegistryError>;
}

/// Registry that accepts nothing; every ingestion ends unregistered.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRegistry;

impl AssetRegistry for NoRegistry {
    fn register(&self, _record: &AssetRecord) -> Result<RegistrationId, RegistryError> {
        Err(RegistryError("no registry configured".to_string()))
    }
}
