//! imgest core: policy-gated ingestion of remote images into a date-partitioned,
//! de-duplicating upload tree.

pub mod config;
pub mod logging;

pub mod checksum;
pub mod fetch;
pub mod ingest;
pub mod policy;
pub mod registry;
pub mod store;
pub mod template;
pub mod url_model;
pub mod variant;

pub use ingest::{
    Ingester, IngestionError, IngestionRequest, IngestionResult, Registration, Site,
};
