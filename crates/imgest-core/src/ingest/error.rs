//! Ingestion error type.

use thiserror::Error;

use crate::fetch::FetchError;
use crate::policy::PolicyReason;
use crate::store::StoreError;

/// Terminal failure of one ingestion. Registration failures are not errors;
/// they surface as [`Registration::Unregistered`](super::Registration).
#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("{url} not eligible for download: {reason}")]
    PolicyRejected { url: String, reason: PolicyReason },
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
