//! Error types for storage and reconciliation.

use ord_client::{DocumentFetchErrors, FetchError};
use ord_validation::RuleViolations;
use uuid::Uuid;

/// Failures of the storage collaborator.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: Uuid },

    /// Another transaction committed since this one began.
    #[error("transaction conflict: registry changed since revision {expected}")]
    Conflict { expected: u64 },

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Failures of a sync or list run.
///
/// Every variant means the surrounding transaction was rolled back.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("fetching global registry documents failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("{count} global registry document(s) could not be fetched:\n{errors}", count = .0.len(), errors = .0)]
    Documents(DocumentFetchErrors),

    #[error("global registry supports only vendors and products")]
    UnsupportedResources,

    #[error("global registry documents are invalid: {0}")]
    Validation(#[from] RuleViolations),

    #[error(transparent)]
    Store(#[from] StoreError),
}
