//! # Error Types
//!
//! Infrastructure failures raised by `ord-core`. Validation findings are not
//! errors; see [`crate::validation::ValidationError`].

use thiserror::Error;

/// Top-level error type for the core crate.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Structural hashing failed.
    #[error("hash error: {0}")]
    Hash(#[from] HashError),

    /// An ORD identifier did not have the `<namespace>:<kind>:<local>:<suffix>` shape.
    #[error("invalid ORD identifier {0:?}")]
    InvalidOrdId(String),

    /// A version string is not a valid semantic version.
    #[error("invalid semantic version {0:?}")]
    InvalidVersion(String),

    /// A semi-structured field had an unexpected JSON shape.
    #[error("field {field} {reason}")]
    UnexpectedShape {
        /// Field name as it appears in the document.
        field: &'static str,
        /// What was wrong with it.
        reason: &'static str,
    },
}

/// Error during structural hash computation.
#[derive(Error, Debug)]
pub enum HashError {
    /// The resource could not be converted to a JSON value.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
