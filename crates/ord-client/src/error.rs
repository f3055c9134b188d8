//! Client error types.

use std::fmt;

use crate::config::ConfigError;
use crate::well_known::WellKnownError;

/// Errors from fetching ORD configuration and documents.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The webhook needs a tenant header but the request carries no tenant.
    #[error("tenant is required for application template webhooks of resource {resource_id}")]
    MissingTenant { resource_id: String },

    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },

    /// The remote side answered with a status other than 200.
    #[error("{endpoint} returned {status}: {body}")]
    ApiError {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The response body exceeded the size cap.
    #[error("response from {endpoint} exceeds {limit} bytes")]
    BodyTooLarge { endpoint: String, limit: usize },

    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: serde_json::Error,
    },

    /// A URL could not be parsed or joined.
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// A configured header name or value is not valid HTTP.
    #[error("invalid header {name:?}: {reason}")]
    InvalidHeader { name: String, reason: String },

    /// A fetch task ended without producing a result.
    #[error("fetch task failed: {0}")]
    TaskFailed(String),

    /// The well-known configuration is structurally invalid.
    #[error("invalid well-known configuration: {0}")]
    InvalidConfig(#[from] WellKnownError),

    /// No executor is available for the requested access strategy.
    #[error(transparent)]
    AccessStrategy(#[from] AccessStrategyError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Failure to resolve an access strategy executor.
#[derive(Debug, thiserror::Error)]
pub enum AccessStrategyError {
    #[error("access strategy {0:?} is not supported")]
    NotFound(String),
}

/// Errors from the delegated validator.
#[derive(Debug, thiserror::Error)]
pub enum ValidationClientError {
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    #[error("validator {endpoint} returned {status}: {body}")]
    ApiError {
        endpoint: String,
        status: u16,
        body: String,
    },
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    #[error("invalid validator URL: {0}")]
    InvalidUrl(String),
    #[error("failed to serialize document: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// One document that could not be fetched.
#[derive(Debug)]
pub struct DocumentFetchFailure {
    pub url: String,
    pub error: FetchError,
}

impl fmt::Display for DocumentFetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error fetching ORD document from {}: {}", self.url, self.error)
    }
}

/// Every per-document failure of one fetch run, reported together.
///
/// Displays one line per failure.
#[derive(Debug, Default)]
pub struct DocumentFetchErrors(pub Vec<DocumentFetchFailure>);

impl DocumentFetchErrors {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn failures(&self) -> &[DocumentFetchFailure] {
        &self.0
    }
}

impl fmt::Display for DocumentFetchErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}

impl std::error::Error for DocumentFetchErrors {}
