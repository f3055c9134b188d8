//! Validation error types.
//!
//! Findings about document content are [`ValidationError`] records. The enums
//! here cover the cases where a stage cannot run at all, plus
//! [`RuleViolations`], the aggregate the local path fails with.

use std::fmt;

use ord_client::ValidationClientError;
use ord_core::{CoreError, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum SanitizeError {
    /// The rewrite base could not be parsed.
    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// A relative URL could not be resolved.
    #[error("cannot resolve {url:?} for {ord_id}: {reason}")]
    UnresolvableUrl {
        ord_id: String,
        url: String,
        reason: String,
    },

    /// A package or resource carried a malformed classification field.
    #[error("cannot merge package attributes into {ord_id}: {source}")]
    Merge {
        ord_id: String,
        #[source]
        source: CoreError,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ValidatorError {
    /// The delegated validator could not be reached or answered badly.
    #[error("delegated validation of document {index} failed: {source}")]
    Delegated {
        index: usize,
        #[source]
        source: ValidationClientError,
    },

    /// Raw sources and documents are not aligned.
    #[error("expected {expected} document sources, got {actual}")]
    SourceCountMismatch { expected: usize, actual: usize },

    /// A raw document source is not valid JSON.
    #[error("document source {index} is not valid JSON: {source}")]
    InvalidSource {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Every error-severity finding of a local validation run.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleViolations {
    pub errors: Vec<ValidationError>,
    /// Warnings found in the same run, kept for reporting.
    pub warnings: Vec<ValidationError>,
}

impl RuleViolations {
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors and warnings together, errors first.
    pub fn all(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().chain(self.warnings.iter())
    }
}

impl fmt::Display for RuleViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rule violation(s)", self.errors.len())?;
        for e in &self.errors {
            write!(f, "\n  {e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for RuleViolations {}
