//! Validation findings.
//!
//! A `ValidationError` is a record returned as data. `error` severity causes
//! excision of the named resource; `warning` never does.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Resource references an ID that does not exist in the batch or the global registry.
pub const UNKNOWN_REFERENCE: &str = "sap-ord-unknown-reference";
/// An ORD ID appears more than once within a duplicate-detection partition.
pub const DUPLICATE_RESOURCE: &str = "sap-ord-duplicate-resource";
/// No base URL from the well-known config, static config, or described system instance.
pub const NO_BASE_URL: &str = "sap-ord-no-base-url";
/// Described system instance base URL differs from the computed one.
pub const BASE_URL_MISMATCH: &str = "sap-ord-base-url-mismatch";
/// Content changed but the version was not raised.
pub const VERSION_NOT_INCREMENTED: &str = "sap-ord-version-not-incremented";
/// A field-level rule failed.
pub const INVALID_FIELD: &str = "sap-ord-invalid-field";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
            Self::Warning => f.write_str("warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    /// Empty when the finding is about the document as a whole.
    pub ord_id: String,
    pub severity: Severity,
    #[serde(rename = "type")]
    pub error_type: String,
    pub description: String,
}

impl ValidationError {
    pub fn error(ord_id: impl Into<String>, code: &str, description: impl Into<String>) -> Self {
        Self {
            ord_id: ord_id.into(),
            severity: Severity::Error,
            error_type: code.to_string(),
            description: description.into(),
        }
    }

    pub fn warning(ord_id: impl Into<String>, code: &str, description: impl Into<String>) -> Self {
        Self {
            ord_id: ord_id.into(),
            severity: Severity::Warning,
            error_type: code.to_string(),
            description: description.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ord_id.is_empty() {
            write!(f, "[{}] {}: {}", self.severity, self.error_type, self.description)
        } else {
            write!(
                f,
                "[{}] {} ({}): {}",
                self.severity, self.error_type, self.ord_id, self.description
            )
        }
    }
}
