//! # Well-Known Configuration
//!
//! The `/.well-known/open-resource-discovery` payload lists the ORD documents
//! an application exposes. It is validated in two steps before any document
//! is fetched:
//!
//! 1. Structure, against the embedded Draft 2020-12 schema
//!    (`schemas/well-known.schema.json`).
//! 2. The cross-field rule: a relative document URL needs a base URL.
//!
//! Both steps fail fast with every violation found, not just the first.

use std::fmt;
use std::sync::LazyLock;

use jsonschema::Validator;
use ord_core::{AccessStrategy, Perspective};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const WELL_KNOWN_SCHEMA: &str = include_str!("../schemas/well-known.schema.json");

static SCHEMA_VALIDATOR: LazyLock<Result<Validator, String>> = LazyLock::new(|| {
    let schema: Value = serde_json::from_str(WELL_KNOWN_SCHEMA).map_err(|e| e.to_string())?;
    let mut opts = jsonschema::options();
    opts.with_draft(jsonschema::Draft::Draft202012);
    opts.build(&schema).map_err(|e| e.to_string())
});

// -- Model --------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WellKnownConfig {
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(rename = "openResourceDiscoveryV1")]
    pub open_resource_discovery_v1: OrdV1,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrdV1 {
    pub documents: Vec<DocumentDescriptor>,
}

/// Where one ORD document lives and how to fetch it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentDescriptor {
    pub url: String,
    pub system_instance_aware: bool,
    pub access_strategies: Vec<AccessStrategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perspective: Option<String>,
}

impl DocumentDescriptor {
    pub fn perspective(&self) -> Perspective {
        Perspective::from_descriptor(self.perspective.as_deref())
    }

    pub fn is_absolute(&self) -> bool {
        is_absolute_url(&self.url)
    }
}

pub(crate) fn is_absolute_url(raw: &str) -> bool {
    url::Url::parse(raw).is_ok_and(|u| u.has_host())
}

impl WellKnownConfig {
    /// Parse and validate a raw well-known payload.
    ///
    /// `effective_base_url` is the base URL the fetcher will join relative
    /// document URLs onto (the config's own `baseUrl` or one derived from the
    /// webhook). It may be empty.
    pub fn from_value(raw: &Value, effective_base_url: &str) -> Result<Self, WellKnownError> {
        validate_schema(raw)?;
        let config: Self = serde_json::from_value(raw.clone()).map_err(WellKnownError::Shape)?;
        config.validate_cross_fields(effective_base_url)?;
        Ok(config)
    }

    pub fn documents(&self) -> &[DocumentDescriptor] {
        &self.open_resource_discovery_v1.documents
    }

    /// Configured base URL, treating an empty string as absent.
    pub fn declared_base_url(&self) -> Option<&str> {
        self.base_url.as_deref().filter(|b| !b.is_empty())
    }

    fn validate_cross_fields(&self, effective_base_url: &str) -> Result<(), WellKnownError> {
        if !effective_base_url.is_empty() {
            return Ok(());
        }
        let violations: Vec<Violation> = self
            .documents()
            .iter()
            .enumerate()
            .filter(|(_, d)| !d.is_absolute())
            .map(|(i, d)| Violation {
                instance_path: format!("/openResourceDiscoveryV1/documents/{i}/url"),
                message: format!("relative document URL {:?} requires a base URL", d.url),
            })
            .collect();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(WellKnownError::Invalid(Violations(violations)))
        }
    }
}

fn validate_schema(raw: &Value) -> Result<(), WellKnownError> {
    let validator = SCHEMA_VALIDATOR
        .as_ref()
        .map_err(|e| WellKnownError::Schema(e.clone()))?;
    let violations: Vec<Violation> = validator
        .iter_errors(raw)
        .map(|e| Violation {
            instance_path: e.instance_path.to_string(),
            message: e.to_string(),
        })
        .collect();
    if violations.is_empty() {
        Ok(())
    } else {
        Err(WellKnownError::Invalid(Violations(violations)))
    }
}

// -- Errors -------------------------------------------------------------------

/// One structural problem in a well-known configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub instance_path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.instance_path, self.message)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violations(pub Vec<Violation>);

impl Violations {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.0.iter()
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WellKnownError {
    #[error("{0}")]
    Invalid(Violations),
    #[error("unexpected shape: {0}")]
    Shape(#[source] serde_json::Error),
    #[error("embedded schema failed to compile: {0}")]
    Schema(String),
}
