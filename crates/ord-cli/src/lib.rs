//! # ord-cli: The `ord` Command
//!
//! ## Subcommands
//!
//! - `ord fetch`: Fetch an application's documents through its well-known
//!   endpoint, sanitize them, validate them (delegated when a validator is
//!   configured, local otherwise) and print a JSON report.
//! - `ord validate`: Sanitize and locally validate JSON or YAML document
//!   files.
//! - `ord hash`: Print the structural hash of every resource in a document.
//!
//! ## Exit codes
//!
//! ```text
//! 0  success, at most warnings
//! 1  validation errors or failed document fetches
//! 2  operational failure (bad input, unreachable endpoint, config error)
//! ```

pub mod config;
pub mod fetch;
pub mod hash;
pub mod report;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use ord_core::Document;
use ord_validation::GlobalOrdIds;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub const EXIT_OK: u8 = 0;
pub const EXIT_FINDINGS: u8 = 1;
pub const EXIT_FAILURE: u8 = 2;

/// Read a JSON or YAML file into a JSON value.
///
/// Files ending in `.json` are parsed as JSON, everything else as YAML.
pub fn load_value(path: &Path) -> Result<Value> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let is_json = path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(&content).with_context(|| format!("failed to parse JSON in {}", path.display()))
    } else {
        serde_yaml::from_str(&content).with_context(|| format!("failed to parse YAML in {}", path.display()))
    }
}

pub fn load_as<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let value = load_value(path)?;
    serde_json::from_value(value).with_context(|| format!("unexpected content in {}", path.display()))
}

pub fn load_document(path: &Path) -> Result<Document> {
    load_as(path)
}

/// A JSON or YAML list of ORD IDs published by the global registry.
pub fn load_global_ids(path: &Path) -> Result<GlobalOrdIds> {
    let ids: Vec<String> = load_as(path)?;
    Ok(ids.into_iter().collect())
}
