//! JSON report printed by `fetch` and `validate`.

use std::path::Path;

use anyhow::{Context, Result};
use ord_client::DocumentFetchErrors;
use ord_core::{Document, ValidationError};
use serde::Serialize;

use crate::{EXIT_FINDINGS, EXIT_OK};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchFailure {
    pub url: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub documents: Vec<Document>,
    pub validation_errors: Vec<ValidationError>,
    pub fetch_failures: Vec<FetchFailure>,
}

impl Report {
    pub fn new(documents: Vec<Document>, findings: Vec<ValidationError>) -> Self {
        Self {
            documents,
            validation_errors: dedupe(findings),
            fetch_failures: Vec::new(),
        }
    }

    pub fn with_fetch_failures(mut self, failures: &DocumentFetchErrors) -> Self {
        self.fetch_failures = failures
            .failures()
            .iter()
            .map(|f| FetchFailure {
                url: f.url.clone(),
                error: f.error.to_string(),
            })
            .collect();
        self
    }

    pub fn error_count(&self) -> usize {
        self.validation_errors.iter().filter(|f| f.is_error()).count()
    }

    pub fn exit_code(&self) -> u8 {
        if self.error_count() > 0 || !self.fetch_failures.is_empty() {
            EXIT_FINDINGS
        } else {
            EXIT_OK
        }
    }

    /// Pretty JSON to `output`, or to stdout when no path is given.
    pub fn write(&self, output: Option<&Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        match output {
            Some(path) => {
                std::fs::write(path, json + "\n").with_context(|| format!("failed to write {}", path.display()))?
            }
            None => println!("{json}"),
        }
        Ok(())
    }
}

/// Drop repeated findings, keeping the first occurrence of each.
///
/// Sanitizer and validator may both report the same unresolved reference.
pub fn dedupe(findings: Vec<ValidationError>) -> Vec<ValidationError> {
    let mut unique: Vec<ValidationError> = Vec::with_capacity(findings.len());
    for finding in findings {
        if !unique.contains(&finding) {
            unique.push(finding);
        }
    }
    unique
}
