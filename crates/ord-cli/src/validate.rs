//! `ord validate`: sanitize and locally validate document files.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use ord_validation::{DocumentSanitizer, DocumentValidator, GlobalOrdIds, StoredResources};

use crate::report::Report;
use crate::{load_as, load_document, load_global_ids};

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// JSON or YAML ORD documents, validated as one batch.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Base URL relative URLs are resolved against.
    #[arg(long)]
    pub base_url: String,

    /// Persisted versions and hashes (JSON or YAML) for the version gate.
    #[arg(long)]
    pub stored: Option<PathBuf>,

    /// ORD IDs published by the global registry (JSON or YAML list).
    #[arg(long)]
    pub global_ids: Option<PathBuf>,

    /// Write the report here instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let mut documents = args
        .files
        .iter()
        .map(PathBuf::as_path)
        .map(load_document)
        .collect::<Result<Vec<_>>>()?;
    let stored: StoredResources = match &args.stored {
        Some(path) => load_as(path)?,
        None => StoredResources::default(),
    };
    let globals = match &args.global_ids {
        Some(path) => load_global_ids(path)?,
        None => GlobalOrdIds::new(),
    };

    let mut findings = DocumentSanitizer::new()
        .sanitize(&mut documents, &args.base_url, None)
        .context("failed to sanitize documents")?;
    match DocumentValidator::new().validate_local(&mut documents, &args.base_url, &stored, &globals) {
        Ok(warnings) => findings.extend(warnings),
        Err(violations) => {
            tracing::info!(errors = violations.len(), "documents failed validation");
            findings.extend(violations.all().cloned());
        }
    }

    let report = Report::new(documents, findings);
    report.write(args.output.as_deref())?;
    Ok(report.exit_code())
}
