//! `ord hash`: structural hashes of every resource in a document.
//!
//! The hash is the value persisted next to a resource's version; comparing
//! it across document revisions tells whether the version must be bumped.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use ord_core::{structural_hash, Document, HashError, OrdResource};
use serde::Serialize;

use crate::{load_document, EXIT_OK};

#[derive(Args, Debug)]
pub struct HashArgs {
    /// JSON or YAML ORD document.
    pub file: PathBuf,

    /// Print a JSON array instead of tab-separated lines.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceHash {
    pub kind: &'static str,
    pub ord_id: String,
    /// Base-10 rendering of the `u64` hash, as persisted.
    pub hash: String,
}

pub fn resource_hashes(doc: &Document) -> Result<Vec<ResourceHash>, HashError> {
    let mut out = Vec::new();
    push(&mut out, &doc.packages)?;
    push(&mut out, &doc.consumption_bundles)?;
    push(&mut out, &doc.products)?;
    push(&mut out, &doc.vendors)?;
    push(&mut out, &doc.api_resources)?;
    push(&mut out, &doc.event_resources)?;
    push(&mut out, &doc.entity_types)?;
    push(&mut out, &doc.capabilities)?;
    push(&mut out, &doc.integration_dependencies)?;
    push(&mut out, &doc.data_products)?;
    push(&mut out, &doc.tombstones)?;
    Ok(out)
}

fn push<T: OrdResource + Serialize>(out: &mut Vec<ResourceHash>, resources: &[T]) -> Result<(), HashError> {
    for resource in resources {
        out.push(ResourceHash {
            kind: T::KIND.label(),
            ord_id: resource.ord_id().to_string(),
            hash: structural_hash(resource)?.to_string(),
        });
    }
    Ok(())
}

pub fn run_hash(args: &HashArgs) -> Result<u8> {
    let doc = load_document(&args.file)?;
    let hashes =
        resource_hashes(&doc).with_context(|| format!("failed to hash resources of {}", args.file.display()))?;
    tracing::debug!(resources = hashes.len(), file = %args.file.display(), "hashed resources");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&hashes)?);
    } else {
        for h in &hashes {
            println!("{}\t{}\t{}", h.kind, h.ord_id, h.hash);
        }
    }
    Ok(EXIT_OK)
}
