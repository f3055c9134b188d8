//! `ord fetch`: one aggregation run for a single application.
//!
//! Fetches every document behind the well-known URL, sanitizes the batch,
//! validates it and prints a report. Validation is delegated when a
//! validator URL is configured (flag, config file or `ORD_VALIDATOR_URL`),
//! otherwise the local rules run. Global ORD IDs come from `--global-ids`, or
//! from a sync against the configured global registry.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use ord_client::{
    ClientConfig, DocumentFetcher, FetchedDocuments, RequestContext, Resource, ValidationClient, Webhook,
};
use ord_core::{Document, ValidationError};
use ord_registry::{GlobalRegistryService, MemoryGlobalRegistry};
use ord_validation::{DocumentSanitizer, DocumentValidator, GlobalOrdIds, StoredResources};

use crate::config::{parse_url, CliConfig};
use crate::load_global_ids;
use crate::report::Report;

/// Resource ID reported for the fetched application.
const CLI_RESOURCE_ID: &str = "cli";

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Well-known URL of the application.
    #[arg(long)]
    pub url: String,

    /// Internal proxy used instead of the application's own host.
    #[arg(long)]
    pub proxy_url: Option<String>,

    /// Delegated rule validator base URL.
    #[arg(long)]
    pub validator_url: Option<String>,

    /// Ruleset requested from the delegated validator.
    #[arg(long)]
    pub ruleset: Option<String>,

    /// Application namespace used to look up the ignore list.
    #[arg(long, default_value = "")]
    pub app_namespace: String,

    /// ORD IDs published by the global registry (JSON or YAML list).
    #[arg(long)]
    pub global_ids: Option<PathBuf>,

    /// Write the report here instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub async fn run_fetch(args: &FetchArgs, config: &CliConfig) -> Result<u8> {
    let client_config = client_config(args, config)?;
    let fetcher = Arc::new(DocumentFetcher::new(client_config).context("failed to build HTTP client")?);
    let globals = global_ids(args, &fetcher).await?;

    let mut webhook = Webhook::open(args.url.clone());
    webhook.proxy_url = args.proxy_url.clone();
    let resource = Resource::application(CLI_RESOURCE_ID, args.url.clone());
    let FetchedDocuments {
        mut documents,
        sources,
        base_url,
        failures,
    } = fetcher
        .fetch_documents(&RequestContext::default(), &resource, &webhook)
        .await
        .with_context(|| format!("failed to fetch ORD documents from {}", args.url))?;
    if !failures.is_empty() {
        tracing::warn!(failed = failures.len(), fetched = documents.len(), "some documents could not be fetched");
    }

    let mut findings = DocumentSanitizer::new()
        .sanitize(&mut documents, &base_url, webhook.proxy_url.as_deref())
        .context("failed to sanitize documents")?;

    let validator = DocumentValidator::new().with_ignore_list(config.ignore_list.clone());
    match &fetcher.config().validator_url {
        Some(url) => {
            let client = ValidationClient::new(fetcher.http_client().clone(), url.clone());
            let raw: Vec<String> = sources.iter().map(|s| s.to_string()).collect();
            let ruleset = args.ruleset.as_deref().unwrap_or_else(|| config.ruleset());
            let delegated = validator
                .with_rule_service(Arc::new(client))
                .validate(&mut documents, &base_url, &globals, &raw, ruleset, &args.app_namespace)
                .await
                .with_context(|| format!("delegated validation against {url} failed"))?;
            findings.extend(delegated);
        }
        None => findings.extend(validate_locally(&validator, &mut documents, &base_url, &globals)),
    }

    let report = Report::new(documents, findings).with_fetch_failures(&failures);
    tracing::info!(
        documents = report.documents.len(),
        errors = report.error_count(),
        failures = report.fetch_failures.len(),
        "fetch finished"
    );
    report.write(args.output.as_deref())?;
    Ok(report.exit_code())
}

fn client_config(args: &FetchArgs, config: &CliConfig) -> Result<ClientConfig> {
    let env = ClientConfig::from_env().context("invalid ORD_* environment")?;
    let mut client = config.apply(env)?;
    if let Some(url) = &args.validator_url {
        client.validator_url = Some(parse_url("--validator-url", url)?);
    }
    Ok(client)
}

async fn global_ids(args: &FetchArgs, fetcher: &Arc<DocumentFetcher>) -> Result<GlobalOrdIds> {
    if let Some(path) = &args.global_ids {
        return load_global_ids(path);
    }
    let Some(url) = fetcher.config().global_registry_url.clone() else {
        return Ok(GlobalOrdIds::new());
    };
    let service = GlobalRegistryService::new(fetcher.clone(), Arc::new(MemoryGlobalRegistry::new()), &url);
    service
        .sync_global_resources(&RequestContext::default())
        .await
        .with_context(|| format!("failed to sync global registry {url}"))
}

fn validate_locally(
    validator: &DocumentValidator,
    documents: &mut [Document],
    base_url: &str,
    globals: &GlobalOrdIds,
) -> Vec<ValidationError> {
    match validator.validate_local(documents, base_url, &StoredResources::default(), globals) {
        Ok(warnings) => warnings,
        Err(violations) => violations.all().cloned().collect(),
    }
}
