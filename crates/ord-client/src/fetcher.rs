//! # Document Fetcher
//!
//! Fetches an application's well-known configuration and then every ORD
//! document it lists.
//!
//! ## Concurrency
//!
//! One task per document descriptor is spawned on a [`JoinSet`]. Each task
//! holds an owned permit from a [`Semaphore`] sized to
//! `ClientConfig::max_parallel_documents` for the whole fetch, so at most that
//! many documents are in flight. Every task returns its own outcome and the
//! coordinator drains the set completely: a failing document never cancels
//! the others. Dropping the future returned by
//! [`DocumentFetcher::fetch_documents`] drops the `JoinSet`, which aborts the
//! tasks still running.
//!
//! ## Failure model
//!
//! Missing tenant and every problem with the well-known configuration are
//! fatal. Per-document problems are collected into [`DocumentFetchErrors`]
//! and returned next to the documents that did succeed.

use std::sync::Arc;

use async_trait::async_trait;
use ord_core::Document;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::StatusCode;
use serde_json::Value;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

use crate::access_strategy::AccessStrategyRegistry;
use crate::config::ClientConfig;
use crate::error::{DocumentFetchErrors, DocumentFetchFailure, FetchError};
use crate::webhook::{RequestContext, Resource, TenantPair, Webhook, WebhookAuth, WELL_KNOWN_SUFFIX};
use crate::well_known::{is_absolute_url, DocumentDescriptor, WellKnownConfig};

/// Upper bound on one document body.
pub const MAX_DOCUMENT_BYTES: usize = 2 * 1024 * 1024;

/// Documents of one fetch run.
#[derive(Debug, Default)]
pub struct FetchedDocuments {
    pub documents: Vec<Document>,
    /// Raw JSON of each document, index-aligned with `documents`.
    pub sources: Vec<Value>,
    /// Base URL the documents were resolved against. May be empty.
    pub base_url: String,
    pub failures: DocumentFetchErrors,
}

impl FetchedDocuments {
    /// The per-document failures, if there were any.
    pub fn aggregate_error(&self) -> Option<&DocumentFetchErrors> {
        (!self.failures.is_empty()).then_some(&self.failures)
    }
}

/// Anything that can produce the documents of a resource.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch_documents(
        &self,
        ctx: &RequestContext,
        resource: &Resource,
        webhook: &Webhook,
    ) -> Result<FetchedDocuments, FetchError>;
}

// -- Fetcher ------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DocumentFetcher {
    http: reqwest::Client,
    config: ClientConfig,
    strategies: Arc<AccessStrategyRegistry>,
}

impl DocumentFetcher {
    /// Build a fetcher with executors for the configured strategies.
    pub fn new(config: ClientConfig) -> Result<Self, FetchError> {
        let strategies = AccessStrategyRegistry::new(config.supported_access_strategies.clone());
        Self::with_strategies(config, strategies)
    }

    pub fn with_strategies(
        config: ClientConfig,
        strategies: AccessStrategyRegistry,
    ) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|source| FetchError::Http {
                endpoint: "client builder".to_string(),
                source,
            })?;
        Ok(Self {
            http,
            config,
            strategies: Arc::new(strategies),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn strategies(&self) -> &AccessStrategyRegistry {
        &self.strategies
    }

    /// The shared HTTP client, carrying the configured timeout.
    pub fn http_client(&self) -> &reqwest::Client {
        &self.http
    }

    #[tracing::instrument(skip_all, fields(resource_id = %resource.id, webhook = %webhook.url))]
    pub async fn fetch_documents(
        &self,
        ctx: &RequestContext,
        resource: &Resource,
        webhook: &Webhook,
    ) -> Result<FetchedDocuments, FetchError> {
        let tenant = if webhook.requires_tenant(resource) {
            let tenant = ctx.tenant.clone().ok_or_else(|| FetchError::MissingTenant {
                resource_id: resource.id.clone(),
            })?;
            Some(tenant)
        } else {
            None
        };
        let headers = self.tenant_headers(tenant.as_ref())?;

        let raw = self.fetch_well_known(webhook, tenant.as_ref(), &headers).await?;
        let base_url = raw
            .get("baseUrl")
            .and_then(Value::as_str)
            .filter(|b| !b.is_empty())
            .or_else(|| webhook.base_url_from_url())
            .unwrap_or_default()
            .to_string();
        let config = WellKnownConfig::from_value(&raw, &base_url)?;
        tracing::info!(
            documents = config.documents().len(),
            base_url = %base_url,
            "well-known configuration fetched"
        );

        let proxy_base = webhook
            .proxy_url
            .as_deref()
            .map(|p| p.strip_suffix(WELL_KNOWN_SUFFIX).unwrap_or(p).to_string());

        // A zero-permit semaphore would never admit a job.
        let permits = Arc::new(Semaphore::new(self.config.max_parallel_documents.max(1)));
        let mut tasks = JoinSet::new();
        for (index, descriptor) in config.documents().iter().cloned().enumerate() {
            let job = DocumentJob {
                index,
                http: self.http.clone(),
                strategies: Arc::clone(&self.strategies),
                tenant: tenant.clone(),
                headers: headers.clone(),
                proxy_base: proxy_base.clone(),
                base_url: base_url.clone(),
            };
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                // Closed only when the semaphore is dropped, which cannot
                // happen while this task holds an Arc to it.
                let _permit = permits.acquire_owned().await.ok();
                job.run(descriptor).await
            });
        }

        let mut outcomes = Vec::with_capacity(tasks.len());
        let mut failures = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => failures.push((
                    usize::MAX,
                    DocumentFetchFailure {
                        url: "<unknown>".to_string(),
                        error: FetchError::TaskFailed(e.to_string()),
                    },
                )),
            }
        }
        outcomes.sort_by_key(|o| o.index);

        let mut fetched = FetchedDocuments {
            base_url,
            ..FetchedDocuments::default()
        };
        for outcome in outcomes {
            match outcome.result {
                Ok(Some((document, source))) => {
                    fetched.documents.push(document);
                    fetched.sources.push(source);
                }
                Ok(None) => {}
                Err(error) => failures.push((
                    outcome.index,
                    DocumentFetchFailure {
                        url: outcome.url,
                        error,
                    },
                )),
            }
        }
        failures.sort_by_key(|(index, _)| *index);
        fetched.failures = DocumentFetchErrors(failures.into_iter().map(|(_, f)| f).collect());

        if let Some(errors) = fetched.aggregate_error() {
            tracing::warn!(failed = errors.len(), fetched = fetched.documents.len(), "some ORD documents could not be fetched");
        }
        Ok(fetched)
    }

    fn tenant_headers(&self, tenant: Option<&TenantPair>) -> Result<HeaderMap, FetchError> {
        let mut headers = HeaderMap::new();
        if let Some(tenant) = tenant {
            let name = HeaderName::from_bytes(self.config.tenant_header.as_bytes()).map_err(|e| {
                FetchError::InvalidHeader {
                    name: self.config.tenant_header.clone(),
                    reason: e.to_string(),
                }
            })?;
            let value = HeaderValue::from_str(&tenant.external).map_err(|e| FetchError::InvalidHeader {
                name: self.config.tenant_header.clone(),
                reason: e.to_string(),
            })?;
            headers.insert(name, value);
        }
        Ok(headers)
    }

    async fn fetch_well_known(
        &self,
        webhook: &Webhook,
        tenant: Option<&TenantPair>,
        headers: &HeaderMap,
    ) -> Result<Value, FetchError> {
        let target = webhook.proxy_url.as_deref().unwrap_or(&webhook.url);
        let endpoint = format!("GET {target}");
        tracing::debug!(url = %target, "fetching well-known configuration");

        let sent = match &webhook.auth {
            Some(WebhookAuth::AccessStrategy(name)) => {
                let executor = self.strategies.resolve_name(name)?;
                executor.execute(&self.http, target, tenant, headers).await
            }
            Some(WebhookAuth::Basic { username, password }) => {
                self.http
                    .get(target)
                    .headers(headers.clone())
                    .basic_auth(username, Some(password.as_str()))
                    .send()
                    .await
            }
            Some(WebhookAuth::Bearer(token)) => {
                self.http
                    .get(target)
                    .headers(headers.clone())
                    .bearer_auth(token.as_str())
                    .send()
                    .await
            }
            None => self.http.get(target).headers(headers.clone()).send().await,
        };
        let resp = sent.map_err(|source| FetchError::Http {
            endpoint: endpoint.clone(),
            source,
        })?;
        let body = read_ok_body(resp, &endpoint).await?;
        serde_json::from_slice(&body).map_err(|source| FetchError::Deserialization { endpoint, source })
    }
}

#[async_trait]
impl DocumentSource for DocumentFetcher {
    async fn fetch_documents(
        &self,
        ctx: &RequestContext,
        resource: &Resource,
        webhook: &Webhook,
    ) -> Result<FetchedDocuments, FetchError> {
        DocumentFetcher::fetch_documents(self, ctx, resource, webhook).await
    }
}

// -- Per-document task --------------------------------------------------------

struct DocumentJob {
    index: usize,
    http: reqwest::Client,
    strategies: Arc<AccessStrategyRegistry>,
    tenant: Option<TenantPair>,
    headers: HeaderMap,
    proxy_base: Option<String>,
    base_url: String,
}

struct DocumentOutcome {
    index: usize,
    url: String,
    /// `Ok(None)` when the document was skipped.
    result: Result<Option<(Document, Value)>, FetchError>,
}

impl DocumentJob {
    async fn run(self, descriptor: DocumentDescriptor) -> DocumentOutcome {
        let url = match resolve_document_url(&descriptor.url, self.proxy_base.as_deref(), &self.base_url) {
            Ok(url) => url,
            Err(error) => {
                return DocumentOutcome {
                    index: self.index,
                    url: descriptor.url.clone(),
                    result: Err(error),
                }
            }
        };
        let result = self.fetch(&url, &descriptor).await;
        if let Err(e) = &result {
            tracing::warn!(url = %url, error = %e, "failed to fetch ORD document");
        }
        DocumentOutcome {
            index: self.index,
            url,
            result,
        }
    }

    async fn fetch(
        &self,
        url: &str,
        descriptor: &DocumentDescriptor,
    ) -> Result<Option<(Document, Value)>, FetchError> {
        let Some(strategy) = self.strategies.first_supported(&descriptor.access_strategies) else {
            tracing::warn!(url = %url, "no supported access strategy, skipping ORD document");
            return Ok(None);
        };
        let executor = self.strategies.resolve(strategy)?;
        let endpoint = format!("GET {url}");
        tracing::debug!(url = %url, strategy = %strategy.strategy_type, "fetching ORD document");

        let resp = executor
            .execute(&self.http, url, self.tenant.as_ref(), &self.headers)
            .await
            .map_err(|source| FetchError::Http {
                endpoint: endpoint.clone(),
                source,
            })?;
        let body = read_ok_body(resp, &endpoint).await?;
        let source: Value = serde_json::from_slice(&body).map_err(|source| FetchError::Deserialization {
            endpoint: endpoint.clone(),
            source,
        })?;
        let mut document: Document = serde_json::from_value(source.clone())
            .map_err(|source| FetchError::Deserialization { endpoint, source })?;
        document.perspective = descriptor.perspective();
        Ok(Some((document, source)))
    }
}

// -- Helpers ------------------------------------------------------------------

async fn read_ok_body(resp: reqwest::Response, endpoint: &str) -> Result<Vec<u8>, FetchError> {
    let status = resp.status();
    if status != StatusCode::OK {
        let body = resp.text().await.unwrap_or_default();
        return Err(FetchError::ApiError {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            body,
        });
    }
    read_capped(resp, endpoint, MAX_DOCUMENT_BYTES).await
}

/// Read a response body, failing as soon as it grows past `limit` bytes.
async fn read_capped(
    mut resp: reqwest::Response,
    endpoint: &str,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    let too_large = || FetchError::BodyTooLarge {
        endpoint: endpoint.to_string(),
        limit,
    };
    if resp.content_length().is_some_and(|len| len > limit as u64) {
        return Err(too_large());
    }
    let mut body = Vec::new();
    while let Some(chunk) = resp.chunk().await.map_err(|source| FetchError::Http {
        endpoint: endpoint.to_string(),
        source,
    })? {
        if body.len() + chunk.len() > limit {
            return Err(too_large());
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

/// Absolute document URLs are kept; relative ones are joined onto the proxy
/// base when there is one, else onto the base URL.
pub fn resolve_document_url(
    document_url: &str,
    proxy_base: Option<&str>,
    base_url: &str,
) -> Result<String, FetchError> {
    if is_absolute_url(document_url) {
        return Ok(document_url.to_string());
    }
    let prefix = proxy_base.filter(|p| !p.is_empty()).unwrap_or(base_url);
    if prefix.is_empty() {
        return Err(FetchError::InvalidUrl {
            url: document_url.to_string(),
            reason: "relative document URL without a base URL".to_string(),
        });
    }
    join_url_path(prefix, document_url).map_err(|reason| FetchError::InvalidUrl {
        url: document_url.to_string(),
        reason,
    })
}

/// Append `relative` to the path of `base`.
///
/// Unlike RFC 3986 resolution the base path is never replaced: joining
/// `/ord/v1` onto `https://h/proxy` gives `https://h/proxy/ord/v1`. Repeated
/// slashes are collapsed. A query on `relative` replaces the base's query.
pub fn join_url_path(base: &str, relative: &str) -> Result<String, String> {
    let mut url = Url::parse(base).map_err(|e| e.to_string())?;
    let (rel_path, rel_query) = match relative.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (relative, None),
    };
    let joined: Vec<&str> = url
        .path()
        .split('/')
        .chain(rel_path.split('/'))
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();
    let mut path = format!("/{}", joined.join("/"));
    if rel_path.ends_with('/') && path.len() > 1 {
        path.push('/');
    }
    url.set_path(&path);
    if let Some(q) = rel_query {
        url.set_query(Some(q));
    }
    Ok(url.to_string())
}
