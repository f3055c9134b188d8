//! # Document Sanitizer
//!
//! Runs between fetch and validation and mutates documents in place:
//!
//! 1. Relative URLs in link-like fields are made absolute. Links are joined
//!    onto the path of the rewrite base (the proxy URL when there is one,
//!    otherwise the webhook base URL). Resource definition URLs are resolved
//!    with RFC 3986 reference resolution against the same base.
//! 2. API entry points and bundle default entry points are joined onto the
//!    webhook base URL, never the proxy: consumers call them directly.
//! 3. Packages without a policy level inherit the document's.
//! 4. Packaged resources inherit the document policy level and merge their
//!    package's classification (package values first, duplicates dropped).
//! 5. An API with several entry points gets the first as default entry point
//!    on every bundle reference that has none.
//!
//! Running the sanitizer twice gives the same result as running it once:
//! absolute URLs are never rewritten and merges deduplicate.

use std::collections::HashMap;

use ord_client::fetcher::join_url_path;
use ord_client::WELL_KNOWN_SUFFIX;
use ord_core::validation::UNKNOWN_REFERENCE;
use ord_core::value::{merge_labels, merge_string_arrays, rewrite_string_field};
use ord_core::{
    Classification, Document, Package, PackagedResource, ResourceDefinition, ValidationError,
};
use serde_json::Value;
use url::Url;

use crate::error::SanitizeError;

#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentSanitizer;

impl DocumentSanitizer {
    pub fn new() -> Self {
        Self
    }

    /// Sanitize a batch of documents fetched for one application.
    ///
    /// Unknown package references are returned as error-severity findings;
    /// the resource is left as it is.
    pub fn sanitize(
        &self,
        documents: &mut [Document],
        webhook_base_url: &str,
        proxy_url: Option<&str>,
    ) -> Result<Vec<ValidationError>, SanitizeError> {
        let rewrite_base = proxy_url
            .filter(|p| !p.is_empty())
            .map(|p| p.strip_suffix(WELL_KNOWN_SUFFIX).unwrap_or(p))
            .unwrap_or(webhook_base_url);
        let urls = UrlRewriter::new(rewrite_base, webhook_base_url)?;

        for doc in documents.iter_mut() {
            rewrite_document_urls(doc, &urls)?;
        }

        for doc in documents.iter_mut() {
            let (level, custom) = (doc.policy_level.clone(), doc.custom_policy_level.clone());
            for pkg in &mut doc.packages {
                if pkg.policy_level.is_none() && level.is_some() {
                    pkg.policy_level = level.clone();
                    pkg.custom_policy_level = custom.clone();
                }
            }
        }

        let packages: HashMap<String, Package> = documents
            .iter()
            .flat_map(|d| d.packages.iter())
            .map(|p| (p.ord_id.clone(), p.clone()))
            .collect();

        let mut findings = Vec::new();
        for doc in documents.iter_mut() {
            let level = doc.policy_level.clone();
            let custom = doc.custom_policy_level.clone();
            let inherit = Inheritance {
                packages: &packages,
                level: level.as_deref(),
                custom: custom.as_deref(),
            };
            inherit.apply(&mut doc.api_resources, &mut findings)?;
            inherit.apply(&mut doc.event_resources, &mut findings)?;
            inherit.apply(&mut doc.entity_types, &mut findings)?;
            inherit.apply(&mut doc.capabilities, &mut findings)?;
            inherit.apply(&mut doc.integration_dependencies, &mut findings)?;
            inherit.apply(&mut doc.data_products, &mut findings)?;

            for api in &mut doc.api_resources {
                fill_default_entry_points(api);
            }
        }

        if !findings.is_empty() {
            tracing::warn!(count = findings.len(), "sanitizer found unknown package references");
        }
        Ok(findings)
    }
}

// -- URL rewriting ------------------------------------------------------------

struct UrlRewriter<'a> {
    base: &'a str,
    base_url: Option<Url>,
    webhook_base: &'a str,
}

impl<'a> UrlRewriter<'a> {
    fn new(base: &'a str, webhook_base: &'a str) -> Result<Self, SanitizeError> {
        let base_url = if base.is_empty() {
            None
        } else {
            Some(Url::parse(base).map_err(|e| SanitizeError::InvalidBaseUrl {
                url: base.to_string(),
                reason: e.to_string(),
            })?)
        };
        Ok(Self {
            base,
            base_url,
            webhook_base,
        })
    }

    fn join(prefix: &str, ord_id: &str, raw: &str) -> Result<Option<String>, SanitizeError> {
        if prefix.is_empty() || is_absolute(raw) {
            return Ok(None);
        }
        join_url_path(prefix, raw)
            .map(Some)
            .map_err(|reason| SanitizeError::UnresolvableUrl {
                ord_id: ord_id.to_string(),
                url: raw.to_string(),
                reason,
            })
    }

    /// Rewrite `key` in every object of a link-like field.
    fn links(&self, field: &mut Option<Value>, key: &str, ord_id: &str) -> Result<(), SanitizeError> {
        match field {
            Some(value) => rewrite_string_field(value, key, &mut |raw| Self::join(self.base, ord_id, raw)),
            None => Ok(()),
        }
    }

    fn definitions(&self, defs: &mut [ResourceDefinition], ord_id: &str) -> Result<(), SanitizeError> {
        let Some(base) = &self.base_url else {
            return Ok(());
        };
        for def in defs.iter_mut().filter(|d| !d.url.is_empty() && !is_absolute(&d.url)) {
            let resolved = base.join(&def.url).map_err(|e| SanitizeError::UnresolvableUrl {
                ord_id: ord_id.to_string(),
                url: def.url.clone(),
                reason: e.to_string(),
            })?;
            def.url = resolved.to_string();
        }
        Ok(())
    }

    fn entry_point(&self, raw: &str, ord_id: &str) -> Result<Option<String>, SanitizeError> {
        Self::join(self.webhook_base, ord_id, raw)
    }
}

fn is_absolute(raw: &str) -> bool {
    Url::parse(raw).is_ok()
}

fn rewrite_document_urls(doc: &mut Document, urls: &UrlRewriter<'_>) -> Result<(), SanitizeError> {
    for pkg in &mut doc.packages {
        urls.links(&mut pkg.package_links, "url", &pkg.ord_id)?;
        urls.links(&mut pkg.links, "url", &pkg.ord_id)?;
    }
    for bundle in &mut doc.consumption_bundles {
        urls.links(&mut bundle.links, "url", &bundle.ord_id)?;
        urls.links(&mut bundle.credential_exchange_strategies, "callbackUrl", &bundle.ord_id)?;
    }
    for api in &mut doc.api_resources {
        let id = api.ord_id.as_str();
        urls.links(&mut api.links, "url", id)?;
        urls.links(&mut api.api_resource_links, "url", id)?;
        urls.links(&mut api.changelog_entries, "url", id)?;
        urls.definitions(&mut api.resource_definitions, id)?;
        if let Some(Value::Array(entry_points)) = &mut api.entry_points {
            for ep in entry_points.iter_mut() {
                if let Value::String(raw) = ep {
                    if let Some(resolved) = urls.entry_point(raw, id)? {
                        *raw = resolved;
                    }
                }
            }
        }
        for reference in api.part_of_consumption_bundles.iter_mut().flatten() {
            if let Some(raw) = &mut reference.default_entry_point {
                if let Some(resolved) = UrlRewriter::join(urls.base, id, raw)? {
                    *raw = resolved;
                }
            }
        }
    }
    for event in &mut doc.event_resources {
        let id = event.ord_id.as_str();
        urls.links(&mut event.links, "url", id)?;
        urls.links(&mut event.event_resource_links, "url", id)?;
        urls.links(&mut event.changelog_entries, "url", id)?;
        urls.definitions(&mut event.resource_definitions, id)?;
    }
    for entity in &mut doc.entity_types {
        urls.links(&mut entity.links, "url", &entity.ord_id)?;
        urls.links(&mut entity.changelog_entries, "url", &entity.ord_id)?;
    }
    for capability in &mut doc.capabilities {
        urls.links(&mut capability.links, "url", &capability.ord_id)?;
        urls.definitions(&mut capability.definitions, &capability.ord_id)?;
    }
    for dependency in &mut doc.integration_dependencies {
        urls.links(&mut dependency.links, "url", &dependency.ord_id)?;
    }
    for product in &mut doc.data_products {
        let id = product.ord_id.as_str();
        urls.links(&mut product.links, "url", id)?;
        urls.links(&mut product.data_product_links, "url", id)?;
        urls.links(&mut product.changelog_entries, "url", id)?;
    }
    Ok(())
}

// -- Inheritance --------------------------------------------------------------

struct Inheritance<'a> {
    packages: &'a HashMap<String, Package>,
    level: Option<&'a str>,
    custom: Option<&'a str>,
}

impl Inheritance<'_> {
    fn apply<R: PackagedResource>(
        &self,
        resources: &mut [R],
        findings: &mut Vec<ValidationError>,
    ) -> Result<(), SanitizeError> {
        for resource in resources.iter_mut() {
            resource.inherit_policy_level(self.level, self.custom);
            let Some(package_id) = resource.part_of_package().map(str::to_string) else {
                continue;
            };
            match self.packages.get(&package_id) {
                Some(pkg) => {
                    let ord_id = resource.ord_id().to_string();
                    merge_classification(&pkg.classification, resource.classification_mut())
                        .map_err(|source| SanitizeError::Merge { ord_id, source })?;
                }
                None => findings.push(ValidationError::error(
                    resource.ord_id(),
                    UNKNOWN_REFERENCE,
                    format!("{} references unknown package {package_id:?}", R::KIND),
                )),
            }
        }
        Ok(())
    }
}

fn merge_classification(
    package: &Classification,
    resource: &mut Classification,
) -> Result<(), ord_core::CoreError> {
    resource.part_of_products = merge_string_arrays(
        "partOfProducts",
        package.part_of_products.as_ref(),
        resource.part_of_products.as_ref(),
    )?;
    resource.tags = merge_string_arrays("tags", package.tags.as_ref(), resource.tags.as_ref())?;
    resource.countries =
        merge_string_arrays("countries", package.countries.as_ref(), resource.countries.as_ref())?;
    resource.industry =
        merge_string_arrays("industry", package.industry.as_ref(), resource.industry.as_ref())?;
    resource.line_of_business = merge_string_arrays(
        "lineOfBusiness",
        package.line_of_business.as_ref(),
        resource.line_of_business.as_ref(),
    )?;
    resource.labels = merge_labels(package.labels.as_ref(), resource.labels.as_ref())?;
    Ok(())
}

fn fill_default_entry_points(api: &mut ord_core::ApiResource) {
    let first = match &api.entry_points {
        Some(Value::Array(eps)) if eps.len() > 1 => eps[0].as_str().map(str::to_string),
        _ => None,
    };
    let Some(first) = first else {
        return;
    };
    for reference in api.part_of_consumption_bundles.iter_mut().flatten() {
        if reference.default_entry_point.is_none() {
            reference.default_entry_point = Some(first.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BASE: &str = "https://app.example.com";

    fn batch() -> Vec<Document> {
        let doc: Document = serde_json::from_value(json!({
            "openResourceDiscovery": "1.9",
            "policyLevel": "sap:core:v1",
            "packages": [{
                "ordId": "ns:package:P:v1",
                "links": [{"title": "home", "url": "/home"}, {"title": "abs", "url": "https://x.example.com/a"}],
                "tags": ["pkg"],
                "labels": {"team": ["a"]},
                "partOfProducts": ["ns:product:X:"]
            }],
            "consumptionBundles": [{
                "ordId": "ns:consumptionBundle:B:v1",
                "credentialExchangeStrategies": [{"type": "custom", "callbackUrl": "/cb"}]
            }],
            "apiResources": [{
                "ordId": "ns:apiResource:A:v1",
                "partOfPackage": "ns:package:P:v1",
                "entryPoints": ["/api/one", "/api/two"],
                "partOfConsumptionBundles": [{"ordId": "ns:consumptionBundle:B:v1"}],
                "resourceDefinitions": [{"type": "openapi-v3", "mediaType": "application/json", "url": "/spec/a.json", "accessStrategies": [{"type": "open"}]}],
                "tags": ["api", "pkg"],
                "labels": {"team": ["b"], "zone": ["eu"]}
            }],
            "eventResources": [{
                "ordId": "ns:eventResource:E:v1",
                "partOfPackage": "ns:package:MISSING:v1"
            }]
        }))
        .unwrap();
        vec![doc]
    }

    #[test]
    fn rewrites_relative_urls_against_webhook_base() {
        let mut docs = batch();
        DocumentSanitizer::new().sanitize(&mut docs, BASE, None).unwrap();
        let doc = &docs[0];

        let links = doc.packages[0].links.as_ref().unwrap();
        assert_eq!(links[0]["url"], "https://app.example.com/home");
        assert_eq!(links[1]["url"], "https://x.example.com/a");
        assert_eq!(
            doc.consumption_bundles[0].credential_exchange_strategies.as_ref().unwrap()[0]["callbackUrl"],
            "https://app.example.com/cb"
        );
        let api = &doc.api_resources[0];
        assert_eq!(api.resource_definitions[0].url, "https://app.example.com/spec/a.json");
        assert_eq!(api.entry_points.as_ref().unwrap()[0], "https://app.example.com/api/one");
    }

    #[test]
    fn entry_points_never_use_the_proxy() {
        let mut docs = batch();
        docs[0].api_resources[0].part_of_consumption_bundles.as_mut().unwrap()[0].default_entry_point =
            Some("/api/default".to_string());
        DocumentSanitizer::new()
            .sanitize(&mut docs, BASE, Some("https://proxy.internal.example.com/p"))
            .unwrap();
        let doc = &docs[0];
        assert_eq!(
            doc.packages[0].links.as_ref().unwrap()[0]["url"],
            "https://proxy.internal.example.com/p/home"
        );
        let api = &doc.api_resources[0];
        assert_eq!(api.entry_points.as_ref().unwrap()[1], "https://app.example.com/api/two");
        // Declared default entry points are links, not entry points.
        assert_eq!(
            api.part_of_consumption_bundles.as_ref().unwrap()[0].default_entry_point.as_deref(),
            Some("https://proxy.internal.example.com/p/api/default")
        );
        // RFC 3986 resolution replaces the proxy path.
        assert_eq!(api.resource_definitions[0].url, "https://proxy.internal.example.com/spec/a.json");
    }

    #[test]
    fn inherits_policy_level_and_merges_package_classification() {
        let mut docs = batch();
        DocumentSanitizer::new().sanitize(&mut docs, BASE, None).unwrap();
        let doc = &docs[0];
        assert_eq!(doc.packages[0].policy_level.as_deref(), Some("sap:core:v1"));

        let api = &doc.api_resources[0];
        assert_eq!(api.policy_level.as_deref(), Some("sap:core:v1"));
        assert_eq!(api.classification.tags, Some(json!(["pkg", "api"])));
        assert_eq!(api.classification.part_of_products, Some(json!(["ns:product:X:"])));
        assert_eq!(api.classification.labels, Some(json!({"team": ["a", "b"], "zone": ["eu"]})));
    }

    #[test]
    fn unknown_package_is_reported_and_left_alone() {
        let mut docs = batch();
        let findings = DocumentSanitizer::new().sanitize(&mut docs, BASE, None).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].ord_id, "ns:eventResource:E:v1");
        assert_eq!(findings[0].error_type, UNKNOWN_REFERENCE);
        assert!(findings[0].is_error());
        let event = &docs[0].event_resources[0];
        assert_eq!(event.classification, Classification::default());
        // Document policy level is still inherited.
        assert_eq!(event.policy_level.as_deref(), Some("sap:core:v1"));
    }

    #[test]
    fn default_entry_point_is_the_first_entry_point() {
        let mut docs = batch();
        DocumentSanitizer::new().sanitize(&mut docs, BASE, None).unwrap();
        let refs = docs[0].api_resources[0].part_of_consumption_bundles.as_ref().unwrap();
        assert_eq!(refs[0].default_entry_point.as_deref(), Some("https://app.example.com/api/one"));
    }

    #[test]
    fn sanitizing_twice_is_a_no_op() {
        let sanitizer = DocumentSanitizer::new();
        let mut once = batch();
        sanitizer.sanitize(&mut once, BASE, Some("https://proxy.internal.example.com")).unwrap();
        let mut twice = once.clone();
        sanitizer.sanitize(&mut twice, BASE, Some("https://proxy.internal.example.com")).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_base_leaves_relative_urls() {
        let mut docs = batch();
        DocumentSanitizer::new().sanitize(&mut docs, "", None).unwrap();
        assert_eq!(docs[0].packages[0].links.as_ref().unwrap()[0]["url"], "/home");
    }

    #[test]
    fn malformed_base_is_an_error() {
        let mut docs = batch();
        let err = DocumentSanitizer::new().sanitize(&mut docs, "not a url", None).unwrap_err();
        assert!(matches!(err, SanitizeError::InvalidBaseUrl { .. }));
    }
}
