//! Global registry sync against the in-memory store.

use std::sync::Arc;

use async_trait::async_trait;
use ord_client::{
    ClientConfig, DocumentFetcher, DocumentSource, FetchError, FetchedDocuments, RequestContext, Resource, Webhook,
    WELL_KNOWN_SUFFIX,
};
use ord_core::{Document, Product, Vendor};
use ord_registry::{
    GlobalRegistryService, GlobalRegistryStore, GlobalRegistryTx, MemoryGlobalRegistry, OperationKind, Record,
    RegistryError, StoreError, GLOBAL_REGISTRY_RESOURCE,
};
use serde_json::{json, Value};
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REGISTRY: &str = "https://registry.acme.com/.well-known/open-resource-discovery";

/// Serves canned documents and checks it is asked for the registry resource.
struct StaticSource(Vec<Value>);

#[async_trait]
impl DocumentSource for StaticSource {
    async fn fetch_documents(
        &self,
        _ctx: &RequestContext,
        resource: &Resource,
        webhook: &Webhook,
    ) -> Result<FetchedDocuments, FetchError> {
        assert_eq!(resource.id, GLOBAL_REGISTRY_RESOURCE);
        let documents = self
            .0
            .iter()
            .map(|raw| serde_json::from_value::<Document>(raw.clone()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| FetchError::Deserialization {
                endpoint: webhook.url.clone(),
                source,
            })?;
        Ok(FetchedDocuments {
            documents,
            sources: self.0.clone(),
            base_url: webhook.base_url_from_url().unwrap_or_default().to_string(),
            ..FetchedDocuments::default()
        })
    }
}

fn vendor(ord_id: &str, title: &str) -> Vendor {
    Vendor {
        ord_id: ord_id.to_string(),
        title: title.to_string(),
        ..Vendor::default()
    }
}

fn product(ord_id: &str, title: &str) -> Product {
    Product {
        ord_id: ord_id.to_string(),
        title: title.to_string(),
        short_description: Some(format!("{title} product")),
        vendor: "sap:vendor:SAP:".to_string(),
        ..Product::default()
    }
}

fn registry_document(vendors: &[Vendor], products: &[Product]) -> Value {
    json!({
        "openResourceDiscovery": "1.9",
        "vendors": vendors,
        "products": products,
    })
}

fn service(source: Vec<Value>, store: Arc<dyn GlobalRegistryStore>) -> GlobalRegistryService {
    GlobalRegistryService::new(Arc::new(StaticSource(source)), store, &REGISTRY.parse().unwrap())
}

fn ord_ids<T>(records: &[Record<T>], ord_id: impl Fn(&T) -> &str) -> Vec<String> {
    let mut ids: Vec<String> = records.iter().map(|r| ord_id(&r.value).to_string()).collect();
    ids.sort();
    ids
}

#[tokio::test]
async fn updates_matches_creates_missing_and_deletes_the_rest() {
    let store = MemoryGlobalRegistry::seeded(
        vec![vendor("sap:vendor:SAP:", "SAP"), vendor("sap:vendor:Old:", "Old")],
        vec![product("sap:product:S4HANA:", "S/4HANA")],
    );
    let sap_id = store
        .vendors()
        .into_iter()
        .find(|r| r.value.ord_id == "sap:vendor:SAP:")
        .map(|r| r.id)
        .unwrap();
    let desired = registry_document(
        &[vendor("sap:vendor:SAP:", "SAP SE"), vendor("sap:vendor:New:", "New")],
        &[product("sap:product:BTP:", "BTP")],
    );

    let ids = service(vec![desired], Arc::new(store.clone()))
        .sync_global_resources(&RequestContext::default())
        .await
        .unwrap();

    let mut returned: Vec<_> = ids.into_iter().collect();
    returned.sort();
    assert_eq!(
        returned,
        vec!["sap:product:BTP:", "sap:vendor:New:", "sap:vendor:SAP:"]
    );
    assert_eq!(ord_ids(&store.vendors(), |v| &v.ord_id), vec!["sap:vendor:New:", "sap:vendor:SAP:"]);
    assert_eq!(ord_ids(&store.products(), |p| &p.ord_id), vec!["sap:product:BTP:"]);

    let kept = store.vendors().into_iter().find(|r| r.id == sap_id).unwrap();
    assert_eq!(kept.value.title, "SAP SE");

    let summary: Vec<_> = store
        .operations()
        .into_iter()
        .map(|op| (op.kind, op.ord_id))
        .collect();
    assert_eq!(
        summary,
        vec![
            (OperationKind::Updated, "sap:vendor:SAP:".to_string()),
            (OperationKind::Created, "sap:vendor:New:".to_string()),
            (OperationKind::Deleted, "sap:vendor:Old:".to_string()),
            (OperationKind::Created, "sap:product:BTP:".to_string()),
            (OperationKind::Deleted, "sap:product:S4HANA:".to_string()),
        ]
    );
}

#[tokio::test]
async fn other_resource_kinds_are_rejected() {
    let store = MemoryGlobalRegistry::new();
    let mut doc = registry_document(&[vendor("sap:vendor:SAP:", "SAP")], &[]);
    doc["packages"] = json!([{"ordId": "sap:package:P:v1"}]);

    let err = service(vec![doc], Arc::new(store.clone()))
        .sync_global_resources(&RequestContext::default())
        .await
        .unwrap_err();

    assert!(matches!(err, RegistryError::UnsupportedResources));
    assert_eq!(err.to_string(), "global registry supports only vendors and products");
    assert!(store.vendors().is_empty());
}

#[tokio::test]
async fn invalid_documents_change_nothing() {
    let store = MemoryGlobalRegistry::seeded(vec![vendor("sap:vendor:SAP:", "SAP")], Vec::new());
    let doc = registry_document(&[vendor("not-an-ord-id", "Broken")], &[]);

    let err = service(vec![doc], Arc::new(store.clone()))
        .sync_global_resources(&RequestContext::default())
        .await
        .unwrap_err();

    match err {
        RegistryError::Validation(violations) => assert_eq!(violations.errors[0].ord_id, "not-an-ord-id"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(ord_ids(&store.vendors(), |v| &v.ord_id), vec!["sap:vendor:SAP:"]);
    assert!(store.operations().is_empty());
}

// -- Rollback -----------------------------------------------------------------

/// Store whose transactions fail every vendor deletion.
struct FailingDeletes(MemoryGlobalRegistry);

struct FailingTx(Box<dyn GlobalRegistryTx>);

#[async_trait]
impl GlobalRegistryStore for FailingDeletes {
    async fn begin(&self) -> Result<Box<dyn GlobalRegistryTx>, StoreError> {
        Ok(Box::new(FailingTx(self.0.begin().await?)))
    }
}

#[async_trait]
impl GlobalRegistryTx for FailingTx {
    async fn list_vendors(&mut self) -> Result<Vec<Record<Vendor>>, StoreError> {
        self.0.list_vendors().await
    }
    async fn create_vendor(&mut self, vendor: &Vendor) -> Result<Uuid, StoreError> {
        self.0.create_vendor(vendor).await
    }
    async fn update_vendor(&mut self, id: Uuid, vendor: &Vendor) -> Result<(), StoreError> {
        self.0.update_vendor(id, vendor).await
    }
    async fn delete_vendor(&mut self, _id: Uuid) -> Result<(), StoreError> {
        Err(StoreError::Backend("disk full".to_string()))
    }
    async fn list_products(&mut self) -> Result<Vec<Record<Product>>, StoreError> {
        self.0.list_products().await
    }
    async fn create_product(&mut self, product: &Product) -> Result<Uuid, StoreError> {
        self.0.create_product(product).await
    }
    async fn update_product(&mut self, id: Uuid, product: &Product) -> Result<(), StoreError> {
        self.0.update_product(id, product).await
    }
    async fn delete_product(&mut self, id: Uuid) -> Result<(), StoreError> {
        self.0.delete_product(id).await
    }
    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.0.commit().await
    }
    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.0.rollback().await
    }
}

#[tokio::test]
async fn store_failure_rolls_back_earlier_changes() {
    let store = MemoryGlobalRegistry::seeded(vec![vendor("sap:vendor:Old:", "Old")], Vec::new());
    let desired = registry_document(&[vendor("sap:vendor:SAP:", "SAP")], &[]);

    let err = service(vec![desired], Arc::new(FailingDeletes(store.clone())))
        .sync_global_resources(&RequestContext::default())
        .await
        .unwrap_err();

    assert!(matches!(err, RegistryError::Store(StoreError::Backend(_))), "{err}");
    assert_eq!(ord_ids(&store.vendors(), |v| &v.ord_id), vec!["sap:vendor:Old:"]);
    assert!(store.operations().is_empty());
    assert_eq!(store.revision(), 0);
}

#[tokio::test]
async fn listing_reads_persisted_ids() {
    let store = MemoryGlobalRegistry::seeded(
        vec![vendor("sap:vendor:SAP:", "SAP")],
        vec![product("sap:product:S4HANA:", "S/4HANA")],
    );
    let ids = service(Vec::new(), Arc::new(store))
        .list_global_resources()
        .await
        .unwrap();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains("sap:product:S4HANA:"));
}

// -- Over HTTP ----------------------------------------------------------------

#[tokio::test]
async fn syncs_from_a_served_registry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(WELL_KNOWN_SUFFIX))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "openResourceDiscoveryV1": {"documents": [
                {"url": "/ord/global", "accessStrategies": [{"type": "open"}]}
            ]}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ord/global"))
        .respond_with(ResponseTemplate::new(200).set_body_json(registry_document(
            &[vendor("sap:vendor:SAP:", "SAP")],
            &[product("sap:product:S4HANA:", "S/4HANA")],
        )))
        .mount(&server)
        .await;

    let fetcher = DocumentFetcher::new(ClientConfig {
        timeout_secs: 5,
        ..ClientConfig::default()
    })
    .unwrap();
    let store = MemoryGlobalRegistry::new();
    let url = format!("{}{WELL_KNOWN_SUFFIX}", server.uri()).parse().unwrap();
    let ids = GlobalRegistryService::new(Arc::new(fetcher), Arc::new(store.clone()), &url)
        .sync_global_resources(&RequestContext::default())
        .await
        .unwrap();

    assert_eq!(ids.len(), 2);
    assert_eq!(store.vendors().len(), 1);
    assert_eq!(store.products()[0].value.vendor, "sap:vendor:SAP:");
}
