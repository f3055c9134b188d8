//! # Global Registry Service
//!
//! Syncs the persisted registry with what the global registry currently
//! publishes:
//!
//! 1. Begin a store transaction.
//! 2. Fetch the registry's documents through a [`DocumentSource`] with the
//!    fixed [`GLOBAL_REGISTRY_RESOURCE`] descriptor. Only vendors and products
//!    are accepted.
//! 3. Validate the batch locally. Registry documents have no stored versions
//!    and no outer global IDs to lean on.
//! 4. Reconcile vendors, then products.
//! 5. Re-list both kinds and return their ORD IDs.
//!
//! The transaction commits only when every step succeeded.

use std::sync::Arc;

use ord_client::{DocumentSource, RequestContext, Resource, Webhook};
use ord_core::{Document, Product, ResourceKind, Vendor};
use ord_validation::{DocumentValidator, GlobalOrdIds, StoredResources};
use url::Url;

use crate::error::RegistryError;
use crate::reconcile::plan;
use crate::store::{GlobalRegistryStore, GlobalRegistryTx};

/// Resource ID and name the registry's documents are fetched under.
pub const GLOBAL_REGISTRY_RESOURCE: &str = "global-registry";

pub struct GlobalRegistryService {
    source: Arc<dyn DocumentSource>,
    store: Arc<dyn GlobalRegistryStore>,
    validator: DocumentValidator,
    webhook: Webhook,
    resource: Resource,
}

impl std::fmt::Debug for GlobalRegistryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalRegistryService")
            .field("webhook", &self.webhook.url)
            .finish_non_exhaustive()
    }
}

impl GlobalRegistryService {
    /// `registry_url` is the registry's well-known endpoint.
    pub fn new(source: Arc<dyn DocumentSource>, store: Arc<dyn GlobalRegistryStore>, registry_url: &Url) -> Self {
        Self {
            source,
            store,
            validator: DocumentValidator::new(),
            webhook: Webhook::open(registry_url.as_str()),
            resource: Resource::application(GLOBAL_REGISTRY_RESOURCE, GLOBAL_REGISTRY_RESOURCE),
        }
    }

    #[tracing::instrument(skip_all, fields(registry = %self.webhook.url))]
    pub async fn sync_global_resources(&self, ctx: &RequestContext) -> Result<GlobalOrdIds, RegistryError> {
        let mut tx = self.store.begin().await?;
        match self.sync_in(ctx, tx.as_mut()).await {
            Ok(ids) => {
                tx.commit().await?;
                tracing::info!(resources = ids.len(), "global registry synced");
                Ok(ids)
            }
            Err(e) => {
                tracing::warn!(error = %e, "global registry sync failed, rolling back");
                if let Err(rollback) = tx.rollback().await {
                    tracing::warn!(error = %rollback, "rollback failed");
                }
                Err(e)
            }
        }
    }

    /// ORD IDs of every persisted vendor and product.
    pub async fn list_global_resources(&self) -> Result<GlobalOrdIds, RegistryError> {
        let mut tx = self.store.begin().await?;
        match persisted_ids(tx.as_mut()).await {
            Ok(ids) => {
                tx.commit().await?;
                Ok(ids)
            }
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    tracing::warn!(error = %rollback, "rollback failed");
                }
                Err(e)
            }
        }
    }

    async fn sync_in(&self, ctx: &RequestContext, tx: &mut dyn GlobalRegistryTx) -> Result<GlobalOrdIds, RegistryError> {
        let fetched = self
            .source
            .fetch_documents(ctx, &self.resource, &self.webhook)
            .await?;
        if !fetched.failures.is_empty() {
            return Err(RegistryError::Documents(fetched.failures));
        }
        let mut documents = fetched.documents;
        if documents.iter().any(has_unsupported_resources) {
            return Err(RegistryError::UnsupportedResources);
        }

        let warnings = self.validator.validate_local(
            &mut documents,
            &fetched.base_url,
            &StoredResources::default(),
            &GlobalOrdIds::new(),
        )?;
        for warning in &warnings {
            tracing::debug!(ord_id = %warning.ord_id, code = %warning.error_type, "registry document warning");
        }

        let vendors: Vec<Vendor> = documents.iter().flat_map(|d| d.vendors.iter().cloned()).collect();
        let products: Vec<Product> = documents.iter().flat_map(|d| d.products.iter().cloned()).collect();
        reconcile_vendors(tx, &vendors).await?;
        reconcile_products(tx, &products).await?;

        persisted_ids(tx).await
    }
}

fn has_unsupported_resources(doc: &Document) -> bool {
    doc.resource_kinds_present()
        .into_iter()
        .any(|kind| !matches!(kind, ResourceKind::Vendor | ResourceKind::Product))
}

async fn reconcile_vendors(tx: &mut dyn GlobalRegistryTx, desired: &[Vendor]) -> Result<(), RegistryError> {
    let plan = plan(tx.list_vendors().await?, desired);
    tracing::debug!(
        update = plan.updates.len(),
        create = plan.creates.len(),
        delete = plan.deletes.len(),
        "reconciling vendors"
    );
    for record in &plan.updates {
        tx.update_vendor(record.id, &record.value).await?;
    }
    for vendor in &plan.creates {
        tx.create_vendor(vendor).await?;
    }
    for record in &plan.deletes {
        tx.delete_vendor(record.id).await?;
    }
    Ok(())
}

async fn reconcile_products(tx: &mut dyn GlobalRegistryTx, desired: &[Product]) -> Result<(), RegistryError> {
    let plan = plan(tx.list_products().await?, desired);
    tracing::debug!(
        update = plan.updates.len(),
        create = plan.creates.len(),
        delete = plan.deletes.len(),
        "reconciling products"
    );
    for record in &plan.updates {
        tx.update_product(record.id, &record.value).await?;
    }
    for product in &plan.creates {
        tx.create_product(product).await?;
    }
    for record in &plan.deletes {
        tx.delete_product(record.id).await?;
    }
    Ok(())
}

async fn persisted_ids(tx: &mut dyn GlobalRegistryTx) -> Result<GlobalOrdIds, RegistryError> {
    let mut ids = GlobalOrdIds::new();
    ids.extend(tx.list_vendors().await?.into_iter().map(|r| r.value.ord_id));
    ids.extend(tx.list_products().await?.into_iter().map(|r| r.value.ord_id));
    Ok(ids)
}
