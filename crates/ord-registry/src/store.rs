//! # Storage Collaborator
//!
//! The registry is persisted by whatever backend the host provides. A backend
//! hands out transactions; everything a sync does happens through one
//! transaction and becomes visible only on [`GlobalRegistryTx::commit`].
//! Dropping a transaction without committing discards its changes.

use async_trait::async_trait;
use ord_core::{Product, Vendor};
use uuid::Uuid;

use crate::error::StoreError;

/// A persisted resource and its storage identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<T> {
    pub id: Uuid,
    pub value: T,
}

impl<T> Record<T> {
    pub fn new(id: Uuid, value: T) -> Self {
        Self { id, value }
    }
}

#[async_trait]
pub trait GlobalRegistryStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn GlobalRegistryTx>, StoreError>;
}

/// One unit of work against the persisted registry.
#[async_trait]
pub trait GlobalRegistryTx: Send {
    async fn list_vendors(&mut self) -> Result<Vec<Record<Vendor>>, StoreError>;
    async fn create_vendor(&mut self, vendor: &Vendor) -> Result<Uuid, StoreError>;
    async fn update_vendor(&mut self, id: Uuid, vendor: &Vendor) -> Result<(), StoreError>;
    async fn delete_vendor(&mut self, id: Uuid) -> Result<(), StoreError>;

    async fn list_products(&mut self) -> Result<Vec<Record<Product>>, StoreError>;
    async fn create_product(&mut self, product: &Product) -> Result<Uuid, StoreError>;
    async fn update_product(&mut self, id: Uuid, product: &Product) -> Result<(), StoreError>;
    async fn delete_product(&mut self, id: Uuid) -> Result<(), StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}
