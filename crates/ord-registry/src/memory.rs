//! # In-Memory Registry Store
//!
//! A [`GlobalRegistryStore`] kept in process memory, used by the CLI and by
//! tests. Transactions work on a private copy of the state taken at
//! [`GlobalRegistryStore::begin`] and write it back on commit. A commit fails
//! with [`StoreError::Conflict`] when another transaction committed first.
//!
//! The shared state sits behind a `parking_lot::Mutex`. The lock is never
//! held across an `.await`: every method takes it, copies or swaps, and
//! releases it before returning.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use ord_core::{OrdResource, Product, ResourceKind, Vendor};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::{GlobalRegistryStore, GlobalRegistryTx, Record};

#[derive(Debug, Clone, Default)]
struct RegistryState {
    revision: u64,
    vendors: BTreeMap<Uuid, Vendor>,
    products: BTreeMap<Uuid, Product>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Created,
    Updated,
    Deleted,
}

/// One committed change, in commit order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub kind: OperationKind,
    pub resource: ResourceKind,
    pub id: Uuid,
    pub ord_id: String,
}

#[derive(Debug, Default)]
struct Shared {
    state: RegistryState,
    log: Vec<Operation>,
}

/// Cloneable handle; clones share the same registry.
#[derive(Debug, Clone, Default)]
pub struct MemoryGlobalRegistry {
    shared: Arc<Mutex<Shared>>,
}

impl MemoryGlobalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated without going through a transaction.
    pub fn seeded(vendors: Vec<Vendor>, products: Vec<Product>) -> Self {
        let registry = Self::new();
        {
            let mut shared = registry.shared.lock();
            for vendor in vendors {
                shared.state.vendors.insert(Uuid::new_v4(), vendor);
            }
            for product in products {
                shared.state.products.insert(Uuid::new_v4(), product);
            }
        }
        registry
    }

    pub fn vendors(&self) -> Vec<Record<Vendor>> {
        records(&self.shared.lock().state.vendors)
    }

    pub fn products(&self) -> Vec<Record<Product>> {
        records(&self.shared.lock().state.products)
    }

    /// Every committed operation so far.
    pub fn operations(&self) -> Vec<Operation> {
        self.shared.lock().log.clone()
    }

    pub fn revision(&self) -> u64 {
        self.shared.lock().state.revision
    }
}

fn records<T: Clone>(map: &BTreeMap<Uuid, T>) -> Vec<Record<T>> {
    map.iter().map(|(id, value)| Record::new(*id, value.clone())).collect()
}

#[async_trait]
impl GlobalRegistryStore for MemoryGlobalRegistry {
    async fn begin(&self) -> Result<Box<dyn GlobalRegistryTx>, StoreError> {
        let state = self.shared.lock().state.clone();
        tracing::debug!(revision = state.revision, "registry transaction started");
        Ok(Box::new(MemoryTx {
            shared: Arc::clone(&self.shared),
            state,
            pending: Vec::new(),
        }))
    }
}

struct MemoryTx {
    shared: Arc<Mutex<Shared>>,
    state: RegistryState,
    pending: Vec<Operation>,
}

impl MemoryTx {
    fn record(&mut self, kind: OperationKind, resource: ResourceKind, id: Uuid, ord_id: &str) {
        self.pending.push(Operation {
            kind,
            resource,
            id,
            ord_id: ord_id.to_string(),
        });
    }
}

fn create<T: OrdResource + Clone>(map: &mut BTreeMap<Uuid, T>, value: &T) -> Uuid {
    let id = Uuid::new_v4();
    map.insert(id, value.clone());
    id
}

fn update<T: OrdResource + Clone>(map: &mut BTreeMap<Uuid, T>, id: Uuid, value: &T) -> Result<(), StoreError> {
    match map.get_mut(&id) {
        Some(slot) => {
            *slot = value.clone();
            Ok(())
        }
        None => Err(StoreError::NotFound {
            kind: T::KIND.label(),
            id,
        }),
    }
}

fn delete<T: OrdResource>(map: &mut BTreeMap<Uuid, T>, id: Uuid) -> Result<T, StoreError> {
    map.remove(&id).ok_or(StoreError::NotFound {
        kind: T::KIND.label(),
        id,
    })
}

#[async_trait]
impl GlobalRegistryTx for MemoryTx {
    async fn list_vendors(&mut self) -> Result<Vec<Record<Vendor>>, StoreError> {
        Ok(records(&self.state.vendors))
    }

    async fn create_vendor(&mut self, vendor: &Vendor) -> Result<Uuid, StoreError> {
        let id = create(&mut self.state.vendors, vendor);
        self.record(OperationKind::Created, ResourceKind::Vendor, id, &vendor.ord_id);
        Ok(id)
    }

    async fn update_vendor(&mut self, id: Uuid, vendor: &Vendor) -> Result<(), StoreError> {
        update(&mut self.state.vendors, id, vendor)?;
        self.record(OperationKind::Updated, ResourceKind::Vendor, id, &vendor.ord_id);
        Ok(())
    }

    async fn delete_vendor(&mut self, id: Uuid) -> Result<(), StoreError> {
        let removed = delete(&mut self.state.vendors, id)?;
        self.record(OperationKind::Deleted, ResourceKind::Vendor, id, &removed.ord_id);
        Ok(())
    }

    async fn list_products(&mut self) -> Result<Vec<Record<Product>>, StoreError> {
        Ok(records(&self.state.products))
    }

    async fn create_product(&mut self, product: &Product) -> Result<Uuid, StoreError> {
        let id = create(&mut self.state.products, product);
        self.record(OperationKind::Created, ResourceKind::Product, id, &product.ord_id);
        Ok(id)
    }

    async fn update_product(&mut self, id: Uuid, product: &Product) -> Result<(), StoreError> {
        update(&mut self.state.products, id, product)?;
        self.record(OperationKind::Updated, ResourceKind::Product, id, &product.ord_id);
        Ok(())
    }

    async fn delete_product(&mut self, id: Uuid) -> Result<(), StoreError> {
        let removed = delete(&mut self.state.products, id)?;
        self.record(OperationKind::Deleted, ResourceKind::Product, id, &removed.ord_id);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryTx {
            shared,
            mut state,
            pending,
        } = *self;
        let mut shared = shared.lock();
        if shared.state.revision != state.revision {
            return Err(StoreError::Conflict {
                expected: state.revision,
            });
        }
        state.revision += 1;
        tracing::debug!(revision = state.revision, operations = pending.len(), "registry transaction committed");
        shared.state = state;
        shared.log.extend(pending);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        tracing::debug!(discarded = self.pending.len(), "registry transaction rolled back");
        Ok(())
    }
}
