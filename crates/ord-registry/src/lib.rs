//! # ord-registry: Global Vendors and Products
//!
//! The global registry publishes vendors and products that every
//! application's documents may reference without declaring them. This crate
//! keeps a persisted copy of that registry in step with what the registry
//! currently publishes, and exposes the resulting ORD IDs as
//! [`ord_validation::GlobalOrdIds`] for reference checking.
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`store`] | Storage collaborator: transaction-scoped list/create/update/delete |
//! | [`memory`] | In-process store backed by `parking_lot` |
//! | [`reconcile`] | Diff of persisted records against desired resources |
//! | [`service`] | Fetch, validate, reconcile, commit |
//!
//! Every sync runs inside one store transaction. Any failure rolls the whole
//! run back, so the persisted registry is never half-updated. Concurrent
//! syncs are not coordinated here and must be serialized by the caller.

pub mod error;
pub mod memory;
pub mod reconcile;
pub mod service;
pub mod store;

pub use error::{RegistryError, StoreError};
pub use memory::{MemoryGlobalRegistry, Operation, OperationKind};
pub use reconcile::{plan, ReconcilePlan};
pub use service::{GlobalRegistryService, GLOBAL_REGISTRY_RESOURCE};
pub use store::{GlobalRegistryStore, GlobalRegistryTx, Record};
