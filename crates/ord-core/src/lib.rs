//! # ord-core: Shared Types for the ORD Ingestion Pipeline
//!
//! This crate defines the data model that flows through every stage of the
//! pipeline: fetch, sanitize, validate, and reconcile. It depends on no other
//! `ord-*` crate.
//!
//! ## Key Design Principles
//!
//! 1. **Typed documents, semi-structured leaves.** `Document` and its resource
//!    inputs are plain serde structs. Fields whose shape the ORD format leaves
//!    open (links, labels, classification arrays) stay `serde_json::Value` and
//!    are manipulated through the helpers in [`value`].
//!
//! 2. **Immutable capability sets.** Which access strategies a deployment can
//!    execute is a `SupportedAccessStrategies` value handed to whoever needs it.
//!    There is no process-wide table.
//!
//! 3. **One hashing path.** Every structural hash flows through
//!    [`hash::structural_hash`], which canonicalizes arrays as sets so element
//!    order never changes the result.
//!
//! 4. **Validation findings are data.** `ValidationError` is a record, not an
//!    `Error` impl. Only infrastructure failures use `thiserror` enums.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `ord-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod access_strategy;
pub mod error;
pub mod hash;
pub mod model;
pub mod ord_id;
pub mod validation;
pub mod value;
pub mod version;

pub use access_strategy::{AccessStrategy, SupportedAccessStrategies, OPEN_ACCESS_STRATEGY};
pub use error::{CoreError, HashError};
pub use hash::{parse_stored_hash, structural_hash};
pub use model::{
    ApiResource, Capability, Classification, ConsumptionBundle, ConsumptionBundleReference,
    DataProduct, Document, EntityType, EventResource, IntegrationDependency, OrdResource, PackagedResource,
    Package, Perspective, Product, ResourceDefinition, ResourceKind, SystemInstance,
    SystemVersion, Tombstone, Vendor,
};
pub use ord_id::OrdId;
pub use validation::{Severity, ValidationError};
pub use version::Version;
