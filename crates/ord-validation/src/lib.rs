//! # ord-validation: Sanitize and Validate Fetched Documents
//!
//! Takes the documents produced by `ord-client` and turns them into a batch
//! the platform can trust.
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`sanitize`] | URL rewriting, policy and classification inheritance, default entry points |
//! | [`validator`] | Delegated and local validation, excision of failing resources |
//! | [`duplicates`] | Perspective-partitioned duplicate detection |
//! | [`references`] | Referential integrity across the batch and the global registry |
//! | [`hash_gate`] | Version discipline for changed content |
//! | [`base_url`] | Base URL consistency |
//! | [`rules`] | Per-kind field rule table |
//! | [`ignore`] | Namespace-aware ignore list for delegated findings |
//! | [`stored`] | Persisted versions and hashes, global ORD IDs |
//!
//! Findings are [`ord_core::ValidationError`] records. An `error` finding
//! removes the resource it names; warnings are only reported.

pub mod base_url;
pub mod duplicates;
pub mod error;
pub mod hash_gate;
pub mod ignore;
pub mod references;
pub mod rules;
pub mod sanitize;
pub mod stored;
pub mod validator;

pub use duplicates::ResourceIds;
pub use error::{RuleViolations, SanitizeError, ValidatorError};
pub use ignore::IgnoreList;
pub use sanitize::DocumentSanitizer;
pub use stored::{GlobalOrdIds, StoredResource, StoredResources};
pub use validator::{DocumentValidator, RuleValidationService};
