//! # ord-client: HTTP Side of the ORD Pipeline
//!
//! Everything that talks to the network:
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`access_strategy`] | Executors per access strategy and the registry resolving them |
//! | [`well_known`] | Well-known configuration model and its validation |
//! | [`fetcher`] | Bounded concurrent fetch of every ORD document of one application |
//! | [`validation_client`] | Delegated rule validator |
//! | [`webhook`] | Webhook, resource, and tenant descriptors handed in by callers |
//! | [`config`] | Environment-driven client configuration |
//!
//! No retries are performed here. Every request runs under the timeout of
//! the shared `reqwest::Client` built from [`ClientConfig`].

pub mod access_strategy;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod validation_client;
pub mod webhook;
pub mod well_known;

pub use access_strategy::{AccessStrategyExecutor, AccessStrategyRegistry, OpenAccessStrategyExecutor};
pub use config::{ClientConfig, ConfigError};
pub use error::{
    AccessStrategyError, DocumentFetchErrors, DocumentFetchFailure, FetchError, ValidationClientError,
};
pub use fetcher::{DocumentFetcher, DocumentSource, FetchedDocuments, MAX_DOCUMENT_BYTES};
pub use validation_client::{ValidationClient, ValidationResult};
pub use webhook::{
    RequestContext, Resource, ResourceType, TenantPair, Webhook, WebhookAuth, WebhookOwner,
    WELL_KNOWN_SUFFIX,
};
pub use well_known::{DocumentDescriptor, WellKnownConfig, WellKnownError};
