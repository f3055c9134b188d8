//! Webhook and resource descriptors consumed by the fetcher.
//!
//! These are the boundary shapes of the surrounding platform's webhook and
//! credential model: just enough to decide where to fetch from, how to
//! authenticate, and whether a tenant header must be sent.

use std::fmt;

use zeroize::Zeroizing;

/// Suffix of every ORD well-known endpoint.
pub const WELL_KNOWN_SUFFIX: &str = "/.well-known/open-resource-discovery";

/// What kind of object the webhook is registered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOwner {
    Application,
    ApplicationTemplate,
}

/// How the well-known configuration must be fetched.
#[derive(Clone)]
pub enum WebhookAuth {
    /// Fetch through the named access strategy executor.
    AccessStrategy(String),
    /// HTTP basic credentials.
    Basic {
        username: String,
        password: Zeroizing<String>,
    },
    /// Static bearer token.
    Bearer(Zeroizing<String>),
}

impl fmt::Debug for WebhookAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AccessStrategy(name) => f.debug_tuple("AccessStrategy").field(name).finish(),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
            Self::Bearer(_) => f.debug_tuple("Bearer").field(&"[REDACTED]").finish(),
        }
    }
}

/// Where an application's ORD configuration lives.
#[derive(Debug, Clone)]
pub struct Webhook {
    pub url: String,
    /// Internal proxy used as the fetch target instead of `url`.
    pub proxy_url: Option<String>,
    pub owner: WebhookOwner,
    pub auth: Option<WebhookAuth>,
}

impl Webhook {
    /// An unauthenticated application webhook.
    pub fn open(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            proxy_url: None,
            owner: WebhookOwner::Application,
            auth: None,
        }
    }

    /// Base URL derived from the webhook URL by stripping the well-known
    /// suffix. `None` when the URL does not end with it.
    pub fn base_url_from_url(&self) -> Option<&str> {
        self.url.strip_suffix(WELL_KNOWN_SUFFIX)
    }

    /// Whether the fetch must carry the caller's tenant.
    pub fn requires_tenant(&self, resource: &Resource) -> bool {
        self.owner == WebhookOwner::ApplicationTemplate
            && resource.resource_type != ResourceType::ApplicationTemplate
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    Application,
    ApplicationTemplate,
    ApplicationTemplateVersion,
}

/// The resource whose documents are being fetched.
#[derive(Debug, Clone)]
pub struct Resource {
    pub id: String,
    pub name: String,
    pub resource_type: ResourceType,
}

impl Resource {
    pub fn application(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            resource_type: ResourceType::Application,
        }
    }
}

/// Internal and external identifiers of the calling tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantPair {
    pub internal: String,
    pub external: String,
}

/// Per-call context handed down from the caller.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub tenant: Option<TenantPair>,
}

impl RequestContext {
    pub fn with_tenant(internal: impl Into<String>, external: impl Into<String>) -> Self {
        Self {
            tenant: Some(TenantPair {
                internal: internal.into(),
                external: external.into(),
            }),
        }
    }
}
