//! Client configuration.
//!
//! Controls fetch parallelism, the HTTP deadline, the tenant header, and the
//! optional validator and global registry endpoints. Defaults suit a single
//! aggregator instance; override via environment variables or explicit
//! construction for tests.

use std::time::Duration;

use ord_core::SupportedAccessStrategies;
use url::Url;

/// Default parallelism for document fetches of one application.
pub const DEFAULT_MAX_PARALLEL_DOCUMENTS: usize = 4;
/// Default request deadline.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
/// Default header carrying the external tenant ID.
pub const DEFAULT_TENANT_HEADER: &str = "Tenant";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Upper bound on in-flight document fetches per application.
    pub max_parallel_documents: usize,
    /// Request timeout in seconds, applied by the HTTP client to every call.
    pub timeout_secs: u64,
    /// Header name used to forward the external tenant.
    pub tenant_header: String,
    /// Base URL of the delegated rule validator, when one is deployed.
    pub validator_url: Option<Url>,
    /// Well-known URL of the global registry, when one is deployed.
    pub global_registry_url: Option<Url>,
    pub supported_access_strategies: SupportedAccessStrategies,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_parallel_documents: DEFAULT_MAX_PARALLEL_DOCUMENTS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            tenant_header: DEFAULT_TENANT_HEADER.to_string(),
            validator_url: None,
            global_registry_url: None,
            supported_access_strategies: SupportedAccessStrategies::default(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `ORD_MAX_PARALLEL_DOCUMENTS_PER_APPLICATION` (default: 4, at least 1)
    /// - `ORD_CLIENT_TIMEOUT_SECS` (default: 120)
    /// - `ORD_TENANT_HEADER` (default: `Tenant`)
    /// - `ORD_VALIDATOR_URL` (optional)
    /// - `ORD_GLOBAL_REGISTRY_URL` (optional)
    /// - `ORD_SUPPORTED_ACCESS_STRATEGIES` (comma separated, default: `open`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ClientConfig::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            max_parallel_documents: match lookup("ORD_MAX_PARALLEL_DOCUMENTS_PER_APPLICATION") {
                Some(raw) => parse_parallelism("ORD_MAX_PARALLEL_DOCUMENTS_PER_APPLICATION", &raw)?,
                None => defaults.max_parallel_documents,
            },
            timeout_secs: match lookup("ORD_CLIENT_TIMEOUT_SECS") {
                Some(raw) => raw.trim().parse().map_err(|_| {
                    ConfigError::InvalidValue("ORD_CLIENT_TIMEOUT_SECS".to_string(), raw.clone())
                })?,
                None => defaults.timeout_secs,
            },
            tenant_header: lookup("ORD_TENANT_HEADER")
                .filter(|h| !h.trim().is_empty())
                .unwrap_or(defaults.tenant_header),
            validator_url: optional_url("ORD_VALIDATOR_URL", lookup("ORD_VALIDATOR_URL"))?,
            global_registry_url: optional_url(
                "ORD_GLOBAL_REGISTRY_URL",
                lookup("ORD_GLOBAL_REGISTRY_URL"),
            )?,
            supported_access_strategies: match lookup("ORD_SUPPORTED_ACCESS_STRATEGIES") {
                Some(raw) => SupportedAccessStrategies::new(raw.split(',')),
                None => defaults.supported_access_strategies,
            },
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn parse_parallelism(var: &str, raw: &str) -> Result<usize, ConfigError> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(ConfigError::InvalidValue(var.to_string(), raw.to_string())),
    }
}

fn optional_url(var: &str, raw: Option<String>) -> Result<Option<Url>, ConfigError> {
    match raw.filter(|r| !r.trim().is_empty()) {
        Some(raw) => Url::parse(raw.trim())
            .map(Some)
            .map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string())),
        None => Ok(None),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid value for {0}: {1:?}")]
    InvalidValue(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        let cfg = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.max_parallel_documents, 4);
        assert_eq!(cfg.timeout_secs, 120);
        assert_eq!(cfg.tenant_header, "Tenant");
        assert!(cfg.validator_url.is_none());
        assert!(cfg.supported_access_strategies.contains("open"));
    }

    #[test]
    fn reads_all_variables() {
        let cfg = ClientConfig::from_lookup(lookup(&[
            ("ORD_MAX_PARALLEL_DOCUMENTS_PER_APPLICATION", "10"),
            ("ORD_CLIENT_TIMEOUT_SECS", "5"),
            ("ORD_TENANT_HEADER", "x-tenant"),
            ("ORD_VALIDATOR_URL", "http://validator.local:8080"),
            ("ORD_GLOBAL_REGISTRY_URL", "https://registry.example.com/.well-known/open-resource-discovery"),
            ("ORD_SUPPORTED_ACCESS_STRATEGIES", "open, acme:mtls:v1"),
        ]))
        .unwrap();
        assert_eq!(cfg.max_parallel_documents, 10);
        assert_eq!(cfg.timeout(), Duration::from_secs(5));
        assert_eq!(cfg.tenant_header, "x-tenant");
        assert_eq!(cfg.validator_url.unwrap().as_str(), "http://validator.local:8080/");
        assert!(cfg.global_registry_url.is_some());
        assert!(cfg.supported_access_strategies.contains("acme:mtls:v1"));
    }

    #[test]
    fn rejects_zero_parallelism() {
        let err = ClientConfig::from_lookup(lookup(&[(
            "ORD_MAX_PARALLEL_DOCUMENTS_PER_APPLICATION",
            "0",
        )]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(var, _) if var == "ORD_MAX_PARALLEL_DOCUMENTS_PER_APPLICATION"));
    }

    #[test]
    fn rejects_invalid_url() {
        let err = ClientConfig::from_lookup(lookup(&[("ORD_VALIDATOR_URL", "not a url")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl(..)));
    }
}
