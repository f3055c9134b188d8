//! CLI configuration file.
//!
//! A YAML (or JSON) file passed with `--config`. Every key is optional and
//! overrides the value `ClientConfig::from_env` produced:
//!
//! ```yaml
//! maxParallelDocuments: 8
//! timeoutSecs: 30
//! tenantHeader: x-tenant
//! validatorUrl: https://validator.internal
//! globalRegistryUrl: https://registry.internal/.well-known/open-resource-discovery
//! supportedAccessStrategies: [open]
//! ruleset: sap:core:v1
//! ignoreList:
//!   "*": [sap-ord-description-length]
//!   acme: [sap-ord-title]
//! ```

use std::path::Path;

use anyhow::{bail, Context, Result};
use ord_client::ClientConfig;
use ord_core::SupportedAccessStrategies;
use ord_validation::IgnoreList;
use serde::Deserialize;
use url::Url;

/// Ruleset requested from the delegated validator when none is configured.
pub const DEFAULT_RULESET: &str = "sap:core:v1";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct CliConfig {
    pub max_parallel_documents: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub tenant_header: Option<String>,
    pub validator_url: Option<String>,
    pub global_registry_url: Option<String>,
    pub supported_access_strategies: Option<Vec<String>>,
    pub ruleset: Option<String>,
    pub ignore_list: IgnoreList,
}

impl CliConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_yaml::from_str(&content).with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Overlay this file on top of `base`.
    pub fn apply(&self, mut base: ClientConfig) -> Result<ClientConfig> {
        if let Some(n) = self.max_parallel_documents {
            if n == 0 {
                bail!("maxParallelDocuments must be at least 1");
            }
            base.max_parallel_documents = n;
        }
        if let Some(secs) = self.timeout_secs {
            base.timeout_secs = secs;
        }
        if let Some(header) = self.tenant_header.as_ref().filter(|h| !h.trim().is_empty()) {
            base.tenant_header = header.clone();
        }
        if let Some(url) = &self.validator_url {
            base.validator_url = Some(parse_url("validatorUrl", url)?);
        }
        if let Some(url) = &self.global_registry_url {
            base.global_registry_url = Some(parse_url("globalRegistryUrl", url)?);
        }
        if let Some(names) = &self.supported_access_strategies {
            base.supported_access_strategies = SupportedAccessStrategies::new(names.iter().cloned());
        }
        Ok(base)
    }

    pub fn ruleset(&self) -> &str {
        self.ruleset.as_deref().unwrap_or(DEFAULT_RULESET)
    }
}

pub fn parse_url(name: &str, raw: &str) -> Result<Url> {
    Url::parse(raw.trim()).with_context(|| format!("{name} is not a valid URL: {raw:?}"))
}
