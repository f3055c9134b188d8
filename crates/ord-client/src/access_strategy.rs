//! Access strategy executors and the registry that dispatches to them.
//!
//! The registry is built once from an immutable [`SupportedAccessStrategies`]
//! set. Only `open` has a built-in executor; deployments can register more
//! executors for names in the supported set. `custom` strategies are only
//! resolvable through their `customType`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use ord_core::{AccessStrategy, SupportedAccessStrategies, OPEN_ACCESS_STRATEGY};
use reqwest::header::HeaderMap;

use crate::error::AccessStrategyError;
use crate::webhook::TenantPair;

/// Performs an authenticated GET on behalf of one access strategy.
#[async_trait]
pub trait AccessStrategyExecutor: Send + Sync {
    async fn execute(
        &self,
        client: &reqwest::Client,
        url: &str,
        tenant: Option<&TenantPair>,
        headers: &HeaderMap,
    ) -> Result<reqwest::Response, reqwest::Error>;
}

/// Executor for the `open` strategy: a plain GET with the given headers.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenAccessStrategyExecutor;

#[async_trait]
impl AccessStrategyExecutor for OpenAccessStrategyExecutor {
    async fn execute(
        &self,
        client: &reqwest::Client,
        url: &str,
        _tenant: Option<&TenantPair>,
        headers: &HeaderMap,
    ) -> Result<reqwest::Response, reqwest::Error> {
        client.get(url).headers(headers.clone()).send().await
    }
}

#[derive(Clone)]
pub struct AccessStrategyRegistry {
    supported: SupportedAccessStrategies,
    executors: HashMap<String, Arc<dyn AccessStrategyExecutor>>,
}

impl fmt::Debug for AccessStrategyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.executors.keys().collect();
        names.sort();
        f.debug_struct("AccessStrategyRegistry")
            .field("supported", &self.supported)
            .field("executors", &names)
            .finish()
    }
}

impl AccessStrategyRegistry {
    pub fn new(supported: SupportedAccessStrategies) -> Self {
        let mut executors: HashMap<String, Arc<dyn AccessStrategyExecutor>> = HashMap::new();
        if supported.contains(OPEN_ACCESS_STRATEGY) {
            executors.insert(
                OPEN_ACCESS_STRATEGY.to_string(),
                Arc::new(OpenAccessStrategyExecutor),
            );
        }
        Self {
            supported,
            executors,
        }
    }

    /// Register an executor. Names outside the supported set are never
    /// resolved.
    pub fn with_executor(
        mut self,
        name: impl Into<String>,
        executor: Arc<dyn AccessStrategyExecutor>,
    ) -> Self {
        self.executors.insert(name.into(), executor);
        self
    }

    pub fn supported(&self) -> &SupportedAccessStrategies {
        &self.supported
    }

    /// Pure lookup against the supported set.
    pub fn is_supported(&self, strategy: &AccessStrategy) -> bool {
        strategy.is_supported(&self.supported)
    }

    /// First strategy of `declared` that this deployment supports.
    pub fn first_supported<'a>(&self, declared: &'a [AccessStrategy]) -> Option<&'a AccessStrategy> {
        declared.iter().find(|s| self.is_supported(s))
    }

    pub fn resolve(
        &self,
        strategy: &AccessStrategy,
    ) -> Result<Arc<dyn AccessStrategyExecutor>, AccessStrategyError> {
        let not_found = || AccessStrategyError::NotFound(describe(strategy));
        let key = strategy.lookup_key().ok_or_else(not_found)?;
        if !self.supported.contains(key) {
            return Err(not_found());
        }
        self.executors.get(key).cloned().ok_or_else(not_found)
    }

    /// Resolve by plain strategy name, as declared on a webhook.
    pub fn resolve_name(&self, name: &str) -> Result<Arc<dyn AccessStrategyExecutor>, AccessStrategyError> {
        self.resolve(&AccessStrategy {
            strategy_type: name.to_string(),
            ..AccessStrategy::default()
        })
    }
}

impl Default for AccessStrategyRegistry {
    fn default() -> Self {
        Self::new(SupportedAccessStrategies::default())
    }
}

fn describe(strategy: &AccessStrategy) -> String {
    match (&strategy.custom_type, strategy.is_custom()) {
        (Some(custom), true) => format!("custom ({custom})"),
        _ => strategy.strategy_type.clone(),
    }
}
