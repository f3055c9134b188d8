//! Access strategies declared on well-known document descriptors and
//! resource definitions, and the immutable set of strategies a deployment
//! is able to execute.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The unauthenticated strategy. The only one executable out of the box.
pub const OPEN_ACCESS_STRATEGY: &str = "open";

/// Strategy type that defers to `customType`.
pub const CUSTOM_ACCESS_STRATEGY: &str = "custom";

/// One declared access strategy: `{type, customType, customDescription}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccessStrategy {
    #[serde(rename = "type")]
    pub strategy_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_description: Option<String>,
}

impl AccessStrategy {
    /// An `open` strategy.
    pub fn open() -> Self {
        Self {
            strategy_type: OPEN_ACCESS_STRATEGY.to_string(),
            ..Self::default()
        }
    }

    /// Whether the declared type is `custom`.
    pub fn is_custom(&self) -> bool {
        self.strategy_type == CUSTOM_ACCESS_STRATEGY
    }

    /// The name used for lookups: `customType` for custom strategies,
    /// `type` otherwise. A custom strategy without a `customType` has no key.
    pub fn lookup_key(&self) -> Option<&str> {
        if self.is_custom() {
            self.custom_type.as_deref().filter(|t| !t.is_empty())
        } else if self.strategy_type.is_empty() {
            None
        } else {
            Some(&self.strategy_type)
        }
    }

    /// Pure lookup against a capability set.
    pub fn is_supported(&self, supported: &SupportedAccessStrategies) -> bool {
        self.lookup_key().is_some_and(|key| supported.contains(key))
    }
}

/// The set of access strategy names a deployment can execute.
///
/// Built once at startup and passed by value or reference to whoever needs
/// it. `custom` is never a member: custom strategies are only supported
/// through their `customType`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedAccessStrategies(BTreeSet<String>);

impl SupportedAccessStrategies {
    /// Build a set from strategy names. Empty names and `custom` are dropped.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            names
                .into_iter()
                .map(Into::into)
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty() && n != CUSTOM_ACCESS_STRATEGY)
                .collect(),
        )
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for SupportedAccessStrategies {
    fn default() -> Self {
        Self::new([OPEN_ACCESS_STRATEGY])
    }
}
