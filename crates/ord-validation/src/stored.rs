//! Previously persisted state the validator compares against.

use std::collections::{BTreeMap, HashSet};

use ord_core::ResourceKind;
use serde::{Deserialize, Serialize};

/// ORD IDs known to the tenant-independent global registry. Any reference to
/// one of them always resolves.
pub type GlobalOrdIds = HashSet<String>;

/// Version and structural hash of a resource as last persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoredResource {
    pub version: String,
    /// Base-10 `u64`. Empty when no hash was recorded.
    pub hash: String,
}

impl StoredResource {
    pub fn new(version: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            hash: hash.into(),
        }
    }
}

/// Persisted resources keyed by ORD ID, one map per hash-gated kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoredResources {
    pub packages: BTreeMap<String, StoredResource>,
    pub apis: BTreeMap<String, StoredResource>,
    pub events: BTreeMap<String, StoredResource>,
    pub entity_types: BTreeMap<String, StoredResource>,
    pub capabilities: BTreeMap<String, StoredResource>,
    pub integration_dependencies: BTreeMap<String, StoredResource>,
    pub data_products: BTreeMap<String, StoredResource>,
}

impl StoredResources {
    fn map(&self, kind: ResourceKind) -> Option<&BTreeMap<String, StoredResource>> {
        match kind {
            ResourceKind::Package => Some(&self.packages),
            ResourceKind::Api => Some(&self.apis),
            ResourceKind::Event => Some(&self.events),
            ResourceKind::EntityType => Some(&self.entity_types),
            ResourceKind::Capability => Some(&self.capabilities),
            ResourceKind::IntegrationDependency => Some(&self.integration_dependencies),
            ResourceKind::DataProduct => Some(&self.data_products),
            _ => None,
        }
    }

    fn map_mut(&mut self, kind: ResourceKind) -> Option<&mut BTreeMap<String, StoredResource>> {
        match kind {
            ResourceKind::Package => Some(&mut self.packages),
            ResourceKind::Api => Some(&mut self.apis),
            ResourceKind::Event => Some(&mut self.events),
            ResourceKind::EntityType => Some(&mut self.entity_types),
            ResourceKind::Capability => Some(&mut self.capabilities),
            ResourceKind::IntegrationDependency => Some(&mut self.integration_dependencies),
            ResourceKind::DataProduct => Some(&mut self.data_products),
            _ => None,
        }
    }

    pub fn get(&self, kind: ResourceKind, ord_id: &str) -> Option<&StoredResource> {
        self.map(kind)?.get(ord_id)
    }

    /// Record a resource. Kinds that are not hash-gated are ignored.
    pub fn insert(&mut self, kind: ResourceKind, ord_id: impl Into<String>, stored: StoredResource) {
        if let Some(map) = self.map_mut(kind) {
            map.insert(ord_id.into(), stored);
        }
    }

    pub fn is_empty(&self) -> bool {
        [
            &self.packages,
            &self.apis,
            &self.events,
            &self.entity_types,
            &self.capabilities,
            &self.integration_dependencies,
            &self.data_products,
        ]
        .iter()
        .all(|m| m.is_empty())
    }
}
