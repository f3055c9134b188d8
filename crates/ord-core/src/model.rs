//! # ORD Document Model
//!
//! Serde representation of one ORD document and every resource input it can
//! declare. Field names follow the ORD JSON format (`camelCase`); missing
//! fields deserialize to their defaults so that rule validation, not parsing,
//! decides what is required.
//!
//! Fields whose content the ORD format leaves open (links, labels,
//! classification arrays, changelog entries, extensibility) are kept as
//! `serde_json::Value` and handled with [`crate::value`].

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::access_strategy::AccessStrategy;

// -- Perspective --------------------------------------------------------------

/// Whether a document describes a static system instance or evolves with the
/// deployed system version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Perspective {
    #[serde(rename = "system-version")]
    SystemVersion,
    #[default]
    #[serde(rename = "system-instance")]
    SystemInstance,
}

impl Perspective {
    /// Map a descriptor value: `system-version` is the only value that selects
    /// the system-version perspective, everything else (including absence) is
    /// system-instance.
    pub fn from_descriptor(value: Option<&str>) -> Self {
        match value {
            Some("system-version") => Self::SystemVersion,
            _ => Self::SystemInstance,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SystemVersion => "system-version",
            Self::SystemInstance => "system-instance",
        }
    }
}

impl<'de> Deserialize<'de> for Perspective {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(Self::from_descriptor(raw.as_deref()))
    }
}

impl fmt::Display for Perspective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// -- Resource kinds -----------------------------------------------------------

/// Every resource collection a document can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Package,
    ConsumptionBundle,
    Product,
    Vendor,
    Api,
    Event,
    EntityType,
    Capability,
    IntegrationDependency,
    DataProduct,
    Tombstone,
}

impl ResourceKind {
    /// Human label used in finding descriptions.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Package => "package",
            Self::ConsumptionBundle => "bundle",
            Self::Product => "product",
            Self::Vendor => "vendor",
            Self::Api => "api",
            Self::Event => "event",
            Self::EntityType => "entity type",
            Self::Capability => "capability",
            Self::IntegrationDependency => "integration dependency",
            Self::DataProduct => "data product",
            Self::Tombstone => "tombstone",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// -- Shared pieces ------------------------------------------------------------

/// Classification metadata shared by packages and every packaged resource.
///
/// Array fields hold JSON arrays of strings; `labels` holds a JSON object of
/// string keys to arrays of strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Classification {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_of_products: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countries: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_of_business: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Value>,
}

/// A machine-readable definition attached to an API, event, or capability.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceDefinition {
    #[serde(rename = "type")]
    pub definition_type: String,
    pub custom_type: Option<String>,
    pub media_type: String,
    pub url: String,
    pub access_strategies: Vec<AccessStrategy>,
}

/// Reference from an API or event to a consumption bundle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConsumptionBundleReference {
    pub ord_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_entry_point: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SystemInstance {
    pub base_url: Option<String>,
    pub labels: Option<Value>,
    pub correlation_ids: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SystemVersion {
    pub version: Option<String>,
    pub title: Option<String>,
}

// -- Document -----------------------------------------------------------------

/// One fetched ORD document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Document {
    #[serde(rename = "$schema")]
    pub schema: Option<String>,
    pub open_resource_discovery: String,
    pub description: Option<String>,
    pub perspective: Perspective,
    pub described_system_instance: Option<SystemInstance>,
    pub described_system_version: Option<SystemVersion>,
    pub policy_level: Option<String>,
    pub custom_policy_level: Option<String>,
    pub packages: Vec<Package>,
    pub consumption_bundles: Vec<ConsumptionBundle>,
    pub products: Vec<Product>,
    pub api_resources: Vec<ApiResource>,
    pub event_resources: Vec<EventResource>,
    pub entity_types: Vec<EntityType>,
    pub tombstones: Vec<Tombstone>,
    pub vendors: Vec<Vendor>,
    pub capabilities: Vec<Capability>,
    pub integration_dependencies: Vec<IntegrationDependency>,
    pub data_products: Vec<DataProduct>,
}

impl Document {
    /// Resource kinds with at least one entry, in declaration order.
    pub fn resource_kinds_present(&self) -> Vec<ResourceKind> {
        let counts = [
            (ResourceKind::Package, self.packages.len()),
            (ResourceKind::ConsumptionBundle, self.consumption_bundles.len()),
            (ResourceKind::Product, self.products.len()),
            (ResourceKind::Vendor, self.vendors.len()),
            (ResourceKind::Api, self.api_resources.len()),
            (ResourceKind::Event, self.event_resources.len()),
            (ResourceKind::EntityType, self.entity_types.len()),
            (ResourceKind::Capability, self.capabilities.len()),
            (ResourceKind::IntegrationDependency, self.integration_dependencies.len()),
            (ResourceKind::DataProduct, self.data_products.len()),
            (ResourceKind::Tombstone, self.tombstones.len()),
        ];
        counts
            .into_iter()
            .filter(|(_, n)| *n > 0)
            .map(|(kind, _)| kind)
            .collect()
    }

    /// The described system instance's base URL, if declared.
    pub fn described_base_url(&self) -> Option<&str> {
        self.described_system_instance
            .as_ref()
            .and_then(|s| s.base_url.as_deref())
    }

    /// Remove the first resource carrying `ord_id`.
    ///
    /// Collections are scanned in a fixed order (APIs, events, entity types,
    /// capabilities, data products, integration dependencies, vendors,
    /// products, packages, bundles, tombstones) and only the first match is
    /// removed. Returns the kind that was removed.
    pub fn remove_resource(&mut self, ord_id: &str) -> Option<ResourceKind> {
        if remove_first(&mut self.api_resources, |r| r.ord_id == ord_id) {
            return Some(ResourceKind::Api);
        }
        if remove_first(&mut self.event_resources, |r| r.ord_id == ord_id) {
            return Some(ResourceKind::Event);
        }
        if remove_first(&mut self.entity_types, |r| r.ord_id == ord_id) {
            return Some(ResourceKind::EntityType);
        }
        if remove_first(&mut self.capabilities, |r| r.ord_id == ord_id) {
            return Some(ResourceKind::Capability);
        }
        if remove_first(&mut self.data_products, |r| r.ord_id == ord_id) {
            return Some(ResourceKind::DataProduct);
        }
        if remove_first(&mut self.integration_dependencies, |r| r.ord_id == ord_id) {
            return Some(ResourceKind::IntegrationDependency);
        }
        if remove_first(&mut self.vendors, |r| r.ord_id == ord_id) {
            return Some(ResourceKind::Vendor);
        }
        if remove_first(&mut self.products, |r| r.ord_id == ord_id) {
            return Some(ResourceKind::Product);
        }
        if remove_first(&mut self.packages, |r| r.ord_id == ord_id) {
            return Some(ResourceKind::Package);
        }
        if remove_first(&mut self.consumption_bundles, |r| r.ord_id == ord_id) {
            return Some(ResourceKind::ConsumptionBundle);
        }
        if remove_first(&mut self.tombstones, |r| r.ord_id == ord_id) {
            return Some(ResourceKind::Tombstone);
        }
        None
    }
}

fn remove_first<T>(items: &mut Vec<T>, matches: impl Fn(&T) -> bool) -> bool {
    match items.iter().position(matches) {
        Some(idx) => {
            items.remove(idx);
            true
        }
        None => false,
    }
}

// -- Resource inputs ----------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Package {
    pub ord_id: String,
    pub title: String,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub version: String,
    pub policy_level: Option<String>,
    pub custom_policy_level: Option<String>,
    pub package_links: Option<Value>,
    pub links: Option<Value>,
    pub license_type: Option<String>,
    pub support_info: Option<String>,
    pub vendor: Option<String>,
    #[serde(flatten)]
    pub classification: Classification,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConsumptionBundle {
    pub ord_id: String,
    pub title: String,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    pub last_update: Option<String>,
    pub links: Option<Value>,
    pub labels: Option<Value>,
    pub credential_exchange_strategies: Option<Value>,
    pub correlation_ids: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
    pub ord_id: String,
    pub title: String,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub vendor: String,
    pub parent: Option<String>,
    pub correlation_ids: Option<Value>,
    pub labels: Option<Value>,
    pub tags: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Vendor {
    pub ord_id: String,
    pub title: String,
    pub partners: Option<Value>,
    pub labels: Option<Value>,
    pub tags: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Tombstone {
    pub ord_id: String,
    pub removal_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiResource {
    pub ord_id: String,
    pub local_id: Option<String>,
    pub title: String,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub version: String,
    pub last_update: Option<String>,
    pub visibility: Option<String>,
    pub release_status: Option<String>,
    pub sunset_date: Option<String>,
    pub successors: Option<Value>,
    pub changelog_entries: Option<Value>,
    pub entry_points: Option<Value>,
    pub part_of_package: Option<String>,
    pub part_of_consumption_bundles: Option<Vec<ConsumptionBundleReference>>,
    pub api_protocol: Option<String>,
    pub api_resource_links: Option<Value>,
    pub links: Option<Value>,
    pub resource_definitions: Vec<ResourceDefinition>,
    pub implementation_standard: Option<String>,
    pub custom_implementation_standard: Option<String>,
    pub custom_implementation_standard_description: Option<String>,
    pub extensible: Option<Value>,
    pub policy_level: Option<String>,
    pub custom_policy_level: Option<String>,
    #[serde(flatten)]
    pub classification: Classification,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventResource {
    pub ord_id: String,
    pub local_id: Option<String>,
    pub title: String,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub version: String,
    pub last_update: Option<String>,
    pub visibility: Option<String>,
    pub release_status: Option<String>,
    pub sunset_date: Option<String>,
    pub successors: Option<Value>,
    pub changelog_entries: Option<Value>,
    pub part_of_package: Option<String>,
    pub part_of_consumption_bundles: Option<Vec<ConsumptionBundleReference>>,
    pub event_resource_links: Option<Value>,
    pub links: Option<Value>,
    pub resource_definitions: Vec<ResourceDefinition>,
    pub implementation_standard: Option<String>,
    pub custom_implementation_standard: Option<String>,
    pub custom_implementation_standard_description: Option<String>,
    pub extensible: Option<Value>,
    pub policy_level: Option<String>,
    pub custom_policy_level: Option<String>,
    #[serde(flatten)]
    pub classification: Classification,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntityType {
    pub ord_id: String,
    pub local_id: Option<String>,
    pub title: String,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub version: String,
    pub last_update: Option<String>,
    pub visibility: Option<String>,
    pub release_status: Option<String>,
    pub sunset_date: Option<String>,
    pub successors: Option<Value>,
    pub changelog_entries: Option<Value>,
    pub part_of_package: Option<String>,
    pub links: Option<Value>,
    pub extensible: Option<Value>,
    pub policy_level: Option<String>,
    pub custom_policy_level: Option<String>,
    #[serde(flatten)]
    pub classification: Classification,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Capability {
    pub ord_id: String,
    pub local_id: Option<String>,
    #[serde(rename = "type")]
    pub capability_type: Option<String>,
    pub custom_type: Option<String>,
    pub title: String,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub version: String,
    pub last_update: Option<String>,
    pub visibility: Option<String>,
    pub release_status: Option<String>,
    pub part_of_package: Option<String>,
    pub definitions: Vec<ResourceDefinition>,
    pub links: Option<Value>,
    pub policy_level: Option<String>,
    pub custom_policy_level: Option<String>,
    #[serde(flatten)]
    pub classification: Classification,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IntegrationDependency {
    pub ord_id: String,
    pub local_id: Option<String>,
    pub title: String,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub version: String,
    pub last_update: Option<String>,
    pub visibility: Option<String>,
    pub release_status: Option<String>,
    pub mandatory: Option<bool>,
    pub part_of_package: Option<String>,
    pub aspects: Option<Value>,
    pub links: Option<Value>,
    pub policy_level: Option<String>,
    pub custom_policy_level: Option<String>,
    #[serde(flatten)]
    pub classification: Classification,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataProduct {
    pub ord_id: String,
    pub local_id: Option<String>,
    pub title: String,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub version: String,
    pub last_update: Option<String>,
    pub visibility: Option<String>,
    pub release_status: Option<String>,
    #[serde(rename = "type")]
    pub product_type: Option<String>,
    pub category: Option<String>,
    pub part_of_package: Option<String>,
    pub entity_types: Option<Value>,
    pub input_ports: Option<Value>,
    pub output_ports: Option<Value>,
    pub responsible: Option<String>,
    pub data_product_links: Option<Value>,
    pub changelog_entries: Option<Value>,
    pub links: Option<Value>,
    pub policy_level: Option<String>,
    pub custom_policy_level: Option<String>,
    #[serde(flatten)]
    pub classification: Classification,
}

// -- Packaged resources -------------------------------------------------------

/// Anything carried in one of the document's resource collections.
pub trait OrdResource {
    const KIND: ResourceKind;

    fn ord_id(&self) -> &str;
}

macro_rules! impl_ord_resource {
    ($($ty:ty => $kind:ident),+ $(,)?) => {
        $(
            impl OrdResource for $ty {
                const KIND: ResourceKind = ResourceKind::$kind;

                fn ord_id(&self) -> &str {
                    &self.ord_id
                }
            }
        )+
    };
}

impl_ord_resource!(
    Package => Package,
    ConsumptionBundle => ConsumptionBundle,
    Product => Product,
    Vendor => Vendor,
    ApiResource => Api,
    EventResource => Event,
    EntityType => EntityType,
    Capability => Capability,
    IntegrationDependency => IntegrationDependency,
    DataProduct => DataProduct,
    Tombstone => Tombstone,
);

/// A resource that belongs to a package and inherits from it.
///
/// Implemented by APIs, events, entity types, capabilities, integration
/// dependencies, and data products.
pub trait PackagedResource: OrdResource {
    fn part_of_package(&self) -> Option<&str>;
    fn policy_level(&self) -> Option<&str>;
    fn version(&self) -> &str;
    fn classification(&self) -> &Classification;
    fn classification_mut(&mut self) -> &mut Classification;

    /// Set policy level and custom policy level together.
    fn set_policy_level(&mut self, level: Option<String>, custom: Option<String>);

    /// Adopt the given policy level if none is declared.
    fn inherit_policy_level(&mut self, level: Option<&str>, custom: Option<&str>) {
        if self.policy_level().is_none() && level.is_some() {
            self.set_policy_level(level.map(str::to_string), custom.map(str::to_string));
        }
    }
}

macro_rules! impl_packaged_resource {
    ($ty:ty) => {
        impl PackagedResource for $ty {
            fn part_of_package(&self) -> Option<&str> {
                self.part_of_package.as_deref()
            }

            fn policy_level(&self) -> Option<&str> {
                self.policy_level.as_deref()
            }

            fn version(&self) -> &str {
                &self.version
            }

            fn classification(&self) -> &Classification {
                &self.classification
            }

            fn classification_mut(&mut self) -> &mut Classification {
                &mut self.classification
            }

            fn set_policy_level(&mut self, level: Option<String>, custom: Option<String>) {
                self.policy_level = level;
                self.custom_policy_level = custom;
            }
        }
    };
}

impl_packaged_resource!(ApiResource);
impl_packaged_resource!(EventResource);
impl_packaged_resource!(EntityType);
impl_packaged_resource!(Capability);
impl_packaged_resource!(IntegrationDependency);
impl_packaged_resource!(DataProduct);
