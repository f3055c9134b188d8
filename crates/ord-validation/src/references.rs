//! Referential integrity across the batch.
//!
//! A reference resolves when the target kind holds the ID in this run's
//! [`ResourceIds`] or the ID belongs to the global registry. Every unresolved
//! reference yields one `sap-ord-unknown-reference` finding and the
//! referencing resource is excised. Excision does not cascade: resources
//! pointing at an excised resource are not re-checked.

use ord_core::validation::UNKNOWN_REFERENCE;
use ord_core::value::string_items;
use ord_core::{
    ApiResource, Capability, DataProduct, Document, EntityType, EventResource, IntegrationDependency,
    OrdResource, Package, PackagedResource, Product, ResourceKind, ValidationError,
};

use crate::duplicates::ResourceIds;
use crate::stored::GlobalOrdIds;

/// Outgoing references of a resource as `(target kind, ORD ID)` pairs.
trait References: OrdResource {
    fn references(&self) -> Vec<(ResourceKind, &str)>;
}

fn packaged<R: PackagedResource>(resource: &R) -> Vec<(ResourceKind, &str)> {
    let mut refs: Vec<_> = resource
        .part_of_package()
        .map(|p| (ResourceKind::Package, p))
        .into_iter()
        .collect();
    if let Some(products) = resource.classification().part_of_products.as_ref().and_then(string_items) {
        refs.extend(products.into_iter().map(|p| (ResourceKind::Product, p)));
    }
    refs
}

impl References for Package {
    fn references(&self) -> Vec<(ResourceKind, &str)> {
        let mut refs = Vec::new();
        if let Some(vendor) = self.vendor.as_deref().filter(|v| !v.is_empty()) {
            refs.push((ResourceKind::Vendor, vendor));
        }
        if let Some(products) = self.classification.part_of_products.as_ref().and_then(string_items) {
            refs.extend(products.into_iter().map(|p| (ResourceKind::Product, p)));
        }
        refs
    }
}

impl References for Product {
    fn references(&self) -> Vec<(ResourceKind, &str)> {
        let mut refs = Vec::new();
        if !self.vendor.is_empty() {
            refs.push((ResourceKind::Vendor, self.vendor.as_str()));
        }
        if let Some(parent) = self.parent.as_deref() {
            refs.push((ResourceKind::Product, parent));
        }
        refs
    }
}

impl References for ApiResource {
    fn references(&self) -> Vec<(ResourceKind, &str)> {
        let mut refs = packaged(self);
        refs.extend(
            self.part_of_consumption_bundles
                .iter()
                .flatten()
                .map(|b| (ResourceKind::ConsumptionBundle, b.ord_id.as_str())),
        );
        refs
    }
}

impl References for EventResource {
    fn references(&self) -> Vec<(ResourceKind, &str)> {
        let mut refs = packaged(self);
        refs.extend(
            self.part_of_consumption_bundles
                .iter()
                .flatten()
                .map(|b| (ResourceKind::ConsumptionBundle, b.ord_id.as_str())),
        );
        refs
    }
}

macro_rules! packaged_references {
    ($($ty:ty),+) => {
        $(
            impl References for $ty {
                fn references(&self) -> Vec<(ResourceKind, &str)> {
                    packaged(self)
                }
            }
        )+
    };
}

packaged_references!(EntityType, Capability, IntegrationDependency, DataProduct);

/// Check every reference in the batch, excising resources with unresolved ones.
pub fn check_references(
    documents: &mut [Document],
    known: &ResourceIds,
    globals: &GlobalOrdIds,
) -> Vec<ValidationError> {
    let mut check = ReferenceCheck {
        known,
        globals,
        findings: Vec::new(),
    };
    for doc in documents.iter_mut() {
        check.collection(&mut doc.packages);
        check.collection(&mut doc.products);
        check.collection(&mut doc.api_resources);
        check.collection(&mut doc.event_resources);
        check.collection(&mut doc.entity_types);
        check.collection(&mut doc.capabilities);
        check.collection(&mut doc.integration_dependencies);
        check.collection(&mut doc.data_products);
    }
    if !check.findings.is_empty() {
        tracing::warn!(count = check.findings.len(), "resources with unknown references excised");
    }
    check.findings
}

struct ReferenceCheck<'a> {
    known: &'a ResourceIds,
    globals: &'a GlobalOrdIds,
    findings: Vec<ValidationError>,
}

impl ReferenceCheck<'_> {
    fn collection<R: References>(&mut self, items: &mut Vec<R>) {
        let (known, globals) = (self.known, self.globals);
        let resolves = |kind: ResourceKind, id: &str| known.contains(kind, id) || globals.contains(id);
        let findings = &mut self.findings;
        items.retain(|item| {
            let unresolved: Vec<_> = item
                .references()
                .into_iter()
                .filter(|(kind, id)| !resolves(*kind, *id))
                .collect();
            if unresolved.is_empty() {
                return true;
            }
            for (kind, id) in unresolved {
                tracing::debug!(ord_id = %item.ord_id(), reference = %id, "unknown reference");
                findings.push(ValidationError::error(
                    item.ord_id(),
                    UNKNOWN_REFERENCE,
                    format!("{} {} references unknown {kind} {id:?}", R::KIND, item.ord_id()),
                ));
            }
            false
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ord_core::ConsumptionBundleReference;

    fn known(entries: &[(ResourceKind, &str)]) -> ResourceIds {
        let mut ids = ResourceIds::default();
        for (kind, id) in entries {
            ids.insert(*kind, id);
        }
        ids
    }

    fn api(package: &str, bundle: Option<&str>) -> ApiResource {
        ApiResource {
            ord_id: "ns:apiResource:A:v1".to_string(),
            part_of_package: Some(package.to_string()),
            part_of_consumption_bundles: bundle.map(|b| {
                vec![ConsumptionBundleReference {
                    ord_id: b.to_string(),
                    default_entry_point: None,
                }]
            }),
            ..ApiResource::default()
        }
    }

    #[test]
    fn unknown_package_is_reported_once_and_excised() {
        let mut docs = vec![Document {
            api_resources: vec![api("ns:package:Missing:v1", None)],
            ..Document::default()
        }];
        let findings = check_references(&mut docs, &ResourceIds::default(), &GlobalOrdIds::new());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].error_type, UNKNOWN_REFERENCE);
        assert_eq!(findings[0].ord_id, "ns:apiResource:A:v1");
        assert!(docs[0].api_resources.is_empty());
    }

    #[test]
    fn known_and_global_ids_resolve() {
        let ids = known(&[
            (ResourceKind::Package, "ns:package:P:v1"),
            (ResourceKind::ConsumptionBundle, "ns:consumptionBundle:B:v1"),
        ]);
        let globals: GlobalOrdIds = ["sap:vendor:SAP:".to_string()].into_iter().collect();
        let mut docs = vec![Document {
            api_resources: vec![api("ns:package:P:v1", Some("ns:consumptionBundle:B:v1"))],
            products: vec![Product {
                ord_id: "ns:product:X:".to_string(),
                vendor: "sap:vendor:SAP:".to_string(),
                ..Product::default()
            }],
            ..Document::default()
        }];
        let findings = check_references(&mut docs, &ids, &globals);
        assert!(findings.is_empty(), "{findings:?}");
        assert_eq!(docs[0].api_resources.len(), 1);
        assert_eq!(docs[0].products.len(), 1);
    }

    #[test]
    fn reference_must_match_the_target_kind() {
        let ids = known(&[(ResourceKind::Product, "ns:package:P:v1")]);
        let mut docs = vec![Document {
            api_resources: vec![api("ns:package:P:v1", None)],
            ..Document::default()
        }];
        let findings = check_references(&mut docs, &ids, &GlobalOrdIds::new());
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn every_unresolved_reference_is_reported() {
        let mut docs = vec![Document {
            packages: vec![Package {
                ord_id: "ns:package:P:v1".to_string(),
                vendor: Some("ns:vendor:V:".to_string()),
                classification: ord_core::Classification {
                    part_of_products: Some(serde_json::json!(["ns:product:X:"])),
                    ..Default::default()
                },
                ..Package::default()
            }],
            ..Document::default()
        }];
        let findings = check_references(&mut docs, &ResourceIds::default(), &GlobalOrdIds::new());
        assert_eq!(findings.len(), 2);
        assert!(docs[0].packages.is_empty());
    }
}
