//! Duplicate detection with perspective partitions.
//!
//! The same ORD ID may be declared once by a system-instance document and
//! once by a system-version document. Within either partition a second
//! declaration is an error and is excised; the first one stays.
//!
//! Three passes run in order: system-instance documents (forbid),
//! system-version documents (forbid), all documents (record only). The seen
//! sets of all passes are merged by union into [`ResourceIds`].
//!
//! Packages are partitioned like every other kind. Checking them across the
//! whole batch would reject a package declared by both a system-instance and
//! a system-version document, which the perspective exemption allows.

use std::collections::{HashMap, HashSet};

use ord_core::validation::DUPLICATE_RESOURCE;
use ord_core::{Document, OrdResource, Perspective, ResourceKind, ValidationError};

use crate::rules::PackagePolicyLevels;

/// Existence sets per resource kind for one validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceIds(HashMap<ResourceKind, HashSet<String>>);

impl ResourceIds {
    /// Record an ID. Returns `false` if it was already present.
    pub fn insert(&mut self, kind: ResourceKind, ord_id: &str) -> bool {
        self.0.entry(kind).or_default().insert(ord_id.to_string())
    }

    pub fn contains(&self, kind: ResourceKind, ord_id: &str) -> bool {
        self.0.get(&kind).is_some_and(|ids| ids.contains(ord_id))
    }

    pub fn merge(&mut self, other: ResourceIds) {
        for (kind, ids) in other.0 {
            self.0.entry(kind).or_default().extend(ids);
        }
    }

    pub fn len(&self, kind: ResourceKind) -> usize {
        self.0.get(&kind).map_or(0, HashSet::len)
    }
}

/// Policy level of every package in the batch. The first declaration of a
/// package ORD ID wins.
pub fn index_packages(documents: &[Document]) -> PackagePolicyLevels {
    let mut levels = PackagePolicyLevels::new();
    for pkg in documents.iter().flat_map(|d| d.packages.iter()) {
        levels
            .entry(pkg.ord_id.clone())
            .or_insert_with(|| pkg.policy_level.clone());
    }
    levels
}

/// Run the three passes, excising duplicates inside each perspective.
pub fn detect_duplicates(documents: &mut [Document]) -> (ResourceIds, Vec<ValidationError>) {
    let mut findings = Vec::new();
    let mut seen = ResourceIds::default();

    for (perspective, forbid) in [
        (Some(Perspective::SystemInstance), true),
        (Some(Perspective::SystemVersion), true),
        (None, false),
    ] {
        let mut pass = Pass {
            ids: ResourceIds::default(),
            forbid,
            findings: &mut findings,
        };
        for doc in documents
            .iter_mut()
            .filter(|d| perspective.map_or(true, |p| d.perspective == p))
        {
            pass.document(doc);
        }
        seen.merge(pass.ids);
    }

    if !findings.is_empty() {
        tracing::warn!(count = findings.len(), "duplicate resources excised");
    }
    (seen, findings)
}

struct Pass<'a> {
    ids: ResourceIds,
    forbid: bool,
    findings: &'a mut Vec<ValidationError>,
}

impl Pass<'_> {
    fn document(&mut self, doc: &mut Document) {
        let perspective = doc.perspective;
        self.collection(&mut doc.packages, perspective);
        self.collection(&mut doc.consumption_bundles, perspective);
        self.collection(&mut doc.products, perspective);
        self.collection(&mut doc.api_resources, perspective);
        self.collection(&mut doc.event_resources, perspective);
        self.collection(&mut doc.entity_types, perspective);
        self.collection(&mut doc.capabilities, perspective);
        self.collection(&mut doc.integration_dependencies, perspective);
        self.collection(&mut doc.data_products, perspective);
        self.collection(&mut doc.vendors, perspective);
    }

    fn collection<R: OrdResource>(&mut self, items: &mut Vec<R>, perspective: Perspective) {
        items.retain(|item| {
            if self.ids.insert(R::KIND, item.ord_id()) || !self.forbid {
                return true;
            }
            tracing::debug!(ord_id = %item.ord_id(), kind = %R::KIND, %perspective, "duplicate resource");
            self.findings.push(ValidationError::error(
                item.ord_id(),
                DUPLICATE_RESOURCE,
                format!("{} {} is declared more than once in {perspective} documents", R::KIND, item.ord_id()),
            ));
            false
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ord_core::Package;

    fn doc(perspective: Perspective, packages: &[&str]) -> Document {
        Document {
            perspective,
            packages: packages
                .iter()
                .map(|id| Package {
                    ord_id: id.to_string(),
                    ..Package::default()
                })
                .collect(),
            ..Document::default()
        }
    }

    #[test]
    fn same_id_across_perspectives_is_allowed() {
        let mut docs = vec![
            doc(Perspective::SystemVersion, &["ns:package:P:v1"]),
            doc(Perspective::SystemInstance, &["ns:package:P:v1"]),
        ];
        let (ids, findings) = detect_duplicates(&mut docs);
        assert!(findings.is_empty());
        assert!(ids.contains(ResourceKind::Package, "ns:package:P:v1"));
        assert_eq!(docs[0].packages.len() + docs[1].packages.len(), 2);
    }

    #[test]
    fn same_id_within_a_perspective_is_reported_once() {
        let mut docs = vec![
            doc(Perspective::SystemInstance, &["ns:package:P:v1"]),
            doc(Perspective::SystemInstance, &["ns:package:P:v1"]),
        ];
        let (ids, findings) = detect_duplicates(&mut docs);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].error_type, DUPLICATE_RESOURCE);
        assert_eq!(docs[0].packages.len(), 1);
        assert!(docs[1].packages.is_empty());
        assert_eq!(ids.len(ResourceKind::Package), 1);
    }

    #[test]
    fn duplicates_inside_one_document_are_excised() {
        let mut docs = vec![doc(Perspective::SystemVersion, &["a", "b", "a", "a"])];
        let (_, findings) = detect_duplicates(&mut docs);
        assert_eq!(findings.len(), 2);
        let ids: Vec<_> = docs[0].packages.iter().map(|p| p.ord_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn package_index_keeps_first_policy_level() {
        let mut first = doc(Perspective::SystemInstance, &["p"]);
        first.packages[0].policy_level = Some("sap:core:v1".to_string());
        let mut second = doc(Perspective::SystemVersion, &["p"]);
        second.packages[0].policy_level = Some("custom".to_string());
        let levels = index_packages(&[first, second]);
        assert_eq!(levels["p"].as_deref(), Some("sap:core:v1"));
    }
}
