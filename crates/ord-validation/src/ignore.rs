//! Namespace-aware list of finding codes that never excise.
//!
//! Keys are application namespaces (`sap.s4`, `acme`) or `*` for every
//! namespace; values are the codes to ignore. An ignored finding is still
//! reported, it just does not remove the resource.

use std::collections::{BTreeMap, BTreeSet};

use ord_core::OrdId;
use serde::{Deserialize, Serialize};

/// Key matching every namespace.
pub const ANY_NAMESPACE: &str = "*";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IgnoreList(BTreeMap<String, BTreeSet<String>>);

impl IgnoreList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, namespace: impl Into<String>, codes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.0
            .entry(namespace.into())
            .or_default()
            .extend(codes.into_iter().map(Into::into));
        self
    }

    fn lists(&self, namespace: &str, code: &str) -> bool {
        self.0.get(namespace).is_some_and(|codes| codes.contains(code))
    }

    /// Whether `code` is ignored for the application namespace, the
    /// namespace of `ord_id`, or every namespace.
    pub fn is_ignored(&self, app_namespace: &str, ord_id: &str, code: &str) -> bool {
        if self.lists(ANY_NAMESPACE, code) {
            return true;
        }
        if !app_namespace.is_empty() && self.lists(app_namespace, code) {
            return true;
        }
        OrdId::parse(ord_id).is_ok_and(|id| self.lists(id.namespace(), code))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_by_app_namespace_resource_namespace_or_wildcard() {
        let list = IgnoreList::new()
            .with("sap.s4", ["sap-ord-api-title"])
            .with("*", ["ord-warning-only"])
            .with("acme", ["acme-rule"]);

        assert!(list.is_ignored("sap.s4", "", "sap-ord-api-title"));
        assert!(!list.is_ignored("sap.c4c", "", "sap-ord-api-title"));
        assert!(list.is_ignored("", "acme:apiResource:A:v1", "acme-rule"));
        assert!(list.is_ignored("anything", "x", "ord-warning-only"));
        assert!(!list.is_ignored("", "not-an-ord-id", "acme-rule"));
    }

    #[test]
    fn deserializes_from_plain_map() {
        let list: IgnoreList = serde_json::from_str(r#"{"sap.s4": ["a", "b"]}"#).unwrap();
        assert!(list.is_ignored("sap.s4", "", "b"));
        assert!(!list.is_empty());
    }
}
