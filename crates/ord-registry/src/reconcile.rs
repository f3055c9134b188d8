//! Diff of persisted records against the resources the registry publishes.
//!
//! Matching is by ORD ID. A persisted record whose ORD ID is desired is
//! updated in place, a desired resource with no persisted record is created,
//! and every other persisted record is deleted. When storage holds the same
//! ORD ID twice, the first record is kept and the rest are deleted.

use std::collections::{HashMap, HashSet};

use ord_core::OrdResource;

use crate::store::Record;

/// Store operations that bring one resource kind in line.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcilePlan<T> {
    /// Persisted ID paired with the desired content.
    pub updates: Vec<Record<T>>,
    pub creates: Vec<T>,
    pub deletes: Vec<Record<T>>,
}

impl<T> ReconcilePlan<T> {
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.creates.is_empty() && self.deletes.is_empty()
    }
}

pub fn plan<T: OrdResource + Clone>(persisted: Vec<Record<T>>, desired: &[T]) -> ReconcilePlan<T> {
    let wanted: HashSet<&str> = desired.iter().map(OrdResource::ord_id).collect();

    let mut stored = HashMap::new();
    let mut deletes = Vec::new();
    for record in persisted {
        let ord_id = record.value.ord_id().to_string();
        if wanted.contains(ord_id.as_str()) && !stored.contains_key(&ord_id) {
            stored.insert(ord_id, record.id);
        } else {
            deletes.push(record);
        }
    }

    let mut updates = Vec::new();
    let mut creates = Vec::new();
    for resource in desired {
        match stored.get(resource.ord_id()) {
            Some(id) => updates.push(Record::new(*id, resource.clone())),
            None => creates.push(resource.clone()),
        }
    }

    ReconcilePlan {
        updates,
        creates,
        deletes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ord_core::Vendor;
    use uuid::Uuid;

    fn vendor(ord_id: &str, title: &str) -> Vendor {
        Vendor {
            ord_id: ord_id.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn matches_update_missing_create_rest_delete() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let persisted = vec![
            Record::new(a, vendor("sap:vendor:A:", "A")),
            Record::new(b, vendor("sap:vendor:B:", "B")),
        ];
        let desired = vec![vendor("sap:vendor:A:", "A2"), vendor("sap:vendor:C:", "C")];

        let plan = plan(persisted, &desired);
        assert_eq!(plan.updates, vec![Record::new(a, vendor("sap:vendor:A:", "A2"))]);
        assert_eq!(plan.creates, vec![vendor("sap:vendor:C:", "C")]);
        assert_eq!(plan.deletes.len(), 1);
        assert_eq!(plan.deletes[0].id, b);
    }

    #[test]
    fn duplicated_storage_rows_keep_the_first() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let persisted = vec![
            Record::new(first, vendor("sap:vendor:A:", "A")),
            Record::new(second, vendor("sap:vendor:A:", "A")),
        ];
        let plan = plan(persisted, &[vendor("sap:vendor:A:", "A")]);
        assert_eq!(plan.updates[0].id, first);
        assert_eq!(plan.deletes[0].id, second);
        assert!(plan.creates.is_empty());
    }

    #[test]
    fn nothing_desired_deletes_everything() {
        let persisted = vec![Record::new(Uuid::new_v4(), vendor("sap:vendor:A:", "A"))];
        let plan = plan::<Vendor>(persisted, &[]);
        assert_eq!(plan.deletes.len(), 1);
        assert!(plan.updates.is_empty());
        assert!(!plan.is_empty());
        assert!(super::plan::<Vendor>(Vec::new(), &[]).is_empty());
    }
}
