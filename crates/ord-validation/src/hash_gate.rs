//! Hash-gated version discipline.
//!
//! A resource whose structural hash differs from the persisted one must carry
//! a strictly greater semantic version. Equal hashes impose no constraint and
//! resources without a stored hash are not gated.

use ord_core::validation::{INVALID_FIELD, VERSION_NOT_INCREMENTED};
use ord_core::{
    parse_stored_hash, structural_hash, ApiResource, Capability, DataProduct, Document, EntityType,
    EventResource, IntegrationDependency, OrdResource, Package, ValidationError, Version,
};
use serde::Serialize;

use crate::stored::StoredResources;

trait Versioned: OrdResource + Serialize {
    fn version(&self) -> &str;
}

macro_rules! impl_versioned {
    ($($ty:ty),+) => {
        $(
            impl Versioned for $ty {
                fn version(&self) -> &str {
                    &self.version
                }
            }
        )+
    };
}

impl_versioned!(Package, ApiResource, EventResource, EntityType, Capability, IntegrationDependency, DataProduct);

pub fn check_versions(documents: &mut [Document], stored: &StoredResources) -> Vec<ValidationError> {
    let mut findings = Vec::new();
    if stored.is_empty() {
        return findings;
    }
    for doc in documents.iter_mut() {
        gate(&mut doc.packages, stored, &mut findings);
        gate(&mut doc.api_resources, stored, &mut findings);
        gate(&mut doc.event_resources, stored, &mut findings);
        gate(&mut doc.entity_types, stored, &mut findings);
        gate(&mut doc.capabilities, stored, &mut findings);
        gate(&mut doc.integration_dependencies, stored, &mut findings);
        gate(&mut doc.data_products, stored, &mut findings);
    }
    findings
}

fn gate<R: Versioned>(items: &mut Vec<R>, stored: &StoredResources, findings: &mut Vec<ValidationError>) {
    items.retain(|item| match verdict(item, stored) {
        Ok(()) => true,
        Err(finding) => {
            tracing::debug!(ord_id = %item.ord_id(), code = %finding.error_type, "hash gate rejected resource");
            findings.push(finding);
            false
        }
    });
}

fn verdict<R: Versioned>(item: &R, stored: &StoredResources) -> Result<(), ValidationError> {
    let Some(record) = stored.get(R::KIND, item.ord_id()) else {
        return Ok(());
    };
    if record.hash.trim().is_empty() {
        return Ok(());
    }
    let Some(previous_hash) = parse_stored_hash(&record.hash) else {
        tracing::warn!(ord_id = %item.ord_id(), hash = %record.hash, "stored hash is not a number, skipping hash gate");
        return Ok(());
    };
    let current_hash = structural_hash(item).map_err(|e| {
        ValidationError::error(item.ord_id(), INVALID_FIELD, format!("cannot compute content hash: {e}"))
    })?;
    if current_hash == previous_hash {
        return Ok(());
    }

    let previous = match Version::parse(&record.version) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(ord_id = %item.ord_id(), error = %e, "stored version is invalid, skipping hash gate");
            return Ok(());
        }
    };
    // An invalid new version is left to the field rules.
    let Ok(current) = Version::parse(item.version()) else {
        return Ok(());
    };
    if current > previous {
        return Ok(());
    }
    Err(ValidationError::error(
        item.ord_id(),
        VERSION_NOT_INCREMENTED,
        format!(
            "{} content changed but version {} is not greater than {}",
            R::KIND,
            item.version(),
            record.version
        ),
    ))
}
