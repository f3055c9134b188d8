//! # Structural Hash
//!
//! Order-insensitive content hash over a resource, used to detect content
//! changes that were published without a version bump.
//!
//! ## Canonical form
//!
//! 1. The resource is converted to a `serde_json::Value`.
//! 2. The top-level `version` and `lastUpdate` fields are removed: they carry
//!    release metadata, not content.
//! 3. Object members with `null` values are dropped, so an absent field and an
//!    explicit `null` hash the same.
//! 4. Object keys are written in sorted order.
//! 5. Every array is written as a set: elements are canonicalized, sorted by
//!    their canonical bytes, and deduplicated.
//!
//! The canonical bytes are hashed with SHA-256 and the first eight bytes,
//! read big-endian, form the `u64` hash. Persisted hashes are the base-10
//! string of that number.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::HashError;

/// Top-level fields excluded from the structural hash.
pub const VOLATILE_FIELDS: &[&str] = &["version", "lastUpdate"];

/// Compute the structural hash of any serializable resource.
pub fn structural_hash(resource: &impl Serialize) -> Result<u64, HashError> {
    let mut value = serde_json::to_value(resource)?;
    if let Value::Object(map) = &mut value {
        for field in VOLATILE_FIELDS {
            map.remove(*field);
        }
    }
    let mut bytes = Vec::new();
    write_canonical(&value, &mut bytes)?;
    let digest = Sha256::digest(&bytes);
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    Ok(u64::from_be_bytes(head))
}

/// Parse a persisted hash. Empty or malformed values mean "no stored hash".
pub fn parse_stored_hash(stored: &str) -> Option<u64> {
    let trimmed = stored.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse().ok()
}

fn write_canonical(value: &Value, out: &mut Vec<u8>) -> Result<(), HashError> {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map
                .iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, _)| k)
                .collect();
            keys.sort();
            out.push(b'{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                serde_json::to_writer(&mut *out, key)?;
                out.push(b':');
                write_canonical(&map[key.as_str()], out)?;
            }
            out.push(b'}');
        }
        Value::Array(items) => {
            let mut encoded = Vec::with_capacity(items.len());
            for item in items {
                let mut buf = Vec::new();
                write_canonical(item, &mut buf)?;
                encoded.push(buf);
            }
            encoded.sort();
            encoded.dedup();
            out.push(b'[');
            for (i, item) in encoded.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                out.extend_from_slice(item);
            }
            out.push(b']');
        }
        scalar => serde_json::to_writer(&mut *out, scalar)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn array_order_does_not_matter() {
        let a = json!({"ordId": "x", "tags": ["a", "b"], "labels": {"k": ["1", "2"]}});
        let b = json!({"labels": {"k": ["2", "1"]}, "tags": ["b", "a"], "ordId": "x"});
        assert_eq!(structural_hash(&a).unwrap(), structural_hash(&b).unwrap());
    }

    #[test]
    fn version_and_last_update_are_ignored() {
        let a = json!({"ordId": "x", "version": "1.0.0", "lastUpdate": "2023-01-01T00:00:00Z"});
        let b = json!({"ordId": "x", "version": "2.0.0"});
        assert_eq!(structural_hash(&a).unwrap(), structural_hash(&b).unwrap());
    }

    #[test]
    fn null_equals_absent() {
        let a = json!({"ordId": "x", "description": null});
        let b = json!({"ordId": "x"});
        assert_eq!(structural_hash(&a).unwrap(), structural_hash(&b).unwrap());
    }

    #[test]
    fn content_change_changes_hash() {
        let a = json!({"ordId": "x", "industry": ["Retail"]});
        let b = json!({"ordId": "x", "industry": ["Retail", "Banking"]});
        assert_ne!(structural_hash(&a).unwrap(), structural_hash(&b).unwrap());
    }

    #[test]
    fn nested_version_fields_still_count() {
        let a = json!({"ordId": "x", "changelogEntries": [{"version": "1.0.0"}]});
        let b = json!({"ordId": "x", "changelogEntries": [{"version": "1.0.1"}]});
        assert_ne!(structural_hash(&a).unwrap(), structural_hash(&b).unwrap());
    }

    #[test]
    fn parse_stored_hash_handles_empty() {
        assert_eq!(parse_stored_hash(""), None);
        assert_eq!(parse_stored_hash("  "), None);
        assert_eq!(parse_stored_hash("123"), Some(123));
        assert_eq!(parse_stored_hash("not-a-number"), None);
        assert_eq!(parse_stored_hash(&u64::MAX.to_string()), Some(u64::MAX));
    }

    proptest! {
        #[test]
        fn permuting_tags_keeps_hash(mut tags in proptest::collection::vec("[a-z]{1,6}", 0..8), seed in any::<u64>()) {
            let original = json!({"ordId": "x", "tags": tags.clone()});
            let len = tags.len();
            if len > 1 {
                tags.rotate_left((seed as usize) % len);
            }
            let rotated = json!({"ordId": "x", "tags": tags});
            prop_assert_eq!(structural_hash(&original).unwrap(), structural_hash(&rotated).unwrap());
        }
    }
}
