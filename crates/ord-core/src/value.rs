//! Helpers over semi-structured JSON fields.
//!
//! Links, labels, and classification arrays are stored as `serde_json::Value`.
//! These functions give the sanitizer and validator typed access to them:
//! path walking, URL-field rewriting, and the package-to-resource merges.

use serde_json::{Map, Value};

use crate::error::CoreError;

/// Walk `root` along `path` (object keys and array indices) and return the
/// `ordId` of the nearest enclosing object that carries one.
///
/// Returns `None` when the path leaves the tree or no object on the way has
/// an `ordId`.
pub fn ord_id_along_path(root: &Value, path: &[String]) -> Option<String> {
    let mut current = root;
    let mut found = ord_id_of(current);
    for segment in path {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
        if let Some(id) = ord_id_of(current) {
            found = Some(id);
        }
    }
    found
}

fn ord_id_of(value: &Value) -> Option<String> {
    value
        .as_object()
        .and_then(|m| m.get("ordId"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Value at a `/`-free key path, or `None`.
pub fn get_path<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(root, |current, key| match current {
        Value::Object(map) => map.get(*key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Rewrite the string at `key` in every object reachable through arrays.
///
/// Arrays are walked element by element; for an object, `rewrite` is called
/// with the current string value of `key` (if present and a string) and its
/// `Some` result replaces the value. Objects are not searched below `key`.
pub fn rewrite_string_field<E>(
    value: &mut Value,
    key: &str,
    rewrite: &mut impl FnMut(&str) -> Result<Option<String>, E>,
) -> Result<(), E> {
    match value {
        Value::Array(items) => {
            for item in items {
                rewrite_string_field(item, key, rewrite)?;
            }
        }
        Value::Object(map) => {
            if let Some(Value::String(current)) = map.get_mut(key) {
                if let Some(updated) = rewrite(current)? {
                    *current = updated;
                }
            }
        }
        _ => {}
    }
    Ok(())
}

/// Strings of a JSON array of strings. `None` if `value` is not an array or
/// holds a non-string element.
pub fn string_items(value: &Value) -> Option<Vec<&str>> {
    value.as_array()?.iter().map(Value::as_str).collect()
}

/// Merge two optional JSON arrays of strings: `first` elements, then `second`,
/// duplicates removed keeping the first occurrence.
///
/// Merging a result with either input again returns it unchanged.
pub fn merge_string_arrays(
    field: &'static str,
    first: Option<&Value>,
    second: Option<&Value>,
) -> Result<Option<Value>, CoreError> {
    if first.is_none() && second.is_none() {
        return Ok(None);
    }
    let mut merged: Vec<Value> = Vec::new();
    for source in [first, second].into_iter().flatten() {
        let items = source.as_array().ok_or(CoreError::UnexpectedShape {
            field,
            reason: "should be a JSON array",
        })?;
        for item in items {
            if !merged.contains(item) {
                merged.push(item.clone());
            }
        }
    }
    Ok(Some(Value::Array(merged)))
}

/// Merge two optional label objects: the union of keys, and for keys present
/// in both, the merged value arrays.
pub fn merge_labels(first: Option<&Value>, second: Option<&Value>) -> Result<Option<Value>, CoreError> {
    if first.is_none() && second.is_none() {
        return Ok(None);
    }
    let mut merged: Map<String, Value> = Map::new();
    for source in [first, second].into_iter().flatten() {
        let labels = source.as_object().ok_or(CoreError::UnexpectedShape {
            field: "labels",
            reason: "should be a JSON object",
        })?;
        for (key, values) in labels {
            let combined = merge_string_arrays("labels", merged.get(key), Some(values))?;
            if let Some(combined) = combined {
                merged.insert(key.clone(), combined);
            }
        }
    }
    Ok(Some(Value::Object(merged)))
}
