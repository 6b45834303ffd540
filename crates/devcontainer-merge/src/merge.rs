//! Deep merge of configuration trees
//!
//! Merge semantics:
//! - Objects: deep-merge by key (recursive)
//! - Arrays: CONCATENATE, then drop duplicates (first occurrence wins)
//! - Scalars and type mismatches: override (source wins)

use std::collections::HashSet;

use serde_json::Value;

use crate::ConfigTree;

/// Deep merge `source` onto `target`, returning a new tree.
///
/// `target` is the lower-priority side: scalars present in both come from
/// `source`. Neither input is modified.
pub fn deep_merge(target: &ConfigTree, source: &ConfigTree) -> ConfigTree {
    let mut result = target.clone();

    for (key, source_value) in source {
        let merged = match (result.get(key), source_value) {
            // Both objects: recurse
            (Some(Value::Object(base)), Value::Object(overlay)) => {
                Value::Object(deep_merge(base, overlay))
            }

            // Both arrays: concatenate and de-duplicate
            (Some(Value::Array(base)), Value::Array(overlay)) => {
                let combined = base.iter().chain(overlay.iter()).cloned().collect();
                Value::Array(dedup_values(combined))
            }

            // Absent, scalar, or mismatched: source wins
            _ => source_value.clone(),
        };
        result.insert(key.clone(), merged);
    }

    result
}

/// Remove duplicate values, keeping the first occurrence of each.
///
/// Two values are duplicates when their RFC 8785 canonical encodings are
/// byte-equal. If any value cannot be canonicalized the list is returned
/// unchanged.
pub fn dedup_values(values: Vec<Value>) -> Vec<Value> {
    let keys: Result<Vec<Vec<u8>>, _> = values
        .iter()
        .map(|value| serde_json_canonicalizer::to_vec(value))
        .collect();

    let Ok(keys) = keys else {
        return values;
    };

    let mut seen = HashSet::with_capacity(keys.len());
    values
        .into_iter()
        .zip(keys)
        .filter_map(|(value, key)| seen.insert(key).then_some(value))
        .collect()
}

/// Append `value` unless an equal value is already present.
///
/// Returns true if the value was appended.
pub fn push_unique(list: &mut Vec<Value>, value: Value) -> bool {
    if list.contains(&value) {
        return false;
    }
    list.push(value);
    true
}
