//! Merge rules for devcontainer configuration trees.
//!
//! A configuration tree is a JSON object whose key order is preserved. Every
//! function in this crate borrows its inputs and returns fresh values, so the
//! trees held by a caller are never aliased or mutated behind its back.

mod merge;
mod mount;
mod port;

pub use merge::{dedup_values, deep_merge, push_unique};
pub use mount::parse_mount_string;
pub use port::{coerce_port, is_bare_port_number};

/// One devcontainer configuration document (common, project or merged).
pub type ConfigTree = serde_json::Map<String, serde_json::Value>;

/// Get `tree[key]` as a mutable list, creating an empty list when the key is
/// absent and wrapping an existing non-list value into a singleton list.
pub fn list_entry<'a>(tree: &'a mut ConfigTree, key: &str) -> &'a mut Vec<serde_json::Value> {
    use serde_json::Value;

    let slot = tree
        .entry(key.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));

    if !slot.is_array() {
        let scalar = slot.take();
        *slot = Value::Array(vec![scalar]);
    }

    match slot {
        Value::Array(items) => items,
        _ => unreachable!("slot was normalized to an array above"),
    }
}

/// Get `tree[key]` as a mutable object, creating an empty object when the key
/// is absent or holds a non-object value.
pub fn object_entry<'a>(tree: &'a mut ConfigTree, key: &str) -> &'a mut ConfigTree {
    use serde_json::Value;

    let slot = tree
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(ConfigTree::new()));

    if !slot.is_object() {
        *slot = Value::Object(ConfigTree::new());
    }

    match slot {
        Value::Object(map) => map,
        _ => unreachable!("slot was normalized to an object above"),
    }
}
