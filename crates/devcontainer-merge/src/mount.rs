//! Mount-string normalization.

/// Options appended to every mount expanded from `source:target` shorthand.
const SHORTHAND_OPTIONS: &str = "type=bind,consistency=cached";

/// Normalize a mount argument into the devcontainer mount-string format.
///
/// - `source=...,target=...` strings are returned as-is
/// - `host:container` shorthand becomes a cached bind mount
/// - anything else is passed through for the container CLI to judge
pub fn parse_mount_string(raw: &str) -> String {
    if raw.contains("source=") && raw.contains("target=") {
        return raw.to_string();
    }

    let parts: Vec<&str> = raw.split(':').collect();
    if let [source, target] = parts.as_slice() {
        return format!("source={source},target={target},{SHORTHAND_OPTIONS}");
    }

    raw.to_string()
}
