//! Configuration merge orchestration
//!
//! Builds the effective devcontainer configuration from three layers:
//! 1. Common config (~/.config/devcontainer.common.json), fills gaps only
//! 2. Project config (.devcontainer/devcontainer.json), the base
//! 3. CLI additions (mounts, env vars, ports), applied last
//!
//! The devcontainer CLI ignores `forwardPorts`, so on request the project's
//! `forwardPorts` list is copied into `appPort`. `forwardPorts` itself is
//! always kept as written for editor integrations.

use std::path::Path;

use serde_json::Value;

use crate::output::OutputSink;
use devcontainer_merge::{
    coerce_port, deep_merge, list_entry, object_entry, parse_mount_string, push_unique,
    ConfigTree,
};

use super::loader::{find_devcontainer_json, load_json_file};
use super::overrides::CliOverrides;

/// Merge common config, project config and CLI additions into one tree.
///
/// Missing or unreadable files contribute an empty tree. The returned tree
/// is freshly built; nothing on disk is modified.
pub fn merge_configurations(
    common_config: Option<&Path>,
    project_config: Option<&Path>,
    overrides: &CliOverrides,
    output: &dyn OutputSink,
) -> ConfigTree {
    let mut merged = match project_config.filter(|path| path.exists()) {
        Some(path) => {
            let mut project = load_json_file(path, output);
            if overrides.auto_forward_ports {
                forward_ports_to_app_port(&mut project);
            }
            project
        }
        None => ConfigTree::new(),
    };

    if let Some(path) = common_config.filter(|path| path.exists()) {
        let common = load_json_file(path, output);
        merged = deep_merge(&common, &merged);
    }

    apply_overrides(&mut merged, overrides);
    merged
}

/// Copy a `forwardPorts` list into `appPort`, replacing any existing value
fn forward_ports_to_app_port(tree: &mut ConfigTree) {
    if let Some(Value::Array(ports)) = tree.get("forwardPorts") {
        let ports = ports.clone();
        tree.insert("appPort".to_string(), Value::Array(ports));
    }
}

fn apply_overrides(merged: &mut ConfigTree, overrides: &CliOverrides) {
    if !overrides.mounts.is_empty() {
        let mounts = list_entry(merged, "mounts");
        for raw in &overrides.mounts {
            push_unique(mounts, Value::String(parse_mount_string(raw)));
        }
    }

    if !overrides.env.is_empty() {
        let remote_env = object_entry(merged, "remoteEnv");
        for (name, value) in &overrides.env {
            remote_env.insert(name.clone(), Value::String(value.clone()));
        }
    }

    // Ports are appended verbatim; `3000` and `"3000"` are distinct here
    if !overrides.ports.is_empty() {
        let app_port = list_entry(merged, "appPort");
        for port in &overrides.ports {
            push_unique(app_port, Value::String(port.clone()));
        }
    }
}

/// Build the override config for `dev exec --port`.
///
/// The project config is located inside `workspace`. Bare port numbers are
/// stored as integers, anything else as strings, and a port already present
/// in `appPort` (after that conversion) is not added twice.
pub fn merge_configurations_for_exec(
    workspace: &Path,
    common_config: Option<&Path>,
    additional_ports: &[String],
    output: &dyn OutputSink,
) -> ConfigTree {
    let project_config = find_devcontainer_json(workspace);
    let mut merged = merge_configurations(
        common_config,
        project_config.as_deref(),
        &CliOverrides::default(),
        output,
    );

    if !additional_ports.is_empty() {
        let app_port = list_entry(&mut merged, "appPort");
        for port in additional_ports {
            push_unique(app_port, coerce_port(port));
        }
    }

    merged
}
