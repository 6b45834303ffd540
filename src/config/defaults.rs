//! Built-in defaults and well-known locations

use std::path::PathBuf;

use serde_json::json;

use devcontainer_merge::ConfigTree;

/// Project config locations, in search order
pub const PROJECT_CONFIG_CANDIDATES: [&str; 2] =
    [".devcontainer/devcontainer.json", "devcontainer.json"];

/// File name of the user-wide common config
pub const COMMON_CONFIG_FILE_NAME: &str = "devcontainer.common.json";

/// Container path used when the project config does not set `workspaceFolder`
pub const DEFAULT_WORKSPACE_FOLDER: &str = "/workspace";

/// Default common config location: `~/.config/devcontainer.common.json`
pub fn default_common_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join(COMMON_CONFIG_FILE_NAME))
}

/// Starting point written by `dev init`
pub fn create_common_config_template() -> ConfigTree {
    let template = json!({
        "features": {
            "ghcr.io/anthropics/devcontainer-features/claude-code:latest": {}
        },
        "mounts": [
            "source=${env:HOME}${env:USERPROFILE}/.claude,target=/home/vscode/.claude,type=bind,consistency=cached"
        ],
        "customizations": {
            "vscode": {
                "extensions": []
            }
        }
    });

    match template {
        serde_json::Value::Object(tree) => tree,
        _ => ConfigTree::new(),
    }
}
