//! Configuration loading and merging
//!
//! Implements the 3-layer configuration merge:
//! 1. Common config (~/.config/devcontainer.common.json)
//! 2. Project config (.devcontainer/devcontainer.json or devcontainer.json)
//! 3. CLI additions (--mount, --env, --port)
//!
//! The merge rules themselves live in the `devcontainer-merge` crate.

mod defaults;
mod effective;
mod loader;
mod merge;
mod overrides;
mod workspace_folder;

pub use defaults::{
    create_common_config_template, default_common_config_path, COMMON_CONFIG_FILE_NAME,
    DEFAULT_WORKSPACE_FOLDER, PROJECT_CONFIG_CANDIDATES,
};
pub use effective::{file_digest, ConfigOrigin, ConfigSource, EffectiveConfig};
pub use loader::{
    find_devcontainer_json, load_json_file, parse_config, save_json_file, try_load_json_file,
    write_json_file, ConfigLoadError, ConfigWriteError,
};
pub use merge::{merge_configurations, merge_configurations_for_exec};
pub use overrides::{parse_env_pairs, CliOverrides};
pub use workspace_folder::{
    get_workspace_folder, sanitize_workspace_folder, WorkspaceFolderError,
};

pub use devcontainer_merge::ConfigTree;
