//! devcontainer-tools - simplified devcontainer management
//!
//! This crate wraps the `devcontainer` CLI and the Docker CLI. It merges a
//! user-wide common configuration with each project's devcontainer.json,
//! hands the result to `devcontainer up` / `devcontainer exec`, and finds
//! (and tears down) the containers backing a workspace, including
//! docker-compose projects.

pub mod compose;
pub mod config;
pub mod container;
pub mod devcontainer;
pub mod logging;
pub mod mock;
pub mod output;
pub mod paths;
pub mod runtime;
pub mod signal;

pub use compose::{detect_compose_config, is_compose_project, ComposeConfig, ComposeProject};
pub use config::{
    merge_configurations, merge_configurations_for_exec, CliOverrides, ConfigTree,
    EffectiveConfig, WorkspaceFolderError,
};
pub use container::{get_container_id, stop_and_remove_container, ContainerInfo};
pub use devcontainer::{DevcontainerError, UpOptions};
pub use output::{ConsoleSink, Level, OutputSink, SilentSink};
pub use runtime::{CommandOutput, CommandRunner, Invocation, Runtime, SystemRunner, ToolPaths};
