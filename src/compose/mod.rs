//! Docker Compose project support
//!
//! A workspace is a compose project when its devcontainer.json references a
//! compose file through `dockerComposeFile`. The reference must be relative
//! to the config file and stay inside the workspace.
//!
//! Compose projects started by the devcontainer CLI are not always named
//! after the workspace directory, so every compose command is tried under
//! two project names:
//! 1. compose's own default (no `--project-name`)
//! 2. `<workspace dir name>_devcontainer`

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::{find_devcontainer_json, load_json_file, ConfigTree};
use crate::output::OutputSink;
use crate::paths;
use crate::runtime::{CommandOutput, DockerCli};

/// Suffix the devcontainer CLI appends to compose project names
pub const DEVCONTAINER_PROJECT_SUFFIX: &str = "_devcontainer";

/// A detected compose setup. Built fresh on every detection.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposeConfig {
    /// Canonical path of the compose file
    pub compose_file: PathBuf,
    /// The project devcontainer.json that referenced it
    pub devcontainer_config: ConfigTree,
}

impl ComposeConfig {
    /// Service the devcontainer attaches to, if configured
    pub fn service(&self) -> Option<&str> {
        self.devcontainer_config
            .get("service")
            .and_then(Value::as_str)
            .filter(|service| !service.is_empty())
    }
}

/// Detect a compose setup for `workspace`.
///
/// Returns `None` for non-compose workspaces and for rejected references.
/// Absolute references and references escaping the workspace are reported
/// as warnings.
pub fn detect_compose_config(workspace: &Path, output: &dyn OutputSink) -> Option<ComposeConfig> {
    let config_path = find_devcontainer_json(workspace)?;
    let config = load_json_file(&config_path, output);
    if config.is_empty() {
        return None;
    }

    let reference = match config.get("dockerComposeFile")? {
        Value::Null => return None,
        Value::String(file) => file.clone(),
        Value::Array(files) => match files.first()? {
            Value::String(file) => file.clone(),
            other => {
                output.warn(&format!("Unsupported dockerComposeFile entry: {}", other));
                return None;
            }
        },
        other => {
            output.warn(&format!("Unsupported dockerComposeFile value: {}", other));
            return None;
        }
    };

    if reference.is_empty() {
        return None;
    }

    if Path::new(&reference).is_absolute() {
        output.warn(&format!(
            "Absolute path in dockerComposeFile is not allowed: {}",
            reference
        ));
        return None;
    }

    let config_dir = config_path.parent().unwrap_or(workspace);
    let base = config_dir
        .canonicalize()
        .unwrap_or_else(|_| config_dir.to_path_buf());
    let compose_file = paths::resolve(&base.join(&reference));
    let root = match workspace.canonicalize() {
        Ok(root) => root,
        Err(e) => {
            tracing::debug!(workspace = %workspace.display(), error = %e, "cannot resolve workspace");
            return None;
        }
    };

    if !compose_file.starts_with(&root) {
        output.warn(&format!(
            "Compose file outside workspace is not allowed: {}",
            compose_file.display()
        ));
        return None;
    }

    if !compose_file.is_file() {
        tracing::debug!(path = %compose_file.display(), "compose file does not exist");
        return None;
    }

    Some(ComposeConfig {
        compose_file,
        devcontainer_config: config,
    })
}

/// True if `workspace` is a valid compose project
pub fn is_compose_project(workspace: &Path, output: &dyn OutputSink) -> bool {
    detect_compose_config(workspace, output).is_some()
}

/// Compose project naming strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposeProject {
    /// Let compose derive the project name
    Default,
    /// Explicit `--project-name`
    Named(String),
}

impl ComposeProject {
    /// The strategies to try for `workspace`, in order
    pub fn candidates(workspace: &Path) -> [ComposeProject; 2] {
        [
            ComposeProject::Default,
            ComposeProject::Named(devcontainer_project_name(workspace)),
        ]
    }

    /// Value for `--project-name`, if any
    pub fn name(&self) -> Option<&str> {
        match self {
            ComposeProject::Default => None,
            ComposeProject::Named(name) => Some(name),
        }
    }
}

/// `<workspace dir name>_devcontainer`, using the name as given (symlinks
/// are not resolved)
pub fn devcontainer_project_name(workspace: &Path) -> String {
    let dir_name = workspace
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{}{}", dir_name, DEVCONTAINER_PROJECT_SUFFIX)
}

/// Every project-name strategy failed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ComposeFailure {
    /// Number of commands run
    pub attempts: usize,
    /// Error text of the last attempt
    pub message: String,
}

/// Run `docker compose ... <args>` under each project-name strategy until
/// `accept` approves an output.
///
/// Runner errors count as a failed attempt. Stops at the first accepted
/// output, so at most two commands run.
pub fn run_with_fallback(
    docker: &DockerCli<'_>,
    workspace: &Path,
    compose_file: &Path,
    args: &[String],
    accept: impl Fn(&CommandOutput) -> bool,
) -> Result<CommandOutput, ComposeFailure> {
    let mut attempts = 0;
    let mut message = String::new();

    for project in ComposeProject::candidates(workspace) {
        attempts += 1;
        match docker.compose(project.name(), compose_file, args) {
            Ok(output) if accept(&output) => return Ok(output),
            Ok(output) => {
                tracing::debug!(project = ?project, code = output.code, "compose attempt rejected");
                message = output.error_message();
            }
            Err(e) => {
                tracing::debug!(project = ?project, error = %e, "compose attempt failed");
                message = e.to_string();
            }
        }
    }

    Err(ComposeFailure { attempts, message })
}
