//! Container discovery and teardown
//!
//! Finds the container(s) backing a workspace and stops them. Single-container
//! workspaces are found through the labels the devcontainer CLI (or VS Code)
//! sets; compose workspaces through `docker compose ps` under both
//! project-name strategies. Runtime failures during lookup never propagate:
//! they read as "not found".

use std::path::Path;

use chrono::{DateTime, Local, Utc};
use serde::Deserialize;

use crate::compose::{detect_compose_config, run_with_fallback, ComposeConfig};
use crate::runtime::{CommandOutput, Runtime};

/// Label set by the devcontainer CLI
pub const LOCAL_FOLDER_LABEL: &str = "devcontainer.local_folder";

/// Label set by VS Code
pub const VSCODE_ID_LABEL: &str = "vscode.devcontainer.id";

/// Characters of a container id shown to users
pub const SHORT_ID_LEN: usize = 12;

/// Mounts listed individually by `dev status`
pub const STATUS_MOUNTS_SHOWN: usize = 3;

/// First 12 characters of a container id
pub fn short_id(container_id: &str) -> &str {
    match container_id.char_indices().nth(SHORT_ID_LEN) {
        Some((cut, _)) => &container_id[..cut],
        None => container_id,
    }
}

/// Running container for `workspace`, if any
pub fn get_container_id(rt: &Runtime<'_>, workspace: &Path) -> Option<String> {
    match detect_compose_config(workspace, rt.output) {
        Some(compose) => get_compose_container_id(rt, workspace, &compose),
        None => get_labeled_container_id(rt, workspace),
    }
}

/// Container carrying the devcontainer CLI or VS Code label for `workspace`
pub fn get_labeled_container_id(rt: &Runtime<'_>, workspace: &Path) -> Option<String> {
    let docker = rt.docker();
    let labels = [
        format!("{}={}", LOCAL_FOLDER_LABEL, workspace.display()),
        format!(
            "{}={}",
            VSCODE_ID_LABEL,
            workspace
                .file_name()
                .map(|name| name.to_string_lossy())
                .unwrap_or_default()
        ),
    ];

    labels.iter().find_map(|label| match docker.ps_by_label(label) {
        Ok(output) => output.first_line(),
        Err(e) => {
            tracing::debug!(label = %label, error = %e, "label lookup failed");
            None
        }
    })
}

/// Container of the configured service (or the first container when no
/// service is configured) in a compose project
pub fn get_compose_container_id(
    rt: &Runtime<'_>,
    workspace: &Path,
    compose: &ComposeConfig,
) -> Option<String> {
    let mut args = vec!["ps".to_string(), "-q".to_string()];
    if let Some(service) = compose.service() {
        args.push(service.to_string());
    }

    run_with_fallback(&rt.docker(), workspace, &compose.compose_file, &args, has_output)
        .ok()
        .and_then(|output| output.first_line())
}

/// All container ids of the compose project in `workspace`
pub fn get_compose_containers(rt: &Runtime<'_>, workspace: &Path) -> Vec<String> {
    let Some(compose) = detect_compose_config(workspace, rt.output) else {
        return Vec::new();
    };

    let args = ["ps".to_string(), "-q".to_string()];
    run_with_fallback(&rt.docker(), workspace, &compose.compose_file, &args, has_output)
        .map(|output| output.lines())
        .unwrap_or_default()
}

fn has_output(output: &CommandOutput) -> bool {
    output.non_empty_stdout().is_some()
}

/// True if a container for `workspace` is running
pub fn is_container_running(rt: &Runtime<'_>, workspace: &Path) -> bool {
    get_container_id(rt, workspace).is_some()
}

/// The parts of `docker inspect` output shown by `dev status`
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerInfo {
    #[serde(default)]
    pub id: String,
    /// RFC 3339 creation time
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub config: Option<ContainerConfig>,
    #[serde(default)]
    pub mounts: Option<Vec<MountInfo>>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerConfig {
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct MountInfo {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
}

impl ContainerInfo {
    pub fn image(&self) -> Option<&str> {
        self.config.as_ref().and_then(|c| c.image.as_deref())
    }

    pub fn mounts(&self) -> &[MountInfo] {
        self.mounts.as_deref().unwrap_or_default()
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        let created = self.created.as_deref()?;
        DateTime::parse_from_rfc3339(created)
            .ok()
            .map(|time| time.with_timezone(&Utc))
    }

    /// Creation time in the local timezone, `YYYY-MM-DD HH:MM:SS`
    pub fn created_local(&self) -> Option<String> {
        self.created_at().map(|time| {
            time.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
    }
}

impl MountInfo {
    /// `source → destination`
    pub fn describe(&self) -> String {
        format!(
            "{} → {}",
            self.source.as_deref().unwrap_or("Unknown"),
            self.destination.as_deref().unwrap_or("Unknown")
        )
    }
}

/// `docker inspect <id>`, first element
pub fn get_container_info(rt: &Runtime<'_>, container_id: &str) -> Option<ContainerInfo> {
    let output = match rt.docker().inspect(container_id) {
        Ok(output) if output.success() => output,
        Ok(output) => {
            tracing::debug!(error = %output.error_message(), "inspect failed");
            return None;
        }
        Err(e) => {
            tracing::debug!(error = %e, "inspect failed");
            return None;
        }
    };

    match serde_json::from_str::<Vec<ContainerInfo>>(&output.stdout) {
        Ok(infos) => infos.into_iter().next(),
        Err(e) => {
            tracing::debug!(error = %e, "unparseable inspect output");
            None
        }
    }
}

/// `docker stop <id>` followed by `docker rm <id> [-v]`.
///
/// Returns false, after reporting the runtime's error text, if either step
/// fails.
pub fn stop_and_remove_container(rt: &Runtime<'_>, container_id: &str, remove_volumes: bool) -> bool {
    let docker = rt.docker();

    rt.output.info(&format!(
        "Stopping container... (ID: {})",
        short_id(container_id)
    ));
    match docker.stop(container_id) {
        Ok(output) if output.success() => {}
        Ok(output) => {
            rt.output
                .error(&format!("Failed to stop container: {}", output.error_message()));
            return false;
        }
        Err(e) => {
            rt.output.error(&format!("Error while stopping container: {}", e));
            return false;
        }
    }

    rt.output.info("Removing container...");
    match docker.rm(container_id, remove_volumes) {
        Ok(output) if output.success() => {}
        Ok(output) => {
            rt.output
                .error(&format!("Failed to remove container: {}", output.error_message()));
            return false;
        }
        Err(e) => {
            rt.output.error(&format!("Error while removing container: {}", e));
            return false;
        }
    }

    rt.output.success("Container stopped and removed");
    true
}

/// `docker compose -f <file> down [-v]` under both project-name strategies
pub fn stop_and_remove_compose_containers(
    rt: &Runtime<'_>,
    workspace: &Path,
    remove_volumes: bool,
) -> bool {
    let Some(compose) = detect_compose_config(workspace, rt.output) else {
        rt.output.error("docker-compose configuration not found");
        return false;
    };

    stop_and_remove_compose_project(rt, workspace, &compose, remove_volumes)
}

/// `docker compose -f <file> down [-v]` for an already detected project
pub fn stop_and_remove_compose_project(
    rt: &Runtime<'_>,
    workspace: &Path,
    compose: &ComposeConfig,
    remove_volumes: bool,
) -> bool {
    rt.output.info("Stopping and removing docker-compose project...");

    let mut args = vec!["down".to_string()];
    if remove_volumes {
        args.push("-v".to_string());
    }

    match run_with_fallback(
        &rt.docker(),
        workspace,
        &compose.compose_file,
        &args,
        CommandOutput::success,
    ) {
        Ok(_) => {
            rt.output.success("docker-compose project stopped and removed");
            true
        }
        Err(failure) => {
            rt.output.error(&format!(
                "Failed to stop docker-compose project: {}",
                failure.message
            ));
            false
        }
    }
}

/// Tear down whatever backs `workspace`: the whole compose project, or the
/// single labeled container.
///
/// Compose detection runs once. Returns true when nothing was running.
pub fn stop_workspace_containers(rt: &Runtime<'_>, workspace: &Path, remove_volumes: bool) -> bool {
    if let Some(compose) = detect_compose_config(workspace, rt.output) {
        rt.output
            .info("docker-compose project detected, stopping all of its containers");
        return stop_and_remove_compose_project(rt, workspace, &compose, remove_volumes);
    }

    rt.output.info("Stopping single container");
    match get_labeled_container_id(rt, workspace) {
        Some(container_id) => stop_and_remove_container(rt, &container_id, remove_volumes),
        None => {
            rt.output.warn("No running container found");
            true
        }
    }
}
