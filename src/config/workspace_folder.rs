//! In-container workspace folder resolution

use std::env;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::output::OutputSink;
use crate::paths::normalize_lexically;

use super::defaults::DEFAULT_WORKSPACE_FOLDER;
use super::loader::{find_devcontainer_json, load_json_file};

/// Rejected `workspaceFolder` values
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkspaceFolderError {
    #[error("workspaceFolder is empty")]
    Empty,

    #[error("workspaceFolder contains control characters")]
    ControlCharacter,

    #[error("invalid workspaceFolder: {0}")]
    Unresolvable(String),
}

/// The container-side workspace folder declared by the project config.
///
/// Falls back to `/workspace` when the workspace or its config does not
/// exist, or the config does not set `workspaceFolder`.
pub fn get_workspace_folder(
    workspace: &Path,
    output: &dyn OutputSink,
) -> Result<String, WorkspaceFolderError> {
    if !workspace.exists() {
        return Ok(DEFAULT_WORKSPACE_FOLDER.to_string());
    }

    let Some(config_path) = find_devcontainer_json(workspace) else {
        return Ok(DEFAULT_WORKSPACE_FOLDER.to_string());
    };

    let config = load_json_file(&config_path, output);
    match config.get("workspaceFolder") {
        None => sanitize_workspace_folder(DEFAULT_WORKSPACE_FOLDER),
        Some(Value::String(folder)) => sanitize_workspace_folder(folder),
        Some(other) => Err(WorkspaceFolderError::Unresolvable(other.to_string())),
    }
}

/// Validate and normalize a `workspaceFolder` value.
///
/// Relative values are resolved against the current directory. The result
/// is lexically normalized and always starts with `/`.
pub fn sanitize_workspace_folder(folder: &str) -> Result<String, WorkspaceFolderError> {
    let base = env::current_dir()
        .map_err(|e| WorkspaceFolderError::Unresolvable(format!("{}: {}", folder, e)))?;
    sanitize_against(folder, &base)
}

fn sanitize_against(folder: &str, base: &Path) -> Result<String, WorkspaceFolderError> {
    if folder.trim().is_empty() {
        return Err(WorkspaceFolderError::Empty);
    }

    if folder.chars().any(|c| (c as u32) < 0x20) {
        return Err(WorkspaceFolderError::ControlCharacter);
    }

    let joined: PathBuf = base.join(folder);
    let normalized = normalize_lexically(&joined);
    let Some(text) = normalized.to_str() else {
        return Err(WorkspaceFolderError::Unresolvable(folder.to_string()));
    };

    if text.starts_with('/') {
        Ok(text.to_string())
    } else {
        Ok(format!("/{}", text.trim_start_matches("./")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::SilentSink;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_absolute_path_kept() {
        assert_eq!(
            sanitize_against("/workspaces/app", Path::new("/cwd")).unwrap(),
            "/workspaces/app"
        );
    }

    #[test]
    fn test_dot_segments_collapsed() {
        assert_eq!(
            sanitize_against("/workspace/../etc/./x", Path::new("/cwd")).unwrap(),
            "/etc/x"
        );
        assert_eq!(sanitize_against("/../../..", Path::new("/cwd")).unwrap(), "/");
    }

    #[test]
    fn test_relative_resolved_against_base() {
        assert_eq!(
            sanitize_against("src/app", Path::new("/home/user")).unwrap(),
            "/home/user/src/app"
        );
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(sanitize_against("", Path::new("/")), Err(WorkspaceFolderError::Empty));
        assert_eq!(sanitize_against("   ", Path::new("/")), Err(WorkspaceFolderError::Empty));
    }

    #[test]
    fn test_control_characters_rejected() {
        for bad in ["/work\nspace", "/work\0space", "/work\tspace", "\x1b[31m"] {
            assert_eq!(
                sanitize_against(bad, Path::new("/")),
                Err(WorkspaceFolderError::ControlCharacter),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn test_default_without_workspace_or_config() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            get_workspace_folder(&dir.path().join("missing"), &SilentSink).unwrap(),
            "/workspace"
        );
        assert_eq!(get_workspace_folder(dir.path(), &SilentSink).unwrap(), "/workspace");
    }

    #[test]
    fn test_reads_workspace_folder_from_config() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".devcontainer")).unwrap();
        fs::write(
            dir.path().join(".devcontainer/devcontainer.json"),
            r#"{"workspaceFolder": "/workspaces/project"}"#,
        )
        .unwrap();

        assert_eq!(
            get_workspace_folder(dir.path(), &SilentSink).unwrap(),
            "/workspaces/project"
        );
    }

    #[test]
    fn test_config_without_key_uses_default() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("devcontainer.json"), r#"{"name": "x"}"#).unwrap();
        assert_eq!(get_workspace_folder(dir.path(), &SilentSink).unwrap(), "/workspace");
    }

    #[test]
    fn test_invalid_config_value_is_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("devcontainer.json"), r#"{"workspaceFolder": ""}"#).unwrap();
        assert_eq!(
            get_workspace_folder(dir.path(), &SilentSink),
            Err(WorkspaceFolderError::Empty)
        );

        fs::write(dir.path().join("devcontainer.json"), r#"{"workspaceFolder": 42}"#).unwrap();
        assert!(matches!(
            get_workspace_folder(dir.path(), &SilentSink),
            Err(WorkspaceFolderError::Unresolvable(_))
        ));
    }
}
