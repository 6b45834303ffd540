//! Reading and writing configuration files
//!
//! Config files are JSON with comments (JSONC / JSON5): `//` and `/* */`
//! comments and trailing commas are accepted. Load failures never propagate;
//! they become a warning plus an empty tree.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::output::OutputSink;
use devcontainer_merge::ConfigTree;

use super::defaults::PROJECT_CONFIG_CANDIDATES;

/// Errors writing a configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigWriteError {
    #[error("I/O error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Why a file could not be turned into a configuration tree
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid JSON in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Could not load {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Parse JSONC text into a configuration tree.
///
/// Whitespace-only text is an empty tree. A top-level value that is not an
/// object is rejected.
pub fn parse_config(content: &str) -> Result<ConfigTree, String> {
    if content.trim().is_empty() {
        return Ok(ConfigTree::new());
    }

    match json5::from_str::<Value>(content).map_err(|e| e.to_string())? {
        Value::Object(tree) => Ok(tree),
        other => Err(format!(
            "expected an object at the top level, found {}",
            kind_name(&other)
        )),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Read and parse a configuration file
pub fn try_load_json_file(path: &Path) -> Result<ConfigTree, ConfigLoadError> {
    let content = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ConfigLoadError::NotFound(path.to_path_buf()),
        _ => ConfigLoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    parse_config(&content).map_err(|message| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

/// Load a configuration file, reporting any failure as a warning and
/// returning an empty tree in its place.
pub fn load_json_file(path: &Path, output: &dyn OutputSink) -> ConfigTree {
    match try_load_json_file(path) {
        Ok(tree) => tree,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "config load failed");
            output.warn(&e.to_string());
            ConfigTree::new()
        }
    }
}

/// Locate the project configuration.
///
/// Searches `.devcontainer/devcontainer.json`, then `devcontainer.json` at
/// the workspace root.
pub fn find_devcontainer_json(workspace: &Path) -> Option<PathBuf> {
    PROJECT_CONFIG_CANDIDATES
        .iter()
        .map(|candidate| workspace.join(candidate))
        .find(|path| path.exists())
}

/// Write `tree` as pretty-printed JSON (2-space indent), creating parent
/// directories as needed.
pub fn write_json_file(tree: &ConfigTree, path: &Path) -> Result<(), ConfigWriteError> {
    let io_err = |source: io::Error| ConfigWriteError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
    }

    let json = serde_json::to_string_pretty(tree)?;
    fs::write(path, json).map_err(io_err)
}

/// [`write_json_file`] that reports failure through `output`.
///
/// Returns true on success.
pub fn save_json_file(tree: &ConfigTree, path: &Path, output: &dyn OutputSink) -> bool {
    match write_json_file(tree, path) {
        Ok(()) => true,
        Err(e) => {
            output.error(&format!("Could not save {}: {}", path.display(), e));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::RecordingSink;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_parse_comments_and_trailing_commas() {
        let tree = parse_config(
            r#"{
                // line comment
                "name": "test", /* block */
                "forwardPorts": [3000, 8080,],
            }"#,
        )
        .unwrap();
        assert_eq!(tree["name"], "test");
        assert_eq!(tree["forwardPorts"], json!([3000, 8080]));
    }

    #[test]
    fn test_parse_preserves_key_order() {
        let tree = parse_config(r#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
        let keys: Vec<&str> = tree.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_parse_whitespace_only_is_empty() {
        assert!(parse_config("  \n\t ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_non_object_rejected() {
        let err = parse_config("[1, 2]").unwrap_err();
        assert!(err.contains("an array"));
    }

    #[test]
    fn test_load_missing_file_warns() {
        let dir = TempDir::new().unwrap();
        let sink = RecordingSink::new();
        let path = dir.path().join("nope.json");

        let tree = load_json_file(&path, &sink);

        assert!(tree.is_empty());
        assert_eq!(sink.warnings().len(), 1);
        assert!(sink.warnings()[0].starts_with("File not found"));
    }

    #[test]
    fn test_load_invalid_json_warns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ invalid json").unwrap();
        let sink = RecordingSink::new();

        let tree = load_json_file(&path, &sink);

        assert!(tree.is_empty());
        assert!(sink.warnings()[0].starts_with("Invalid JSON in"));
    }

    #[test]
    fn test_load_directory_warns() {
        let dir = TempDir::new().unwrap();
        let sink = RecordingSink::new();

        let tree = load_json_file(dir.path(), &sink);

        assert!(tree.is_empty());
        assert_eq!(sink.warnings().len(), 1);
    }

    #[test]
    fn test_load_empty_file_is_silent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.json");
        fs::write(&path, "").unwrap();
        let sink = RecordingSink::new();

        assert!(load_json_file(&path, &sink).is_empty());
        assert!(sink.messages().is_empty());
    }

    #[test]
    fn test_find_prefers_devcontainer_dir() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".devcontainer")).unwrap();
        fs::write(dir.path().join(".devcontainer/devcontainer.json"), "{}").unwrap();
        fs::write(dir.path().join("devcontainer.json"), "{}").unwrap();

        assert_eq!(
            find_devcontainer_json(dir.path()),
            Some(dir.path().join(".devcontainer/devcontainer.json"))
        );
    }

    #[test]
    fn test_find_root_fallback_and_none() {
        let dir = TempDir::new().unwrap();
        assert_eq!(find_devcontainer_json(dir.path()), None);

        fs::write(dir.path().join("devcontainer.json"), "{}").unwrap();
        assert_eq!(
            find_devcontainer_json(dir.path()),
            Some(dir.path().join("devcontainer.json"))
        );
    }

    #[test]
    fn test_save_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b/config.json");
        let tree = json!({"name": "x", "list": [1]}).as_object().cloned().unwrap();
        let sink = RecordingSink::new();

        assert!(save_json_file(&tree, &path, &sink));

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("\n  \"name\": \"x\""));
        assert_eq!(parse_config(&written).unwrap(), tree);
    }

    #[test]
    fn test_save_failure_reports_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();
        let sink = RecordingSink::new();

        assert!(!save_json_file(&ConfigTree::new(), &blocker.join("config.json"), &sink));
        assert!(sink.errors()[0].starts_with("Could not save"));
    }
}
