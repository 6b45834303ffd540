//! Test fixtures for on-disk workspaces
//!
//! Builds throwaway workspaces with a project config, an optional common
//! config and an optional compose file, and wires a scripted runtime.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use devcontainer_tools::mock::{MockRunner, RecordingSink};
use devcontainer_tools::{Runtime, ToolPaths};
use serde_json::Value;
use tempfile::TempDir;

/// A temporary workspace directory
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp workspace"),
        }
    }

    /// Workspace root as created (not canonicalized)
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the root, creating parents
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(&path, content).expect("write fixture file");
        path
    }

    /// Write `.devcontainer/devcontainer.json`
    pub fn with_project_config(&self, config: Value) -> PathBuf {
        self.write(".devcontainer/devcontainer.json", &config.to_string())
    }

    /// Write a common config next to (not inside) the project
    pub fn with_common_config(&self, config: Value) -> PathBuf {
        self.write("home/.config/devcontainer.common.json", &config.to_string())
    }

    /// Write a compose file at the workspace root
    pub fn with_compose_file(&self, name: &str) -> PathBuf {
        self.write(name, "services:\n  app:\n    image: nginx:alpine\n")
    }
}

/// Scripted runner, captured output and default tool paths
pub struct Harness {
    pub runner: MockRunner,
    pub sink: RecordingSink,
    pub tools: ToolPaths,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            runner: MockRunner::new(),
            sink: RecordingSink::new(),
            tools: ToolPaths::default(),
        }
    }

    pub fn runtime(&self) -> Runtime<'_> {
        Runtime::new(&self.runner, &self.tools, &self.sink)
    }
}

/// Convert a `json!` object into a config tree
pub fn tree(value: Value) -> serde_json::Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {}", other),
    }
}
