//! devcontainer CLI integration
//!
//! `dev up` and `dev exec` hand the merged configuration to the devcontainer
//! CLI as an `--override-config` file. The file lives in the system temp
//! directory and is removed when the [`TempConfigFile`] guard drops, on
//! success, failure and interrupt alike.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::config::{
    find_devcontainer_json, get_workspace_folder, merge_configurations_for_exec, ConfigTree,
    ConfigWriteError, WorkspaceFolderError, PROJECT_CONFIG_CANDIDATES,
};
use crate::container::get_container_id;
use crate::runtime::{CommandRunner, Invocation, Runtime, RunnerError};

/// Flags for `devcontainer up`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpOptions {
    /// `--remove-existing-container`
    pub remove_existing: bool,
    /// `--build-no-cache`
    pub build_no_cache: bool,
    /// `--gpu-availability all`
    pub gpu: bool,
}

impl UpOptions {
    /// Options for a from-scratch rebuild: remove existing, no cache
    pub fn rebuild(gpu: bool) -> Self {
        Self {
            remove_existing: true,
            build_no_cache: true,
            gpu,
        }
    }
}

/// Errors from `up` / `exec`
#[derive(Debug, thiserror::Error)]
pub enum DevcontainerError {
    #[error("devcontainer.json not found in {}; expected one of: {}", .0.display(), PROJECT_CONFIG_CANDIDATES.join(", "))]
    ConfigNotFound(PathBuf),

    #[error("container is not running, run `dev up` first")]
    NotRunning,

    #[error(transparent)]
    Runner(#[from] RunnerError),

    #[error("Failed to write override config: {0}")]
    Write(#[from] ConfigWriteError),

    #[error(transparent)]
    WorkspaceFolder(#[from] WorkspaceFolderError),
}

/// The devcontainer CLI (`devcontainer` by default)
#[derive(Clone, Copy)]
pub struct DevcontainerCli<'a> {
    runner: &'a dyn CommandRunner,
    program: &'a str,
}

impl<'a> DevcontainerCli<'a> {
    pub fn new(runner: &'a dyn CommandRunner, program: &'a str) -> Self {
        Self { runner, program }
    }

    /// `devcontainer up --workspace-folder <dir> --override-config <file> [flags]`
    pub fn up_invocation(
        &self,
        workspace: &Path,
        override_config: &Path,
        options: &UpOptions,
    ) -> Invocation {
        let mut args = vec![
            "up".to_string(),
            "--workspace-folder".to_string(),
            workspace.display().to_string(),
            "--override-config".to_string(),
            override_config.display().to_string(),
        ];
        if options.remove_existing {
            args.push("--remove-existing-container".to_string());
        }
        if options.build_no_cache {
            args.push("--build-no-cache".to_string());
        }
        if options.gpu {
            args.push("--gpu-availability".to_string());
            args.push("all".to_string());
        }
        Invocation::new(self.program, args)
    }

    /// `devcontainer exec --workspace-folder <dir> [--override-config <file>] -- <command...>`
    pub fn exec_invocation(
        &self,
        workspace: &Path,
        override_config: Option<&Path>,
        command: &[String],
    ) -> Invocation {
        let mut args = vec![
            "exec".to_string(),
            "--workspace-folder".to_string(),
            workspace.display().to_string(),
        ];
        if let Some(path) = override_config {
            args.push("--override-config".to_string());
            args.push(path.display().to_string());
        }
        args.push("--".to_string());
        args.extend(command.iter().cloned());
        Invocation::new(self.program, args)
    }

    /// Run `up` attached to the terminal, returning its exit code
    pub fn up(
        &self,
        workspace: &Path,
        override_config: &Path,
        options: &UpOptions,
    ) -> Result<i32, RunnerError> {
        self.runner
            .run_interactive(&self.up_invocation(workspace, override_config, options))
    }

    /// Run `exec` attached to the terminal, returning its exit code
    pub fn exec(
        &self,
        workspace: &Path,
        override_config: Option<&Path>,
        command: &[String],
    ) -> Result<i32, RunnerError> {
        self.runner
            .run_interactive(&self.exec_invocation(workspace, override_config, command))
    }
}

/// Merged config written to a temp file, deleted on drop
pub struct TempConfigFile {
    file: NamedTempFile,
}

impl TempConfigFile {
    /// Write `tree` as pretty JSON to a fresh `devcontainer-*.json` temp file
    pub fn write(tree: &ConfigTree) -> Result<Self, ConfigWriteError> {
        let io_err = |source| ConfigWriteError::Io {
            path: std::env::temp_dir(),
            source,
        };

        let mut file = tempfile::Builder::new()
            .prefix("devcontainer-")
            .suffix(".json")
            .tempfile()
            .map_err(io_err)?;

        let json = serde_json::to_string_pretty(tree)?;
        file.write_all(json.as_bytes()).map_err(io_err)?;
        file.flush().map_err(io_err)?;

        tracing::debug!(path = %file.path().display(), "wrote override config");
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Start the devcontainer for `workspace` with `config` as override config.
///
/// Returns the devcontainer CLI's exit code.
pub fn run_up(
    rt: &Runtime<'_>,
    workspace: &Path,
    config: &ConfigTree,
    options: &UpOptions,
) -> Result<i32, DevcontainerError> {
    if find_devcontainer_json(workspace).is_none() {
        return Err(DevcontainerError::ConfigNotFound(workspace.to_path_buf()));
    }

    let override_config = TempConfigFile::write(config)?;
    let code = rt
        .devcontainer()
        .up(workspace, override_config.path(), options)?;

    if code == 0 {
        rt.output.success("Container started successfully!");
    } else {
        rt.output.error("Failed to start container");
    }
    Ok(code)
}

/// Run `command` in the workspace's running container.
///
/// With `ports`, an override config adding them to `appPort` is passed
/// along. An invalid `workspaceFolder` in the project config fails the call
/// before anything runs. Returns the command's exit code.
pub fn run_exec(
    rt: &Runtime<'_>,
    workspace: &Path,
    common_config: Option<&Path>,
    ports: &[String],
    command: &[String],
) -> Result<i32, DevcontainerError> {
    if get_container_id(rt, workspace).is_none() {
        return Err(DevcontainerError::NotRunning);
    }

    get_workspace_folder(workspace, rt.output)?;

    let override_config = if ports.is_empty() {
        None
    } else {
        let merged = merge_configurations_for_exec(workspace, common_config, ports, rt.output);
        Some(TempConfigFile::write(&merged)?)
    };

    let code = rt.devcontainer().exec(
        workspace,
        override_config.as_ref().map(TempConfigFile::path),
        command,
    )?;
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockRunner, RecordingSink};
    use crate::output::SilentSink;
    use crate::runtime::{CommandOutput, ToolPaths};
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_up_invocation_flags() {
        let runner = MockRunner::new();
        let cli = DevcontainerCli::new(&runner, "devcontainer");
        let invocation = cli.up_invocation(
            Path::new("/ws"),
            Path::new("/tmp/c.json"),
            &UpOptions {
                remove_existing: true,
                build_no_cache: true,
                gpu: true,
            },
        );
        assert_eq!(
            invocation.argv(),
            vec![
                "devcontainer",
                "up",
                "--workspace-folder",
                "/ws",
                "--override-config",
                "/tmp/c.json",
                "--remove-existing-container",
                "--build-no-cache",
                "--gpu-availability",
                "all"
            ]
        );
    }

    #[test]
    fn test_up_invocation_minimal() {
        let runner = MockRunner::new();
        let cli = DevcontainerCli::new(&runner, "devcontainer");
        let invocation =
            cli.up_invocation(Path::new("/ws"), Path::new("/tmp/c.json"), &UpOptions::default());
        assert_eq!(invocation.args.len(), 5);
    }

    #[test]
    fn test_rebuild_options() {
        let options = UpOptions::rebuild(false);
        assert!(options.remove_existing && options.build_no_cache && !options.gpu);
    }

    #[test]
    fn test_exec_invocation_separates_command() {
        let runner = MockRunner::new();
        let cli = DevcontainerCli::new(&runner, "devcontainer");
        let invocation = cli.exec_invocation(
            Path::new("/ws"),
            Some(Path::new("/tmp/c.json")),
            &args(&["ls", "-la"]),
        );
        assert_eq!(
            invocation.argv(),
            vec![
                "devcontainer",
                "exec",
                "--workspace-folder",
                "/ws",
                "--override-config",
                "/tmp/c.json",
                "--",
                "ls",
                "-la"
            ]
        );
    }

    #[test]
    fn test_temp_config_removed_on_drop() {
        let tree = json!({"name": "x"}).as_object().cloned().unwrap();
        let temp = TempConfigFile::write(&tree).unwrap();
        let path = temp.path().to_path_buf();

        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("devcontainer-") && name.ends_with(".json"));
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&fs::read_to_string(&path).unwrap()).unwrap(),
            json!({"name": "x"})
        );

        drop(temp);
        assert!(!path.exists());
    }

    #[test]
    fn test_run_up_requires_project_config() {
        let dir = TempDir::new().unwrap();
        let runner = MockRunner::new();
        let tools = ToolPaths::default();
        let rt = Runtime::new(&runner, &tools, &SilentSink);

        let result = run_up(&rt, dir.path(), &ConfigTree::new(), &UpOptions::default());

        assert!(matches!(result, Err(DevcontainerError::ConfigNotFound(_))));
        assert_eq!(runner.call_count(), 0);
    }

    #[test]
    fn test_run_up_propagates_exit_code_and_cleans_up() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("devcontainer.json"), "{}").unwrap();
        let runner = MockRunner::new();
        runner.push_output(CommandOutput::failed(2, ""));
        let tools = ToolPaths::default();
        let sink = RecordingSink::new();
        let rt = Runtime::new(&runner, &tools, &sink);

        let code = run_up(&rt, dir.path(), &ConfigTree::new(), &UpOptions::default()).unwrap();

        assert_eq!(code, 2);
        assert_eq!(sink.errors(), vec!["Failed to start container"]);
        let override_path = &runner.invocations()[0].args[4];
        assert!(!Path::new(override_path).exists());
    }

    #[test]
    fn test_run_exec_refuses_when_not_running() {
        let dir = TempDir::new().unwrap();
        let runner = MockRunner::new();
        let tools = ToolPaths::default();
        let rt = Runtime::new(&runner, &tools, &SilentSink);

        let result = run_exec(&rt, dir.path(), None, &[], &args(&["bash"]));

        assert!(matches!(result, Err(DevcontainerError::NotRunning)));
        assert!(runner.argvs().iter().all(|argv| argv[0] == "docker"));
    }

    #[test]
    fn test_run_exec_rejects_invalid_workspace_folder() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("devcontainer.json"), r#"{"workspaceFolder": "  "}"#).unwrap();
        let runner = MockRunner::new();
        runner.push_stdout("container123\n");
        let tools = ToolPaths::default();
        let rt = Runtime::new(&runner, &tools, &SilentSink);

        let result = run_exec(&rt, dir.path(), None, &[], &args(&["bash"]));

        assert!(matches!(
            result,
            Err(DevcontainerError::WorkspaceFolder(WorkspaceFolderError::Empty))
        ));
        assert_eq!(runner.call_count(), 1);
    }

    #[test]
    fn test_run_exec_with_ports_passes_override() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("devcontainer.json"), r#"{"forwardPorts": [3000]}"#).unwrap();
        let runner = MockRunner::new();
        runner.push_stdout("container123\n");
        runner.push_output(CommandOutput::failed(7, ""));
        let tools = ToolPaths::default();
        let rt = Runtime::new(&runner, &tools, &SilentSink);

        let code = run_exec(&rt, dir.path(), None, &args(&["8080"]), &args(&["echo", "hi"])).unwrap();

        assert_eq!(code, 7);
        let exec = &runner.invocations()[1];
        assert_eq!(exec.program, "devcontainer");
        assert_eq!(exec.args[0], "exec");
        assert_eq!(exec.args[3], "--override-config");
        assert_eq!(&exec.args[exec.args.len() - 3..], &args(&["--", "echo", "hi"])[..]);
    }
}
