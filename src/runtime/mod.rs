//! Process Runner
//!
//! Abstracts external command execution for testability. Provides:
//! - CommandRunner trait: interface for running the docker/devcontainer CLIs
//! - SystemRunner: real subprocesses via `std::process::Command`
//! - Runtime: the runner, executable paths and output sink bundled together
//!
//! `crate::mock::MockRunner` is the scripted in-process counterpart used by tests.

mod docker;

pub use docker::DockerCli;

use std::io;
use std::process::{Command, ExitStatus, Stdio};

use crate::devcontainer::DevcontainerCli;
use crate::output::OutputSink;

/// Maximum characters of captured output shown in verbose diagnostics
pub const MAX_DIAGNOSTIC_CHARS: usize = 200;

/// Default container runtime executable
pub const DEFAULT_DOCKER: &str = "docker";

/// Default devcontainer CLI executable
pub const DEFAULT_DEVCONTAINER: &str = "devcontainer";

/// A single command invocation: program plus arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Full argv (program first)
    pub fn argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.args.len() + 1);
        argv.push(self.program.clone());
        argv.extend(self.args.iter().cloned());
        argv
    }

    /// Space-joined command line for display
    pub fn display(&self) -> String {
        self.argv().join(" ")
    }
}

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code (128 + signal number if the process was killed by a signal)
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Build an output with exit code 0 and the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Build a failed output with the given exit code and stderr
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.code == 0
    }

    /// Trimmed stdout of a successful run, if it is non-empty
    pub fn non_empty_stdout(&self) -> Option<&str> {
        if !self.success() {
            return None;
        }
        let trimmed = self.stdout.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// Non-empty, trimmed stdout lines of a successful run
    pub fn lines(&self) -> Vec<String> {
        self.non_empty_stdout()
            .map(|out| {
                out.lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// First non-empty stdout line of a successful run
    pub fn first_line(&self) -> Option<String> {
        self.lines().into_iter().next()
    }

    /// Best available error text: stderr, then stdout, then the exit code
    pub fn error_message(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        format!("process exited with code {}", self.code)
    }
}

/// Runner errors
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// Interface for running external commands
pub trait CommandRunner {
    /// Run a command to completion, capturing stdout and stderr
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput, RunnerError>;

    /// Run a command attached to the terminal and return its exit code
    fn run_interactive(&self, invocation: &Invocation) -> Result<i32, RunnerError>;
}

/// Runs commands as real subprocesses
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    verbose: bool,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log exit codes and truncated output of every captured run
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput, RunnerError> {
        tracing::debug!(command = %invocation.display(), "running");

        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| RunnerError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;

        let result = CommandOutput {
            code: exit_code(output.status),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if self.verbose {
            tracing::debug!(code = result.code, "finished");
            if !result.stdout.is_empty() {
                tracing::debug!(stdout = %truncate_output(&result.stdout, MAX_DIAGNOSTIC_CHARS));
            }
            if !result.stderr.is_empty() {
                tracing::debug!(stderr = %truncate_output(&result.stderr, MAX_DIAGNOSTIC_CHARS));
            }
        }

        Ok(result)
    }

    fn run_interactive(&self, invocation: &Invocation) -> Result<i32, RunnerError> {
        tracing::debug!(command = %invocation.display(), "running interactively");

        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .status()
            .map_err(|source| RunnerError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;

        let code = exit_code(status);
        tracing::debug!(code, "interactive command finished");
        Ok(code)
    }
}

/// Map an exit status to a shell-style exit code
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

/// Shorten `output` to `max_chars` characters, appending `...` when cut
pub fn truncate_output(output: &str, max_chars: usize) -> String {
    match output.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &output[..cut]),
        None => output.to_string(),
    }
}

/// Executable names for the two external CLIs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub docker: String,
    pub devcontainer: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            docker: DEFAULT_DOCKER.to_string(),
            devcontainer: DEFAULT_DEVCONTAINER.to_string(),
        }
    }
}

/// Everything a command needs to reach the outside world
#[derive(Clone, Copy)]
pub struct Runtime<'a> {
    pub runner: &'a dyn CommandRunner,
    pub tools: &'a ToolPaths,
    pub output: &'a dyn OutputSink,
}

impl<'a> Runtime<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        tools: &'a ToolPaths,
        output: &'a dyn OutputSink,
    ) -> Self {
        Self {
            runner,
            tools,
            output,
        }
    }

    /// Container runtime CLI
    pub fn docker(&self) -> DockerCli<'a> {
        DockerCli::new(self.runner, &self.tools.docker)
    }

    /// Higher-level devcontainer CLI
    pub fn devcontainer(&self) -> DevcontainerCli<'a> {
        DevcontainerCli::new(self.runner, &self.tools.devcontainer)
    }
}
