//! Typed argv builders for the container runtime CLI.

use std::path::Path;

use super::{CommandOutput, CommandRunner, Invocation, RunnerError};

/// Docker CLI (`docker` by default) driven through a [`CommandRunner`]
#[derive(Clone, Copy)]
pub struct DockerCli<'a> {
    runner: &'a dyn CommandRunner,
    program: &'a str,
}

impl<'a> DockerCli<'a> {
    pub fn new(runner: &'a dyn CommandRunner, program: &'a str) -> Self {
        Self { runner, program }
    }

    fn invocation(&self, args: Vec<String>) -> Invocation {
        Invocation::new(self.program, args)
    }

    fn run(&self, args: Vec<String>) -> Result<CommandOutput, RunnerError> {
        self.runner.run(&self.invocation(args))
    }

    /// `docker ps -q -f label=<label>`
    pub fn ps_by_label(&self, label: &str) -> Result<CommandOutput, RunnerError> {
        self.run(vec![
            "ps".to_string(),
            "-q".to_string(),
            "-f".to_string(),
            format!("label={}", label),
        ])
    }

    /// `docker inspect <id>`
    pub fn inspect(&self, container_id: &str) -> Result<CommandOutput, RunnerError> {
        self.run(vec!["inspect".to_string(), container_id.to_string()])
    }

    /// `docker stop <id>`
    pub fn stop(&self, container_id: &str) -> Result<CommandOutput, RunnerError> {
        self.run(vec!["stop".to_string(), container_id.to_string()])
    }

    /// `docker rm <id> [-v]`
    pub fn rm(&self, container_id: &str, remove_volumes: bool) -> Result<CommandOutput, RunnerError> {
        let mut args = vec!["rm".to_string(), container_id.to_string()];
        if remove_volumes {
            args.push("-v".to_string());
        }
        self.run(args)
    }

    /// Argv for `docker compose [--project-name <name>] -f <file> <args...>`
    pub fn compose_invocation(
        &self,
        project_name: Option<&str>,
        compose_file: &Path,
        args: &[String],
    ) -> Invocation {
        let mut argv = vec!["compose".to_string()];
        if let Some(name) = project_name {
            argv.push("--project-name".to_string());
            argv.push(name.to_string());
        }
        argv.push("-f".to_string());
        argv.push(compose_file.display().to_string());
        argv.extend(args.iter().cloned());
        self.invocation(argv)
    }

    /// Run `docker compose` against a compose file
    pub fn compose(
        &self,
        project_name: Option<&str>,
        compose_file: &Path,
        args: &[String],
    ) -> Result<CommandOutput, RunnerError> {
        self.runner
            .run(&self.compose_invocation(project_name, compose_file, args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockRunner;

    #[test]
    fn test_compose_invocation_default_project() {
        let runner = MockRunner::new();
        let docker = DockerCli::new(&runner, "docker");
        let invocation = docker.compose_invocation(
            None,
            Path::new("/ws/docker-compose.yml"),
            &["ps".to_string(), "-q".to_string()],
        );
        assert_eq!(
            invocation.argv(),
            vec!["docker", "compose", "-f", "/ws/docker-compose.yml", "ps", "-q"]
        );
    }

    #[test]
    fn test_compose_invocation_named_project() {
        let runner = MockRunner::new();
        let docker = DockerCli::new(&runner, "docker");
        let invocation = docker.compose_invocation(
            Some("ws_devcontainer"),
            Path::new("/ws/docker-compose.yml"),
            &["down".to_string()],
        );
        assert_eq!(
            invocation.argv(),
            vec![
                "docker",
                "compose",
                "--project-name",
                "ws_devcontainer",
                "-f",
                "/ws/docker-compose.yml",
                "down"
            ]
        );
    }

    #[test]
    fn test_rm_with_volumes() {
        let runner = MockRunner::new();
        let docker = DockerCli::new(&runner, "podman");
        docker.rm("abc", true).unwrap();
        assert_eq!(runner.invocations()[0].argv(), vec!["podman", "rm", "abc", "-v"]);
    }
}
