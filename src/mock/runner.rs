//! Scripted command runner

use std::collections::VecDeque;
use std::io;
use std::sync::Mutex;

use crate::runtime::{CommandOutput, CommandRunner, Invocation, RunnerError};

/// A scripted reply to one invocation
#[derive(Debug, Clone)]
pub enum Scripted {
    /// The command ran and produced this output
    Output(CommandOutput),
    /// The program could not be started
    SpawnError,
}

/// Reply used whenever the invocation's args contain every token in `tokens`
#[derive(Debug, Clone)]
struct Rule {
    tokens: Vec<String>,
    reply: Scripted,
}

impl Rule {
    fn matches(&self, invocation: &Invocation) -> bool {
        self.tokens
            .iter()
            .all(|token| invocation.args.iter().any(|arg| arg == token))
    }
}

#[derive(Debug, Default)]
struct MockState {
    queue: VecDeque<Scripted>,
    rules: Vec<Rule>,
    invocations: Vec<Invocation>,
}

/// Command runner that never spawns processes
///
/// Replies are chosen in order of precedence:
/// 1. the next queued reply (`push_*`), consumed once
/// 2. the first rule whose tokens all appear in the args (`respond_when`)
/// 3. exit code 0 with empty output
#[derive(Debug, Default)]
pub struct MockRunner {
    state: Mutex<MockState>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for the next invocation
    pub fn push(&self, reply: Scripted) {
        if let Ok(mut state) = self.state.lock() {
            state.queue.push_back(reply);
        }
    }

    /// Queue a successful reply with the given stdout
    pub fn push_stdout(&self, stdout: &str) {
        self.push(Scripted::Output(CommandOutput::ok(stdout)));
    }

    /// Queue a reply with the given output
    pub fn push_output(&self, output: CommandOutput) {
        self.push(Scripted::Output(output));
    }

    /// Queue a spawn failure for the next invocation
    pub fn push_spawn_error(&self) {
        self.push(Scripted::SpawnError);
    }

    /// Reply with `output` to every invocation whose args contain all `tokens`
    pub fn respond_when(&self, tokens: &[&str], output: CommandOutput) {
        if let Ok(mut state) = self.state.lock() {
            state.rules.push(Rule {
                tokens: tokens.iter().map(|t| t.to_string()).collect(),
                reply: Scripted::Output(output),
            });
        }
    }

    /// Every invocation seen so far, in order
    pub fn invocations(&self) -> Vec<Invocation> {
        self.state
            .lock()
            .map(|state| state.invocations.clone())
            .unwrap_or_default()
    }

    /// Full argv of every invocation seen so far
    pub fn argvs(&self) -> Vec<Vec<String>> {
        self.invocations().iter().map(Invocation::argv).collect()
    }

    /// Number of invocations seen so far
    pub fn call_count(&self) -> usize {
        self.state
            .lock()
            .map(|state| state.invocations.len())
            .unwrap_or(0)
    }

    fn reply(&self, invocation: &Invocation) -> Result<CommandOutput, RunnerError> {
        let reply = match self.state.lock() {
            Ok(mut state) => {
                state.invocations.push(invocation.clone());
                state.queue.pop_front().or_else(|| {
                    state
                        .rules
                        .iter()
                        .find(|rule| rule.matches(invocation))
                        .map(|rule| rule.reply.clone())
                })
            }
            Err(_) => None,
        };

        match reply.unwrap_or_else(|| Scripted::Output(CommandOutput::ok(""))) {
            Scripted::Output(output) => Ok(output),
            Scripted::SpawnError => Err(RunnerError::Spawn {
                program: invocation.program.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "mock spawn failure"),
            }),
        }
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput, RunnerError> {
        self.reply(invocation)
    }

    fn run_interactive(&self, invocation: &Invocation) -> Result<i32, RunnerError> {
        self.reply(invocation).map(|output| output.code)
    }
}
