//! Mock Runtime Implementation
//!
//! In-process stand-ins for the external world, used by unit and integration
//! tests:
//!
//! - [`MockRunner`]: a [`CommandRunner`](crate::runtime::CommandRunner) that
//!   records every invocation and answers from a script instead of spawning
//!   `docker` or `devcontainer`
//! - [`RecordingSink`]: an [`OutputSink`](crate::output::OutputSink) that
//!   captures user-facing messages for assertions

mod runner;
mod sink;

pub use runner::{MockRunner, Scripted};
pub use sink::RecordingSink;
