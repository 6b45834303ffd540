//! User-facing output
//!
//! Components never print directly. They receive an [`OutputSink`] and report
//! through it, so the binary can write to the console while tests capture or
//! discard the same messages.

use std::io::{self, Write};

/// Severity of a user-facing message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warn,
    Error,
}

/// Destination for status lines shown to the user
pub trait OutputSink {
    /// Emit a message at the given level
    fn emit(&self, level: Level, message: &str);

    fn info(&self, message: &str) {
        self.emit(Level::Info, message);
    }

    fn success(&self, message: &str) {
        self.emit(Level::Success, message);
    }

    fn warn(&self, message: &str) {
        self.emit(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.emit(Level::Error, message);
    }
}

/// Console output: info/success on stdout, warnings and errors on stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl OutputSink for ConsoleSink {
    fn emit(&self, level: Level, message: &str) {
        // Write errors (closed pipe) are ignored
        let _ = match level {
            Level::Info => writeln!(io::stdout(), "{}", message),
            Level::Success => writeln!(io::stdout(), "✓ {}", message),
            Level::Warn => writeln!(io::stderr(), "Warning: {}", message),
            Level::Error => writeln!(io::stderr(), "Error: {}", message),
        };
    }
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSink;

impl OutputSink for SilentSink {
    fn emit(&self, _level: Level, _message: &str) {}
}
