//! Output capture

use std::sync::Mutex;

use crate::output::{Level, OutputSink};

/// Output sink that keeps every message in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<(Level, String)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages in emission order
    pub fn messages(&self) -> Vec<(Level, String)> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }

    /// Messages emitted at `level`
    pub fn at_level(&self, level: Level) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message)
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.at_level(Level::Warn)
    }

    pub fn errors(&self) -> Vec<String> {
        self.at_level(Level::Error)
    }

    /// True if any message at `level` contains `needle`
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.at_level(level).iter().any(|m| m.contains(needle))
    }
}

impl OutputSink for RecordingSink {
    fn emit(&self, level: Level, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push((level, message.to_string()));
        }
    }
}
