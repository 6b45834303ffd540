//! Interrupt handling while a child process owns the terminal
//!
//! Ctrl-C reaches every process in the foreground group, so the attached
//! `devcontainer` child receives SIGINT directly and decides how to exit.
//! The wrapper only records the signal and keeps running: once the child
//! returns, the override-config guard drops and the child's exit code is
//! propagated.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

/// Signal handler state
#[derive(Debug, Default)]
pub struct SignalState {
    /// At least one interrupt received
    interrupted: AtomicBool,
    /// Interrupts received (saturating)
    signal_count: AtomicU8,
}

impl SignalState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    pub fn signal_count(&self) -> u8 {
        self.signal_count.load(Ordering::SeqCst)
    }

    /// Record an interrupt and decide what to report
    pub fn handle_signal(&self) -> SignalAction {
        let previous = self
            .signal_count
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| Some(n.saturating_add(1)))
            .unwrap_or(u8::MAX);
        self.interrupted.store(true, Ordering::SeqCst);

        if previous == 0 {
            SignalAction::ForwardedToChild
        } else {
            SignalAction::Ignore
        }
    }
}

/// Action to take after receiving a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalAction {
    /// First interrupt: the child handles it, the wrapper waits
    ForwardedToChild,
    /// Repeated interrupt: nothing more to report
    Ignore,
}

/// Installs the process-wide interrupt handler
pub struct SignalHandler {
    state: Arc<SignalState>,
}

impl SignalHandler {
    pub fn new() -> Self {
        Self {
            state: Arc::new(SignalState::new()),
        }
    }

    /// Shared state, readable after the child exits
    pub fn state(&self) -> Arc<SignalState> {
        Arc::clone(&self.state)
    }

    /// Install the handler. Must be called at most once per process.
    pub fn install(&self) -> Result<(), ctrlc::Error> {
        let state = Arc::clone(&self.state);
        ctrlc::set_handler(move || match state.handle_signal() {
            SignalAction::ForwardedToChild => {
                tracing::debug!("interrupt received, waiting for child to exit");
            }
            SignalAction::Ignore => {}
        })
    }
}

/// Log an interrupt received while the child ran
pub fn report_interrupt(state: &SignalState) -> bool {
    if !state.is_interrupted() {
        return false;
    }
    tracing::info!(signals = state.signal_count(), "child run was interrupted");
    true
}

impl Default for SignalHandler {
    fn default() -> Self {
        Self::new()
    }
}
