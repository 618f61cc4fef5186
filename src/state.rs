use crate::jobs::ChildStatus;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Process-wide shell state.
///
/// `foreground_only` is the one field written asynchronously: the stop-signal
/// handler flips it through the shared atomic. Everything else is owned by the
/// main loop.
#[derive(Debug, Default)]
pub struct ShellState {
    foreground_only: Arc<AtomicBool>,
    observed_foreground_only: bool,
    last_status: ChildStatus,
}

impl ShellState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the foreground-only flag for the stop-signal handler.
    pub fn foreground_only_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.foreground_only)
    }

    pub fn foreground_only(&self) -> bool {
        self.foreground_only.load(Ordering::SeqCst)
    }

    /// Returns the new mode if it changed since the last call.
    pub fn take_mode_change(&mut self) -> Option<bool> {
        let current = self.foreground_only();
        if current == self.observed_foreground_only {
            return None;
        }
        self.observed_foreground_only = current;
        Some(current)
    }

    /// Status of the most recent foreground child.
    pub fn last_status(&self) -> ChildStatus {
        self.last_status
    }

    pub fn record_foreground(&mut self, status: ChildStatus) {
        self.last_status = status;
    }
}
