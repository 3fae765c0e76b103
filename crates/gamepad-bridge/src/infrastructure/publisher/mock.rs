//! Recording [`CommandPublisher`] for tests.

use std::sync::Mutex;

use bridge_core::Command;

use super::{CommandPublisher, PublishError};

/// Records every published command; can simulate a non-running session.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    commands: Mutex<Vec<Command>>,
    not_running: bool,
}

impl RecordingPublisher {
    /// A publisher whose session is running; records all commands.
    pub fn new() -> Self {
        Self::default()
    }

    /// A publisher whose session never reaches the running state.
    pub fn not_running() -> Self {
        Self {
            commands: Mutex::new(Vec::new()),
            not_running: true,
        }
    }

    /// Returns a copy of every command published so far, in order.
    pub fn published(&self) -> Vec<Command> {
        self.commands
            .lock()
            .expect("recording publisher lock poisoned")
            .clone()
    }

    /// Drops all recorded commands.
    pub fn clear(&self) {
        self.commands
            .lock()
            .expect("recording publisher lock poisoned")
            .clear();
    }
}

impl CommandPublisher for RecordingPublisher {
    fn is_running(&self) -> bool {
        !self.not_running
    }

    fn publish(&self, command: Command) -> Result<(), PublishError> {
        if self.not_running {
            return Err(PublishError::SessionNotRunning);
        }
        self.commands
            .lock()
            .expect("recording publisher lock poisoned")
            .push(command);
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
