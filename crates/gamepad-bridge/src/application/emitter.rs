//! The fixed-frequency command emitter.
//!
//! The emitter owns no loop: the orchestrator's scheduler calls
//! [`CommandEmitter::tick`] at the configured frequency and must stop
//! calling it once a tick returns `false`.  Each tick copies the snapshot
//! and error flag out of the shared cell under the lock, releases the lock,
//! and then publishes — so the emitter never blocks and never holds the
//! lock across I/O.
//!
//! Per tick:
//! - `active_button == 0`: left pedal command, then right pedal command,
//!   then the switch-state command.
//! - any other active button: only the switch-state command.
//!
//! Publish failures are logged and never fatal; only a device error (the
//! shared error flag) halts the schedule.

use std::sync::Arc;

use bridge_core::{Command, PedalSide};
use tracing::{debug, warn};

use crate::application::state::ControlCell;
use crate::infrastructure::publisher::CommandPublisher;

/// Emits actuation commands derived from the latest control snapshot.
pub struct CommandEmitter {
    cell: Arc<ControlCell>,
    publisher: Arc<dyn CommandPublisher>,
}

impl CommandEmitter {
    pub fn new(cell: Arc<ControlCell>, publisher: Arc<dyn CommandPublisher>) -> Self {
        Self { cell, publisher }
    }

    /// Publishes one burst for the current snapshot.
    ///
    /// Returns `false` once the fatal error flag has been observed; the
    /// scheduler must then stop invoking the emitter.
    pub fn tick(&self) -> bool {
        let (snapshot, errored) = self.cell.snapshot();

        if snapshot.active_button == 0 {
            self.publish(Command::pedal(PedalSide::Left, snapshot.left_pedal));
            self.publish(Command::pedal(PedalSide::Right, snapshot.right_pedal));
        }
        self.publish(Command::switch_state(snapshot.active_button));

        !errored
    }

    /// Publishes the all-neutral burst sent once before the first tick.
    pub fn emit_neutral(&self) {
        self.publish(Command::pedal(PedalSide::Left, 0.0));
        self.publish(Command::pedal(PedalSide::Right, 0.0));
        self.publish(Command::switch_state(-1));
    }

    fn publish(&self, command: Command) {
        match self.publisher.publish(command) {
            Ok(()) => {}
            Err(e) => {
                // A lost command is repaired by the next tick; only device
                // errors halt the bridge.
                if self.publisher.is_running() {
                    warn!(key = command.grouping_key(), "publish failed: {e}");
                } else {
                    debug!(key = command.grouping_key(), "session not running: {e}");
                }
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
