//! Shutdown sequencing for the bridge.
//!
//! The whole bridge moves through a single one-way state machine:
//!
//! ```text
//! Init ──device open + poller start──▶ Running
//! Running ──error flag or stop request──▶ Draining
//! Draining ──poller joined, device released──▶ Stopped
//! ```
//!
//! The coordinator enforces the one ordering rule that matters: the device
//! handle is released strictly after the poller thread has terminated.  The
//! poller thread owns the event source; ownership transfers back here only
//! through a completed join, so a close can never race an in-flight read.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::application::poller::{PollerHandle, PollerOutcome};
use crate::application::state::ControlCell;
use crate::infrastructure::joystick::EventSource;

/// Lifecycle phase of the bridge.  Transitions are one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgePhase {
    /// Device not yet open, no actor running.
    Init,
    /// Poller thread running, emitter schedulable.
    Running,
    /// Stop requested; waiting for the poller to terminate.
    Draining,
    /// Poller joined and device handle released.
    Stopped,
}

/// Error type for shutdown operations.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// The poller thread panicked instead of terminating normally.
    #[error("poller thread panicked")]
    PollerPanicked,
}

/// Sequences actor termination and device release.
pub struct ShutdownCoordinator<S: EventSource + 'static> {
    cell: Arc<ControlCell>,
    handle: PollerHandle<S>,
    phase: BridgePhase,
}

impl<S: EventSource + 'static> ShutdownCoordinator<S> {
    /// Takes responsibility for a started bridge (phase `Running`).
    pub fn new(cell: Arc<ControlCell>, handle: PollerHandle<S>) -> Self {
        Self {
            cell,
            handle,
            phase: BridgePhase::Running,
        }
    }

    /// The current lifecycle phase.
    pub fn phase(&self) -> BridgePhase {
        self.phase
    }

    /// Drains and stops the bridge.
    ///
    /// Sets the stop flag (observed by the poller within one poll
    /// interval), joins the poller thread, and only then returns the event
    /// source — dropping it is what finally releases the device handle.
    ///
    /// # Errors
    ///
    /// Returns [`ShutdownError::PollerPanicked`] if the poller thread did
    /// not terminate normally.
    pub fn shutdown(mut self) -> Result<(PollerOutcome, S), ShutdownError> {
        self.phase = BridgePhase::Draining;
        debug!("stop requested; draining");
        self.cell.request_stop();

        let (outcome, source) = self
            .handle
            .join()
            .map_err(|_| ShutdownError::PollerPanicked)?;

        self.phase = BridgePhase::Stopped;
        info!(?outcome, "poller terminated; releasing device handle");
        Ok((outcome, source))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
