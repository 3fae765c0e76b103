//! The device-polling actor.
//!
//! Runs on a dedicated OS thread because the readiness wait is a blocking
//! `select(2)` — parking a Tokio worker on that would stall the runtime.
//! The thread owns its event source outright and hands it back through the
//! join handle, so the device handle cannot be released while a read might
//! still be in flight.
//!
//! Loop shape, repeated until stopped or errored:
//!
//! 1. Observe the stop/error flags (one lock acquisition).
//! 2. Wait for readiness with a fixed 20 ms timeout, which bounds how long
//!    a stop request can go unobserved.
//! 3. On readiness, drain every immediately available event (non-blocking
//!    reads, no lock held), then fold the whole batch into the shared cell
//!    inside a single critical section.
//! 4. On any device error, set the shared error flag and terminate.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use bridge_core::{apply_event, AxisMapping};
use tracing::{debug, error, trace};

use crate::application::state::ControlCell;
use crate::infrastructure::joystick::EventSource;

/// Fixed readiness-wait timeout; bounds shutdown-detection latency.
pub const POLL_TIMEOUT: Duration = Duration::from_millis(20);

/// How a poller run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerOutcome {
    /// Terminated on an external stop request.
    Clean,
    /// Terminated after a fatal device error; the error flag is set.
    Errored,
}

/// Runs the polling loop to completion, returning the outcome and the
/// event source so the caller controls when the device handle is released.
pub fn run_poller<S: EventSource>(
    mut source: S,
    mapping: AxisMapping,
    cell: &ControlCell,
) -> (PollerOutcome, S) {
    loop {
        if cell.should_stop() {
            let outcome = if cell.has_error() {
                PollerOutcome::Errored
            } else {
                PollerOutcome::Clean
            };
            debug!(?outcome, "poller stopping");
            return (outcome, source);
        }

        let ready = match source.wait_readable(POLL_TIMEOUT) {
            Ok(ready) => ready,
            Err(e) => {
                error!("device wait failed: {e}");
                cell.set_error();
                return (PollerOutcome::Errored, source);
            }
        };
        if !ready {
            continue;
        }

        // Collect first, then apply: the batch becomes visible atomically
        // and no syscall ever runs while the lock is held.
        let events = match source.drain() {
            Ok(events) => events,
            Err(e) => {
                error!("device read failed: {e}");
                cell.set_error();
                return (PollerOutcome::Errored, source);
            }
        };
        if events.is_empty() {
            continue;
        }

        trace!(count = events.len(), "applying drained events");
        cell.apply(|snapshot| {
            for event in &events {
                apply_event(event, &mapping, snapshot);
            }
        });
    }
}

/// Handle to a running poller thread.
pub struct PollerHandle<S: EventSource + 'static> {
    thread: thread::JoinHandle<(PollerOutcome, S)>,
}

impl<S: EventSource + 'static> PollerHandle<S> {
    /// Blocks until the poller thread has fully terminated.
    ///
    /// Returns the outcome and the event source the thread owned.  An `Err`
    /// means the thread panicked.
    pub fn join(self) -> thread::Result<(PollerOutcome, S)> {
        self.thread.join()
    }
}

/// Spawns the polling loop on a dedicated OS thread.
///
/// The thread takes ownership of `source` and its copy of the mapping; it
/// communicates exclusively through `cell`.
///
/// # Errors
///
/// Returns the OS error if the thread cannot be created.
pub fn spawn_poller<S: EventSource + 'static>(
    source: S,
    mapping: AxisMapping,
    cell: Arc<ControlCell>,
) -> std::io::Result<PollerHandle<S>> {
    let thread = thread::Builder::new()
        .name("gamepad-poller".to_string())
        .spawn(move || run_poller(source, mapping, &cell))?;

    Ok(PollerHandle { thread })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
