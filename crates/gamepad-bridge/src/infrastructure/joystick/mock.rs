//! Scriptable in-memory [`EventSource`] for tests.
//!
//! `MockEventSource` replays a queue of steps: each step is either a batch
//! of events (one `drain` worth) or an injected read error.  Cloning the
//! mock shares the underlying script, so a test can keep one handle to
//! inject steps while the poller thread owns the other.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use bridge_core::RawEvent;

use super::{DeviceError, EventSource};

/// One scripted step consumed by a `drain` call.
#[derive(Debug)]
enum Step {
    Events(Vec<RawEvent>),
    ReadError,
}

#[derive(Debug, Default)]
struct Shared {
    script: Mutex<VecDeque<Step>>,
    wait_calls: AtomicU32,
    drain_calls: AtomicU32,
}

/// Shared-handle mock event source.
#[derive(Debug, Clone, Default)]
pub struct MockEventSource {
    shared: Arc<Shared>,
}

impl MockEventSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a batch of events to be returned by the next `drain`.
    pub fn inject_events(&self, events: Vec<RawEvent>) {
        self.shared
            .script
            .lock()
            .expect("mock script lock poisoned")
            .push_back(Step::Events(events));
    }

    /// Queues a fatal read error to be returned by the next `drain`.
    pub fn inject_read_error(&self) {
        self.shared
            .script
            .lock()
            .expect("mock script lock poisoned")
            .push_back(Step::ReadError);
    }

    /// Number of `wait_readable` calls made so far.
    pub fn wait_count(&self) -> u32 {
        self.shared.wait_calls.load(Ordering::Relaxed)
    }

    /// Number of `drain` calls made so far.
    pub fn drain_count(&self) -> u32 {
        self.shared.drain_calls.load(Ordering::Relaxed)
    }
}

impl EventSource for MockEventSource {
    fn wait_readable(&mut self, timeout: Duration) -> Result<bool, DeviceError> {
        self.shared.wait_calls.fetch_add(1, Ordering::Relaxed);

        let has_step = !self
            .shared
            .script
            .lock()
            .expect("mock script lock poisoned")
            .is_empty();
        if has_step {
            return Ok(true);
        }

        // Simulate the bounded readiness wait so the poller loop keeps the
        // same cadence against the mock as against a real device.
        thread::sleep(timeout);
        Ok(false)
    }

    fn drain(&mut self) -> Result<Vec<RawEvent>, DeviceError> {
        self.shared.drain_calls.fetch_add(1, Ordering::Relaxed);

        let step = self
            .shared
            .script
            .lock()
            .expect("mock script lock poisoned")
            .pop_front();
        match step {
            Some(Step::Events(events)) => Ok(events),
            Some(Step::ReadError) => Err(DeviceError::Read(std::io::Error::new(
                std::io::ErrorKind::Other,
                "injected read error",
            ))),
            None => Ok(Vec::new()),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
