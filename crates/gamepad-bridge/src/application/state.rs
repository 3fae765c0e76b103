//! The synchronized cell shared by the poller and the emitter.
//!
//! `ControlCell` is the only piece of shared mutable state in the bridge.
//! It guards the control snapshot, the fatal-error flag, and the
//! stop-request flag behind a single mutex, and exposes nothing but
//! apply-under-lock and read-under-lock operations — raw field access never
//! escapes this module.
//!
//! # Synchronization contract
//!
//! - The poller mutates the snapshot via [`ControlCell::apply`], one closure
//!   per drained batch, so a whole drain is one critical section and a
//!   reader can never observe a partially applied batch.
//! - The emitter copies `(snapshot, error)` via [`ControlCell::snapshot`]
//!   and releases the lock immediately; the copy is consistent across all
//!   three snapshot fields.
//! - The error flag is write-once-true: once set it never resets.
//!
//! Work under the lock is bounded and never performs I/O, so neither side
//! can stall the other.

use std::sync::Mutex;

use bridge_core::ControlSnapshot;

#[derive(Debug, Default)]
struct Inner {
    snapshot: ControlSnapshot,
    error: bool,
    stop_requested: bool,
}

/// Mutex-guarded cell holding the latest control snapshot plus the error and
/// stop-request flags.
#[derive(Debug, Default)]
pub struct ControlCell {
    inner: Mutex<Inner>,
}

impl ControlCell {
    /// Creates a cell with an all-neutral snapshot and both flags clear.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `mutate` on the snapshot inside the critical section.
    ///
    /// The closure must only mutate the snapshot; it runs while the lock is
    /// held, so it must not block or perform I/O.
    pub fn apply<F: FnOnce(&mut ControlSnapshot)>(&self, mutate: F) {
        let mut inner = self.inner.lock().expect("control cell lock poisoned");
        mutate(&mut inner.snapshot);
    }

    /// Copies out the current snapshot together with the error flag.
    pub fn snapshot(&self) -> (ControlSnapshot, bool) {
        let inner = self.inner.lock().expect("control cell lock poisoned");
        (inner.snapshot, inner.error)
    }

    /// Marks the bridge as fatally errored.  Never resets.
    pub fn set_error(&self) {
        let mut inner = self.inner.lock().expect("control cell lock poisoned");
        inner.error = true;
    }

    /// Returns whether the error flag has been set.
    pub fn has_error(&self) -> bool {
        self.inner
            .lock()
            .expect("control cell lock poisoned")
            .error
    }

    /// Asks the poller to terminate at its next poll-interval boundary.
    pub fn request_stop(&self) {
        let mut inner = self.inner.lock().expect("control cell lock poisoned");
        inner.stop_requested = true;
    }

    /// Whether the poller should exit its loop (stop requested or errored).
    pub fn should_stop(&self) -> bool {
        let inner = self.inner.lock().expect("control cell lock poisoned");
        inner.stop_requested || inner.error
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_core::{apply_event, AxisMapping, RawEvent};

    #[test]
    fn test_new_cell_starts_neutral_with_flags_clear() {
        let cell = ControlCell::new();

        let (snapshot, error) = cell.snapshot();

        assert_eq!(snapshot, ControlSnapshot::default());
        assert!(!error);
        assert!(!cell.should_stop());
    }

    #[test]
    fn test_apply_batch_is_visible_as_a_whole() {
        let cell = ControlCell::new();
        let mapping = AxisMapping {
            left_axis: 1,
            right_axis: 4,
        };
        let events = [
            RawEvent::axis(1, i16::MIN),
            RawEvent::axis(4, i16::MIN),
            RawEvent::button(0, 1),
        ];

        cell.apply(|snapshot| {
            for event in &events {
                apply_event(event, &mapping, snapshot);
            }
        });

        let (snapshot, _) = cell.snapshot();
        assert_eq!(snapshot.left_pedal, 1.0);
        assert_eq!(snapshot.right_pedal, 1.0);
        assert_eq!(snapshot.active_button, 0);
    }

    #[test]
    fn test_set_error_is_sticky() {
        let cell = ControlCell::new();

        cell.set_error();

        assert!(cell.has_error());
        assert!(cell.should_stop());
        let (_, error) = cell.snapshot();
        assert!(error);
    }

    #[test]
    fn test_request_stop_sets_should_stop_without_error() {
        let cell = ControlCell::new();

        cell.request_stop();

        assert!(cell.should_stop());
        assert!(!cell.has_error());
    }
}
