//! Raw joystick events as reported by the device layer.
//!
//! These are transient values: the poller drains them from the device and
//! folds them into the shared [`ControlSnapshot`](crate::ControlSnapshot)
//! immediately; nothing stores a `RawEvent` beyond that.

use serde::{Deserialize, Serialize};

/// The kind of a raw joystick event.
///
/// Mirrors the Linux joydev event classes.  The kernel tags the synthetic
/// events it emits right after open (reporting the initial position of every
/// axis and button) with an *init* bit; events carrying only that bit decode
/// to [`EventKind::Init`] and are ignored by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// An analog axis moved.
    Axis,
    /// A button changed state (`value` 1 = pressed, 0 = released).
    Button,
    /// Synthetic initial-state marker; carries no usable payload.
    Init,
}

/// One raw event drained from the joystick device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    /// What kind of input changed.
    pub kind: EventKind,
    /// Zero-based axis or button index.
    pub index: u8,
    /// Raw value: full signed 16-bit range for axes, 0/1 for buttons.
    pub value: i16,
}

impl RawEvent {
    /// Shorthand for an axis event.
    pub fn axis(index: u8, value: i16) -> Self {
        Self {
            kind: EventKind::Axis,
            index,
            value,
        }
    }

    /// Shorthand for a button event.
    pub fn button(index: u8, value: i16) -> Self {
        Self {
            kind: EventKind::Button,
            index,
            value,
        }
    }
}
