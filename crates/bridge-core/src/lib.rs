//! # bridge-core
//!
//! Shared library for gamepad-bridge containing the raw device event types,
//! the normalized control state and its decoder, and the outbound command
//! types with their binary wire codec.
//!
//! This crate is pure domain logic: it has zero dependencies on OS APIs,
//! device drivers, or network sockets, so everything in it is unit-testable
//! on any platform.
//!
//! # Architecture overview
//!
//! gamepad-bridge reads a Linux joystick device and republishes its state as
//! actuation commands at a fixed frequency.  This crate defines the three
//! stations of that pipeline that are shared between components:
//!
//! - **`event`** – The raw event shape produced by the device layer: axis
//!   movements, button transitions, and synthetic init events.
//!
//! - **`control`** – The normalized control snapshot (two pedals in
//!   `[-1.0, 1.0]` plus the active button) and the pure decoder that folds a
//!   raw event into it.
//!
//! - **`command`** – The outbound command vocabulary (`Pedal`,
//!   `SwitchState`), the grouping keys that tag each command on the wire,
//!   and the binary envelope codec used by the UDP session publisher.

pub mod command;
pub mod control;
pub mod event;

// Re-export the most-used types at the crate root so callers can write
// `bridge_core::ControlSnapshot` instead of the full module path.
pub use command::codec::{decode_envelope, encode_envelope, CodecError, Envelope};
pub use command::{Command, PedalCommand, PedalSide, SwitchStateCommand};
pub use control::{apply_event, normalize_axis, AxisMapping, ControlSnapshot};
pub use event::{EventKind, RawEvent};
