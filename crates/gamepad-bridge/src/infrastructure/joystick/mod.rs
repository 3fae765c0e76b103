//! Joystick device access behind the [`EventSource`] trait.
//!
//! The production implementation ([`linux::JoystickDevice`]) wraps the
//! Linux joydev character device: a non-blocking file descriptor polled
//! with `select(2)` and drained with fixed-size `read(2)` calls.  Tests use
//! [`mock::MockEventSource`], which replays a script and can inject read
//! errors.
//!
//! # Contract
//!
//! - `wait_readable` blocks for at most `timeout`; a `false` return means
//!   the timeout elapsed without data, which is not an error.
//! - `drain` only ever performs non-blocking reads and returns every event
//!   that was immediately available.  The would-block condition terminates a
//!   drain normally; any other read failure is [`DeviceError::Read`] and is
//!   the one fatal runtime condition.
//! - The device is opened once, before the poller starts, and never
//!   reopened.  The handle is released on drop, which the shutdown
//!   coordinator delays until the poller thread has terminated.

use std::path::PathBuf;
use std::time::Duration;

use bridge_core::RawEvent;
use thiserror::Error;

pub mod mock;

#[cfg(target_os = "linux")]
pub mod linux;

/// Error type for device operations.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The device could not be opened.  Fatal at startup.
    #[error("could not open device {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A read failed with something other than would-block, or the device
    /// reported end-of-file (it was unplugged).  Fatal once detected.
    #[error("device read failed: {0}")]
    Read(std::io::Error),
}

/// Identity reported by the device at open time, logged once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    /// Device name, or the literal `"Unknown"` if the device does not
    /// report one.
    pub name: String,
    /// Number of axes the device exposes.
    pub axes: u8,
    /// Number of buttons the device exposes.
    pub buttons: u8,
}

/// Trait abstracting raw joystick event production.
pub trait EventSource: Send {
    /// Waits up to `timeout` for the device to become readable.
    ///
    /// Returns `Ok(true)` when data is available, `Ok(false)` on timeout.
    fn wait_readable(&mut self, timeout: Duration) -> Result<bool, DeviceError>;

    /// Reads every event that is available right now, without blocking.
    fn drain(&mut self) -> Result<Vec<RawEvent>, DeviceError>;
}
