//! Runtime configuration for the bridge.
//!
//! Built once from the CLI in `main.rs` and immutable afterwards.  The
//! orchestrator owns it; the actors receive the pieces they need (the axis
//! mapping is `Copy`, the device path is only used for the one-time open).

use std::path::PathBuf;
use std::time::Duration;

use bridge_core::AxisMapping;

/// Immutable bridge configuration, validated at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    /// Path to the joystick character device, e.g. `/dev/input/js0`.
    pub device_path: PathBuf,
    /// Which raw axis indices feed the two pedals.
    pub mapping: AxisMapping,
    /// Command emission frequency in Hz.  Always finite and positive.
    pub frequency_hz: f32,
    /// Session (conference) identifier consumed by the publisher.
    pub cid: u8,
    /// Emit per-command diagnostics.
    pub verbose: bool,
}

impl BridgeConfig {
    /// Returns the emission period derived from [`frequency_hz`].
    ///
    /// [`frequency_hz`]: BridgeConfig::frequency_hz
    pub fn tick_period(&self) -> Duration {
        Duration::from_secs_f32(1.0 / self.frequency_hz)
    }
}
