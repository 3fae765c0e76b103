//! gamepad-bridge — entry point.
//!
//! Interfaces with a Linux joystick device and republishes its state as
//! actuation commands on a UDP session at a fixed frequency.
//!
//! # Usage
//!
//! ```text
//! gamepad-bridge [OPTIONS] --device <PATH> --axis-left-updown <N> \
//!                --axis-right-updown <N> --freq <HZ> --cid <CID>
//!
//! Options:
//!   --device            <PATH>  Joystick device, e.g. /dev/input/js0
//!   --axis-left-updown  <N>     Raw axis index for the left pedal
//!   --axis-right-updown <N>     Raw axis index for the right pedal
//!   --freq              <HZ>    Command emission frequency
//!   --cid               <CID>   Session conference id (group 225.0.0.CID)
//!   --verbose                   Per-command diagnostics
//! ```
//!
//! Missing required arguments produce a usage message on stderr and a
//! nonzero exit before any device access.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ Cli::parse() → BridgeConfig
//!  └─ JoystickDevice::open()        -- once, non-blocking
//!  └─ spawn_poller()                -- dedicated OS thread, owns the device
//!  └─ UdpSessionPublisher::open()
//!  └─ neutral burst, then the tick loop (tokio interval + Ctrl-C)
//!  └─ ShutdownCoordinator::shutdown()  -- stop flag → join → close device
//! ```

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bridge_core::AxisMapping;
use gamepad_bridge::application::emitter::CommandEmitter;
use gamepad_bridge::application::poller::{spawn_poller, PollerOutcome};
use gamepad_bridge::application::shutdown::ShutdownCoordinator;
use gamepad_bridge::application::state::ControlCell;
use gamepad_bridge::config::BridgeConfig;
use gamepad_bridge::infrastructure::publisher::{udp::UdpSessionPublisher, CommandPublisher};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Bridges a joystick to fixed-frequency actuation commands.
#[derive(Debug, Parser)]
#[command(
    name = "gamepad-bridge",
    about = "Emits pedal and switch-state commands derived from a joystick device",
    version
)]
struct Cli {
    /// Path to the joystick character device (e.g. /dev/input/js0).
    #[arg(long, env = "GAMEPAD_DEVICE")]
    device: std::path::PathBuf,

    /// Raw axis index decoded into the left pedal.
    #[arg(long = "axis-left-updown", env = "GAMEPAD_AXIS_LEFT")]
    axis_left_updown: u8,

    /// Raw axis index decoded into the right pedal.
    #[arg(long = "axis-right-updown", env = "GAMEPAD_AXIS_RIGHT")]
    axis_right_updown: u8,

    /// Command emission frequency in Hz.
    #[arg(long, env = "GAMEPAD_FREQ")]
    freq: f32,

    /// Session conference id; commands go to multicast group 225.0.0.CID.
    #[arg(long, env = "GAMEPAD_CID")]
    cid: u8,

    /// Log per-command diagnostics.
    #[arg(long, env = "GAMEPAD_VERBOSE")]
    verbose: bool,
}

impl Cli {
    /// Validates the parsed arguments into a [`BridgeConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if `--freq` is not a finite, positive number.
    fn into_config(self) -> anyhow::Result<BridgeConfig> {
        if !self.freq.is_finite() || self.freq <= 0.0 {
            bail!("--freq must be a finite, positive frequency in Hz (got {})", self.freq);
        }

        Ok(BridgeConfig {
            device_path: self.device,
            mapping: AxisMapping {
                left_axis: self.axis_left_updown,
                right_axis: self.axis_right_updown,
            },
            frequency_hz: self.freq,
            cid: self.cid,
            verbose: self.verbose,
        })
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse first: argument errors must not touch the device.
    let cli = Cli::parse();
    let config = cli.into_config()?;

    // Level from RUST_LOG; --verbose raises the default to debug.
    let default_level = if config.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    info!("gamepad-bridge starting — device={}", config.device_path.display());

    run_bridge(config).await
}

#[cfg(target_os = "linux")]
async fn run_bridge(config: BridgeConfig) -> anyhow::Result<()> {
    use gamepad_bridge::infrastructure::joystick::linux::JoystickDevice;

    // ── Device ────────────────────────────────────────────────────────────────
    let device = JoystickDevice::open(&config.device_path)
        .context("startup failed before any actor was launched")?;
    let descriptor = device.descriptor().clone();
    info!(
        "Found {}, number of axes: {}, number of buttons: {}",
        descriptor.name, descriptor.axes, descriptor.buttons
    );

    // ── Actors ────────────────────────────────────────────────────────────────
    let cell = Arc::new(ControlCell::new());
    let handle = spawn_poller(device, config.mapping, Arc::clone(&cell))
        .context("failed to spawn the poller thread")?;
    let coordinator = ShutdownCoordinator::new(Arc::clone(&cell), handle);

    let publisher = Arc::new(UdpSessionPublisher::open(config.cid));
    let emitter = CommandEmitter::new(
        Arc::clone(&cell),
        Arc::clone(&publisher) as Arc<dyn CommandPublisher>,
    );

    // ── Ctrl-C handler ────────────────────────────────────────────────────────
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C — initiating graceful shutdown");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    // ── Emission ──────────────────────────────────────────────────────────────
    // The neutral burst announces an all-neutral state before the first
    // timed tick.  Against a non-running session it is a logged no-op.
    emitter.emit_neutral();

    if publisher.is_running() {
        info!(
            "session {} running — emitting at {} Hz",
            publisher.group(),
            config.frequency_hz
        );
        run_emission_loop(&emitter, config.tick_period(), &running).await;
    } else {
        warn!("session never reached running state; skipping periodic emission");
    }

    // ── Shutdown ──────────────────────────────────────────────────────────────
    let (outcome, device) = coordinator
        .shutdown()
        .context("failed to stop the poller")?;
    // Only now is it safe to release the handle: the poller has terminated.
    drop(device);
    info!("gamepad-bridge stopped");

    match outcome {
        PollerOutcome::Clean => Ok(()),
        PollerOutcome::Errored => bail!("device read error — see log for details"),
    }
}

#[cfg(not(target_os = "linux"))]
async fn run_bridge(_config: BridgeConfig) -> anyhow::Result<()> {
    bail!("gamepad-bridge requires the Linux joydev interface")
}

/// Drives the emitter at a fixed frequency until it reports a fatal error
/// or an external stop is requested.
async fn run_emission_loop(emitter: &CommandEmitter, period: Duration, running: &AtomicBool) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        interval.tick().await;
        if !running.load(Ordering::Relaxed) {
            break;
        }
        if !emitter.tick() {
            warn!("fatal device error observed; halting emission");
            break;
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: [&str; 11] = [
        "gamepad-bridge",
        "--device",
        "/dev/input/js0",
        "--axis-left-updown",
        "1",
        "--axis-right-updown",
        "4",
        "--freq",
        "50",
        "--cid",
        "111",
    ];

    #[test]
    fn test_cli_parses_all_required_arguments() {
        let cli = Cli::parse_from(REQUIRED);

        assert_eq!(cli.device, std::path::PathBuf::from("/dev/input/js0"));
        assert_eq!(cli.axis_left_updown, 1);
        assert_eq!(cli.axis_right_updown, 4);
        assert_eq!(cli.freq, 50.0);
        assert_eq!(cli.cid, 111);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_missing_required_argument_is_an_error() {
        // Drop --cid and its value.
        let result = Cli::try_parse_from(&REQUIRED[..9]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_verbose_flag() {
        let mut args = REQUIRED.to_vec();
        args.push("--verbose");

        let cli = Cli::parse_from(args);

        assert!(cli.verbose);
    }

    #[test]
    fn test_into_config_builds_mapping_from_axis_arguments() {
        let config = Cli::parse_from(REQUIRED).into_config().unwrap();

        assert_eq!(config.mapping.left_axis, 1);
        assert_eq!(config.mapping.right_axis, 4);
        assert_eq!(config.frequency_hz, 50.0);
    }

    #[test]
    fn test_into_config_rejects_zero_frequency() {
        let mut cli = Cli::parse_from(REQUIRED);
        cli.freq = 0.0;

        assert!(cli.into_config().is_err());
    }

    #[test]
    fn test_into_config_rejects_negative_frequency() {
        let mut cli = Cli::parse_from(REQUIRED);
        cli.freq = -10.0;

        assert!(cli.into_config().is_err());
    }

    #[test]
    fn test_into_config_rejects_nan_frequency() {
        let mut cli = Cli::parse_from(REQUIRED);
        cli.freq = f32::NAN;

        assert!(cli.into_config().is_err());
    }
}
