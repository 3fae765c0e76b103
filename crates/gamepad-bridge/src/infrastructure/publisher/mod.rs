//! Outbound command publishing behind the [`CommandPublisher`] trait.
//!
//! The emitter only depends on this trait; the production implementation
//! ([`udp::UdpSessionPublisher`]) sends one datagram per command to the
//! session's multicast group, and tests use [`mock::RecordingPublisher`].
//!
//! A publisher may fail to reach its running state (for example when no
//! multicast-capable socket can be set up).  That is not fatal: the
//! orchestrator skips the periodic loop, still attempts the neutral burst
//! (a no-op against a non-running session), and shuts down cleanly.

use bridge_core::{CodecError, Command};
use thiserror::Error;

pub mod mock;
pub mod udp;

/// Error type for publish operations.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The session never reached (or has lost) its running state.
    #[error("session is not running")]
    SessionNotRunning,

    /// The command could not be encoded.
    #[error("failed to encode command: {0}")]
    Encode(#[from] CodecError),

    /// The datagram could not be sent.
    #[error("failed to send command: {0}")]
    Send(#[from] std::io::Error),
}

/// Trait abstracting the external publishing collaborator.
///
/// Implementations must not block: the emitter calls [`publish`] from the
/// fixed-frequency tick and relies on it returning promptly.
///
/// [`publish`]: CommandPublisher::publish
pub trait CommandPublisher: Send + Sync {
    /// Whether the underlying session is up and able to carry commands.
    fn is_running(&self) -> bool;

    /// Publishes one command, tagged with its grouping key.
    fn publish(&self, command: Command) -> Result<(), PublishError>;
}
