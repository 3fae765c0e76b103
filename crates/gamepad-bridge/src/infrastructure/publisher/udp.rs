//! UDP multicast session publisher.
//!
//! A session is identified by a one-byte conference id (`cid`): all
//! participants of conference `N` exchange datagrams on the multicast group
//! `225.0.0.N`, port 12175.  Each command is sent as a single datagram in
//! the envelope format from [`bridge_core::command::codec`], stamped with a
//! per-publisher sequence number and a microsecond timestamp.
//!
//! Socket setup failures do not abort construction: they produce a
//! publisher whose session is not running, which the orchestrator treats as
//! "skip the periodic loop, shut down cleanly".

use std::net::{Ipv4Addr, SocketAddrV4, UdpSocket};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use bridge_core::{encode_envelope, Command};
use tracing::{debug, warn};

use super::{CommandPublisher, PublishError};

/// UDP port shared by all conference groups.
pub const SESSION_PORT: u16 = 12175;

/// Publishes commands to the multicast group of one conference.
pub struct UdpSessionPublisher {
    socket: Option<UdpSocket>,
    group: SocketAddrV4,
    /// Monotonically increasing datagram counter.
    ///
    /// `Relaxed` is sufficient: sequence numbers order datagrams, they do
    /// not synchronise memory between threads.
    sequence: AtomicU64,
}

impl UdpSessionPublisher {
    /// Sets up a publisher for conference `cid`.
    ///
    /// Never fails: if the socket cannot be created the session simply
    /// never reaches its running state, which [`is_running`] reports.
    ///
    /// [`is_running`]: CommandPublisher::is_running
    pub fn open(cid: u8) -> Self {
        let group = SocketAddrV4::new(Ipv4Addr::new(225, 0, 0, cid), SESSION_PORT);

        let socket = match Self::setup_socket() {
            Ok(socket) => Some(socket),
            Err(e) => {
                warn!("session {group} unavailable: {e}");
                None
            }
        };

        Self {
            socket,
            group,
            sequence: AtomicU64::new(0),
        }
    }

    fn setup_socket() -> std::io::Result<UdpSocket> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
        // The tick must never stall on a send buffer.
        socket.set_nonblocking(true)?;
        socket.set_multicast_loop_v4(true)?;
        Ok(socket)
    }

    /// The multicast group this publisher sends to.
    pub fn group(&self) -> SocketAddrV4 {
        self.group
    }
}

impl CommandPublisher for UdpSessionPublisher {
    fn is_running(&self) -> bool {
        self.socket.is_some()
    }

    fn publish(&self, command: Command) -> Result<(), PublishError> {
        let socket = self.socket.as_ref().ok_or(PublishError::SessionNotRunning)?;

        let timestamp_us = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_micros() as u64;
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);

        let datagram = encode_envelope(&command, sequence, timestamp_us);
        socket.send_to(&datagram, self.group)?;

        debug!(
            key = command.grouping_key(),
            sequence,
            "published command datagram"
        );
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
