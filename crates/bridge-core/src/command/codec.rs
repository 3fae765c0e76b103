//! Binary codec for the command datagrams sent to the session.
//!
//! Wire format:
//! ```text
//! [version:1][cmd_type:1][reserved:2][grouping_key:4][seq:8][timestamp_us:8][payload:N]
//! ```
//! Total header size: 24 bytes.  All multi-byte integers are big-endian.
//!
//! Payloads:
//! - `Pedal` (0x01): `[side:1][position:f32]` — side 0x00 = left, 0x01 = right.
//! - `SwitchState` (0x02): `[state:i32]`.
//!
//! One datagram carries exactly one command, so the codec never has to frame
//! across packet boundaries.

use thiserror::Error;

use crate::command::{Command, PedalCommand, PedalSide, SwitchStateCommand};

/// Current wire format version byte.
pub const WIRE_VERSION: u8 = 0x01;

/// Total size of the envelope header in bytes.
pub const HEADER_SIZE: usize = 24;

const CMD_TYPE_PEDAL: u8 = 0x01;
const CMD_TYPE_SWITCH_STATE: u8 = 0x02;

const SIDE_LEFT: u8 = 0x00;
const SIDE_RIGHT: u8 = 0x01;

/// Errors that can occur while encoding or decoding a command datagram.
#[derive(Debug, Error, PartialEq)]
pub enum CodecError {
    /// The byte slice is shorter than the minimum required length.
    #[error("insufficient data: need at least {needed} bytes, got {available}")]
    InsufficientData { needed: usize, available: usize },

    /// The wire version in the header is not supported.
    #[error("unsupported wire version: {0}")]
    UnsupportedVersion(u8),

    /// The command type byte is not a recognized value.
    #[error("unknown command type: 0x{0:02X}")]
    UnknownCommandType(u8),

    /// A payload field holds a value outside its legal range.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

/// A decoded command datagram: the command plus its header metadata.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    /// The decoded command.
    pub command: Command,
    /// Per-publisher monotonically increasing counter.
    pub sequence_number: u64,
    /// Microseconds since Unix epoch at the time of publishing.
    pub timestamp_us: u64,
}

/// Encodes one command into a complete datagram including the header.
pub fn encode_envelope(command: &Command, sequence_number: u64, timestamp_us: u64) -> Vec<u8> {
    let payload = encode_payload(command);

    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    buf.push(WIRE_VERSION);
    buf.push(command_type(command));
    buf.push(0x00); // reserved
    buf.push(0x00); // reserved
    buf.extend_from_slice(&command.grouping_key().to_be_bytes());
    buf.extend_from_slice(&sequence_number.to_be_bytes());
    buf.extend_from_slice(&timestamp_us.to_be_bytes());
    buf.extend_from_slice(&payload);
    buf
}

/// Decodes one command datagram.
///
/// # Errors
///
/// Returns [`CodecError`] if the datagram is truncated, the version is
/// unsupported, or a payload field is out of range.
pub fn decode_envelope(bytes: &[u8]) -> Result<Envelope, CodecError> {
    if bytes.len() < HEADER_SIZE {
        return Err(CodecError::InsufficientData {
            needed: HEADER_SIZE,
            available: bytes.len(),
        });
    }

    let version = bytes[0];
    if version != WIRE_VERSION {
        return Err(CodecError::UnsupportedVersion(version));
    }

    let cmd_type = bytes[1];
    // bytes[2..4] reserved, bytes[4..8] grouping key (recomputed from the
    // command on the way out, so it is not stored separately here).
    let sequence_number = u64::from_be_bytes(
        bytes[8..16]
            .try_into()
            .expect("slice length checked above"),
    );
    let timestamp_us = u64::from_be_bytes(
        bytes[16..24]
            .try_into()
            .expect("slice length checked above"),
    );

    let payload = &bytes[HEADER_SIZE..];
    let command = decode_payload(cmd_type, payload)?;

    Ok(Envelope {
        command,
        sequence_number,
        timestamp_us,
    })
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn command_type(command: &Command) -> u8 {
    match command {
        Command::Pedal(_) => CMD_TYPE_PEDAL,
        Command::SwitchState(_) => CMD_TYPE_SWITCH_STATE,
    }
}

fn encode_payload(command: &Command) -> Vec<u8> {
    match command {
        Command::Pedal(cmd) => {
            let mut payload = Vec::with_capacity(5);
            payload.push(match cmd.side {
                PedalSide::Left => SIDE_LEFT,
                PedalSide::Right => SIDE_RIGHT,
            });
            payload.extend_from_slice(&cmd.position.to_be_bytes());
            payload
        }
        Command::SwitchState(cmd) => cmd.state.to_be_bytes().to_vec(),
    }
}

fn decode_payload(cmd_type: u8, payload: &[u8]) -> Result<Command, CodecError> {
    match cmd_type {
        CMD_TYPE_PEDAL => {
            if payload.len() < 5 {
                return Err(CodecError::InsufficientData {
                    needed: HEADER_SIZE + 5,
                    available: HEADER_SIZE + payload.len(),
                });
            }
            let side = match payload[0] {
                SIDE_LEFT => PedalSide::Left,
                SIDE_RIGHT => PedalSide::Right,
                other => {
                    return Err(CodecError::MalformedPayload(format!(
                        "unknown pedal side: 0x{other:02X}"
                    )))
                }
            };
            let position = f32::from_be_bytes(
                payload[1..5]
                    .try_into()
                    .expect("payload length checked above"),
            );
            if !position.is_finite() {
                return Err(CodecError::MalformedPayload(
                    "pedal position is not finite".to_string(),
                ));
            }
            Ok(Command::Pedal(PedalCommand { side, position }))
        }
        CMD_TYPE_SWITCH_STATE => {
            if payload.len() < 4 {
                return Err(CodecError::InsufficientData {
                    needed: HEADER_SIZE + 4,
                    available: HEADER_SIZE + payload.len(),
                });
            }
            let state = i32::from_be_bytes(
                payload[..4]
                    .try_into()
                    .expect("payload length checked above"),
            );
            Ok(Command::SwitchState(SwitchStateCommand { state }))
        }
        other => Err(CodecError::UnknownCommandType(other)),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
