//! Outbound actuation command types.
//!
//! Every command published to the session carries a *grouping key*: a small
//! integer that distinguishes otherwise identical command shapes on the
//! wire.  Both pedals are `Pedal` commands; the key tells subscribers which
//! side a value belongs to.
//!
//! | Command              | Grouping key |
//! |----------------------|--------------|
//! | `Pedal` (left side)  | 0            |
//! | `Pedal` (right side) | 10           |
//! | `SwitchState`        | 99           |

use serde::{Deserialize, Serialize};

pub mod codec;

// ── Grouping keys ─────────────────────────────────────────────────────────────

/// Grouping key for the left pedal command.
pub const KEY_PEDAL_LEFT: u32 = 0;
/// Grouping key for the right pedal command.
pub const KEY_PEDAL_RIGHT: u32 = 10;
/// Grouping key for the switch-state command.
pub const KEY_SWITCH_STATE: u32 = 99;

/// Which pedal a [`PedalCommand`] actuates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PedalSide {
    Left,
    Right,
}

/// Requests a pedal actuation in `[-1.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PedalCommand {
    /// Which pedal to actuate.
    pub side: PedalSide,
    /// Normalized actuation value.
    pub position: f32,
}

/// Reports the active button to switch downstream consumers, `-1` = none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchStateCommand {
    /// Index of the active button.
    pub state: i32,
}

/// One outbound command, tagged with its grouping key on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Command {
    Pedal(PedalCommand),
    SwitchState(SwitchStateCommand),
}

impl Command {
    /// Convenience constructor for a pedal command.
    pub fn pedal(side: PedalSide, position: f32) -> Self {
        Command::Pedal(PedalCommand { side, position })
    }

    /// Convenience constructor for a switch-state command.
    pub fn switch_state(state: i32) -> Self {
        Command::SwitchState(SwitchStateCommand { state })
    }

    /// Returns the grouping key this command is published under.
    pub fn grouping_key(&self) -> u32 {
        match self {
            Command::Pedal(cmd) => match cmd.side {
                PedalSide::Left => KEY_PEDAL_LEFT,
                PedalSide::Right => KEY_PEDAL_RIGHT,
            },
            Command::SwitchState(_) => KEY_SWITCH_STATE,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
