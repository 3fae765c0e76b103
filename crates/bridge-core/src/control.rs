//! Normalized control state and the pure event decoder.
//!
//! The decoder is a pure function from `(raw event, axis mapping)` to a
//! mutation of [`ControlSnapshot`].  It performs no I/O and takes no locks;
//! the poller is responsible for calling it inside the shared cell's
//! critical section so that a drain is applied atomically.
//!
//! # Axis normalization
//!
//! Joydev reports axes across the full signed 16-bit range.  A pedal value
//! is derived as
//!
//! ```text
//! pedal = 1.0 - 2.0 * (value - MIN) / (MAX - MIN)
//! ```
//!
//! with MIN = -32768 and MAX = 32767, so the device minimum maps to `1.0`
//! and the device maximum maps to `-1.0`.  The raw input is bounded, so the
//! result needs no additional clamping.

use serde::{Deserialize, Serialize};

use crate::event::{EventKind, RawEvent};

/// Smallest raw axis value the device reports.
pub const AXIS_MIN: i32 = -32768;
/// Largest raw axis value the device reports.
pub const AXIS_MAX: i32 = 32767;

/// Which raw axis indices feed the left and right pedals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisMapping {
    /// Raw axis index decoded into [`ControlSnapshot::left_pedal`].
    pub left_axis: u8,
    /// Raw axis index decoded into [`ControlSnapshot::right_pedal`].
    pub right_axis: u8,
}

/// The normalized control state derived from the device's event stream.
///
/// This is the single piece of long-lived shared data in the bridge.  It is
/// created once at startup with all-neutral values, mutated only by the
/// poller, and read only by the emitter — both under the shared lock, so a
/// copy of this struct is always a consistent snapshot of all three fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlSnapshot {
    /// Left pedal actuation in `[-1.0, 1.0]`.
    pub left_pedal: f32,
    /// Right pedal actuation in `[-1.0, 1.0]`.
    pub right_pedal: f32,
    /// Index of the most recently pressed button, `-1` meaning "none yet".
    pub active_button: i32,
}

impl Default for ControlSnapshot {
    fn default() -> Self {
        Self {
            left_pedal: 0.0,
            right_pedal: 0.0,
            active_button: -1,
        }
    }
}

/// Normalizes a raw axis value into the pedal range `[-1.0, 1.0]`.
///
/// `AXIS_MIN` maps to `1.0` and `AXIS_MAX` to `-1.0` (pushing a pedal
/// forward drives its raw value up and the actuation down).
pub fn normalize_axis(value: i16) -> f32 {
    let percent = (value as i32 - AXIS_MIN) as f32 / (AXIS_MAX - AXIS_MIN) as f32;
    1.0 - 2.0 * percent
}

/// Applies one raw event to the control snapshot.
///
/// - Axis events on the mapped indices update the corresponding pedal.
/// - A button press (`value == 1`) records that button as active.
/// - A button release does **not** clear `active_button`: the active command
///   key sticks until another button is pressed.  Downstream consumers
///   depend on this, so it is preserved deliberately.
/// - Init events and unmapped indices are ignored.
pub fn apply_event(event: &RawEvent, mapping: &AxisMapping, state: &mut ControlSnapshot) {
    match event.kind {
        EventKind::Axis => {
            if event.index == mapping.left_axis {
                state.left_pedal = normalize_axis(event.value);
            }
            if event.index == mapping.right_axis {
                state.right_pedal = normalize_axis(event.value);
            }
        }
        EventKind::Button => {
            if event.value == 1 {
                state.active_button = i32::from(event.index);
            }
        }
        EventKind::Init => {}
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const MAPPING: AxisMapping = AxisMapping {
        left_axis: 1,
        right_axis: 4,
    };

    #[test]
    fn test_normalize_axis_minimum_maps_to_one() {
        assert_eq!(normalize_axis(i16::MIN), 1.0);
    }

    #[test]
    fn test_normalize_axis_maximum_maps_to_minus_one() {
        // 2 * 65535/65535 is exact, so the endpoint is exact as well.
        assert!((normalize_axis(i16::MAX) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_axis_midpoint_is_near_zero() {
        // Raw zero sits half a step off the exact middle of the span.
        assert!(normalize_axis(0).abs() < 1e-4);
    }

    #[test]
    fn test_normalize_axis_stays_in_range_across_full_span() {
        for value in [i16::MIN, -12345, -1, 0, 1, 12345, i16::MAX] {
            let decoded = normalize_axis(value);
            assert!((-1.0..=1.0).contains(&decoded), "out of range for {value}");
        }
    }

    #[test]
    fn test_apply_event_left_axis_updates_left_pedal_only() {
        let mut state = ControlSnapshot::default();

        apply_event(&RawEvent::axis(1, i16::MIN), &MAPPING, &mut state);

        assert_eq!(state.left_pedal, 1.0);
        assert_eq!(state.right_pedal, 0.0);
        assert_eq!(state.active_button, -1);
    }

    #[test]
    fn test_apply_event_right_axis_updates_right_pedal_only() {
        let mut state = ControlSnapshot::default();

        apply_event(&RawEvent::axis(4, i16::MIN), &MAPPING, &mut state);

        assert_eq!(state.right_pedal, 1.0);
        assert_eq!(state.left_pedal, 0.0);
    }

    #[test]
    fn test_apply_event_unmapped_axis_is_ignored() {
        let mut state = ControlSnapshot::default();

        apply_event(&RawEvent::axis(2, i16::MAX), &MAPPING, &mut state);

        assert_eq!(state, ControlSnapshot::default());
    }

    #[test]
    fn test_apply_event_button_press_sets_active_button() {
        let mut state = ControlSnapshot::default();

        apply_event(&RawEvent::button(7, 1), &MAPPING, &mut state);

        assert_eq!(state.active_button, 7);
    }

    #[test]
    fn test_apply_event_button_release_keeps_active_button() {
        // The active button sticks across a release; only another press
        // replaces it.
        let mut state = ControlSnapshot::default();

        apply_event(&RawEvent::button(7, 1), &MAPPING, &mut state);
        apply_event(&RawEvent::button(7, 0), &MAPPING, &mut state);

        assert_eq!(state.active_button, 7);
    }

    #[test]
    fn test_apply_event_second_press_replaces_active_button() {
        let mut state = ControlSnapshot::default();

        apply_event(&RawEvent::button(7, 1), &MAPPING, &mut state);
        apply_event(&RawEvent::button(3, 1), &MAPPING, &mut state);

        assert_eq!(state.active_button, 3);
    }

    #[test]
    fn test_apply_event_init_event_is_ignored() {
        let mut state = ControlSnapshot::default();

        apply_event(
            &RawEvent {
                kind: EventKind::Init,
                index: 1,
                value: i16::MAX,
            },
            &MAPPING,
            &mut state,
        );

        assert_eq!(state, ControlSnapshot::default());
    }

    #[test]
    fn test_default_snapshot_is_all_neutral() {
        let state = ControlSnapshot::default();
        assert_eq!(state.left_pedal, 0.0);
        assert_eq!(state.right_pedal, 0.0);
        assert_eq!(state.active_button, -1);
    }
}
