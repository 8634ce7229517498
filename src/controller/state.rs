//! # Controller State
//!
//! The per-tick snapshot of button and axis state.
//!
//! ## Value domains
//!
//! | Field | Range | Description |
//! |-------|-------|-------------|
//! | `buttons[i]` | bool | pressed flag, 15 buttons |
//! | `axis[0..4]` | −15..15 | stick deflection, sign+magnitude domain |
//! | `axis[4..6]` | 0..15 | trigger travel |
//! | `axis_raw[i]` | −1.0..1.0 | full-precision device value |
//!
//! The snapshot is ephemeral: recomputed every tick by the sampler that owns
//! it, never persisted. `axis_raw` shadows the device floats for the bind
//! workflow's threshold checks; everything transmitted goes through the
//! truncated `axis` domain.

use crate::codec::protocol::{AXIS_COUNT, BUTTON_COUNT, STICK_AXES, TRIGGER_AXIS_BASE};

/// Raw axis values reported when no device is present.
///
/// Sticks rest at center (0.0); triggers rest at −1.0 before the
/// [−1, 1] → [0, 1] remap.
pub const AXIS_REST: [f32; AXIS_COUNT] = [0.0, 0.0, 0.0, 0.0, -1.0, -1.0];

/// Complete controller state for one simulation tick.
///
/// # Examples
///
/// ```
/// use padlink::controller::state::ControllerState;
///
/// let state = ControllerState::default();
/// assert!(!state.any_button_pressed());
/// assert_eq!(state.axis, [0i8; 6]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerState {
    /// Pressed flags, one per button.
    pub buttons: [bool; BUTTON_COUNT],
    /// Truncated axis values in the wire magnitude domain.
    pub axis: [i8; AXIS_COUNT],
    /// Full-precision shadow of the raw device values.
    pub axis_raw: [f32; AXIS_COUNT],
}

impl Default for ControllerState {
    fn default() -> Self {
        Self {
            buttons: [false; BUTTON_COUNT],
            axis: [0; AXIS_COUNT],
            axis_raw: AXIS_REST,
        }
    }
}

impl ControllerState {
    /// Creates a neutral state: no buttons, sticks centered, triggers at rest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fills the snapshot from raw device values.
    ///
    /// Triggers map [−1, 1] → [0, 1] → rounded 0..15. Sticks take the
    /// absolute value clamped to [0, 1], round to 0..15, and keep the sign
    /// when the rounded magnitude is nonzero. A negative value that rounds
    /// to magnitude 0 collapses to +0: a known precision floor, not a fault.
    ///
    /// # Examples
    ///
    /// ```
    /// use padlink::controller::state::ControllerState;
    ///
    /// let mut state = ControllerState::default();
    /// state.fill_from_gamepad([false; 15], [-0.9, 0.0, 0.0, 0.0, -1.0, 1.0]);
    /// assert_eq!(state.axis[0], -14); // round(0.9 * 15) = 14, negative
    /// assert_eq!(state.axis[4], 0);   // trigger at rest
    /// assert_eq!(state.axis[5], 15);  // trigger fully pressed
    /// ```
    pub fn fill_from_gamepad(&mut self, buttons: [bool; BUTTON_COUNT], axes: [f32; AXIS_COUNT]) {
        self.buttons = buttons;
        self.axis_raw = axes;

        for i in 0..STICK_AXES {
            let raw = axes[i];
            let magnitude = (raw.abs().min(1.0) * 15.0).round() as i8;
            self.axis[i] = if raw < 0.0 { -magnitude } else { magnitude };
        }

        for i in TRIGGER_AXIS_BASE..AXIS_COUNT {
            let travel = ((axes[i] + 1.0) / 2.0).clamp(0.0, 1.0);
            self.axis[i] = (travel * 15.0).round() as i8;
        }
    }

    /// Checks if any button is currently pressed.
    #[must_use]
    pub fn any_button_pressed(&self) -> bool {
        self.buttons.iter().any(|&pressed| pressed)
    }

    /// Checks if any stick's raw deflection exceeds a threshold.
    ///
    /// # Arguments
    ///
    /// * `threshold` - Minimum |raw| deflection (0.0..1.0)
    #[must_use]
    pub fn any_stick_beyond(&self, threshold: f32) -> bool {
        self.axis_raw[..STICK_AXES]
            .iter()
            .any(|&raw| raw.abs() > threshold)
    }
}
