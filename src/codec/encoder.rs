//! # State Encoder
//!
//! Packs a [`ControllerState`] into the two wire values.
//!
//! Encoding is lossy only at the documented clamp: axis magnitudes above 15
//! are clamped to 15 before packing and can never overflow into an adjacent
//! field.

use super::protocol::*;
use crate::controller::state::ControllerState;

/// Encode button state into a [`ButtonMask`].
///
/// Bit i is set iff button i is pressed, i in 0..15.
///
/// # Examples
///
/// ```
/// use padlink::codec::encoder::encode_buttons;
/// use padlink::controller::state::ControllerState;
///
/// let mut state = ControllerState::default();
/// state.buttons[3] = true;
/// assert_eq!(encode_buttons(&state), 0b1000);
/// ```
#[must_use]
pub fn encode_buttons(state: &ControllerState) -> ButtonMask {
    let mut mask: ButtonMask = 0;
    for (i, &pressed) in state.buttons.iter().enumerate() {
        if pressed {
            mask |= 1 << i;
        }
    }
    mask
}

/// Encode axis state into an [`AxisMask`].
///
/// Stick axes 0..3 pack into 5-bit sign+magnitude fields (bit 4 = sign,
/// bits 0..3 = magnitude); trigger axes 4..5 pack into 4-bit unsigned
/// fields at offsets 20 and 24.
///
/// # Examples
///
/// ```
/// use padlink::codec::encoder::encode_axes;
/// use padlink::controller::state::ControllerState;
///
/// let mut state = ControllerState::default();
/// state.axis[0] = -14;
/// // Sign flag (16) plus magnitude 14 in the lowest field.
/// assert_eq!(encode_axes(&state), 30);
/// ```
#[must_use]
pub fn encode_axes(state: &ControllerState) -> AxisMask {
    let mut mask: AxisMask = 0;

    for (i, &offset) in STICK_FIELD_OFFSETS.iter().enumerate() {
        let value = state.axis[i];
        let magnitude = clamp_magnitude(value.unsigned_abs());
        let mut field = u32::from(magnitude) & STICK_MAGNITUDE_MASK;
        if value < 0 && magnitude > 0 {
            field |= STICK_SIGN_BIT;
        }
        mask |= field << offset;
    }

    for (i, &offset) in TRIGGER_FIELD_OFFSETS.iter().enumerate() {
        let value = state.axis[TRIGGER_AXIS_BASE + i].max(0) as u8;
        let field = u32::from(clamp_magnitude(value)) & TRIGGER_FIELD_MASK;
        mask |= field << offset;
    }

    mask
}

/// Clamp an axis magnitude to the encodable 0..15 domain.
#[inline]
#[must_use]
pub fn clamp_magnitude(magnitude: u8) -> u8 {
    magnitude.min(AXIS_MAGNITUDE_MAX)
}
