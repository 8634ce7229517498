//! # State Decoder
//!
//! Unpacks the two wire values back into button and axis arrays.
//!
//! A mask with bits outside the documented layout is an internal invariant
//! violation: decoding fails fast in debug builds (`debug_assert!`) and
//! defensively masks the stray bits in release builds.

use super::protocol::*;

/// Decode a [`ButtonMask`] into per-button pressed flags.
///
/// Inverse of [`encode_buttons`](crate::codec::encoder::encode_buttons).
///
/// # Examples
///
/// ```
/// use padlink::codec::decoder::decode_buttons;
///
/// let buttons = decode_buttons(0b1000);
/// assert!(buttons[3]);
/// assert!(!buttons[0]);
/// ```
#[must_use]
pub fn decode_buttons(mask: ButtonMask) -> [bool; BUTTON_COUNT] {
    debug_assert_eq!(mask & !BUTTON_MASK_USED, 0, "button mask out of width: {:#06x}", mask);
    let mask = mask & BUTTON_MASK_USED;

    let mut buttons = [false; BUTTON_COUNT];
    for (i, pressed) in buttons.iter_mut().enumerate() {
        *pressed = (mask >> i) & 1 == 1;
    }
    buttons
}

/// Decode an [`AxisMask`] into signed axis values.
///
/// Sticks come back in −15..15, triggers in 0..15. A set sign flag with
/// magnitude 0 decodes to 0: negative values that round to magnitude 0 are
/// indistinguishable from positive zero on the wire (documented precision
/// floor).
///
/// # Examples
///
/// ```
/// use padlink::codec::decoder::decode_axes;
///
/// // Sign flag plus magnitude 14 in the lowest stick field.
/// assert_eq!(decode_axes(30)[0], -14);
/// ```
#[must_use]
pub fn decode_axes(mask: AxisMask) -> [i8; AXIS_COUNT] {
    debug_assert_eq!(mask & !AXIS_MASK_USED, 0, "axis mask out of width: {:#010x}", mask);
    let mask = mask & AXIS_MASK_USED;

    let mut axis = [0i8; AXIS_COUNT];

    for (i, &offset) in STICK_FIELD_OFFSETS.iter().enumerate() {
        let field = (mask >> offset) & STICK_FIELD_MASK;
        let magnitude = (field & STICK_MAGNITUDE_MASK) as i8;
        axis[i] = if field & STICK_SIGN_BIT != 0 { -magnitude } else { magnitude };
    }

    for (i, &offset) in TRIGGER_FIELD_OFFSETS.iter().enumerate() {
        axis[TRIGGER_AXIS_BASE + i] = ((mask >> offset) & TRIGGER_FIELD_MASK) as i8;
    }

    axis
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encoder::{encode_axes, encode_buttons};
    use crate::controller::state::ControllerState;

    // ==================== Button Decoding Tests ====================

    #[test]
    fn test_decode_buttons_zero() {
        assert_eq!(decode_buttons(0), [false; BUTTON_COUNT]);
    }

    #[test]
    fn test_decode_buttons_all() {
        assert_eq!(decode_buttons(BUTTON_MASK_USED), [true; BUTTON_COUNT]);
    }

    #[test]
    fn test_decode_buttons_single_bits() {
        for i in 0..BUTTON_COUNT {
            let buttons = decode_buttons(1 << i);
            for (j, &pressed) in buttons.iter().enumerate() {
                assert_eq!(pressed, i == j, "mask bit {} button {}", i, j);
            }
        }
    }

    // ==================== Axis Decoding Tests ====================

    #[test]
    fn test_decode_axes_zero() {
        assert_eq!(decode_axes(0), [0i8; AXIS_COUNT]);
    }

    #[test]
    fn test_decode_axes_negative_stick() {
        assert_eq!(decode_axes(30)[0], -14);
    }

    #[test]
    fn test_decode_axes_sign_flag_with_zero_magnitude() {
        // Sign flag alone carries no information: decodes to plain zero.
        let mask = STICK_SIGN_BIT << STICK_FIELD_OFFSETS[1];
        assert_eq!(decode_axes(mask)[1], 0);
    }

    #[test]
    fn test_decode_axes_trigger_fields() {
        let mask = (9 << TRIGGER_FIELD_OFFSETS[0]) | (15 << TRIGGER_FIELD_OFFSETS[1]);
        let axis = decode_axes(mask);
        assert_eq!(axis[4], 9);
        assert_eq!(axis[5], 15);
    }

    #[test]
    fn test_decode_axes_adjacent_fields_independent() {
        // Max out field 0; neighbours must stay zero.
        let axis = decode_axes(STICK_FIELD_MASK);
        assert_eq!(axis[0], -15);
        assert_eq!(axis[1], 0);
        assert_eq!(axis[2], 0);
    }

    // ==================== Round-Trip Tests ====================

    #[test]
    fn test_decode_encode_buttons_round_trip() {
        for mask in [0u16, 1, 0b101, 0x7FFF, 0x4001] {
            let mut state = ControllerState::default();
            state.buttons = decode_buttons(mask);
            assert_eq!(encode_buttons(&state), mask);
        }
    }

    #[test]
    fn test_decode_encode_axes_round_trip() {
        // Canonical masks (no sign flag on zero magnitude) survive the trip.
        for mask in [0u32, 30, 15, 0x0FEF_7BDE & AXIS_MASK_USED] {
            let mut state = ControllerState::default();
            state.axis = decode_axes(mask);
            let reencoded = encode_axes(&state);
            assert_eq!(decode_axes(reencoded), state.axis, "mask {:#x}", mask);
        }
    }

    // ==================== Defensive Masking Tests ====================

    #[test]
    #[cfg(not(debug_assertions))]
    fn test_decode_buttons_masks_stray_bit_in_release() {
        let buttons = decode_buttons(0x8001);
        assert!(buttons[0]);
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn test_decode_axes_masks_stray_bits_in_release() {
        let axis = decode_axes(0xF000_0000 | 7);
        assert_eq!(axis[0], 7);
    }
}
