//! # Wire Layout Constants
//!
//! Field offsets and widths for the packed controller state values.
//!
//! The layout is fixed for wire compatibility. In particular the stick
//! fields are 5 bits (sign flag + 4-bit magnitude) even though a 0..15
//! magnitude would fit in 4: the spare encoding is part of the wire format
//! and must not be repacked.

/// Number of buttons carried in a [`ButtonMask`].
pub const BUTTON_COUNT: usize = 15;

/// Number of analog axes carried in an [`AxisMask`].
pub const AXIS_COUNT: usize = 6;

/// Number of stick axes (indices 0..3, signed).
pub const STICK_AXES: usize = 4;

/// First trigger axis index (axes 4..5, unsigned).
pub const TRIGGER_AXIS_BASE: usize = 4;

/// Maximum encodable axis magnitude (both sticks and triggers).
pub const AXIS_MAGNITUDE_MAX: u8 = 15;

/// Bit offset of each stick field inside the axis mask.
pub const STICK_FIELD_OFFSETS: [u32; STICK_AXES] = [0, 5, 10, 15];

/// Sign flag inside a 5-bit stick field.
pub const STICK_SIGN_BIT: u32 = 0x10;

/// Magnitude bits inside a 5-bit stick field.
pub const STICK_MAGNITUDE_MASK: u32 = 0x0F;

/// Full 5-bit stick field mask.
pub const STICK_FIELD_MASK: u32 = 0x1F;

/// Bit offset of each trigger field inside the axis mask.
pub const TRIGGER_FIELD_OFFSETS: [u32; 2] = [20, 24];

/// Full 4-bit trigger field mask.
pub const TRIGGER_FIELD_MASK: u32 = 0x0F;

/// Every bit a valid button mask may set (bit 15 is unused).
pub const BUTTON_MASK_USED: u16 = 0x7FFF;

/// Every bit a valid axis mask may set (bits 28..31 are unused).
pub const AXIS_MASK_USED: u32 = 0x0FFF_FFFF;

/// First bind input index derived from a stick direction.
///
/// The bind input index space is the 15 buttons (0..14), then the four
/// stick axes split by sign into eight directional indices (15..22), then
/// the two triggers (23, 24).
pub const BIND_INDEX_STICK_BASE: u8 = BUTTON_COUNT as u8;

/// First bind input index derived from a trigger.
pub const BIND_INDEX_TRIGGER_BASE: u8 = BIND_INDEX_STICK_BASE + (STICK_AXES as u8) * 2;

/// Total size of the bind input index space.
pub const BIND_INDEX_COUNT: u8 = BIND_INDEX_TRIGGER_BASE + 2;

/// Bind input index for a stick direction.
///
/// # Arguments
///
/// * `axis` - Stick axis, 0..3
/// * `negative` - Which sign of the deflection
#[must_use]
pub fn stick_bind_index(axis: usize, negative: bool) -> u8 {
    debug_assert!(axis < STICK_AXES);
    BIND_INDEX_STICK_BASE + (axis as u8) * 2 + u8::from(negative)
}

/// Bind input index for a trigger axis (4 or 5).
#[must_use]
pub fn trigger_bind_index(axis: usize) -> u8 {
    debug_assert!((TRIGGER_AXIS_BASE..AXIS_COUNT).contains(&axis));
    BIND_INDEX_TRIGGER_BASE + (axis - TRIGGER_AXIS_BASE) as u8
}

/// Packed button state: bit i is set iff button i is pressed.
pub type ButtonMask = u16;

/// Packed axis state: four 5-bit stick fields and two 4-bit trigger fields.
pub type AxisMask = u32;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_offsets_do_not_overlap() {
        let mut used: u32 = 0;
        for offset in STICK_FIELD_OFFSETS {
            let field = STICK_FIELD_MASK << offset;
            assert_eq!(used & field, 0, "stick field at {} overlaps", offset);
            used |= field;
        }
        for offset in TRIGGER_FIELD_OFFSETS {
            let field = TRIGGER_FIELD_MASK << offset;
            assert_eq!(used & field, 0, "trigger field at {} overlaps", offset);
            used |= field;
        }
        assert_eq!(used, AXIS_MASK_USED);
    }

    #[test]
    fn test_button_mask_width() {
        assert_eq!(BUTTON_MASK_USED, (1u16 << BUTTON_COUNT) - 1);
    }

    #[test]
    fn test_axis_counts() {
        assert_eq!(STICK_AXES + TRIGGER_FIELD_OFFSETS.len(), AXIS_COUNT);
        assert_eq!(TRIGGER_AXIS_BASE, STICK_AXES);
    }

    #[test]
    fn test_bind_index_space() {
        assert_eq!(BIND_INDEX_STICK_BASE, 15);
        assert_eq!(BIND_INDEX_TRIGGER_BASE, 23);
        assert_eq!(BIND_INDEX_COUNT, 25);
    }

    #[test]
    fn test_stick_bind_indices() {
        assert_eq!(stick_bind_index(0, false), 15);
        assert_eq!(stick_bind_index(0, true), 16);
        assert_eq!(stick_bind_index(3, true), 22);
    }

    #[test]
    fn test_trigger_bind_indices() {
        assert_eq!(trigger_bind_index(4), 23);
        assert_eq!(trigger_bind_index(5), 24);
    }
}
