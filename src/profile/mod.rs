//! # Binding Profile
//!
//! The per-item persisted record tying controller inputs to targets and
//! frequencies.
//!
//! This module handles:
//! - The 12 motor slots and 8 auxiliary slots ([`binding`])
//! - Load/save over a nested key/value record, with a one-way migration
//!   from the legacy 4-slot schema ([`storage`])
//! - Consuming bind messages into motor slots

pub mod binding;
pub mod storage;

use crate::network::{FrequencyPair, Location};
use binding::{AuxBinding, MotorBinding, MotorSlot, AUX_SLOT_COUNT, MOTOR_SLOT_COUNT};
use tracing::debug;

/// A controller item's complete binding configuration.
///
/// Owns exactly 12 motor bindings and 8 auxiliary bindings. Slots are fixed
/// and independent; no two slots need distinct targets.
///
/// # Examples
///
/// ```
/// use padlink::profile::BindingProfile;
/// use padlink::profile::binding::MotorSlot;
///
/// let profile = BindingProfile::new();
/// assert!(!profile.motor(MotorSlot::LeftUp).has_target());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BindingProfile {
    motors: [MotorBinding; MOTOR_SLOT_COUNT],
    aux: [AuxBinding; AUX_SLOT_COUNT],
}

impl BindingProfile {
    /// Creates an all-default profile.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The motor binding in a slot.
    #[must_use]
    pub fn motor(&self, slot: MotorSlot) -> &MotorBinding {
        &self.motors[slot.index()]
    }

    /// Mutable access to a motor slot.
    pub fn motor_mut(&mut self, slot: MotorSlot) -> &mut MotorBinding {
        &mut self.motors[slot.index()]
    }

    /// All motor slots in slot order.
    #[must_use]
    pub fn motors(&self) -> &[MotorBinding; MOTOR_SLOT_COUNT] {
        &self.motors
    }

    /// The auxiliary binding in a slot, if the index is in range.
    #[must_use]
    pub fn aux(&self, index: usize) -> Option<&AuxBinding> {
        self.aux.get(index)
    }

    /// Mutable access to an auxiliary slot, if the index is in range.
    pub fn aux_mut(&mut self, index: usize) -> Option<&mut AuxBinding> {
        self.aux.get_mut(index)
    }

    /// All auxiliary slots in slot order.
    #[must_use]
    pub fn aux_slots(&self) -> &[AuxBinding; AUX_SLOT_COUNT] {
        &self.aux
    }

    /// Consumes a bind message: points the motor slot for `input_index` at
    /// the given target.
    ///
    /// Input indices without a motor slot (most plain buttons) are a benign
    /// no-op and return false; aux frequencies are assigned through
    /// [`set_aux_frequency`](Self::set_aux_frequency) instead.
    pub fn apply_bind(&mut self, input_index: u8, target: Location, target_kind: &str) -> bool {
        let Some(slot) = MotorSlot::from_input_index(input_index) else {
            debug!("bind input {} has no motor slot, ignoring", input_index);
            return false;
        };
        let bound = self.motor_mut(slot);
        bound.target = Some(target);
        bound.target_kind = target_kind.to_string();
        if bound.label.is_empty() {
            bound.label = slot.label().to_string();
        }
        debug!("bound {} to {:?} ({})", slot.label(), target, target_kind);
        true
    }

    /// Assigns an auxiliary slot's frequency pair (configuration UI path).
    ///
    /// Out-of-range indices are a benign no-op.
    pub fn set_aux_frequency(&mut self, index: usize, frequency: FrequencyPair) {
        if let Some(slot) = self.aux.get_mut(index) {
            slot.frequency = frequency;
        }
    }
}
