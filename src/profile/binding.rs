//! # Binding Slots
//!
//! The fixed slot tables of a [`BindingProfile`](super::BindingProfile).
//!
//! Motor slots are identified by gamepad-direction label, never by an
//! arbitrary index; the slot order below is part of the persisted layout and
//! of the legacy migration table, so it must not be reordered.

use crate::codec::protocol::{
    trigger_bind_index, BIND_INDEX_STICK_BASE, BIND_INDEX_TRIGGER_BASE,
};
use crate::controller::device::buttons;
use crate::network::{FrequencyPair, Location};
use serde::{Deserialize, Serialize};

/// Number of motor binding slots.
pub const MOTOR_SLOT_COUNT: usize = 12;

/// Number of auxiliary binding slots.
pub const AUX_SLOT_COUNT: usize = 8;

/// Motor speed domain.
pub const SPEED_MIN: u16 = 1;
/// Motor speed domain.
pub const SPEED_MAX: u16 = 256;
/// Default motor speed.
pub const SPEED_DEFAULT: u16 = 64;

/// Auxiliary power domain.
pub const POWER_MIN: u8 = 1;
/// Auxiliary power domain.
pub const POWER_MAX: u8 = 15;

/// Default sequential travel distance.
pub const DISTANCE_DEFAULT: u32 = 10;

/// The twelve motor slots, labelled by gamepad direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotorSlot {
    LeftUp,
    LeftDown,
    LeftLeft,
    LeftRight,
    RightUp,
    RightDown,
    RightLeft,
    RightRight,
    TriggerLeft,
    TriggerRight,
    BumperLeft,
    BumperRight,
}

impl MotorSlot {
    /// Every slot in persisted order.
    pub const ALL: [MotorSlot; MOTOR_SLOT_COUNT] = [
        MotorSlot::LeftUp,
        MotorSlot::LeftDown,
        MotorSlot::LeftLeft,
        MotorSlot::LeftRight,
        MotorSlot::RightUp,
        MotorSlot::RightDown,
        MotorSlot::RightLeft,
        MotorSlot::RightRight,
        MotorSlot::TriggerLeft,
        MotorSlot::TriggerRight,
        MotorSlot::BumperLeft,
        MotorSlot::BumperRight,
    ];

    /// Position of this slot in the persisted slot table.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The slot at a persisted table position.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Human-readable slot label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            MotorSlot::LeftUp => "L Up",
            MotorSlot::LeftDown => "L Down",
            MotorSlot::LeftLeft => "L Left",
            MotorSlot::LeftRight => "L Right",
            MotorSlot::RightUp => "R Up",
            MotorSlot::RightDown => "R Down",
            MotorSlot::RightLeft => "R Left",
            MotorSlot::RightRight => "R Right",
            MotorSlot::TriggerLeft => "L Trigger",
            MotorSlot::TriggerRight => "R Trigger",
            MotorSlot::BumperLeft => "L Bumper",
            MotorSlot::BumperRight => "R Bumper",
        }
    }

    /// The motor slot a bind input index resolves to, if any.
    ///
    /// Stick directions and triggers map to their directional slots; the
    /// two bumpers are the only plain buttons with a motor slot.
    #[must_use]
    pub fn from_input_index(input_index: u8) -> Option<Self> {
        if input_index == buttons::BUMPER_LEFT as u8 {
            return Some(MotorSlot::BumperLeft);
        }
        if input_index == buttons::BUMPER_RIGHT as u8 {
            return Some(MotorSlot::BumperRight);
        }
        if (BIND_INDEX_STICK_BASE..BIND_INDEX_TRIGGER_BASE).contains(&input_index) {
            let directional = input_index - BIND_INDEX_STICK_BASE;
            let axis = directional / 2;
            let negative = directional % 2 == 1;
            let slot = match (axis, negative) {
                (0, false) => MotorSlot::LeftRight,
                (0, true) => MotorSlot::LeftLeft,
                (1, false) => MotorSlot::LeftUp,
                (1, true) => MotorSlot::LeftDown,
                (2, false) => MotorSlot::RightRight,
                (2, true) => MotorSlot::RightLeft,
                (3, false) => MotorSlot::RightUp,
                _ => MotorSlot::RightDown,
            };
            return Some(slot);
        }
        if input_index == trigger_bind_index(4) {
            return Some(MotorSlot::TriggerLeft);
        }
        if input_index == trigger_bind_index(5) {
            return Some(MotorSlot::TriggerRight);
        }
        None
    }
}

/// One motor slot's binding.
///
/// Bound iff a target location is set. Numeric fields are clamped to their
/// domain on load, never rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotorBinding {
    /// Target location reference, when bound.
    pub target: Option<Location>,
    /// Target kind string (opaque to the core).
    pub target_kind: String,
    /// Human-readable label.
    pub label: String,
    /// Speed, 1..=256.
    pub speed: u16,
    /// Direction reversal flag.
    pub reversed: bool,
    /// Sequential (fixed-distance) travel flag.
    pub sequential: bool,
    /// Sequential travel distance, >= 1.
    pub distance: u32,
}

impl Default for MotorBinding {
    fn default() -> Self {
        Self {
            target: None,
            target_kind: String::new(),
            label: String::new(),
            speed: SPEED_DEFAULT,
            reversed: false,
            sequential: false,
            distance: DISTANCE_DEFAULT,
        }
    }
}

impl MotorBinding {
    /// A slot is bound iff a target reference is set.
    #[must_use]
    pub fn has_target(&self) -> bool {
        self.target.is_some()
    }

    /// Clamps numeric fields to their valid domain.
    pub fn clamp_loaded(&mut self) {
        self.speed = self.speed.clamp(SPEED_MIN, SPEED_MAX);
        self.distance = self.distance.max(1);
    }
}

/// One auxiliary slot's binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuxBinding {
    /// Human-readable label.
    pub label: String,
    /// Transmitted power level, 1..=15.
    pub power: u8,
    /// Momentary (true) or toggle (false) activation.
    pub momentary: bool,
    /// The addressed channel; slot is complete only when both halves are
    /// non-empty.
    pub frequency: FrequencyPair,
}

impl Default for AuxBinding {
    fn default() -> Self {
        Self {
            label: String::new(),
            power: POWER_MAX,
            momentary: true,
            frequency: FrequencyPair::default(),
        }
    }
}

impl AuxBinding {
    /// A slot is complete iff its frequency pair is.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.frequency.is_complete()
    }

    /// Clamps numeric fields to their valid domain.
    pub fn clamp_loaded(&mut self) {
        self.power = self.power.clamp(POWER_MIN, POWER_MAX);
    }
}
