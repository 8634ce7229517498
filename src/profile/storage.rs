//! # Profile Persistence
//!
//! Load/save of a [`BindingProfile`] over a nested key/value record.
//!
//! The record is a JSON document owned by the persistence collaborator
//! (world save, item data). Two schema keys matter here:
//!
//! - `"ControlProfile"`: the current schema, all 12 motor and 8 aux slots,
//!   serialized unconditionally so slot positions stay stable across saves.
//! - `"AxisConfig"`: the legacy 4-slot schema, read-only. When the current
//!   key is absent and the legacy key is present, a one-way migration runs.
//!
//! Loading never fails toward the caller: out-of-range numerics are clamped
//! to their domain and malformed slots fall back to defaults.

use serde_json::{json, Value};
use tracing::{debug, info};

use super::binding::{AuxBinding, MotorBinding, MotorSlot, AUX_SLOT_COUNT, MOTOR_SLOT_COUNT};
use super::BindingProfile;
use crate::network::Location;

/// Current schema key.
pub const PROFILE_KEY: &str = "ControlProfile";

/// Legacy schema key (read-only).
pub const LEGACY_KEY: &str = "AxisConfig";

/// Motor slots the four legacy bidirectional axes migrate into.
///
/// Legacy slots are LeftX, LeftY, RightX, RightY in order; each maps to the
/// positive-direction slot only (L Right, L Up, R Right, R Up). The legacy
/// format had no way to express the opposite sign as a separate slot, so the
/// negative-direction slots stay at defaults. Intentionally partial.
const LEGACY_SLOT_TARGETS: [MotorSlot; 4] = [
    MotorSlot::LeftRight,
    MotorSlot::LeftUp,
    MotorSlot::RightRight,
    MotorSlot::RightUp,
];

/// Loads a profile from a persisted record.
///
/// Resolution order: current schema key, else legacy migration, else an
/// all-default profile. Missing slots retain defaults; numeric fields are
/// clamped on the way in.
#[must_use]
pub fn load(record: &Value) -> BindingProfile {
    if let Some(current) = record.get(PROFILE_KEY) {
        return load_current(current);
    }
    if let Some(legacy) = record.get(LEGACY_KEY) {
        if let Some(profile) = migrate_legacy(legacy) {
            info!("migrated legacy axis bindings to the current profile schema");
            return profile;
        }
        debug!("legacy record present but unreadable, starting from defaults");
    }
    BindingProfile::default()
}

/// Saves a profile into a persisted record, replacing the current schema
/// key. Every slot serializes, bound or not: empty motor slots emit a
/// placeholder so slot identity survives the round trip.
pub fn save(profile: &BindingProfile, record: &mut Value) {
    if !record.is_object() {
        *record = json!({});
    }
    let motors: Vec<Value> = profile
        .motors()
        .iter()
        .map(|binding| serde_json::to_value(binding).unwrap_or(Value::Null))
        .collect();
    let aux: Vec<Value> = profile
        .aux_slots()
        .iter()
        .map(|binding| serde_json::to_value(binding).unwrap_or(Value::Null))
        .collect();
    record[PROFILE_KEY] = json!({ "Motors": motors, "Aux": aux });
}

/// One-way migration from the legacy 4-slot schema.
///
/// Invoked only when the current schema key is absent; never re-run on a
/// migrated record because saving writes the current key.
#[must_use]
pub fn migrate_legacy(legacy: &Value) -> Option<BindingProfile> {
    let slots = legacy.as_array()?;
    let mut profile = BindingProfile::default();

    for (i, slot_value) in slots.iter().take(LEGACY_SLOT_TARGETS.len()).enumerate() {
        let Some(target) = read_location(slot_value.get("target")) else {
            continue;
        };
        let binding = profile.motor_mut(LEGACY_SLOT_TARGETS[i]);
        binding.target = Some(target);
        binding.target_kind = read_string(slot_value.get("kind"));
        binding.label = read_string(slot_value.get("label"));
        if binding.label.is_empty() {
            binding.label = LEGACY_SLOT_TARGETS[i].label().to_string();
        }
        binding.speed =
            read_u64(slot_value.get("speed"), u64::from(binding.speed)).min(u64::from(u16::MAX)) as u16;
        binding.reversed = read_bool(slot_value.get("reversed"), false);
        binding.clamp_loaded();
    }

    Some(profile)
}

fn load_current(current: &Value) -> BindingProfile {
    let mut profile = BindingProfile::default();

    if let Some(motors) = current.get("Motors").and_then(Value::as_array) {
        for index in 0..MOTOR_SLOT_COUNT {
            if let (Some(slot), Some(value)) = (MotorSlot::from_index(index), motors.get(index)) {
                *profile.motor_mut(slot) = motor_from_value(value);
            }
        }
    }

    if let Some(aux) = current.get("Aux").and_then(Value::as_array) {
        for index in 0..AUX_SLOT_COUNT {
            if let (Some(target), Some(value)) = (profile.aux_mut(index), aux.get(index)) {
                *target = aux_from_value(value);
            }
        }
    }

    profile
}

fn motor_from_value(value: &Value) -> MotorBinding {
    let mut binding = MotorBinding {
        target: read_location(value.get("target")),
        target_kind: read_string(value.get("target_kind")),
        label: read_string(value.get("label")),
        reversed: read_bool(value.get("reversed"), false),
        sequential: read_bool(value.get("sequential"), false),
        ..MotorBinding::default()
    };
    binding.speed = read_u64(value.get("speed"), u64::from(binding.speed)).min(u64::from(u16::MAX)) as u16;
    binding.distance = read_u64(value.get("distance"), u64::from(binding.distance)).min(u64::from(u32::MAX)) as u32;
    binding.clamp_loaded();
    binding
}

fn aux_from_value(value: &Value) -> AuxBinding {
    let mut binding = AuxBinding {
        label: read_string(value.get("label")),
        momentary: read_bool(value.get("momentary"), true),
        ..AuxBinding::default()
    };
    binding.power = read_u64(value.get("power"), u64::from(binding.power)).min(u64::from(u8::MAX)) as u8;
    if let Some(frequency) = value.get("frequency") {
        binding.frequency = serde_json::from_value(frequency.clone()).unwrap_or_default();
    }
    binding.clamp_loaded();
    binding
}

fn read_location(value: Option<&Value>) -> Option<Location> {
    value.and_then(|v| serde_json::from_value(v.clone()).ok())
}

fn read_string(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}

fn read_u64(value: Option<&Value>, fallback: u64) -> u64 {
    value.and_then(Value::as_u64).unwrap_or(fallback)
}

fn read_bool(value: Option<&Value>, fallback: bool) -> bool {
    value.and_then(Value::as_bool).unwrap_or(fallback)
}
