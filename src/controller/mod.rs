//! # Controller Module
//!
//! Gamepad input handling.
//!
//! This module handles:
//! - The per-tick [`state::ControllerState`] snapshot and its conversion
//!   from raw device floats into the wire magnitude domain
//! - The [`device::Gamepad`] polling seam with an evdev-backed adapter
//!   and the absent-device rest state

pub mod state;
pub mod device;
