//! # Controller State Codec
//!
//! Bit-exact packing of controller state into two fixed-width wire values.
//!
//! This module handles:
//! - Button packing (15 buttons into a `u16`, one bit each)
//! - Axis packing (4 stick axes in 5-bit sign+magnitude fields, 2 trigger
//!   axes in 4-bit unsigned fields, all inside one `u32`)
//! - Lossless round-trip decoding over the 15-step magnitude domain
//!
//! All field offsets and widths live in [`protocol`]; nothing outside this
//! module manipulates the raw bit layout.

pub mod protocol;
pub mod encoder;
pub mod decoder;
