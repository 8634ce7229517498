//! # Padlink Library
//!
//! Drive a named-frequency wireless signal network with a gamepad.
//!
//! This library provides the core protocol for capturing controller state,
//! bit-packing it for transport, and converting it server-side into live
//! signal sources with timeout-based expiry.

pub mod config;
pub mod error;
pub mod codec;
pub mod controller;
pub mod network;
pub mod profile;
pub mod transport;
pub mod session;
pub mod registry;
