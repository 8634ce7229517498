//! # Error Types
//!
//! Custom error types for padlink using `thiserror`.
//!
//! Core operations (codec, registry, profile load) are deliberately
//! infallible toward the user: malformed persisted values are clamped and
//! stale messages are no-ops. Errors here cover the edges that can genuinely
//! fail: wire framing, device discovery, configuration and I/O.

use thiserror::Error;

/// Main error type for padlink
#[derive(Debug, Error)]
pub enum PadlinkError {
    /// Wire frame errors (bad sync, length, CRC, or field width)
    #[error("frame error: {0}")]
    Frame(String),

    /// Input device errors (no gamepad at the requested index, evdev failure)
    #[error("device error: {0}")]
    Device(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for padlink
pub type Result<T> = std::result::Result<T, PadlinkError>;
