//! # Transport Module
//!
//! Message shapes and the outbound transport seam.
//!
//! The transport carries four discrete, idempotent-receive messages from the
//! client tick loop to the authoritative side. Delivery from a single sender
//! is assumed in-order; the receiver tolerates duplicates and stale state.
//!
//! This module handles:
//! - The [`Message`] shapes (button state, axis state, bind request, seat
//!   input)
//! - The synchronous [`Transport`] trait the client driver sends through
//! - Byte-level framing with a CRC8 checksum ([`frame`])

pub mod crc;
pub mod frame;

use crate::codec::protocol::{AxisMask, ButtonMask};
use crate::error::Result;
use crate::network::Location;

/// One outbound protocol message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Packed button state.
    ButtonState {
        mask: ButtonMask,
    },
    /// Packed axis state. `seat_input` marks the seated-control variant;
    /// the location rides along when the sender is seated.
    AxisState {
        mask: AxisMask,
        seat_input: bool,
        location: Option<Location>,
    },
    /// One completed bind: which input was captured, targeting what.
    BindRequest {
        input_index: u8,
        location: Location,
    },
    /// Combined state for the seated-control variant.
    SeatInput {
        location: Location,
        button_mask: ButtonMask,
        axis_mask: AxisMask,
    },
}

/// Outbound message sink.
///
/// Implementations must not block; the client tick loop calls this
/// synchronously.
pub trait Transport {
    /// Sends one message toward the authoritative side.
    fn send(&mut self, message: &Message) -> Result<()>;
}

/// In-process transport that queues messages for a local receiver.
///
/// Used by tests and by the loopback demo loop.
#[derive(Debug, Default)]
pub struct LoopbackTransport {
    queued: Vec<Message>,
}

impl LoopbackTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes every queued message, oldest first.
    pub fn drain(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.queued)
    }

    /// Messages queued so far, oldest first.
    #[must_use]
    pub fn queued(&self) -> &[Message] {
        &self.queued
    }
}

impl Transport for LoopbackTransport {
    fn send(&mut self, message: &Message) -> Result<()> {
        self.queued.push(message.clone());
        Ok(())
    }
}
