//! # Wire Framing
//!
//! Byte-level frames for the protocol messages.
//!
//! Frame structure: `sync(1) + length(1) + type(1) + payload(N) + crc(1)`,
//! where `length` counts type + payload + crc and the CRC8-DVB-S2 checksum
//! covers length + type + payload. Locations serialize as three
//! little-endian `i32`s; masks as little-endian integers.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::crc::crc8_dvb_s2;
use super::Message;
use crate::codec::protocol::{AXIS_MASK_USED, BIND_INDEX_COUNT, BUTTON_MASK_USED};
use crate::error::{PadlinkError, Result};
use crate::network::Location;

/// Frame sync byte.
pub const SYNC_BYTE: u8 = 0xB1;

/// Button state frame type.
pub const FRAME_BUTTON_STATE: u8 = 0x01;
/// Axis state frame type.
pub const FRAME_AXIS_STATE: u8 = 0x02;
/// Bind request frame type.
pub const FRAME_BIND_REQUEST: u8 = 0x03;
/// Seat input frame type.
pub const FRAME_SEAT_INPUT: u8 = 0x04;

/// Serialized size of a [`Location`].
const LOCATION_SIZE: usize = 12;

/// Axis state flag: seated-control variant.
const AXIS_FLAG_SEAT: u8 = 0x01;
/// Axis state flag: a location follows.
const AXIS_FLAG_LOCATION: u8 = 0x02;

/// Encode a message into a complete wire frame.
///
/// # Examples
///
/// ```
/// use padlink::transport::frame::{encode_frame, decode_frame};
/// use padlink::transport::Message;
///
/// let message = Message::ButtonState { mask: 0b1000 };
/// let frame = encode_frame(&message);
/// assert_eq!(decode_frame(&frame).unwrap(), message);
/// ```
#[must_use]
pub fn encode_frame(message: &Message) -> Bytes {
    let mut payload = BytesMut::new();
    let frame_type = match message {
        Message::ButtonState { mask } => {
            payload.put_u16_le(*mask);
            FRAME_BUTTON_STATE
        }
        Message::AxisState { mask, seat_input, location } => {
            payload.put_u32_le(*mask);
            let mut flags = 0u8;
            if *seat_input {
                flags |= AXIS_FLAG_SEAT;
            }
            if location.is_some() {
                flags |= AXIS_FLAG_LOCATION;
            }
            payload.put_u8(flags);
            if let Some(location) = location {
                put_location(&mut payload, location);
            }
            FRAME_AXIS_STATE
        }
        Message::BindRequest { input_index, location } => {
            payload.put_u8(*input_index);
            put_location(&mut payload, location);
            FRAME_BIND_REQUEST
        }
        Message::SeatInput { location, button_mask, axis_mask } => {
            put_location(&mut payload, location);
            payload.put_u16_le(*button_mask);
            payload.put_u32_le(*axis_mask);
            FRAME_SEAT_INPUT
        }
    };

    // length = type + payload + crc
    let length = (1 + payload.len() + 1) as u8;
    let mut checksummed = BytesMut::with_capacity(2 + payload.len());
    checksummed.put_u8(length);
    checksummed.put_u8(frame_type);
    checksummed.extend_from_slice(&payload);
    let crc = crc8_dvb_s2(&checksummed);

    let mut frame = BytesMut::with_capacity(3 + payload.len() + 1);
    frame.put_u8(SYNC_BYTE);
    frame.extend_from_slice(&checksummed);
    frame.put_u8(crc);
    frame.freeze()
}

/// Decode a complete wire frame back into a message.
///
/// # Errors
///
/// Returns [`PadlinkError::Frame`] when the frame is truncated, the sync
/// byte or CRC is wrong, the type is unknown, a payload has the wrong size,
/// or a mask carries bits outside its documented width.
pub fn decode_frame(frame: &[u8]) -> Result<Message> {
    // Minimum frame: sync + length + type + crc
    if frame.len() < 4 {
        return Err(PadlinkError::Frame("frame too short".to_string()));
    }
    if frame[0] != SYNC_BYTE {
        return Err(PadlinkError::Frame(format!("bad sync byte: {:#04x}", frame[0])));
    }

    let length = frame[1] as usize;
    if length < 2 || frame.len() < 2 + length {
        return Err(PadlinkError::Frame(format!(
            "frame length {} does not match {} bytes",
            length,
            frame.len()
        )));
    }

    let checksummed = &frame[1..1 + length];
    let received_crc = frame[1 + length];
    let computed_crc = crc8_dvb_s2(checksummed);
    if received_crc != computed_crc {
        return Err(PadlinkError::Frame(format!(
            "crc mismatch: computed {:#04x}, got {:#04x}",
            computed_crc, received_crc
        )));
    }

    let frame_type = frame[2];
    let mut payload = &frame[3..1 + length];

    match frame_type {
        FRAME_BUTTON_STATE => {
            let mask = take_u16(&mut payload)?;
            expect_empty(payload)?;
            if mask & !BUTTON_MASK_USED != 0 {
                return Err(PadlinkError::Frame(format!("button mask out of width: {:#06x}", mask)));
            }
            Ok(Message::ButtonState { mask })
        }
        FRAME_AXIS_STATE => {
            let mask = take_u32(&mut payload)?;
            let flags = take_u8(&mut payload)?;
            let location = if flags & AXIS_FLAG_LOCATION != 0 {
                Some(take_location(&mut payload)?)
            } else {
                None
            };
            expect_empty(payload)?;
            if mask & !AXIS_MASK_USED != 0 {
                return Err(PadlinkError::Frame(format!("axis mask out of width: {:#010x}", mask)));
            }
            Ok(Message::AxisState {
                mask,
                seat_input: flags & AXIS_FLAG_SEAT != 0,
                location,
            })
        }
        FRAME_BIND_REQUEST => {
            let input_index = take_u8(&mut payload)?;
            let location = take_location(&mut payload)?;
            expect_empty(payload)?;
            if input_index >= BIND_INDEX_COUNT {
                return Err(PadlinkError::Frame(format!("bind input index out of range: {}", input_index)));
            }
            Ok(Message::BindRequest { input_index, location })
        }
        FRAME_SEAT_INPUT => {
            let location = take_location(&mut payload)?;
            let button_mask = take_u16(&mut payload)?;
            let axis_mask = take_u32(&mut payload)?;
            expect_empty(payload)?;
            if button_mask & !BUTTON_MASK_USED != 0 || axis_mask & !AXIS_MASK_USED != 0 {
                return Err(PadlinkError::Frame("seat input mask out of width".to_string()));
            }
            Ok(Message::SeatInput { location, button_mask, axis_mask })
        }
        other => Err(PadlinkError::Frame(format!("unknown frame type: {:#04x}", other))),
    }
}

fn put_location(buffer: &mut BytesMut, location: &Location) {
    buffer.put_i32_le(location.x);
    buffer.put_i32_le(location.y);
    buffer.put_i32_le(location.z);
}

fn take_u8(payload: &mut &[u8]) -> Result<u8> {
    if payload.remaining() < 1 {
        return Err(PadlinkError::Frame("payload truncated".to_string()));
    }
    Ok(payload.get_u8())
}

fn take_u16(payload: &mut &[u8]) -> Result<u16> {
    if payload.remaining() < 2 {
        return Err(PadlinkError::Frame("payload truncated".to_string()));
    }
    Ok(payload.get_u16_le())
}

fn take_u32(payload: &mut &[u8]) -> Result<u32> {
    if payload.remaining() < 4 {
        return Err(PadlinkError::Frame("payload truncated".to_string()));
    }
    Ok(payload.get_u32_le())
}

fn take_location(payload: &mut &[u8]) -> Result<Location> {
    if payload.remaining() < LOCATION_SIZE {
        return Err(PadlinkError::Frame("payload truncated".to_string()));
    }
    Ok(Location::new(
        payload.get_i32_le(),
        payload.get_i32_le(),
        payload.get_i32_le(),
    ))
}

fn expect_empty(payload: &[u8]) -> Result<()> {
    if payload.is_empty() {
        Ok(())
    } else {
        Err(PadlinkError::Frame(format!("{} trailing payload bytes", payload.len())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_messages() -> Vec<Message> {
        vec![
            Message::ButtonState { mask: 0 },
            Message::ButtonState { mask: 0x7FFF },
            Message::AxisState { mask: 30, seat_input: false, location: None },
            Message::AxisState {
                mask: 0x0FFF_FFFF,
                seat_input: true,
                location: Some(Location::new(-1, 64, 2_000_000)),
            },
            Message::BindRequest { input_index: 23, location: Location::new(0, 0, 0) },
            Message::SeatInput {
                location: Location::new(i32::MIN, 0, i32::MAX),
                button_mask: 0b101,
                axis_mask: 15,
            },
        ]
    }

    // ==================== Round-Trip Tests ====================

    #[test]
    fn test_every_message_shape_round_trips() {
        for message in sample_messages() {
            let frame = encode_frame(&message);
            assert_eq!(decode_frame(&frame).unwrap(), message, "{:?}", message);
        }
    }

    #[test]
    fn test_frame_structure() {
        let frame = encode_frame(&Message::ButtonState { mask: 0x0008 });
        // sync + length + type + 2-byte mask + crc
        assert_eq!(frame.len(), 6);
        assert_eq!(frame[0], SYNC_BYTE);
        assert_eq!(frame[1], 4);
        assert_eq!(frame[2], FRAME_BUTTON_STATE);
        assert_eq!(frame[3], 0x08);
        assert_eq!(frame[4], 0x00);
    }

    // ==================== Rejection Tests ====================

    #[test]
    fn test_decode_rejects_truncated_frame() {
        assert!(decode_frame(&[SYNC_BYTE, 4]).is_err());
        assert!(decode_frame(&[]).is_err());
    }

    #[test]
    fn test_decode_rejects_bad_sync() {
        let mut frame = encode_frame(&Message::ButtonState { mask: 1 }).to_vec();
        frame[0] = 0xC8;
        assert!(decode_frame(&frame).is_err());
    }

    #[test]
    fn test_decode_rejects_corrupted_payload() {
        let mut frame = encode_frame(&Message::ButtonState { mask: 1 }).to_vec();
        frame[3] ^= 0xFF;
        assert!(decode_frame(&frame).is_err());
    }

    #[test]
    fn test_decode_rejects_corrupted_crc() {
        let mut frame = encode_frame(&Message::ButtonState { mask: 1 }).to_vec();
        let last = frame.len() - 1;
        frame[last] ^= 0x01;
        assert!(decode_frame(&frame).is_err());
    }

    #[test]
    fn test_decode_rejects_unknown_type() {
        let payload = [0u8; 2];
        let mut checksummed = vec![4u8, 0x7E];
        checksummed.extend_from_slice(&payload);
        let crc = crc8_dvb_s2(&checksummed);
        let mut frame = vec![SYNC_BYTE];
        frame.extend_from_slice(&checksummed);
        frame.push(crc);
        assert!(decode_frame(&frame).is_err());
    }

    #[test]
    fn test_decode_rejects_out_of_width_button_mask() {
        // Build a frame carrying the unused bit 15 by hand.
        let mut checksummed = vec![4u8, FRAME_BUTTON_STATE, 0x00, 0x80];
        let crc = crc8_dvb_s2(&checksummed);
        let mut frame = vec![SYNC_BYTE];
        frame.append(&mut checksummed);
        frame.push(crc);
        assert!(decode_frame(&frame).is_err());
    }

    #[test]
    fn test_decode_rejects_out_of_range_bind_index() {
        let mut checksummed = vec![15u8, FRAME_BIND_REQUEST, 25];
        checksummed.extend_from_slice(&[0u8; 12]);
        let crc = crc8_dvb_s2(&checksummed);
        let mut frame = vec![SYNC_BYTE];
        frame.append(&mut checksummed);
        frame.push(crc);
        assert!(decode_frame(&frame).is_err());
    }

    #[test]
    fn test_decode_rejects_trailing_bytes() {
        // ButtonState payload padded with an extra byte, CRC recomputed.
        let mut checksummed = vec![5u8, FRAME_BUTTON_STATE, 0x01, 0x00, 0xAA];
        let crc = crc8_dvb_s2(&checksummed);
        let mut frame = vec![SYNC_BYTE];
        frame.append(&mut checksummed);
        frame.push(crc);
        assert!(decode_frame(&frame).is_err());
    }
}
