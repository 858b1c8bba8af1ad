//! Frame header: message type byte plus channel sequence number.

use bytes::BufMut;
use reckon_codec::FieldReader;

use crate::error::{ProtocolError, ProtocolResult};
use crate::message::Message;

/// Byte length of the frame header.
pub const HEADER_LEN: usize = 9;

/// Kind of message carried by a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    /// Free-form UTF-8 text, for diagnostics.
    Debug = 0,
    /// A vessel snapshot diff.
    VesselUpdate = 1,
    /// Acknowledgement of a previously received frame.
    Ack = 2,
}

impl MessageType {
    /// Converts a wire byte to a message type.
    #[must_use]
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Debug),
            1 => Some(Self::VesselUpdate),
            2 => Some(Self::Ack),
            _ => None,
        }
    }

    /// Converts the message type to its wire byte.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }
}

/// A decoded datagram: header fields plus the parsed body.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// The sending channel's sequence number for this frame.
    pub sequence: u64,
    /// The parsed message body.
    pub message: Message,
}

impl Frame {
    /// Encodes a message into a complete datagram.
    ///
    /// `sequence` is the sending channel's outbound counter value for
    /// this frame.
    pub fn encode(message: &Message, sequence: u64) -> ProtocolResult<Vec<u8>> {
        let mut buf = Vec::with_capacity(HEADER_LEN + 64);
        buf.put_u8(message.message_type().as_byte());
        buf.put_u64(sequence);
        message.encode_body(&mut buf)?;
        Ok(buf)
    }

    /// Decodes a complete datagram.
    pub fn decode(data: &[u8]) -> ProtocolResult<Self> {
        if data.len() < HEADER_LEN {
            return Err(ProtocolError::Truncated { len: data.len() });
        }

        let message_type = MessageType::from_byte(data[0])
            .ok_or(ProtocolError::UnknownMessageType(data[0]))?;

        let mut reader = FieldReader::new(&data[1..]);
        let sequence = reader.read_u64().map_err(ProtocolError::Codec)?;
        let message = Message::decode_body(message_type, &mut reader)?;

        if !reader.is_empty() {
            return Err(ProtocolError::TrailingBytes {
                remaining: reader.remaining(),
            });
        }

        Ok(Self { sequence, message })
    }
}
