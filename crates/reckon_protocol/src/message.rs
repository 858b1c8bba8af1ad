//! Message bodies.

use bytes::BufMut;
use reckon_codec::{Diff, FieldReader};
use reckon_core::VesselId;

use crate::error::{ProtocolError, ProtocolResult};
use crate::frame::MessageType;
use crate::vessel::VesselStatus;

/// A parsed message body.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Free-form UTF-8 text.
    Debug(String),
    /// A vessel snapshot diff.
    VesselUpdate(VesselUpdate),
    /// Acknowledgement of a previously received frame.
    Ack(Ack),
}

/// Body of a vessel update: which vessel, and what changed.
#[derive(Debug, Clone, PartialEq)]
pub struct VesselUpdate {
    /// The vessel the diff belongs to.
    pub vessel: VesselId,
    /// The changed fields and their new values.
    pub diff: Diff<VesselStatus>,
}

/// Body of an acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    /// Type of the acknowledged frame.
    pub acked_type: MessageType,
    /// Channel sequence number of the acknowledged frame.
    pub acked_sequence: u64,
}

impl Message {
    /// Convenience constructor for a Debug message.
    pub fn debug(text: impl Into<String>) -> Self {
        Self::Debug(text.into())
    }

    /// Convenience constructor for a vessel update.
    #[must_use]
    pub fn vessel_update(vessel: VesselId, diff: Diff<VesselStatus>) -> Self {
        Self::VesselUpdate(VesselUpdate { vessel, diff })
    }

    /// Convenience constructor for an acknowledgement.
    #[must_use]
    pub fn ack(acked_type: MessageType, acked_sequence: u64) -> Self {
        Self::Ack(Ack {
            acked_type,
            acked_sequence,
        })
    }

    /// The wire type of this message.
    #[must_use]
    pub fn message_type(&self) -> MessageType {
        match self {
            Self::Debug(_) => MessageType::Debug,
            Self::VesselUpdate(_) => MessageType::VesselUpdate,
            Self::Ack(_) => MessageType::Ack,
        }
    }

    /// Appends the body encoding to `buf`.
    pub(crate) fn encode_body(&self, buf: &mut Vec<u8>) -> ProtocolResult<()> {
        match self {
            Self::Debug(text) => {
                buf.put_slice(text.as_bytes());
            }
            Self::VesselUpdate(update) => {
                buf.put_slice(update.vessel.as_bytes());
                update.diff.encode(buf).map_err(ProtocolError::Codec)?;
            }
            Self::Ack(ack) => {
                buf.put_u8(ack.acked_type.as_byte());
                buf.put_u64(ack.acked_sequence);
            }
        }
        Ok(())
    }

    /// Decodes the body for `message_type` from `reader`.
    pub(crate) fn decode_body(
        message_type: MessageType,
        reader: &mut FieldReader<'_>,
    ) -> ProtocolResult<Self> {
        match message_type {
            MessageType::Debug => {
                let bytes = reader.read_bytes(reader.remaining())?;
                let text = std::str::from_utf8(bytes)
                    .map_err(|_| ProtocolError::InvalidDebugText)?
                    .to_string();
                Ok(Self::Debug(text))
            }
            MessageType::VesselUpdate => {
                let mut id = [0u8; 16];
                id.copy_from_slice(reader.read_bytes(16)?);
                let vessel = VesselId::from_bytes(id);
                let diff = Diff::decode(reader)?;
                Ok(Self::VesselUpdate(VesselUpdate { vessel, diff }))
            }
            MessageType::Ack => {
                let type_byte = reader.read_u8()?;
                let acked_type = MessageType::from_byte(type_byte)
                    .ok_or(ProtocolError::UnknownMessageType(type_byte))?;
                let acked_sequence = reader.read_u64()?;
                Ok(Self::Ack(Ack {
                    acked_type,
                    acked_sequence,
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;
    use reckon_codec::{CodecError, Quat, Vec3, Vec3d};

    fn status(name: &str, x: f64) -> VesselStatus {
        VesselStatus {
            name: name.into(),
            planet_time: 1000.0,
            body_name: "Kerbin".into(),
            rotation: Quat::IDENTITY,
            angular_velocity: Vec3::default(),
            position: Vec3d::new(x, 0.0, 0.0),
            velocity: Vec3d::default(),
            acceleration: Vec3d::default(),
            terrain_normal: Vec3::new(0.0, 1.0, 0.0),
        }
    }

    #[test]
    fn debug_roundtrip() {
        let data = Frame::encode(&Message::debug("hello, pad"), 3).unwrap();
        let frame = Frame::decode(&data).unwrap();
        assert_eq!(frame.sequence, 3);
        assert_eq!(frame.message, Message::debug("hello, pad"));
    }

    #[test]
    fn empty_debug_roundtrip() {
        let data = Frame::encode(&Message::debug(""), 0).unwrap();
        let frame = Frame::decode(&data).unwrap();
        assert_eq!(frame.message, Message::debug(""));
    }

    #[test]
    fn ack_roundtrip() {
        let data = Frame::encode(&Message::ack(MessageType::VesselUpdate, 41), 7).unwrap();
        let frame = Frame::decode(&data).unwrap();
        assert_eq!(frame.message, Message::ack(MessageType::VesselUpdate, 41));
    }

    #[test]
    fn ack_with_unknown_acked_type_is_rejected() {
        let mut data = Frame::encode(&Message::ack(MessageType::Debug, 1), 0).unwrap();
        data[9] = 0xEE;
        assert_eq!(
            Frame::decode(&data).unwrap_err(),
            ProtocolError::UnknownMessageType(0xEE)
        );
    }

    #[test]
    fn vessel_update_roundtrip() {
        let vessel = VesselId::from_bytes([7u8; 16]);
        let old = status("Auriga", 0.0);
        let new = status("Auriga", 25.0);
        let diff = Diff::between(Some(&old), new.clone());

        let data = Frame::encode(&Message::vessel_update(vessel, diff.clone()), 11).unwrap();
        let frame = Frame::decode(&data).unwrap();

        let Message::VesselUpdate(update) = frame.message else {
            panic!("expected a vessel update");
        };
        assert_eq!(update.vessel, vessel);
        assert_eq!(update.diff.changed(), diff.changed());

        let mut target = old;
        update.diff.apply(&mut target);
        assert_eq!(target.position, new.position);
    }

    #[test]
    fn vessel_update_with_bad_mask_is_rejected() {
        let vessel = VesselId::from_bytes([1u8; 16]);
        let mut data = Frame::encode(
            &Message::vessel_update(vessel, Diff::snapshot(status("X", 0.0))),
            0,
        )
        .unwrap();
        // Rewrite the mask: bit 1 is the schema gap.
        let mask_at = crate::frame::HEADER_LEN + 16;
        data[mask_at..mask_at + 4].copy_from_slice(&0b10u32.to_be_bytes());
        // Strip the body so only the mask remains.
        data.truncate(mask_at + 4);

        let err = Frame::decode(&data).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::Codec(CodecError::Schema { .. })
        ));
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut data = Frame::encode(&Message::ack(MessageType::Debug, 1), 0).unwrap();
        data.push(0xAA);
        assert!(matches!(
            Frame::decode(&data).unwrap_err(),
            ProtocolError::TrailingBytes { remaining: 1 }
        ));
    }
}
