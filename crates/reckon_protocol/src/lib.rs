//! # Reckon Protocol
//!
//! Datagram framing and message types.
//!
//! This crate provides:
//! - `MessageType` and the 9-byte frame header
//! - `Message` bodies: Debug, VesselUpdate, Ack
//! - `VesselStatus`, the replicated vessel snapshot and its field schema
//! - Frame encoding/decoding
//!
//! This is a pure protocol crate with no I/O operations. The transport
//! sequence number in the header belongs to the sending channel and is
//! independent of the reckoning positions the payloads are recorded
//! under.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod frame;
mod message;
mod vessel;

pub use error::{ProtocolError, ProtocolResult};
pub use frame::{Frame, MessageType, HEADER_LEN};
pub use message::{Ack, Message, VesselUpdate};
pub use vessel::VesselStatus;
