//! Error types for frame encoding and decoding.

use reckon_codec::CodecError;
use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors that can occur while framing or parsing datagrams.
///
/// All of these mark a single corrupt or unintelligible datagram; the
/// receiver drops the datagram and keeps the session alive.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The datagram is shorter than the frame header.
    #[error("datagram too short for a frame header: {len} bytes")]
    Truncated {
        /// Datagram length.
        len: usize,
    },

    /// The leading type byte names no known message type.
    #[error("unknown message type {0:#04x}")]
    UnknownMessageType(u8),

    /// The body did not decode under the schema.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Bytes were left over after the body was fully decoded.
    #[error("trailing bytes after message body: {remaining}")]
    TrailingBytes {
        /// Leftover byte count.
        remaining: usize,
    },

    /// The Debug body was not valid UTF-8.
    #[error("debug text is not valid UTF-8")]
    InvalidDebugText,
}
