//! Error types for the diff codec.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while encoding or decoding diffs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A decoded mask references a field index the schema does not
    /// assign. The datagram is corrupt and must be dropped.
    #[error("mask {mask:#010x} references field bits outside the schema (assigned {assigned:#010x})")]
    Schema {
        /// The offending mask.
        mask: u32,
        /// The bits the schema actually assigns.
        assigned: u32,
    },

    /// Input ended before a field was fully decoded.
    #[error("unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEnd {
        /// Bytes the decoder needed.
        needed: usize,
        /// Bytes that were left.
        remaining: usize,
    },

    /// A string field was not valid UTF-8.
    #[error("string field is not valid UTF-8")]
    InvalidUtf8,

    /// A string field exceeds the length the wire format can carry.
    #[error("string field too long: {len} bytes exceeds {max}")]
    StringTooLong {
        /// Actual length in bytes.
        len: usize,
        /// Maximum encodable length.
        max: usize,
    },
}
