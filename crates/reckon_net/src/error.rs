//! Error types for the transport layer.

use reckon_protocol::ProtocolError;
use thiserror::Error;

/// Result type for transport operations.
pub type NetResult<T> = Result<T, NetError>;

/// Errors that can occur in the transport layer.
#[derive(Error, Debug)]
pub enum NetError {
    /// Socket-level I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A frame could not be encoded or decoded.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The endpoint has been closed.
    #[error("endpoint is closed")]
    Closed,
}
