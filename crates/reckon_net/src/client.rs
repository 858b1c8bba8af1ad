//! Client-side channel to one server.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reckon_codec::Diff;
use reckon_core::VesselId;
use reckon_protocol::{Frame, Message, MessageType, VesselStatus};

use crate::config::ClientConfig;
use crate::endpoint::Endpoint;
use crate::error::NetResult;

/// A client's logical connection to a server.
///
/// The connection owns the outbound sequence counter for its channel;
/// every send stamps the next value. Frames from addresses other than
/// the configured server are discarded.
pub struct Connection {
    endpoint: Endpoint,
    server: SocketAddr,
    sequence: AtomicU64,
}

impl Connection {
    /// Binds an ephemeral local socket pointed at the configured server.
    pub fn connect(config: &ClientConfig) -> NetResult<Self> {
        let endpoint = Endpoint::bind((Ipv4Addr::UNSPECIFIED, 0), config.read_timeout)?;
        Ok(Self {
            endpoint,
            server: config.server,
            sequence: AtomicU64::new(0),
        })
    }

    /// The server this connection talks to.
    #[must_use]
    pub fn server_addr(&self) -> SocketAddr {
        self.server
    }

    /// The local socket address.
    pub fn local_addr(&self) -> NetResult<SocketAddr> {
        self.endpoint.local_addr()
    }

    fn send(&self, message: &Message) -> NetResult<u64> {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        self.endpoint.send_frame(self.server, message, sequence)?;
        Ok(sequence)
    }

    /// Sends a Debug text message. Returns the frame sequence used.
    pub fn send_debug(&self, text: impl Into<String>) -> NetResult<u64> {
        self.send(&Message::debug(text))
    }

    /// Acknowledges a previously received frame.
    pub fn send_ack(&self, acked_type: MessageType, acked_sequence: u64) -> NetResult<u64> {
        self.send(&Message::ack(acked_type, acked_sequence))
    }

    /// Sends a vessel update. Returns the frame sequence used, which is
    /// also the position the update will be recorded under.
    pub fn send_update(&self, vessel: VesselId, diff: Diff<VesselStatus>) -> NetResult<u64> {
        self.send(&Message::vessel_update(vessel, diff))
    }

    /// Waits up to `timeout` for the next frame from the server.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Frame> {
        loop {
            let incoming = self.endpoint.recv_timeout(timeout)?;
            if incoming.remote == self.server {
                return Some(incoming.frame);
            }
        }
    }

    /// Returns the next frame from the server without blocking.
    pub fn try_recv(&self) -> Option<Frame> {
        loop {
            let incoming = self.endpoint.try_recv()?;
            if incoming.remote == self.server {
                return Some(incoming.frame);
            }
        }
    }

    /// Closes the underlying endpoint. Safe to call more than once.
    pub fn close(&self) {
        self.endpoint.close();
    }

    /// Returns true when the connection has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.endpoint.is_closed()
    }
}
