//! UDP endpoint with a background reader thread.

use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::Mutex;
use reckon_protocol::{Frame, Message, ProtocolError};
use tracing::{debug, trace, warn};

use crate::error::{NetError, NetResult};

/// Largest datagram the reader accepts.
pub const MAX_DATAGRAM_LEN: usize = 64 * 1024;

/// A datagram received and decoded by the reader thread.
#[derive(Debug)]
pub struct Incoming {
    /// Address the datagram came from.
    pub remote: SocketAddr,
    /// The decoded frame.
    pub frame: Frame,
}

/// A UDP socket paired with one background reader thread.
///
/// The reader continuously receives datagrams, decodes the frame, and
/// delivers it on a channel. Malformed datagrams and unknown message
/// types are logged and dropped without disturbing the session. Receive
/// errors after a close terminate the reader silently.
pub struct Endpoint {
    socket: Arc<UdpSocket>,
    incoming: Receiver<Incoming>,
    closed: Arc<AtomicBool>,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl Endpoint {
    /// Binds a socket and starts the reader thread.
    ///
    /// `read_timeout` bounds how long the reader blocks per receive,
    /// which in turn bounds how quickly it observes a close.
    pub fn bind(addr: impl ToSocketAddrs, read_timeout: Duration) -> NetResult<Self> {
        let socket = UdpSocket::bind(addr)?;
        socket.set_read_timeout(Some(read_timeout))?;
        let socket = Arc::new(socket);
        let closed = Arc::new(AtomicBool::new(false));
        let (sender, incoming) = mpsc::channel();

        let reader = std::thread::Builder::new()
            .name("reckon-recv".into())
            .spawn({
                let socket = Arc::clone(&socket);
                let closed = Arc::clone(&closed);
                move || read_loop(&socket, &closed, &sender)
            })?;

        Ok(Self {
            socket,
            incoming,
            closed,
            reader: Mutex::new(Some(reader)),
        })
    }

    /// The local address of the socket.
    pub fn local_addr(&self) -> NetResult<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Encodes `message` and sends it to `remote` with the given
    /// channel sequence number.
    pub fn send_frame(
        &self,
        remote: SocketAddr,
        message: &Message,
        sequence: u64,
    ) -> NetResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(NetError::Closed);
        }
        let data = Frame::encode(message, sequence)?;
        self.socket.send_to(&data, remote)?;
        Ok(())
    }

    /// Waits up to `timeout` for the next received frame.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Incoming> {
        self.incoming.recv_timeout(timeout).ok()
    }

    /// Returns the next received frame without blocking.
    pub fn try_recv(&self) -> Option<Incoming> {
        self.incoming.try_recv().ok()
    }

    /// Returns true when the endpoint has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Closes the endpoint: the reader stops re-arming receives and the
    /// socket is released once it exits. Safe to call more than once.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(handle) = self.reader.lock().take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Endpoint {
    fn drop(&mut self) {
        self.close();
    }
}

fn read_loop(socket: &UdpSocket, closed: &AtomicBool, sender: &Sender<Incoming>) {
    let mut buf = vec![0u8; MAX_DATAGRAM_LEN];
    loop {
        if closed.load(Ordering::SeqCst) {
            return;
        }
        let (len, remote) = match socket.recv_from(&mut buf) {
            Ok(received) => received,
            Err(err)
                if matches!(
                    err.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) =>
            {
                continue;
            }
            Err(err) => {
                trace!(%err, "receive loop terminating");
                return;
            }
        };

        let frame = match Frame::decode(&buf[..len]) {
            Ok(frame) => frame,
            Err(ProtocolError::UnknownMessageType(byte)) => {
                debug!(byte, %remote, "ignoring unknown message type");
                continue;
            }
            Err(err) => {
                warn!(%err, %remote, "dropping malformed datagram");
                continue;
            }
        };

        if sender.send(Incoming { remote, frame }).is_err() {
            // Consumer is gone; nothing left to deliver to.
            return;
        }
    }
}
