//! Configuration for servers and clients.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Default port the server listens on.
pub const DEFAULT_PORT: u16 = 6754;

/// Configuration for a [`Server`](crate::Server).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the UDP socket to.
    pub bind: SocketAddr,
    /// Sessions silent for longer than this are swept.
    pub idle_timeout: Duration,
    /// How often the idle sweep runs.
    pub sweep_interval: Duration,
    /// Socket read timeout; bounds how quickly the reader thread
    /// observes a close.
    pub read_timeout: Duration,
    /// How many recently sent updates each session remembers for
    /// matching acknowledgements.
    pub sent_ledger_capacity: usize,
}

impl ServerConfig {
    /// Creates a configuration binding to `bind`.
    #[must_use]
    pub fn new(bind: SocketAddr) -> Self {
        Self {
            bind,
            idle_timeout: Duration::from_secs(30),
            sweep_interval: Duration::from_secs(5),
            read_timeout: Duration::from_millis(200),
            sent_ledger_capacity: 256,
        }
    }

    /// Sets the idle timeout.
    #[must_use]
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Sets the sweep interval.
    #[must_use]
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Sets the sent-update ledger capacity per session.
    #[must_use]
    pub fn with_sent_ledger_capacity(mut self, capacity: usize) -> Self {
        self.sent_ledger_capacity = capacity;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)))
    }
}

/// Configuration for a client [`Connection`](crate::Connection).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Address of the server to talk to.
    pub server: SocketAddr,
    /// Socket read timeout; bounds how quickly the reader thread
    /// observes a close.
    pub read_timeout: Duration,
    /// How many recent snapshots the tracker retains per vessel.
    pub history_capacity: usize,
}

impl ClientConfig {
    /// Creates a configuration pointed at `server`.
    #[must_use]
    pub fn new(server: SocketAddr) -> Self {
        Self {
            server,
            read_timeout: Duration::from_millis(200),
            history_capacity: 16,
        }
    }

    /// Sets the per-vessel snapshot history capacity.
    #[must_use]
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind.port(), DEFAULT_PORT);
        assert_eq!(config.idle_timeout, Duration::from_secs(30));
    }

    #[test]
    fn builders_override() {
        let config = ServerConfig::default()
            .with_idle_timeout(Duration::from_secs(5))
            .with_sent_ledger_capacity(16);
        assert_eq!(config.idle_timeout, Duration::from_secs(5));
        assert_eq!(config.sent_ledger_capacity, 16);
    }
}
