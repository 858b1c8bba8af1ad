//! The routing loop: sessions in, reckonings updated, diffs back out.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use reckon_core::{Reckoning, SessionId};
use reckon_protocol::{Ack, Message, MessageType, VesselStatus, VesselUpdate};
use tracing::{debug, info, trace, warn};

use crate::config::ServerConfig;
use crate::endpoint::{Endpoint, Incoming};
use crate::error::NetResult;
use crate::registry::Registry;

/// Session lifecycle notification produced by [`Server::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerEvent {
    /// A datagram arrived from a previously unseen address.
    Connected {
        /// The new session.
        session: SessionId,
        /// Its remote address.
        remote: SocketAddr,
    },
    /// A session went silent for longer than the idle timeout.
    Disconnected {
        /// The swept session.
        session: SessionId,
        /// Its remote address.
        remote: SocketAddr,
    },
}

/// The authoritative server: one UDP endpoint, a session registry, and
/// one reckoning per known vessel.
///
/// All mutation happens on the thread driving [`step`](Self::step), so
/// the registry and the reckonings have exactly one writer. A received
/// vessel update is recorded, acknowledged to its sender, and relayed
/// as a per-observer diff to every other live session; observers
/// acknowledge relays, which advances their watermarks and lets the
/// ledgers shrink.
pub struct Server {
    endpoint: Endpoint,
    registry: Registry,
    vessels: HashMap<reckon_core::VesselId, Reckoning<VesselStatus, SessionId>>,
    config: ServerConfig,
    last_sweep: Instant,
}

impl Server {
    /// Binds the configured address and prepares the routing state.
    pub fn bind(config: ServerConfig) -> NetResult<Self> {
        let endpoint = Endpoint::bind(config.bind, config.read_timeout)?;
        Ok(Self {
            endpoint,
            registry: Registry::new(config.sent_ledger_capacity),
            vessels: HashMap::new(),
            config,
            last_sweep: Instant::now(),
        })
    }

    /// The bound socket address.
    pub fn local_addr(&self) -> NetResult<SocketAddr> {
        self.endpoint.local_addr()
    }

    /// Number of live sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.registry.len()
    }

    /// Number of vessels with a reckoning.
    #[must_use]
    pub fn vessel_count(&self) -> usize {
        self.vessels.len()
    }

    /// Processes datagrams for up to `wait`, then runs the idle sweep
    /// if it is due. Returns the lifecycle events that occurred.
    pub fn step(&mut self, wait: Duration) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        let deadline = Instant::now() + wait;
        loop {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            match self.endpoint.recv_timeout(deadline - now) {
                Some(incoming) => self.handle(incoming, &mut events),
                None => break,
            }
        }
        self.maybe_sweep(&mut events);
        events
    }

    /// Runs the serve loop until the process is terminated, logging
    /// lifecycle events.
    pub fn run(&mut self) {
        info!(addr = ?self.local_addr().ok(), "serving");
        loop {
            for event in self.step(Duration::from_millis(500)) {
                match event {
                    ServerEvent::Connected { session, remote } => {
                        info!(%session, %remote, "client connected");
                    }
                    ServerEvent::Disconnected { session, remote } => {
                        info!(%session, %remote, "client idle, disconnected");
                    }
                }
            }
        }
    }

    /// Closes the endpoint. Safe to call more than once.
    pub fn close(&self) {
        self.endpoint.close();
    }

    fn handle(&mut self, incoming: Incoming, events: &mut Vec<ServerEvent>) {
        let now = Instant::now();
        let (session, is_new) = self.registry.touch(incoming.remote, now);
        if is_new {
            for reckoning in self.vessels.values_mut() {
                reckoning.add_observer(session);
            }
            events.push(ServerEvent::Connected {
                session,
                remote: incoming.remote,
            });
        }

        match incoming.frame.message {
            Message::Debug(text) => {
                info!(%session, remote = %incoming.remote, message = %text, "debug");
            }
            Message::Ack(ack) => self.handle_ack(incoming.remote, ack),
            Message::VesselUpdate(update) => {
                self.handle_update(session, incoming.remote, incoming.frame.sequence, update);
            }
        }
    }

    fn handle_ack(&mut self, remote: SocketAddr, ack: Ack) {
        if ack.acked_type != MessageType::VesselUpdate {
            trace!(?ack, "ignoring ack for non-update frame");
            return;
        }
        let Some(session) = self.registry.get(remote) else {
            return;
        };
        let session_id = session.id();
        let Some((vessel, position)) = session.sent_update(ack.acked_sequence) else {
            debug!(
                %session_id,
                sequence = ack.acked_sequence,
                "ack does not match a remembered update"
            );
            return;
        };
        let Some(reckoning) = self.vessels.get_mut(&vessel) else {
            return;
        };
        if let Err(err) = reckoning.note_position(&session_id, position) {
            debug!(%err, %session_id, "could not advance watermark");
        }
    }

    fn handle_update(
        &mut self,
        sender: SessionId,
        remote: SocketAddr,
        sequence: u64,
        update: VesselUpdate,
    ) {
        let registry = &mut self.registry;
        let endpoint = &self.endpoint;

        let reckoning = match self.vessels.entry(update.vessel) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let mut fresh = Reckoning::new();
                for session in registry.iter() {
                    fresh.add_observer(session.id());
                }
                debug!(vessel = %update.vessel, "tracking new vessel");
                entry.insert(fresh)
            }
        };

        if !reckoning.record(sequence, &update.diff) {
            debug!(
                vessel = %update.vessel,
                position = sequence,
                "dropped stale vessel update"
            );
            return;
        }
        trace!(
            vessel = %update.vessel,
            position = sequence,
            mask = %update.diff.changed(),
            "recorded vessel update"
        );

        // The sender demonstrably holds this state.
        if let Err(err) = reckoning.note_position(&sender, sequence) {
            debug!(%err, %sender, "sender is not an observer");
        }

        // Acknowledge the sender's frame.
        if let Some(session) = registry.get_mut(remote) {
            let ack_sequence = session.next_sequence();
            let ack = Message::ack(MessageType::VesselUpdate, sequence);
            if let Err(err) = endpoint.send_frame(session.remote(), &ack, ack_sequence) {
                warn!(%err, remote = %session.remote(), "failed to send ack");
            }
        }

        // Relay what changed to every other live session.
        let vessel = update.vessel;
        for session in registry.iter_mut() {
            if session.id() == sender {
                continue;
            }
            let diff = match reckoning.diff_for(&session.id()) {
                Ok(diff) => diff,
                Err(err) => {
                    debug!(%err, session = %session.id(), "no diff for observer");
                    continue;
                }
            };
            if diff.is_noop() {
                continue;
            }
            let relay_sequence = session.next_sequence();
            let message = Message::vessel_update(vessel, diff);
            match endpoint.send_frame(session.remote(), &message, relay_sequence) {
                Ok(()) => session.note_sent_update(relay_sequence, vessel, sequence),
                Err(err) => {
                    warn!(%err, remote = %session.remote(), "failed to relay update");
                }
            }
        }
    }

    fn maybe_sweep(&mut self, events: &mut Vec<ServerEvent>) {
        if self.last_sweep.elapsed() < self.config.sweep_interval {
            return;
        }
        self.last_sweep = Instant::now();

        let removed = self
            .registry
            .sweep_idle(Instant::now(), self.config.idle_timeout);
        for session in removed {
            let id = session.id();
            for reckoning in self.vessels.values_mut() {
                reckoning.remove_observer(&id);
            }
            events.push(ServerEvent::Disconnected {
                session: id,
                remote: session.remote(),
            });
        }
    }
}
