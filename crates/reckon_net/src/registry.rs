//! Server-side peer session bookkeeping.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use reckon_core::{RingBuffer, SessionId, VesselId};

/// One recently sent vessel update, remembered until the ring evicts it.
#[derive(Debug, Clone, Copy)]
struct SentUpdate {
    sequence: u64,
    vessel: VesselId,
    position: u64,
}

/// Server-side state for one remote peer.
///
/// A session owns the outbound sequence counter for its channel and a
/// bounded ledger of recently sent updates, used to translate an
/// acknowledged frame sequence back into the vessel position it
/// carried.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    remote: SocketAddr,
    sequence: u64,
    last_seen: Instant,
    sent_updates: RingBuffer<SentUpdate>,
}

impl Session {
    fn new(id: SessionId, remote: SocketAddr, ledger_capacity: usize, now: Instant) -> Self {
        Self {
            id,
            remote,
            sequence: 0,
            last_seen: now,
            sent_updates: RingBuffer::new(ledger_capacity),
        }
    }

    /// The session's identifier.
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The remote address this session belongs to.
    #[must_use]
    pub fn remote(&self) -> SocketAddr {
        self.remote
    }

    /// When a datagram was last received from this peer.
    #[must_use]
    pub fn last_seen(&self) -> Instant {
        self.last_seen
    }

    /// Claims the next outbound sequence number.
    pub(crate) fn next_sequence(&mut self) -> u64 {
        let sequence = self.sequence;
        self.sequence += 1;
        sequence
    }

    /// Remembers that frame `sequence` carried `vessel` at `position`.
    pub(crate) fn note_sent_update(&mut self, sequence: u64, vessel: VesselId, position: u64) {
        self.sent_updates.push(SentUpdate {
            sequence,
            vessel,
            position,
        });
    }

    /// Looks up a recently sent update by its frame sequence.
    pub(crate) fn sent_update(&self, sequence: u64) -> Option<(VesselId, u64)> {
        self.sent_updates
            .iter()
            .find(|sent| sent.sequence == sequence)
            .map(|sent| (sent.vessel, sent.position))
    }

    fn touch(&mut self, now: Instant) {
        self.last_seen = now;
    }
}

/// Maps remote addresses to logical sessions.
///
/// Sessions are created lazily on first contact and removed by the idle
/// sweep. IDs are never reused within a registry's lifetime.
#[derive(Debug)]
pub struct Registry {
    sessions: HashMap<SocketAddr, Session>,
    next_id: u64,
    sent_ledger_capacity: usize,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new(sent_ledger_capacity: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            next_id: 1,
            sent_ledger_capacity,
        }
    }

    /// Records contact from `remote`, creating a session when the
    /// address is unseen. Returns the session ID and whether it is new.
    pub fn touch(&mut self, remote: SocketAddr, now: Instant) -> (SessionId, bool) {
        if let Some(session) = self.sessions.get_mut(&remote) {
            session.touch(now);
            return (session.id, false);
        }
        let id = SessionId::new(self.next_id);
        self.next_id += 1;
        self.sessions
            .insert(remote, Session::new(id, remote, self.sent_ledger_capacity, now));
        (id, true)
    }

    /// The session for `remote`, if one exists.
    #[must_use]
    pub fn get(&self, remote: SocketAddr) -> Option<&Session> {
        self.sessions.get(&remote)
    }

    /// Mutable access to the session for `remote`.
    pub fn get_mut(&mut self, remote: SocketAddr) -> Option<&mut Session> {
        self.sessions.get_mut(&remote)
    }

    /// Iterates all sessions.
    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    /// Iterates all sessions mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Session> {
        self.sessions.values_mut()
    }

    /// Removes and returns every session idle for longer than `timeout`.
    pub fn sweep_idle(&mut self, now: Instant, timeout: Duration) -> Vec<Session> {
        let idle: Vec<SocketAddr> = self
            .sessions
            .iter()
            .filter(|(_, session)| now.duration_since(session.last_seen) > timeout)
            .map(|(addr, _)| *addr)
            .collect();
        idle.into_iter()
            .filter_map(|addr| self.sessions.remove(&addr))
            .collect()
    }

    /// Number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns true when no sessions exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
