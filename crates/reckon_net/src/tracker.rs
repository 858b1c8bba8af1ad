//! Client-side vessel tracking: diff outgoing snapshots, apply inbound
//! updates.

use std::collections::{HashMap, HashSet};

use reckon_codec::Diff;
use reckon_core::{History, VesselId};
use reckon_protocol::{Frame, Message, MessageType, VesselStatus, VesselUpdate};
use tracing::{debug, info, trace};

use crate::client::Connection;
use crate::config::ClientConfig;
use crate::error::NetResult;

struct TrackedVessel {
    history: History<VesselStatus>,
    last_applied: Option<u64>,
}

impl TrackedVessel {
    fn new(history_capacity: usize) -> Self {
        Self {
            // Applying partial diffs needs at least the latest snapshot.
            history: History::new(history_capacity.max(1)),
            last_applied: None,
        }
    }

    fn latest(&self) -> Option<&VesselStatus> {
        self.history.current().ok()
    }
}

/// Tracks the vessels a client knows about.
///
/// Fed fresh snapshots each tick, the tracker sends a diff only when
/// something actually changed, announces vessels appearing and
/// disappearing, and keeps a bounded history of recent snapshots per
/// vessel. Inbound updates are applied onto the local copy; an update
/// whose position is not newer than the last applied one is dropped so
/// reordered datagrams cannot resurrect stale field values.
pub struct VesselTracker {
    connection: Connection,
    history_capacity: usize,
    vessels: HashMap<VesselId, TrackedVessel>,
}

impl VesselTracker {
    /// Creates a tracker over an established connection.
    #[must_use]
    pub fn new(connection: Connection, config: &ClientConfig) -> Self {
        Self {
            connection,
            history_capacity: config.history_capacity,
            vessels: HashMap::new(),
        }
    }

    /// The underlying connection.
    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Number of currently tracked vessels.
    #[must_use]
    pub fn tracked_count(&self) -> usize {
        self.vessels.len()
    }

    /// The latest known state of a vessel, if tracked.
    #[must_use]
    pub fn latest(&self, vessel: &VesselId) -> Option<&VesselStatus> {
        self.vessels.get(vessel).and_then(TrackedVessel::latest)
    }

    /// Ingests one tick's worth of snapshots.
    ///
    /// New vessels are announced and sent as full snapshots; known
    /// vessels send a diff only when non-empty; vessels absent from
    /// `snapshots` are reported and forgotten.
    pub fn update(&mut self, snapshots: &[(VesselId, VesselStatus)]) -> NetResult<()> {
        let mut vanished: HashSet<VesselId> = self.vessels.keys().copied().collect();

        for (id, status) in snapshots {
            vanished.remove(id);
            match self.vessels.get_mut(id) {
                Some(tracked) => {
                    let previous = tracked.latest().cloned();
                    let diff = Diff::between(previous.as_ref(), status.clone());
                    if diff.is_noop() {
                        continue;
                    }
                    self.connection.send_update(*id, diff)?;
                    tracked.history.add(status.clone());
                }
                None => {
                    self.connection
                        .send_debug(format!("> new vessel: {} ({})", status.name, id))?;
                    self.connection
                        .send_update(*id, Diff::between(None, status.clone()))?;
                    let mut tracked = TrackedVessel::new(self.history_capacity);
                    tracked.history.add(status.clone());
                    self.vessels.insert(*id, tracked);
                }
            }
        }

        for id in vanished {
            if let Some(tracked) = self.vessels.remove(&id) {
                let name = tracked
                    .latest()
                    .map(|status| status.name.clone())
                    .unwrap_or_default();
                self.connection
                    .send_debug(format!("< removed vessel: {name} ({id})"))?;
            }
        }
        Ok(())
    }

    /// Drains received frames, applying vessel updates and
    /// acknowledging each applied one. Returns how many were applied.
    pub fn pump(&mut self) -> NetResult<usize> {
        let mut applied = 0;
        while let Some(frame) = self.connection.try_recv() {
            if self.absorb(frame)? {
                applied += 1;
            }
        }
        Ok(applied)
    }

    /// Handles one received frame. Returns whether it was an update
    /// that got applied.
    pub fn absorb(&mut self, frame: Frame) -> NetResult<bool> {
        match frame.message {
            Message::VesselUpdate(update) => self.apply_update(frame.sequence, update),
            Message::Ack(ack) => {
                trace!(?ack, "server acknowledged frame");
                Ok(false)
            }
            Message::Debug(text) => {
                info!(message = %text, "debug from server");
                Ok(false)
            }
        }
    }

    fn apply_update(&mut self, position: u64, update: VesselUpdate) -> NetResult<bool> {
        let tracked = self
            .vessels
            .entry(update.vessel)
            .or_insert_with(|| TrackedVessel::new(self.history_capacity));

        if let Some(last) = tracked.last_applied {
            if position <= last {
                debug!(
                    vessel = %update.vessel,
                    position,
                    last,
                    "dropped stale inbound update"
                );
                return Ok(false);
            }
        }

        let mut value = tracked.latest().cloned().unwrap_or_default();
        update.diff.apply(&mut value);
        tracked.history.add(value);
        tracked.last_applied = Some(position);

        self.connection
            .send_ack(MessageType::VesselUpdate, position)?;
        Ok(true)
    }

    /// Closes the underlying connection.
    pub fn close(&self) {
        self.connection.close();
    }
}
