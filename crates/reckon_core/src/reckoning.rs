//! Per-vessel reconciliation: head value, position ledger, watermarks.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;

use reckon_codec::{Diff, DiffSchema};
use tracing::debug;

use crate::error::{CoreError, CoreResult};

/// Reconciliation unit for one replicated vessel.
///
/// A reckoning owns the authoritative head value, a ledger of the head
/// as it stood at each recorded position, and one watermark per
/// registered observer. The watermark is the last position the observer
/// is known to have received; `None` means "never synchronized, needs a
/// full snapshot".
///
/// Positions are caller-supplied (typically the sender's message
/// sequence number). They must increase but need not be contiguous;
/// stale or duplicate positions are rejected so lost or reordered
/// datagrams can never regress the head.
#[derive(Debug, Clone)]
pub struct Reckoning<T, O> {
    head: T,
    newest: Option<u64>,
    ledger: BTreeMap<u64, T>,
    watermarks: HashMap<O, Option<u64>>,
}

impl<T, O> Reckoning<T, O>
where
    T: DiffSchema,
    O: Hash + Eq + Clone,
{
    /// Creates a reckoning with a default head value.
    #[must_use]
    pub fn new() -> Self {
        Self::with_head(T::default())
    }

    /// Creates a reckoning seeded with `head`.
    #[must_use]
    pub fn with_head(head: T) -> Self {
        Self {
            head,
            newest: None,
            ledger: BTreeMap::new(),
            watermarks: HashMap::new(),
        }
    }

    /// The current authoritative value.
    #[must_use]
    pub fn head(&self) -> &T {
        &self.head
    }

    /// Records a new moment by applying `diff` to the head.
    ///
    /// Returns false and leaves the head untouched when `position` is
    /// not newer than the newest recorded position. With no observers
    /// registered there is nothing to reconcile against, so the ledger
    /// is cleared before recording.
    pub fn record(&mut self, position: u64, diff: &Diff<T>) -> bool {
        if !self.accept(position) {
            return false;
        }
        diff.apply(&mut self.head);
        self.ledger.insert(position, self.head.clone());
        true
    }

    /// Records a new moment from a complete value.
    pub fn record_snapshot(&mut self, position: u64, value: T) -> bool {
        if !self.accept(position) {
            return false;
        }
        self.head = value;
        self.ledger.insert(position, self.head.clone());
        true
    }

    fn accept(&mut self, position: u64) -> bool {
        if let Some(newest) = self.newest {
            if position <= newest {
                debug!(position, newest, "stale position rejected");
                return false;
            }
        }
        if self.watermarks.is_empty() {
            self.ledger.clear();
        }
        self.newest = Some(position);
        true
    }

    /// Registers an observer with no watermark.
    ///
    /// Registering an observer that is already known keeps its current
    /// watermark.
    pub fn add_observer(&mut self, observer: O) {
        self.watermarks.entry(observer).or_insert(None);
    }

    /// Deregisters an observer and prunes the ledger.
    ///
    /// Returns whether the observer was registered.
    pub fn remove_observer(&mut self, observer: &O) -> bool {
        if self.watermarks.remove(observer).is_some() {
            self.prune();
            return true;
        }
        false
    }

    /// Returns true when `observer` is registered.
    #[must_use]
    pub fn is_observer(&self, observer: &O) -> bool {
        self.watermarks.contains_key(observer)
    }

    /// Number of registered observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.watermarks.len()
    }

    /// Records that `observer` has received `position` and prunes.
    pub fn note_position(&mut self, observer: &O, position: u64) -> CoreResult<()> {
        let watermark = self
            .watermarks
            .get_mut(observer)
            .ok_or(CoreError::UnknownObserver)?;
        *watermark = Some(position);
        self.prune();
        Ok(())
    }

    /// The diff that brings `observer` up to the head.
    ///
    /// An observer with no watermark gets a full snapshot. A watermark
    /// whose position is no longer retained also falls back to a full
    /// snapshot; the observer stays resynchronizable either way.
    pub fn diff_for(&self, observer: &O) -> CoreResult<Diff<T>> {
        let watermark = self
            .watermarks
            .get(observer)
            .ok_or(CoreError::UnknownObserver)?;

        let Some(position) = watermark else {
            return Ok(Diff::snapshot(self.head.clone()));
        };

        match self.ledger.get(position) {
            Some(old) => Ok(Diff::between(Some(old), self.head.clone())),
            None => {
                debug!(position, "watermark no longer retained, sending full snapshot");
                Ok(Diff::snapshot(self.head.clone()))
            }
        }
    }

    /// Drops every ledger position no observer's watermark references.
    pub fn prune(&mut self) {
        let mut unreferenced: HashSet<u64> = self.ledger.keys().copied().collect();
        for watermark in self.watermarks.values().flatten() {
            unreferenced.remove(watermark);
        }
        for position in unreferenced {
            self.ledger.remove(&position);
        }
    }

    /// Number of retained ledger positions.
    #[must_use]
    pub fn retained(&self) -> usize {
        self.ledger.len()
    }

    /// The oldest retained ledger position.
    #[must_use]
    pub fn oldest_retained(&self) -> Option<u64> {
        self.ledger.keys().next().copied()
    }
}

impl<T, O> Default for Reckoning<T, O>
where
    T: DiffSchema,
    O: Hash + Eq + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
