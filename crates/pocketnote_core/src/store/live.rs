//! Live note collection: versioned snapshots fanned out to subscribers.
//!
//! # Responsibility
//! - Carry immutable, versioned note snapshots from the store to observers.
//! - Keep delivery decoupled from any rendering surface.
//!
//! # Invariants
//! - A new subscriber first receives the snapshot current at subscribe time.
//! - Each subscriber holds at most one undelivered snapshot: a newer publish
//!   replaces it, so versions seen by one subscriber only ever increase.
//! - Subscribers whose handle was dropped are pruned on the next publish.

use crate::model::note::{Note, NoteId};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, Weak};
use std::time::Duration;

/// Immutable view of every note at one committed store version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSnapshot {
    /// Increases by one per committed mutation; `0` for a fresh store.
    pub version: u64,
    notes: Arc<[Note]>,
}

impl NoteSnapshot {
    pub fn new(version: u64, notes: Vec<Note>) -> Self {
        Self {
            version,
            notes: notes.into(),
        }
    }

    /// Notes in collection order (newest first).
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }
}

#[derive(Debug, Default)]
struct SlotState {
    latest: Option<NoteSnapshot>,
    closed: bool,
}

/// Single-snapshot mailbox shared by one subscriber and the hub.
#[derive(Debug, Default)]
struct Slot {
    state: Mutex<SlotState>,
    ready: Condvar,
}

impl Slot {
    fn lock(&self) -> MutexGuard<'_, SlotState> {
        // Slot state is two plain fields; a panicked holder cannot leave it torn.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn offer(&self, snapshot: NoteSnapshot) {
        self.lock().latest = Some(snapshot);
        self.ready.notify_all();
    }

    fn close(&self) {
        self.lock().closed = true;
        self.ready.notify_all();
    }
}

fn is_waiting(state: &mut SlotState) -> bool {
    state.latest.is_none() && !state.closed
}

/// Subscription handle returned by `NoteStore::observe_all`.
#[derive(Debug)]
pub struct LiveNotes {
    slot: Arc<Slot>,
}

impl LiveNotes {
    /// Blocks until a snapshot newer than the last one taken is available.
    ///
    /// Returns `None` once the store has been dropped and the pending
    /// snapshot was consumed.
    pub fn recv(&self) -> Option<NoteSnapshot> {
        let guard = self.slot.lock();
        let mut state = match self.slot.ready.wait_while(guard, is_waiting) {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.latest.take()
    }

    /// Waits at most `timeout` for a pending snapshot.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<NoteSnapshot> {
        let guard = self.slot.lock();
        let mut state = match self.slot.ready.wait_timeout_while(guard, timeout, is_waiting) {
            Ok((state, _)) => state,
            Err(poisoned) => poisoned.into_inner().0,
        };
        state.latest.take()
    }

    /// Takes the pending snapshot, if any, without blocking.
    pub fn try_latest(&self) -> Option<NoteSnapshot> {
        self.slot.lock().latest.take()
    }
}

/// Fan-out registry owned by the store, guarded by the store lock.
#[derive(Debug, Default)]
pub(crate) struct SnapshotHub {
    subscribers: Vec<Weak<Slot>>,
}

impl SnapshotHub {
    pub(crate) fn subscribe(&mut self, current: NoteSnapshot) -> LiveNotes {
        let slot = Arc::new(Slot::default());
        slot.offer(current);
        self.subscribers.push(Arc::downgrade(&slot));
        LiveNotes { slot }
    }

    /// Hands `snapshot` to every live subscriber and returns how many got it.
    pub(crate) fn publish(&mut self, snapshot: &NoteSnapshot) -> usize {
        self.subscribers.retain(|subscriber| match subscriber.upgrade() {
            Some(slot) => {
                slot.offer(snapshot.clone());
                true
            }
            None => false,
        });
        self.subscribers.len()
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl Drop for SnapshotHub {
    fn drop(&mut self) {
        for slot in self.subscribers.iter().filter_map(Weak::upgrade) {
            slot.close();
        }
    }
}
