//! Note view-model.
//!
//! # Responsibility
//! - Be the single facade between presentation components and the store.
//! - Expose the live note collection unchanged.
//!
//! # Invariants
//! - No validation, caching or transformation happens here; every call is a
//!   direct delegation to `NoteStore`.
//! - Clones share one store, so every screen of a process sees the same data.

use crate::model::note::{Note, NoteDraft, NoteId};
use crate::repo::note_repo::NoteRepository;
use crate::store::live::{LiveNotes, NoteSnapshot};
use crate::store::{NoteStore, StoreResult};
use std::sync::Arc;

/// Process-scoped mediator over a shared `NoteStore`.
pub struct NoteViewModel<R: NoteRepository> {
    store: Arc<NoteStore<R>>,
}

impl<R: NoteRepository> Clone for NoteViewModel<R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<R: NoteRepository> NoteViewModel<R> {
    pub fn new(store: NoteStore<R>) -> Self {
        Self::from_shared(Arc::new(store))
    }

    /// Wraps a store that is already shared with other owners.
    pub fn from_shared(store: Arc<NoteStore<R>>) -> Self {
        Self { store }
    }

    /// Live collection of all notes; see `NoteStore::observe_all`.
    pub fn all_notes(&self) -> StoreResult<LiveNotes> {
        self.store.observe_all()
    }

    pub fn snapshot(&self) -> StoreResult<NoteSnapshot> {
        self.store.snapshot()
    }

    pub fn get(&self, id: NoteId) -> StoreResult<Option<Note>> {
        self.store.get(id)
    }

    pub fn insert(&self, draft: NoteDraft) -> StoreResult<Note> {
        self.store.insert(draft)
    }

    pub fn update(&self, id: NoteId, draft: NoteDraft) -> StoreResult<Note> {
        self.store.update(id, draft)
    }

    pub fn delete(&self, id: NoteId) -> StoreResult<()> {
        self.store.delete(id)
    }
}
