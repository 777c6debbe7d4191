//! Durable note store with a live, observable collection.
//!
//! # Responsibility
//! - Wrap a `NoteRepository` with id-based insert/update/delete use-cases.
//! - Publish a fresh `NoteSnapshot` to every observer after each commit.
//! - Translate persistence failures into caller-facing `StoreError`s.
//!
//! # Invariants
//! - Mutation and snapshot publication happen under one lock, so observers
//!   see snapshots in commit order.
//! - Failed or rejected mutations never bump the version or publish.
//! - A commit whose publish could not be built is delivered by the next
//!   successful read of the collection.
//! - Storage failures surface as `StorageUnavailable`, never a panic.

pub mod live;

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::note::{Note, NoteDraft, NoteId, NoteValidationError};
use crate::repo::note_repo::{NoteRepository, RepoError, SqliteNoteRepository};
use live::{LiveNotes, NoteSnapshot, SnapshotHub};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

pub type StoreResult<T> = Result<T, StoreError>;

/// Caller-facing error for store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Title or content is blank.
    Validation(NoteValidationError),
    /// No note carries the requested id.
    NoteNotFound(NoteId),
    /// Underlying storage could not complete the operation.
    StorageUnavailable(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
    /// A previous holder of the store lock panicked.
    Poisoned,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::StorageUnavailable(err) => write!(f, "note storage unavailable: {err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent note state: {details}"),
            Self::Poisoned => write!(f, "note store lock poisoned"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::StorageUnavailable(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NoteNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::StorageUnavailable(other),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::StorageUnavailable(RepoError::Db(value))
    }
}

impl From<NoteValidationError> for StoreError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

struct StoreInner<R> {
    repo: R,
    version: u64,
    hub: SnapshotHub,
    /// Set when `version` moved past the last snapshot observers received.
    publish_pending: bool,
}

impl<R: NoteRepository> StoreInner<R> {
    /// Reads the collection at the current version and delivers it to
    /// observers if they are behind.
    fn current_snapshot(&mut self) -> StoreResult<NoteSnapshot> {
        let snapshot = NoteSnapshot::new(self.version, self.repo.list_notes()?);
        if self.publish_pending {
            let delivered = self.hub.publish(&snapshot);
            self.publish_pending = false;
            debug!(
                "event=note_publish module=store status=ok version={} observers={delivered}",
                self.version
            );
        }
        Ok(snapshot)
    }
}

/// Note store shared by every presentation component of one process.
pub struct NoteStore<R: NoteRepository> {
    inner: Mutex<StoreInner<R>>,
}

impl NoteStore<SqliteNoteRepository> {
    /// Opens (or creates) a file-backed store.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = open_db(path)?;
        Ok(Self::new(SqliteNoteRepository::try_new(conn)?))
    }

    /// Opens an empty in-memory store.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = open_db_in_memory()?;
        Ok(Self::new(SqliteNoteRepository::try_new(conn)?))
    }
}

impl<R: NoteRepository> NoteStore<R> {
    pub fn new(repo: R) -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                repo,
                version: 0,
                hub: SnapshotHub::default(),
                publish_pending: false,
            }),
        }
    }

    /// Persists a new note built from `draft` and returns the stored record.
    ///
    /// # Errors
    /// - `Validation` when title or content is blank.
    /// - `StorageUnavailable` when the write fails.
    pub fn insert(&self, draft: NoteDraft) -> StoreResult<Note> {
        let note = Note::from_draft(draft);
        self.mutate("note_insert", note.id, |repo| {
            repo.insert_note(&note)?;
            repo.get_note(note.id)?
                .ok_or(StoreError::InconsistentState("inserted note not found in read-back"))
        })
    }

    /// Replaces title and content of the note with `id`.
    ///
    /// # Errors
    /// - `NoteNotFound` when no note has `id`; the collection is unchanged.
    pub fn update(&self, id: NoteId, draft: NoteDraft) -> StoreResult<Note> {
        let note = Note::with_id(id, draft.title, draft.content);
        self.mutate("note_update", id, |repo| {
            repo.update_note(&note)?;
            repo.get_note(id)?
                .ok_or(StoreError::InconsistentState("updated note not found in read-back"))
        })
    }

    /// Removes the note with `id`.
    ///
    /// # Errors
    /// - `NoteNotFound` when no note has `id`; nothing is published.
    pub fn delete(&self, id: NoteId) -> StoreResult<()> {
        self.mutate("note_delete", id, |repo| Ok(repo.delete_note(id)?))
    }

    pub fn get(&self, id: NoteId) -> StoreResult<Option<Note>> {
        let inner = self.lock()?;
        Ok(inner.repo.get_note(id)?)
    }

    /// Returns the current collection without subscribing.
    pub fn snapshot(&self) -> StoreResult<NoteSnapshot> {
        self.lock()?.current_snapshot()
    }

    /// Subscribes to the live collection.
    ///
    /// The returned handle yields the current snapshot first, then one
    /// snapshot per committed mutation.
    pub fn observe_all(&self) -> StoreResult<LiveNotes> {
        let mut inner = self.lock()?;
        let current = inner.current_snapshot()?;
        let live = inner.hub.subscribe(current);
        debug!(
            "event=note_observe module=store status=ok version={} observers={}",
            inner.version,
            inner.hub.subscriber_count()
        );
        Ok(live)
    }

    pub fn count(&self) -> StoreResult<u64> {
        Ok(self.lock()?.repo.count_notes()?)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, StoreInner<R>>> {
        self.inner.lock().map_err(|_| StoreError::Poisoned)
    }

    fn mutate<T>(
        &self,
        event: &'static str,
        id: NoteId,
        op: impl FnOnce(&R) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let started_at = Instant::now();
        let mut inner = self.lock()?;

        let value = match op(&inner.repo) {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    "event={event} module=store status=error note_id={id} duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                return Err(err);
            }
        };

        inner.version += 1;
        inner.publish_pending = true;
        let version = inner.version;
        let published = inner.current_snapshot();
        match published {
            Ok(_) => info!(
                "event={event} module=store status=ok note_id={id} version={version} observers={} duration_ms={}",
                inner.hub.subscriber_count(),
                started_at.elapsed().as_millis()
            ),
            // The write is committed; the next successful read delivers it.
            Err(err) => warn!(
                "event={event} module=store status=publish_skipped note_id={id} version={version} error={err}"
            ),
        }

        Ok(value)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::model::note::{Note, NoteId};
    use crate::repo::note_repo::{NoteRepository, RepoError, RepoResult, SqliteNoteRepository};
    use crate::store::NoteStore;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    /// Switches that make a `FlakyRepository` fail on demand.
    #[derive(Debug, Clone, Default)]
    pub(crate) struct Outage {
        writes: Arc<AtomicBool>,
        lists: Arc<AtomicBool>,
    }

    impl Outage {
        pub(crate) fn fail_writes(&self, on: bool) {
            self.writes.store(on, Ordering::SeqCst);
        }

        pub(crate) fn fail_lists(&self, on: bool) {
            self.lists.store(on, Ordering::SeqCst);
        }
    }

    /// In-memory SQLite repository that reports disk I/O errors while an
    /// `Outage` switch is on.
    pub(crate) struct FlakyRepository {
        inner: SqliteNoteRepository,
        outage: Outage,
    }

    pub(crate) fn flaky_store() -> (NoteStore<FlakyRepository>, Outage) {
        let outage = Outage::default();
        let conn = crate::db::open_db_in_memory().unwrap();
        let repo = FlakyRepository {
            inner: SqliteNoteRepository::try_new(conn).unwrap(),
            outage: outage.clone(),
        };
        (NoteStore::new(repo), outage)
    }

    fn io_error() -> RepoError {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_IOERR),
            Some("disk I/O error".to_string()),
        )
        .into()
    }

    impl FlakyRepository {
        fn check(&self, switch: &AtomicBool) -> RepoResult<()> {
            if switch.load(Ordering::SeqCst) {
                Err(io_error())
            } else {
                Ok(())
            }
        }
    }

    impl NoteRepository for FlakyRepository {
        fn insert_note(&self, note: &Note) -> RepoResult<NoteId> {
            self.check(&self.outage.writes)?;
            self.inner.insert_note(note)
        }

        fn update_note(&self, note: &Note) -> RepoResult<()> {
            self.check(&self.outage.writes)?;
            self.inner.update_note(note)
        }

        fn delete_note(&self, id: NoteId) -> RepoResult<()> {
            self.check(&self.outage.writes)?;
            self.inner.delete_note(id)
        }

        fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
            self.inner.get_note(id)
        }

        fn list_notes(&self) -> RepoResult<Vec<Note>> {
            self.check(&self.outage.lists)?;
            self.inner.list_notes()
        }

        fn count_notes(&self) -> RepoResult<u64> {
            self.inner.count_notes()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::flaky_store;
    use super::{NoteStore, StoreError};
    use crate::model::note::{NoteDraft, NoteValidationError};
    use uuid::Uuid;

    #[test]
    fn rejected_insert_does_not_publish_or_bump_version() {
        let store = NoteStore::open_in_memory().unwrap();
        let live = store.observe_all().unwrap();
        assert_eq!(live.try_latest().map(|s| s.version), Some(0));

        let err = store.insert(NoteDraft::new("", "body")).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation(NoteValidationError::EmptyTitle)
        ));
        assert!(live.try_latest().is_none());
        assert_eq!(store.snapshot().unwrap().version, 0);
    }

    #[test]
    fn update_of_unknown_id_is_not_found() {
        let store = NoteStore::open_in_memory().unwrap();
        let id = Uuid::new_v4();
        let err = store.update(id, NoteDraft::new("t", "c")).unwrap_err();
        assert!(matches!(err, StoreError::NoteNotFound(missing) if missing == id));
    }

    #[test]
    fn each_commit_publishes_next_version() {
        let store = NoteStore::open_in_memory().unwrap();
        let live = store.observe_all().unwrap();
        assert_eq!(live.recv().map(|s| s.version), Some(0));

        let note = store.insert(NoteDraft::new("t", "c")).unwrap();
        assert_eq!(live.recv().map(|s| (s.version, s.len())), Some((1, 1)));
        store.delete(note.id).unwrap();
        assert_eq!(live.recv().map(|s| (s.version, s.len())), Some((2, 0)));
    }

    #[test]
    fn failed_write_is_storage_unavailable_and_not_published() {
        let (store, outage) = flaky_store();
        let live = store.observe_all().unwrap();
        live.try_latest();

        outage.fail_writes(true);
        let err = store.insert(NoteDraft::new("t", "c")).unwrap_err();
        assert!(matches!(err, StoreError::StorageUnavailable(_)));
        assert!(live.try_latest().is_none());

        outage.fail_writes(false);
        assert_eq!(store.snapshot().unwrap().version, 0);
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn skipped_publish_is_delivered_on_next_read() {
        let (store, outage) = flaky_store();
        let live = store.observe_all().unwrap();
        live.try_latest();

        outage.fail_lists(true);
        let note = store.insert(NoteDraft::new("kept", "despite publish failure")).unwrap();
        assert!(live.try_latest().is_none());
        assert!(matches!(
            store.snapshot(),
            Err(StoreError::StorageUnavailable(_))
        ));

        outage.fail_lists(false);
        let current = store.snapshot().unwrap();
        assert_eq!(current.version, 1);
        let delivered = live.try_latest().unwrap();
        assert_eq!(delivered.version, 1);
        assert_eq!(delivered.notes()[0].id, note.id);

        // Already caught up: a plain read does not publish again.
        store.snapshot().unwrap();
        assert!(live.try_latest().is_none());
    }

    #[test]
    fn new_observer_also_flushes_skipped_publish() {
        let (store, outage) = flaky_store();
        let early = store.observe_all().unwrap();
        early.try_latest();

        outage.fail_lists(true);
        store.insert(NoteDraft::new("t", "c")).unwrap();
        outage.fail_lists(false);

        let late = store.observe_all().unwrap();
        assert_eq!(late.try_latest().map(|s| s.version), Some(1));
        assert_eq!(early.try_latest().map(|s| s.len()), Some(1));
    }
}
