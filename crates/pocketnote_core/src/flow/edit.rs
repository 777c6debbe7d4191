//! Edit/delete screen flow.
//!
//! The flow is entered with a note id and loads the current record from the
//! store, so edits always start from committed state. `save` and `delete`
//! terminate the flow unless they fail with a retryable error.

use super::{validation_reason, FlowError};
use crate::model::note::{Note, NoteDraft, NoteId};
use crate::repo::note_repo::NoteRepository;
use crate::service::note_view_model::NoteViewModel;
use crate::store::StoreError;
use log::{debug, info, warn};

/// Result of a delete action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The note was gone before the delete ran; nothing changed.
    AlreadyAbsent,
}

impl DeleteOutcome {
    pub fn notice(&self) -> &'static str {
        match self {
            Self::Deleted => "Note deleted",
            Self::AlreadyAbsent => "Note was already deleted",
        }
    }
}

#[derive(Debug)]
pub struct EditFlow {
    original: Note,
    draft: NoteDraft,
    open: bool,
}

impl EditFlow {
    /// Loads note `id` from the store and seeds the fields from it.
    ///
    /// # Errors
    /// - `Store(NoteNotFound)` when the note no longer exists.
    pub fn enter<R: NoteRepository>(vm: &NoteViewModel<R>, id: NoteId) -> Result<Self, FlowError> {
        let original = vm.get(id)?.ok_or(StoreError::NoteNotFound(id))?;
        debug!("event=edit_enter module=flow status=ok note_id={id}");
        Ok(Self {
            draft: original.to_draft(),
            original,
            open: true,
        })
    }

    pub fn id(&self) -> NoteId {
        self.original.id
    }

    /// The note as loaded when the flow was entered.
    pub fn original(&self) -> &Note {
        &self.original
    }

    pub fn title(&self) -> &str {
        &self.draft.title
    }

    pub fn content(&self) -> &str {
        &self.draft.content
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_dirty(&self) -> bool {
        self.draft.title != self.original.title || self.draft.content != self.original.content
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), FlowError> {
        self.ensure_open()?;
        self.draft.title = title.into();
        Ok(())
    }

    pub fn set_content(&mut self, content: impl Into<String>) -> Result<(), FlowError> {
        self.ensure_open()?;
        self.draft.content = content.into();
        Ok(())
    }

    /// Writes the current fields to the note and closes the flow.
    ///
    /// # Errors
    /// - `Validation` for blank fields; the flow stays open.
    /// - `Store(NoteNotFound)` when the note was deleted meanwhile; the flow
    ///   closes.
    /// - other `Store` errors keep the flow open for a retry.
    pub fn save<R: NoteRepository>(&mut self, vm: &NoteViewModel<R>) -> Result<Note, FlowError> {
        self.ensure_open()?;
        if let Err(err) = self.draft.validate() {
            debug!(
                "event=edit_save module=flow status=rejected note_id={} reason={}",
                self.id(),
                validation_reason(err)
            );
            return Err(err.into());
        }

        match vm.update(self.id(), self.draft.clone()) {
            Ok(note) => {
                info!("event=edit_save module=flow status=ok note_id={}", note.id);
                self.open = false;
                Ok(note)
            }
            Err(err @ StoreError::NoteNotFound(_)) => {
                self.open = false;
                Err(err.into())
            }
            Err(err) => {
                warn!(
                    "event=edit_save module=flow status=error note_id={} error={err}",
                    self.id()
                );
                Err(err.into())
            }
        }
    }

    /// Deletes the note and closes the flow.
    ///
    /// Deleting a note that is already gone is not an error.
    pub fn delete<R: NoteRepository>(
        &mut self,
        vm: &NoteViewModel<R>,
    ) -> Result<DeleteOutcome, FlowError> {
        self.ensure_open()?;
        let outcome = match vm.delete(self.id()) {
            Ok(()) => DeleteOutcome::Deleted,
            Err(StoreError::NoteNotFound(_)) => DeleteOutcome::AlreadyAbsent,
            Err(err) => {
                warn!(
                    "event=edit_delete module=flow status=error note_id={} error={err}",
                    self.id()
                );
                return Err(err.into());
            }
        };
        info!(
            "event=edit_delete module=flow status=ok note_id={} outcome={:?}",
            self.id(),
            outcome
        );
        self.open = false;
        Ok(outcome)
    }

    /// Leaves the screen without writing.
    pub fn close(&mut self) {
        self.open = false;
    }

    fn ensure_open(&self) -> Result<(), FlowError> {
        if self.open {
            Ok(())
        } else {
            Err(FlowError::NotCollecting)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DeleteOutcome, EditFlow};
    use crate::flow::FlowError;
    use crate::model::note::{NoteDraft, NoteValidationError};
    use crate::service::note_view_model::NoteViewModel;
    use crate::store::testing::flaky_store;
    use crate::store::{NoteStore, StoreError};
    use uuid::Uuid;

    #[test]
    fn enter_unknown_id_is_not_found() {
        let vm = NoteViewModel::new(NoteStore::open_in_memory().unwrap());
        let err = EditFlow::enter(&vm, Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, FlowError::Store(StoreError::NoteNotFound(_))));
    }

    #[test]
    fn enter_reads_current_state_not_selection_time_state() {
        let vm = NoteViewModel::new(NoteStore::open_in_memory().unwrap());
        let note = vm.insert(NoteDraft::new("old", "text")).unwrap();
        vm.update(note.id, NoteDraft::new("new", "text")).unwrap();

        let flow = EditFlow::enter(&vm, note.id).unwrap();
        assert_eq!(flow.title(), "new");
        assert!(!flow.is_dirty());
    }

    #[test]
    fn blank_save_keeps_flow_open() {
        let vm = NoteViewModel::new(NoteStore::open_in_memory().unwrap());
        let note = vm.insert(NoteDraft::new("t", "c")).unwrap();
        let mut flow = EditFlow::enter(&vm, note.id).unwrap();
        flow.set_content("   ").unwrap();

        let err = flow.save(&vm).unwrap_err();
        assert!(matches!(
            err,
            FlowError::Validation(NoteValidationError::EmptyContent)
        ));
        assert!(flow.is_open());
        assert_eq!(vm.get(note.id).unwrap().unwrap().content, "c");
    }

    #[test]
    fn save_after_concurrent_delete_reports_not_found_and_closes() {
        let vm = NoteViewModel::new(NoteStore::open_in_memory().unwrap());
        let note = vm.insert(NoteDraft::new("t", "c")).unwrap();
        let mut flow = EditFlow::enter(&vm, note.id).unwrap();
        vm.delete(note.id).unwrap();

        let err = flow.save(&vm).unwrap_err();
        assert!(matches!(err, FlowError::Store(StoreError::NoteNotFound(_))));
        assert!(!flow.is_open());
        assert!(vm.snapshot().unwrap().is_empty());
    }

    #[test]
    fn delete_closes_flow_with_notice() {
        let vm = NoteViewModel::new(NoteStore::open_in_memory().unwrap());
        let note = vm.insert(NoteDraft::new("t", "c")).unwrap();
        let mut flow = EditFlow::enter(&vm, note.id).unwrap();

        let outcome = flow.delete(&vm).unwrap();
        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert_eq!(outcome.notice(), "Note deleted");
        assert!(matches!(flow.delete(&vm), Err(FlowError::NotCollecting)));
    }

    #[test]
    fn storage_failure_on_save_keeps_flow_open_for_retry() {
        let (store, outage) = flaky_store();
        let vm = NoteViewModel::new(store);
        let note = vm.insert(NoteDraft::new("t", "c")).unwrap();
        let mut flow = EditFlow::enter(&vm, note.id).unwrap();
        flow.set_content("c2").unwrap();

        outage.fail_writes(true);
        let err = flow.save(&vm).unwrap_err();
        assert!(matches!(
            err,
            FlowError::Store(StoreError::StorageUnavailable(_))
        ));
        assert_eq!(err.user_message(), "Notes could not be saved, please try again");
        assert!(flow.is_open());
        assert_eq!(flow.content(), "c2");
        assert_eq!(vm.get(note.id).unwrap().unwrap().content, "c");

        outage.fail_writes(false);
        assert_eq!(flow.save(&vm).unwrap().content, "c2");
        assert!(!flow.is_open());
    }

    #[test]
    fn storage_failure_on_delete_keeps_flow_open_for_retry() {
        let (store, outage) = flaky_store();
        let vm = NoteViewModel::new(store);
        let note = vm.insert(NoteDraft::new("t", "c")).unwrap();
        let mut flow = EditFlow::enter(&vm, note.id).unwrap();

        outage.fail_writes(true);
        let err = flow.delete(&vm).unwrap_err();
        assert!(matches!(
            err,
            FlowError::Store(StoreError::StorageUnavailable(_))
        ));
        assert_eq!(err.user_message(), "Notes could not be saved, please try again");
        assert!(flow.is_open());
        assert_eq!(vm.snapshot().unwrap().len(), 1);

        outage.fail_writes(false);
        assert_eq!(flow.delete(&vm).unwrap(), DeleteOutcome::Deleted);
        assert!(vm.snapshot().unwrap().is_empty());
    }
}
