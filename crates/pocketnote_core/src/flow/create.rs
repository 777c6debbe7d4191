//! Add-note dialog flow.
//!
//! States: `Idle -> Collecting -> Idle` once `confirm` stores the note. A
//! `confirm` that fails validation or storage leaves the dialog `Collecting`
//! with its input intact. Validation runs inside `confirm` and never spans
//! two calls, so it has no state of its own. `cancel` returns to `Idle` from
//! anywhere and discards input.

use super::{validation_reason, FlowError};
use crate::model::note::{Note, NoteDraft};
use crate::repo::note_repo::NoteRepository;
use crate::service::note_view_model::NoteViewModel;
use log::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateState {
    Idle,
    Collecting,
}

#[derive(Debug)]
pub struct CreateFlow {
    state: CreateState,
    draft: NoteDraft,
}

impl Default for CreateFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl CreateFlow {
    pub const SUCCESS_NOTICE: &'static str = "Note added";

    pub fn new() -> Self {
        Self {
            state: CreateState::Idle,
            draft: NoteDraft::default(),
        }
    }

    pub fn state(&self) -> CreateState {
        self.state
    }

    pub fn draft(&self) -> &NoteDraft {
        &self.draft
    }

    /// Opens the dialog with empty fields. Reopening keeps current input.
    pub fn open(&mut self) {
        if self.state == CreateState::Idle {
            self.draft = NoteDraft::default();
            self.state = CreateState::Collecting;
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), FlowError> {
        self.ensure_collecting()?;
        self.draft.title = title.into();
        Ok(())
    }

    pub fn set_content(&mut self, content: impl Into<String>) -> Result<(), FlowError> {
        self.ensure_collecting()?;
        self.draft.content = content.into();
        Ok(())
    }

    /// Validates input and inserts the note.
    ///
    /// # Errors
    /// - `Validation` when either field is blank after trimming; the flow
    ///   stays `Collecting` and nothing is written.
    /// - `Store` when the insert fails; the flow stays `Collecting`.
    pub fn confirm<R: NoteRepository>(
        &mut self,
        vm: &NoteViewModel<R>,
    ) -> Result<Note, FlowError> {
        self.ensure_collecting()?;

        if let Err(err) = self.draft.validate() {
            debug!(
                "event=create_confirm module=flow status=rejected reason={}",
                validation_reason(err)
            );
            return Err(err.into());
        }

        match vm.insert(self.draft.clone()) {
            Ok(note) => {
                info!("event=create_confirm module=flow status=ok note_id={}", note.id);
                self.draft = NoteDraft::default();
                self.state = CreateState::Idle;
                Ok(note)
            }
            Err(err) => {
                warn!("event=create_confirm module=flow status=error error={err}");
                Err(err.into())
            }
        }
    }

    /// Discards input and closes the dialog without touching the store.
    pub fn cancel(&mut self) {
        self.draft = NoteDraft::default();
        self.state = CreateState::Idle;
    }

    fn ensure_collecting(&self) -> Result<(), FlowError> {
        if self.state == CreateState::Collecting {
            Ok(())
        } else {
            Err(FlowError::NotCollecting)
        }
    }
}
