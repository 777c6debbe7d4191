//! Note domain model.
//!
//! # Responsibility
//! - Define the persisted note record and the form-level draft shape.
//! - Own the non-blank title/content rule shared by every write path.
//!
//! # Invariants
//! - `id` is generated once at creation and never reused.
//! - A note accepted by storage has non-blank `title` and `content`.
//! - Validation trims for the emptiness check only; stored text is kept raw.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier assigned to a note at insert time.
pub type NoteId = Uuid;

/// Validation failures for title/content input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteValidationError {
    /// Title is empty after trimming whitespace.
    EmptyTitle,
    /// Content is empty after trimming whitespace.
    EmptyContent,
}

impl NoteValidationError {
    /// Message shown to the user when a form is rejected.
    pub fn user_message(&self) -> &'static str {
        "Title and content cannot be empty"
    }
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "note title cannot be empty"),
            Self::EmptyContent => write!(f, "note content cannot be empty"),
        }
    }
}

impl Error for NoteValidationError {}

/// Title/content pair collected by a form before an id exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Checks both fields, title first.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        validate_fields(&self.title, &self.content)
    }
}

/// Persisted note record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Stable id used by update/delete; never matched by text.
    pub id: NoteId,
    pub title: String,
    pub content: String,
    /// Epoch milliseconds, set by storage on insert.
    pub created_at: i64,
    /// Epoch milliseconds, refreshed by storage on every update.
    pub updated_at: i64,
}

impl Note {
    /// Creates a not-yet-persisted note with a generated id.
    ///
    /// Timestamps stay `0` until storage assigns them.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), title, content)
    }

    /// Creates a note with a caller-provided id.
    pub fn with_id(id: NoteId, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
            created_at: 0,
            updated_at: 0,
        }
    }

    /// Builds a fresh note from a form draft.
    pub fn from_draft(draft: NoteDraft) -> Self {
        Self::new(draft.title, draft.content)
    }

    pub fn validate(&self) -> Result<(), NoteValidationError> {
        validate_fields(&self.title, &self.content)
    }

    /// Returns the editable part of this note.
    pub fn to_draft(&self) -> NoteDraft {
        NoteDraft::new(self.title.clone(), self.content.clone())
    }
}

fn validate_fields(title: &str, content: &str) -> Result<(), NoteValidationError> {
    if title.trim().is_empty() {
        return Err(NoteValidationError::EmptyTitle);
    }
    if content.trim().is_empty() {
        return Err(NoteValidationError::EmptyContent);
    }
    Ok(())
}
