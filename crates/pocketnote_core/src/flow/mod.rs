//! Form flows driving the add dialog and the edit/delete screen.
//!
//! # Responsibility
//! - Collect title/content input and validate it before any write.
//! - Translate store outcomes into user-visible results.
//!
//! # Invariants
//! - A rejected form never reaches the store.
//! - Flows only talk to storage through `NoteViewModel`.

pub mod create;
pub mod edit;

use crate::model::note::NoteValidationError;
use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Error returned by flow actions.
#[derive(Debug)]
pub enum FlowError {
    /// Form input was rejected; the flow stays open.
    Validation(NoteValidationError),
    /// The store refused or failed the operation.
    Store(StoreError),
    /// The action is not allowed in the current flow state.
    NotCollecting,
}

impl FlowError {
    /// Text suitable for a toast/snackbar.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(err) => err.user_message().to_string(),
            Self::Store(StoreError::NoteNotFound(_)) => "This note no longer exists".to_string(),
            Self::Store(_) => "Notes could not be saved, please try again".to_string(),
            Self::NotCollecting => "This form is closed".to_string(),
        }
    }
}

impl Display for FlowError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::NotCollecting => write!(f, "flow is not collecting input"),
        }
    }
}

impl Error for FlowError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::NotCollecting => None,
        }
    }
}

impl From<NoteValidationError> for FlowError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for FlowError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Validation(err) => Self::Validation(err),
            other => Self::Store(other),
        }
    }
}

fn validation_reason(err: NoteValidationError) -> &'static str {
    match err {
        NoteValidationError::EmptyTitle => "empty_title",
        NoteValidationError::EmptyContent => "empty_content",
    }
}
