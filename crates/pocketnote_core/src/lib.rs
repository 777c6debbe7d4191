//! Core domain logic for PocketNote.
//! This crate is the single source of truth for note invariants.

pub mod db;
pub mod flow;
pub mod logging;
pub mod model;
pub mod presenter;
pub mod repo;
pub mod service;
pub mod store;

pub use flow::create::{CreateFlow, CreateState};
pub use flow::edit::{DeleteOutcome, EditFlow};
pub use flow::FlowError;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::note::{Note, NoteDraft, NoteId, NoteValidationError};
pub use presenter::list::{ListChange, NoteListPresenter, NoteRow, NoteSelection};
pub use repo::note_repo::{NoteRepository, RepoError, RepoResult, SqliteNoteRepository};
pub use service::note_view_model::NoteViewModel;
pub use store::live::{LiveNotes, NoteSnapshot};
pub use store::{NoteStore, StoreError, StoreResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
