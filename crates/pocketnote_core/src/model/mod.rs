//! Domain model for notes.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`, never by its text.
//! - Deletion is a hard delete; no tombstones are kept.

pub mod note;
