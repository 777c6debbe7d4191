//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the note data access contract.
//! - Isolate SQLite query details from store/view-model orchestration.
//!
//! # Invariants
//! - Repository writes enforce `Note::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod note_repo;
