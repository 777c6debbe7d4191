//! Core use-case facades.
//!
//! # Responsibility
//! - Mediate between presentation components and the note store.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod note_view_model;
