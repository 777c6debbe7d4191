//! Flutter-facing bindings for PocketNote core.

pub mod api;
