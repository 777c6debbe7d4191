//! Presentation-side state that list surfaces render from.

pub mod list;
