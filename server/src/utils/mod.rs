//! Utility module - small shared helpers

pub mod slug;

pub use slug::slugify;
