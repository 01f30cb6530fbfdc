//! Utility functions shared across the crate

pub mod slug;

pub use slug::{slugify, with_suffix};
