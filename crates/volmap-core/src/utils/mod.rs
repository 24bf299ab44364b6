//! Utility functions for string formatting.

pub mod format;

pub use format::{format_date, join_languages, truncate_string};
