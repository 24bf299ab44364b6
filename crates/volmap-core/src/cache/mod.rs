//! In-memory caching of country records.
//!
//! This module provides the `CountryCache`, a read-through cache in front of
//! the `CountryStore`. Entries live for a fixed TTL (5 minutes by default),
//! are checked lazily on read, and are always replaced wholesale.

pub mod country;
pub mod entry;

pub use country::{CountryCache, DEFAULT_TTL};
pub use entry::CacheEntry;
