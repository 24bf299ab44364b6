//! volmap-core - data layer for the volunteer map.
//!
//! Loads per-country volunteer records from a data directory, a static file
//! host, or the REST backend; completes missing statistics; caches the
//! results with a TTL; and sums them into global statistics.

pub mod aggregate;
pub mod api;
pub mod cache;
pub mod config;
pub mod countries;
pub mod models;
pub mod present;
pub mod source;
pub mod store;
pub mod utils;

pub use aggregate::compute_global_stats;
pub use api::{ApiClient, ApiError};
pub use cache::CountryCache;
pub use config::{Config, SourceKind};
pub use countries::Locale;
pub use present::CountryPresenter;
pub use source::{CountrySource, SourceError};
pub use store::{CountryStore, LoadFailure, Loaded};
