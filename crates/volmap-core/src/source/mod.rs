//! Where raw country records come from.
//!
//! A deployment reads per-country JSON from exactly one place:
//!
//! - `DirSource`: a local `data/volunteers/countries` directory
//! - `HttpSource`: the same files served over HTTP
//! - `ApiClient`: the REST backend, one region query per country
//!
//! Absence of a record is reported as `SourceError::NotFound`, which the
//! store treats as "no data yet" rather than a failure.

pub mod dir;
pub mod http;

pub use dir::DirSource;
pub use http::HttpSource;

use async_trait::async_trait;
use thiserror::Error;

use crate::api::ApiError;
use crate::models::{CountryRecord, RawCountryRecord};

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("No data for {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed country record: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Api(ApiError),

    #[error("Not a country code: {0:?}")]
    InvalidCode(String),

    #[error("{0} is read-only")]
    ReadOnly(String),
}

impl From<ApiError> for SourceError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::NotFound(what) => SourceError::NotFound(what),
            other => SourceError::Api(other),
        }
    }
}

impl SourceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, SourceError::NotFound(_))
    }
}

#[async_trait]
pub trait CountrySource: Send + Sync {
    /// Fetch the raw record for an upper-case country code
    async fn fetch(&self, code: &str) -> Result<RawCountryRecord, SourceError>;

    /// Write a record back. Sources are read-only unless they say otherwise.
    async fn store(&self, _record: &CountryRecord) -> Result<(), SourceError> {
        Err(SourceError::ReadOnly(self.describe()))
    }

    /// Short description for logs and error messages
    fn describe(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_not_found_becomes_source_not_found() {
        let err: SourceError = ApiError::NotFound("CN".to_string()).into();
        assert!(err.is_not_found());

        let err: SourceError = ApiError::RateLimited.into();
        assert!(!err.is_not_found());
    }
}
