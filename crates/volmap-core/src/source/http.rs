use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{CountrySource, SourceError};
use crate::api::ApiError;
use crate::models::RawCountryRecord;

/// HTTP request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Fetches `{base_url}/{CODE}.json` from a static file host.
/// Clone is cheap - reqwest::Client uses Arc internally.
#[derive(Clone)]
pub struct HttpSource {
    client: Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: &str) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Share an existing connection pool
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn record_url(&self, code: &str) -> String {
        format!("{}/{}.json", self.base_url, code)
    }
}

#[async_trait]
impl CountrySource for HttpSource {
    async fn fetch(&self, code: &str) -> Result<RawCountryRecord, SourceError> {
        let url = self.record_url(code);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body).into());
        }

        let text = response.text().await?;
        debug!(url = %url, bytes = text.len(), "Fetched country file");
        Ok(serde_json::from_str(&text)?)
    }

    fn describe(&self) -> String {
        format!("static files at {}", self.base_url)
    }
}
