//! API client for the volunteer backend.
//!
//! This module provides the `ApiClient` struct for the volunteer CRUD
//! endpoints, the region list, and the summary statistics.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::ApiError;
use crate::models::{
    ApiVolunteer, Envelope, Pagination, RawCountryRecord, RawStats, Role, SummaryStats,
    VolunteerFilter,
};
use crate::source::{CountrySource, SourceError};

// ============================================================================
// Constants
// ============================================================================

/// Base URL used when nothing is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api/v1";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Page size used when reading a whole region
const REGION_PAGE_LIMIT: u32 = 100;

/// One page of `GET /volunteers`
#[derive(Debug, Clone, Default)]
pub struct VolunteerPage {
    pub volunteers: Vec<ApiVolunteer>,
    pub pagination: Option<Pagination>,
}

/// API client for the volunteer backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    initial_backoff: Duration,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            initial_backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
        })
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token),
            initial_backoff: self.initial_backoff,
        }
    }

    /// First delay after a 429; doubles on each further retry
    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match self.token {
            Some(ref token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(response: Response) -> Result<Option<Response>, ApiError> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Send a request, backing off and retrying while rate limited.
    /// `build` is called once per attempt.
    async fn send(&self, url: &str, build: impl Fn() -> RequestBuilder) -> Result<Response, ApiError> {
        let mut retries = 0;
        let mut backoff = self.initial_backoff;

        loop {
            let response = build().send().await?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => return Ok(response),
                None => {
                    // Rate limited
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited);
                    }
                    warn!(url = url, retry = retries, backoff_ms = backoff.as_millis() as u64, "Rate limited, backing off");
                    tokio::time::sleep(backoff).await;
                    backoff *= 2; // Exponential backoff
                }
            }
        }
    }

    /// Decode the `{ success, data, message }` envelope
    async fn envelope<T: DeserializeOwned>(response: Response, url: &str) -> Result<Envelope<T>, ApiError> {
        let text = response.text().await?;
        let envelope: Envelope<T> = serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse JSON response from {}: {}", url, e)))?;
        if !envelope.success {
            return Err(ApiError::Rejected(envelope.failure_reason()));
        }
        Ok(envelope)
    }

    async fn call<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let response = self
            .send(&url, || {
                let builder = self.request(method.clone(), &url);
                match body {
                    Some(body) => builder.json(body),
                    None => builder,
                }
            })
            .await?;
        Self::envelope::<T>(response, &url)
            .await?
            .data
            .ok_or_else(|| ApiError::InvalidResponse(format!("Missing data in response from {}", url)))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.call::<T, ()>(Method::GET, path, None).await
    }

    // ===== Volunteers =====

    /// List volunteers matching a filter
    pub async fn list_volunteers(&self, filter: &VolunteerFilter) -> Result<VolunteerPage, ApiError> {
        let url = self.url("volunteers");
        let response = self
            .send(&url, || self.request(Method::GET, &url).query(filter))
            .await?;

        let envelope = Self::envelope::<Vec<ApiVolunteer>>(response, &url).await?;
        debug!(url = %url, count = envelope.data.as_ref().map_or(0, Vec::len), "Listed volunteers");
        Ok(VolunteerPage {
            volunteers: envelope.data.unwrap_or_default(),
            pagination: envelope.pagination,
        })
    }

    /// Fetch a single volunteer by backend id
    pub async fn get_volunteer(&self, id: &str) -> Result<ApiVolunteer, ApiError> {
        self.get(&format!("volunteers/{}", id)).await
    }

    pub async fn create_volunteer(&self, volunteer: &ApiVolunteer) -> Result<ApiVolunteer, ApiError> {
        self.call(Method::POST, "volunteers", Some(volunteer)).await
    }

    /// Partial update; only the fields present in `changes` are set
    pub async fn update_volunteer(&self, id: &str, changes: &serde_json::Value) -> Result<ApiVolunteer, ApiError> {
        self.call(Method::PUT, &format!("volunteers/{}", id), Some(changes)).await
    }

    pub async fn delete_volunteer(&self, id: &str) -> Result<(), ApiError> {
        let url = self.url(&format!("volunteers/{}", id));
        let response = self.send(&url, || self.request(Method::DELETE, &url)).await?;
        Self::envelope::<serde_json::Value>(response, &url).await?;
        Ok(())
    }

    /// Backend-defined per-volunteer statistics
    pub async fn volunteer_stats(&self) -> Result<serde_json::Value, ApiError> {
        self.get("volunteers/stats").await
    }

    // ===== Regions & Stats =====

    /// Distinct region ids known to the backend
    pub async fn regions(&self) -> Result<Vec<String>, ApiError> {
        self.get("regions").await
    }

    pub async fn summary(&self) -> Result<SummaryStats, ApiError> {
        self.get("stats/summary").await
    }

    /// Read every volunteer of one region, following pagination
    pub async fn fetch_region(&self, region: &str) -> Result<Vec<ApiVolunteer>, ApiError> {
        let mut all = Vec::new();
        let mut page = 1;
        loop {
            let filter = VolunteerFilter {
                region: Some(region.to_string()),
                page: Some(page),
                limit: Some(REGION_PAGE_LIMIT),
                ..VolunteerFilter::default()
            };
            let result = self.list_volunteers(&filter).await?;
            let received = result.volunteers.len();
            all.extend(result.volunteers);

            let more = match result.pagination {
                Some(p) => page < p.pages,
                None => false,
            };
            if !more || received == 0 {
                break;
            }
            page += 1;
        }
        Ok(all)
    }
}

#[async_trait]
impl CountrySource for ApiClient {
    async fn fetch(&self, code: &str) -> Result<RawCountryRecord, SourceError> {
        let remote = self.fetch_region(code).await?;
        if remote.is_empty() {
            return Err(SourceError::NotFound(format!("region {}", code)));
        }

        let volunteers: Vec<_> = remote.iter().map(ApiVolunteer::to_volunteer).collect();
        let count_role = |role: Role| volunteers.iter().filter(|v| v.role == role).count() as u32;
        let stats = RawStats {
            total: Some(volunteers.len() as u32),
            active: Some(volunteers.iter().filter(|v| v.status.is_active()).count() as u32),
            translators: Some(count_role(Role::Translator)),
            reviewers: Some(count_role(Role::Reviewer)),
            coordinators: Some(count_role(Role::Coordinator)),
            languages: None,
        };

        Ok(RawCountryRecord {
            country_code: Some(code.to_string()),
            country_name: None,
            last_updated: None,
            stats: Some(stats),
            volunteers,
        })
    }

    fn describe(&self) -> String {
        format!("volunteer API at {}", self.base_url)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Status;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_summary_unwraps_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stats/summary"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "data": {"totalVolunteers": 12, "activeVolunteers": 9, "totalServiceHours": 40.5}
            })))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).unwrap();
        let summary = client.summary().await.unwrap();
        assert_eq!(summary.total_volunteers, 12);
        assert_eq!(summary.active_volunteers, 9);
        assert_eq!(summary.inactive_volunteers, 0);
    }

    fn regions_ok() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "data": ["CN"]
        }))
    }

    #[tokio::test]
    async fn test_rate_limited_then_ok_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/regions"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/regions"))
            .respond_with(regions_ok())
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri())
            .unwrap()
            .with_initial_backoff(Duration::from_millis(5));
        assert_eq!(client.regions().await.unwrap(), vec!["CN"]);
    }

    #[tokio::test]
    async fn test_rate_limit_gives_up_after_max_retries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/regions"))
            .respond_with(ResponseTemplate::new(429))
            .expect(u64::from(MAX_RATE_LIMIT_RETRIES) + 1)
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri())
            .unwrap()
            .with_initial_backoff(Duration::from_millis(1));
        let err = client.regions().await.unwrap_err();
        assert!(matches!(err, ApiError::RateLimited));
        server.verify().await;
    }

    #[test]
    fn test_default_backoff_and_token_keep_settings() {
        let client = ApiClient::new(DEFAULT_BASE_URL).unwrap();
        assert_eq!(client.initial_backoff, Duration::from_millis(INITIAL_BACKOFF_MS));

        let client = client
            .with_initial_backoff(Duration::from_millis(7))
            .with_token("t".to_string());
        assert_eq!(client.initial_backoff, Duration::from_millis(7));
    }

    #[tokio::test]
    async fn test_unsuccessful_envelope_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/regions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": false,
                "message": "database offline"
            })))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).unwrap();
        let err = client.regions().await.unwrap_err();
        assert!(matches!(err, ApiError::Rejected(ref m) if m == "database offline"));
    }

    #[tokio::test]
    async fn test_get_volunteer_404() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/volunteers/VM-0001"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "success": false,
                "error": "Volunteer not found"
            })))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).unwrap();
        let err = client.get_volunteer("VM-0001").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_country_source_reads_region() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/volunteers"))
            .and(query_param("region", "CN"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "data": [
                    {"id": "VM-0001", "chineseName": "李明", "status": "active", "services": ["translation"]},
                    {"id": "VM-0002", "chineseName": "张伟", "status": "inactive", "services": ["management"]}
                ],
                "pagination": {"page": 1, "limit": 100, "total": 2, "pages": 1}
            })))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).unwrap();
        let raw = client.fetch("CN").await.unwrap();
        let stats = raw.stats.unwrap();
        assert_eq!(stats.total, Some(2));
        assert_eq!(stats.active, Some(1));
        assert_eq!(stats.translators, Some(1));
        assert_eq!(stats.coordinators, Some(1));
        assert_eq!(raw.volunteers[1].status, Status::Inactive);
    }

    #[tokio::test]
    async fn test_country_source_empty_region_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/volunteers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "data": []
            })))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).unwrap();
        let err = client.fetch("ZZ").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_bearer_token_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/regions"))
            .and(wiremock::matchers::header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "data": ["CN", "US"]
            })))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).unwrap().with_token("secret".to_string());
        assert_eq!(client.regions().await.unwrap(), vec!["CN", "US"]);
    }
}
