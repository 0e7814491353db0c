//! API client for the episode statistics REST API.
//!
//! Two fixed endpoints under a configurable base path, each answering with a
//! JSON envelope (`{"users": [...]}` / `{"statistics": [...]}`).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::models::{StatisticsItem, StatisticsResponse, User, UsersResponse};

use super::{ApiError, RemoteSource};

// ============================================================================
// Constants
// ============================================================================

/// Base path of the remote API, without trailing slash
pub const DEFAULT_BASE_URL: &str = "http://test-case.rikmasters.ru/api/episode";

/// HTTP request timeout in seconds.
/// Bounds every fetch so an unresponsive server surfaces as a transport error.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Users,
    Statistics,
}

impl Endpoint {
    /// Path relative to the base URL, trailing slash included
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Users => "users/",
            Endpoint::Statistics => "statistics/",
        }
    }
}

/// API client for the statistics service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client with the default request timeout
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve the absolute URL of an endpoint
    pub fn endpoint_url(&self, endpoint: Endpoint) -> Result<Url, ApiError> {
        let raw = format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint.path());
        let url = Url::parse(&raw).map_err(|e| ApiError::InvalidEndpoint(format!("{}: {}", raw, e)))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ApiError::InvalidEndpoint(format!(
                "{}: unsupported scheme '{}'",
                raw, other
            ))),
        }
    }

    /// Single GET, decoded as `T`. Dropping the returned future aborts the request.
    async fn get<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T, ApiError> {
        let url = self.endpoint_url(endpoint)?;
        debug!(url = %url, "Sending GET request");

        let response = self
            .client
            .get(url.clone())
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                url = %url,
                status = status.as_u16(),
                body = %ApiError::truncate_body(&body),
                "Request failed"
            );
            return Err(ApiError::ServerStatus(status.as_u16()));
        }

        let body = response.bytes().await?;
        if body.is_empty() {
            return Err(ApiError::EmptyResponseBody);
        }

        let decoded = serde_json::from_slice(&body)?;
        debug!(url = %url, bytes = body.len(), "Response decoded");
        Ok(decoded)
    }
}

#[async_trait]
impl RemoteSource for ApiClient {
    async fn fetch_users(&self) -> Result<Vec<User>, ApiError> {
        let response: UsersResponse = self.get(Endpoint::Users).await?;
        Ok(response.users)
    }

    async fn fetch_statistics(&self) -> Result<Vec<StatisticsItem>, ApiError> {
        let response: StatisticsResponse = self.get(Endpoint::Statistics).await?;
        Ok(response.statistics)
    }
}
