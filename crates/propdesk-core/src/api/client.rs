//! HTTP client for the site's collection endpoints.
//!
//! `HttpResourceClient` serves every record type: the endpoint path comes
//! from the record's `ResourceKind`, so one client (and one connection
//! pool) backs all four collection stores.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::{Resource, ResourceKind};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Confirmation payload returned by a successful delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DeleteReceipt {
    #[serde(default)]
    pub message: Option<String>,
}

/// List/create/update/delete against one remote collection.
///
/// The collection stores are generic over this trait so tests can swap in
/// an in-memory fake.
pub trait ResourceClient<R: Resource>: Send + Sync {
    /// Fetch the whole collection in the remote store's sort order.
    fn list(&self) -> impl Future<Output = Result<Vec<R>, ApiError>> + Send;

    /// Create a record; the returned record carries the assigned id.
    fn create(&self, record: &R) -> impl Future<Output = Result<R, ApiError>> + Send;

    /// Replace a record by id; the returned record is the stored version.
    fn update(&self, record: &R) -> impl Future<Output = Result<R, ApiError>> + Send;

    fn delete(&self, id: &str) -> impl Future<Output = Result<DeleteReceipt, ApiError>> + Send;
}

/// Client for the site's collection endpoints.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpResourceClient {
    client: Client,
    base_url: String,
}

impl HttpResourceClient {
    /// Create a client rooted at the site's base URL (e.g. `https://example.com`)
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, kind: ResourceKind) -> String {
        format!("{}{}", self.base_url, kind.endpoint())
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

    /// Send a request, rebuilding and retrying it while the server rate limits.
    async fn send<F>(&self, url: &str, build: F) -> Result<Response, ApiError>
    where
        F: Fn() -> RequestBuilder + Send + Sync,
    {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = build().send().await?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => return Ok(response),
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited);
                    }
                    warn!(url = url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2; // Exponential backoff
                }
            }
        }
    }

    async fn read_json<T: DeserializeOwned>(response: Response, url: &str) -> Result<T, ApiError> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse JSON response from {}: {}", url, e))
        })
    }
}

impl<R: Resource> ResourceClient<R> for HttpResourceClient {
    async fn list(&self) -> Result<Vec<R>, ApiError> {
        let url = self.url_for(R::KIND);
        debug!(url = %url, "Fetching collection");

        let response = self.send(&url, || self.client.get(&url)).await?;
        let body: Value = Self::read_json(response, &url).await?;
        Ok(parse_list(body))
    }

    async fn create(&self, record: &R) -> Result<R, ApiError> {
        let url = self.url_for(R::KIND);
        let mut body = record.clone();
        body.set_id(None);

        let response = self.send(&url, || self.client.post(&url).json(&body)).await?;
        Self::read_json(response, &url).await
    }

    async fn update(&self, record: &R) -> Result<R, ApiError> {
        if record.id().is_none() {
            return Err(ApiError::MissingId);
        }
        let url = self.url_for(R::KIND);

        let response = self.send(&url, || self.client.put(&url).json(record)).await?;
        Self::read_json(response, &url).await
    }

    async fn delete(&self, id: &str) -> Result<DeleteReceipt, ApiError> {
        let url = self.url_for(R::KIND);

        let response = self
            .send(&url, || self.client.delete(&url).query(&[("id", id)]))
            .await?;
        let text = response.text().await?;
        // The confirmation body is informational only
        Ok(serde_json::from_str(&text).unwrap_or_default())
    }
}

/// Interpret a list response body. Anything other than a JSON array of
/// records is treated as an empty collection.
pub fn parse_list<R: Resource>(body: Value) -> Vec<R> {
    if !body.is_array() {
        warn!(kind = %R::KIND, "List response is not an array, treating as empty");
        return Vec::new();
    }
    match serde_json::from_value(body) {
        Ok(records) => records,
        Err(e) => {
            warn!(kind = %R::KIND, error = %e, "List response has malformed records, treating as empty");
            Vec::new()
        }
    }
}
