//! Catalog search gateway.
//!
//! The reqwest adapter owns transport details only: building the query
//! string, HTTP status mapping and decoding the body into domain records.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use shared::{
    domain::{ResultSet, SearchQuery},
    error::ErrorInfo,
    protocol::SearchResponseDto,
};
use tracing::{debug, warn};

const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(500);
const MAX_ERROR_BODY_CHARS: usize = 200;

#[async_trait]
pub trait FetchGateway: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<ResultSet, ErrorInfo>;
}

/// Bounded retry for unreachable endpoints. Other failures are never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_backoff: Duration) -> Self {
        Self {
            max_retries,
            initial_backoff,
        }
    }

    /// Delay before retry number `attempt` (zero based); doubles each time.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.initial_backoff.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(0, DEFAULT_RETRY_BACKOFF)
    }
}

pub struct HttpFetchGateway {
    http: Client,
    retry: RetryPolicy,
}

impl HttpFetchGateway {
    /// Single attempt, no request timeout.
    pub fn new() -> Self {
        Self {
            http: Client::new(),
            retry: RetryPolicy::default(),
        }
    }

    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_options(
        retry: RetryPolicy,
        timeout: Option<Duration>,
    ) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            retry,
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    async fn search_once(&self, query: &SearchQuery) -> Result<ResultSet, ErrorInfo> {
        let response = self
            .http
            .get(query.request_url())
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            // The status alone decides the error; the body only enriches the message.
            let body = response.text().await.unwrap_or_default();
            return Err(map_status_error(status, &body));
        }

        let body = response.bytes().await.map_err(map_transport_error)?;
        debug!(bytes = body.len(), "decoding catalog search response");
        SearchResponseDto::from_slice(&body)?.into_result_set()
    }
}

impl Default for HttpFetchGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FetchGateway for HttpFetchGateway {
    async fn search(&self, query: &SearchQuery) -> Result<ResultSet, ErrorInfo> {
        let mut attempt = 0;
        loop {
            match self.search_once(query).await {
                Err(err) if err.is_retryable() && attempt < self.retry.max_retries => {
                    let delay = self.retry.backoff_for(attempt);
                    attempt += 1;
                    warn!(
                        attempt,
                        max_retries = self.retry.max_retries,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "catalog unreachable; retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                outcome => return outcome,
            }
        }
    }
}

// The request URL carries the API key, so it is stripped from transport errors.
fn map_transport_error(err: reqwest::Error) -> ErrorInfo {
    let kind = if err.is_timeout() {
        "request timed out"
    } else if err.is_connect() {
        "failed to connect"
    } else {
        "transport failure"
    };
    ErrorInfo::unreachable(format!("{kind}: {}", err.without_url()))
}

fn map_status_error(status: StatusCode, body: &str) -> ErrorInfo {
    let snippet: String = body.trim().chars().take(MAX_ERROR_BODY_CHARS).collect();
    let message = if snippet.is_empty() {
        format!("catalog returned {status}")
    } else {
        format!("catalog returned {status}: {snippet}")
    };
    ErrorInfo::http(status.as_u16(), message)
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
