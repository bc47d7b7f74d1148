//! HTTP transport for the API.
//!
//! The fetcher only sees [`ApiTransport`]; production uses [`HttpTransport`]
//! over reqwest, tests swap in canned responses.

use crate::youtube::error::FetchError;
use futures::future::{BoxFuture, FutureExt};
use std::time::Duration;
use tracing::debug;

/// Raw response: status code and body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    #[allow(dead_code)] // Canned responses in tests
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues GET requests against one API endpoint family.
pub trait ApiTransport: Send + Sync {
    /// GET `{base}/{endpoint}` with the given query parameters.
    fn get<'a>(
        &'a self,
        endpoint: &'a str,
        query: &'a [(&'a str, String)],
    ) -> BoxFuture<'a, Result<ApiResponse, FetchError>>;
}

/// reqwest-backed transport.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    timeout_seconds: u64,
}

impl HttpTransport {
    /// Create a transport rooted at `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout_seconds: u64) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent(concat!("viewwatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_seconds,
        })
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }
}

impl ApiTransport for HttpTransport {
    fn get<'a>(
        &'a self,
        endpoint: &'a str,
        query: &'a [(&'a str, String)],
    ) -> BoxFuture<'a, Result<ApiResponse, FetchError>> {
        async move {
            let url = self.endpoint_url(endpoint);
            debug!("GET {}", url);

            // The query carries the API key, so errors are reported without the URL.
            let transport_error = |e: reqwest::Error| {
                let message = if e.is_timeout() {
                    format!("timed out after {}s", self.timeout_seconds)
                } else if e.is_connect() {
                    format!("cannot connect to {}", self.base_url)
                } else {
                    e.without_url().to_string()
                };
                FetchError::Transport {
                    endpoint: endpoint.to_string(),
                    message,
                }
            };

            let response = self
                .client
                .get(&url)
                .query(query)
                .send()
                .await
                .map_err(transport_error)?;

            let status = response.status().as_u16();
            let body = response.text().await.map_err(transport_error)?;

            debug!("{} answered HTTP {} ({} bytes)", endpoint, status, body.len());
            Ok(ApiResponse { status, body })
        }
        .boxed()
    }
}
