//! HTTP transport seam
//!
//! The executor hands a fully-built [`ApiRequest`] to an [`HttpTransport`]
//! and gets back the raw body of a 2xx response. Anything else (connection
//! failure, timeout, non-2xx status) is a [`TransportError`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method};
use thiserror::Error;
use tracing::debug;

/// Transport-level failure
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, TLS, timeout or body-read failure
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Remote answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

impl TransportError {
    /// HTTP status, when the remote answered at all
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request(err) => err.status().map(|s| s.as_u16()),
            Self::Status { status, .. } => Some(*status),
        }
    }
}

/// Outbound request as built by the executor
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    /// JSON-encoded body; `None` for GET-style calls
    pub body: Option<String>,
}

/// Sends requests and returns the body of successful responses
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send `request`
    ///
    /// # Errors
    /// Returns [`TransportError`] on network failure or non-2xx status
    async fn send(&self, request: ApiRequest) -> Result<String, TransportError>;
}

/// [`HttpTransport`] backed by a reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport whose requests time out after `timeout`
    ///
    /// # Errors
    /// Returns error if the TLS backend cannot be initialised
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Wrap an existing reqwest client (shared connection pool)
    #[must_use]
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<String, TransportError> {
        let method = request.method.clone();
        let mut builder =
            self.client.request(request.method, &request.url).headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        debug!(%method, url = %request.url, %status, "received HTTP response");

        let body = response.text().await?;
        if !status.is_success() {
            return Err(TransportError::Status { status: status.as_u16(), body });
        }

        Ok(body)
    }
}
