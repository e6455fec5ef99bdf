//! Authenticated request executor
//!
//! Single path for every outbound API call: attach the bearer token, send,
//! decode the `{ "data": ... }` envelope. A failed fetch clears the shared
//! credential state before the error is returned; a body that fails to
//! parse does not.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use salla_auth::CredentialState;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::errors::ApiError;
use crate::transport::{ApiRequest, HttpTransport, TransportError};

/// Executes bearer-authenticated JSON requests
#[derive(Clone)]
pub struct RequestExecutor {
    transport: Arc<dyn HttpTransport>,
    credentials: Arc<CredentialState>,
}

impl RequestExecutor {
    /// Create an executor sharing `credentials` with the token manager
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>, credentials: Arc<CredentialState>) -> Self {
        Self { transport, credentials }
    }

    /// Shared credential state
    #[must_use]
    pub fn credentials(&self) -> &Arc<CredentialState> {
        &self.credentials
    }

    /// Token a call will carry: the override if non-empty, else the current
    /// access token, else the empty string
    #[must_use]
    pub fn resolve_token(&self, token: Option<&str>) -> String {
        match token {
            Some(token) if !token.is_empty() => token.to_string(),
            _ => self.credentials.access_token().unwrap_or_default(),
        }
    }

    /// Send one request and return the `data` field of the response
    ///
    /// # Errors
    /// - [`ApiError::FetchFailed`] on network failure or non-2xx status,
    ///   after the credential state has been reset
    /// - [`ApiError::ParseFailed`] if the body is not JSON
    #[instrument(skip_all, fields(%method, %url))]
    pub async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<Value, ApiError> {
        let request = self.build_request(method, url, body, token)?;

        debug!(has_body = request.body.is_some(), "Sending API request");

        let text = match self.transport.send(request).await {
            Ok(text) => text,
            Err(source) => return Err(self.fetch_failed(source)),
        };

        let json: Value = serde_json::from_str(&text).map_err(|source| ApiError::ParseFailed {
            message: "Failed to parse response body as JSON".to_string(),
            source,
        })?;

        Ok(match json {
            Value::Object(mut map) => map.remove("data").unwrap_or(Value::Null),
            _ => Value::Null,
        })
    }

    fn build_request(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<ApiRequest, ApiError> {
        let bearer = format!("Bearer {}", self.resolve_token(token));
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&bearer)
                .map_err(|e| ApiError::Config(format!("Invalid bearer token: {e}")))?,
        );

        let body = match body {
            Some(body) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
                Some(serde_json::to_string(body).map_err(ApiError::InvalidBody)?)
            }
            None => None,
        };

        Ok(ApiRequest { method, url: url.to_string(), headers, body })
    }

    fn fetch_failed(&self, source: TransportError) -> ApiError {
        warn!(error = %source, "API request failed; resetting credentials");
        self.credentials.reset();
        ApiError::FetchFailed { message: "Failed to fetch data".to_string(), source }
    }
}
