//! OAuth 2.0 client for the Salla accounts server
//!
//! Handles the confidential-client authorization-code flow:
//! - Browser authorization URL building
//! - Authorization code exchange
//! - Resource-owner (user-info) lookup
//! - Token refresh

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::traits::OAuthClientTrait;
use super::types::{OAuthConfig, OAuthError, Principal, TokenResponse, TokenSet};

/// Error type for OAuth client operations
#[derive(Debug, Error)]
pub enum OAuthClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// OAuth server returned an error document
    #[error("OAuth error: {0}")]
    OAuthError(OAuthError),

    /// OAuth server returned a non-success status without an error document
    #[error("Unexpected HTTP status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// State parameter mismatch (CSRF attack detected)
    #[error("State mismatch (CSRF): no pending login matches the callback state")]
    StateMismatch,

    /// Failed to parse response
    #[error("Parse error: {0}")]
    ParseError(String),

    /// No refresh token available
    #[error("No refresh token available")]
    NoRefreshToken,

    /// No client registered under the requested provider name
    #[error("No OAuth strategy registered for provider '{0}'")]
    UnknownProvider(String),
}

/// OAuth 2.0 client for Salla
#[derive(Debug, Clone)]
pub struct OAuthClient {
    config: OAuthConfig,
    client: Client,
}

impl OAuthClient {
    /// Create a new OAuth client with the given configuration
    ///
    /// # Examples
    /// ```
    /// use salla_auth::{OAuthClient, OAuthConfig};
    ///
    /// let config = OAuthConfig::salla(
    ///     "client_id".to_string(),
    ///     "client_secret".to_string(),
    ///     "http://localhost:8081/oauth/callback".to_string(),
    /// );
    /// let client = OAuthClient::new(config);
    /// assert_eq!(client.redirect_uri(), "http://localhost:8081/oauth/callback");
    /// ```
    #[must_use]
    pub fn new(config: OAuthConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { config, client }
    }

    /// Generate authorization URL for browser-based login
    ///
    /// The merchant is redirected to `callback_url` with `code` and `state`
    /// query parameters after granting access.
    #[must_use]
    pub fn authorization_url(&self, state: &str) -> String {
        let mut params = vec![
            ("response_type", "code".to_string()),
            ("client_id", self.config.client_id.clone()),
            ("redirect_uri", self.config.callback_url.clone()),
            ("state", state.to_string()),
        ];

        if !self.config.scopes.is_empty() {
            params.push(("scope", self.config.scope_string()));
        }

        let query_string = params
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        format!("{}?{}", self.config.authorization_url(), query_string)
    }

    /// Exchange authorization code for tokens
    ///
    /// # Errors
    /// Returns error if the token endpoint rejects the code or the response
    /// cannot be parsed
    pub async fn exchange_code_for_tokens(&self, code: &str) -> Result<TokenSet, OAuthClientError> {
        let request_body = [
            ("grant_type", "authorization_code"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", self.config.callback_url.as_str()),
        ];

        debug!("Exchanging authorization code for tokens");

        let response =
            self.client.post(self.config.token_url()).form(&request_body).send().await?;

        Self::parse_token_response(response).await
    }

    /// Fetch the resource owner of `access_token` from the user-info endpoint
    ///
    /// # Errors
    /// Returns error if the request fails or the body is not a `{ data }`
    /// envelope
    pub async fn fetch_user_profile(
        &self,
        access_token: &str,
    ) -> Result<Principal, OAuthClientError> {
        let response = self
            .client
            .get(self.config.user_info_url())
            .bearer_auth(access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;

        let body: Value =
            response.json().await.map_err(|e| OAuthClientError::ParseError(e.to_string()))?;
        let data = body.get("data").ok_or_else(|| {
            OAuthClientError::ParseError("user info response has no `data` field".to_string())
        })?;

        Ok(Principal::from_user_info(data))
    }

    /// Refresh access token using refresh token
    ///
    /// # Errors
    /// Returns error if no refresh token is provided, the refresh is
    /// rejected, or the response cannot be parsed
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenSet, OAuthClientError> {
        if refresh_token.is_empty() {
            return Err(OAuthClientError::NoRefreshToken);
        }

        let params = [
            ("grant_type", "refresh_token"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("refresh_token", refresh_token),
        ];

        debug!("Refreshing access token");

        let response = self.client.post(self.config.token_url()).form(&params).send().await?;

        Self::parse_token_response(response).await
    }

    /// Get the configured redirect URI
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.config.callback_url
    }

    async fn parse_token_response(response: Response) -> Result<TokenSet, OAuthClientError> {
        let response = Self::ensure_success(response).await?;

        let token_response: TokenResponse =
            response.json().await.map_err(|e| OAuthClientError::ParseError(e.to_string()))?;

        Ok(token_response.into())
    }

    async fn ensure_success(response: Response) -> Result<Response, OAuthClientError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        match serde_json::from_str::<OAuthError>(&body) {
            Ok(error) => Err(OAuthClientError::OAuthError(error)),
            Err(_) => Err(OAuthClientError::UnexpectedStatus { status, body }),
        }
    }
}

#[async_trait]
impl OAuthClientTrait for OAuthClient {
    fn authorization_url(&self, state: &str) -> String {
        self.authorization_url(state)
    }

    async fn exchange_code_for_tokens(&self, code: &str) -> Result<TokenSet, OAuthClientError> {
        self.exchange_code_for_tokens(code).await
    }

    async fn fetch_user_profile(
        &self,
        access_token: &str,
    ) -> Result<Principal, OAuthClientError> {
        self.fetch_user_profile(access_token).await
    }

    async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenSet, OAuthClientError> {
        self.refresh_access_token(refresh_token).await
    }

    fn redirect_uri(&self) -> &str {
        self.redirect_uri()
    }
}
