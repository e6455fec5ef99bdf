//! Mock implementations of the OAuth seam
//!
//! Enabled for this crate's own tests and, through the `test-utils` feature,
//! for downstream crates.

// Mutex poisoning is acceptable in test mocks: a panicking test fails anyway.
#![allow(clippy::missing_panics_doc)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use crate::client::OAuthClientError;
use crate::traits::OAuthClientTrait;
use crate::types::{Principal, TokenSet};

/// Mock OAuth client for testing
///
/// Code exchange yields `mock_access_token` / `mock_refresh_token`, the
/// profile lookup yields a principal named `Mock Store`, and refresh yields
/// `refreshed_access_token` / `refreshed_refresh_token` unless a response or
/// failure is configured.
#[derive(Debug, Clone)]
pub struct MockOAuthClient {
    refresh_called: Arc<Mutex<bool>>,
    last_refresh_token: Arc<Mutex<Option<String>>>,
    refresh_token_response: Arc<Mutex<Option<TokenSet>>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockOAuthClient {
    /// Create a new mock OAuth client with default state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            refresh_called: Arc::new(Mutex::new(false)),
            last_refresh_token: Arc::new(Mutex::new(None)),
            refresh_token_response: Arc::new(Mutex::new(None)),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    /// Configure the response returned by `refresh_access_token`.
    pub fn set_refresh_response(&self, tokens: TokenSet) {
        *self.refresh_token_response.lock().unwrap() = Some(tokens);
    }

    /// Force the refresh call to fail.
    pub fn set_should_fail(&self, should_fail: bool) {
        *self.should_fail.lock().unwrap() = should_fail;
    }

    /// Check whether refresh was called.
    #[must_use]
    pub fn was_refresh_called(&self) -> bool {
        *self.refresh_called.lock().unwrap()
    }

    /// Refresh token passed to the most recent refresh call.
    #[must_use]
    pub fn last_refresh_token(&self) -> Option<String> {
        self.last_refresh_token.lock().unwrap().clone()
    }
}

impl Default for MockOAuthClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OAuthClientTrait for MockOAuthClient {
    fn authorization_url(&self, state: &str) -> String {
        format!("https://mock.salla.sa/oauth2/auth?client_id=test&state={state}")
    }

    async fn exchange_code_for_tokens(&self, _code: &str) -> Result<TokenSet, OAuthClientError> {
        Ok(TokenSet::new(
            "mock_access_token".to_string(),
            Some("mock_refresh_token".to_string()),
            Some(3600),
            Some("offline_access".to_string()),
        ))
    }

    async fn fetch_user_profile(
        &self,
        _access_token: &str,
    ) -> Result<Principal, OAuthClientError> {
        Ok(Principal::from_user_info(&json!({
            "id": 1,
            "name": "Mock Store",
            "merchant": { "id": 2, "name": "Mock Merchant" }
        })))
    }

    async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenSet, OAuthClientError> {
        *self.refresh_called.lock().unwrap() = true;
        *self.last_refresh_token.lock().unwrap() = Some(refresh_token.to_string());

        if *self.should_fail.lock().unwrap() {
            return Err(OAuthClientError::NoRefreshToken);
        }

        let response = self.refresh_token_response.lock().unwrap();
        Ok(response.clone().unwrap_or_else(|| {
            TokenSet::new(
                "refreshed_access_token".to_string(),
                Some("refreshed_refresh_token".to_string()),
                Some(3600),
                None,
            )
        }))
    }

    fn redirect_uri(&self) -> &str {
        "http://localhost:8081/oauth/callback"
    }
}
