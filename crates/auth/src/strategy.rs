//! Authorization strategy adapter and provider-keyed refresh registry
//!
//! The adapter wraps an [`OAuthClientTrait`] implementation and turns one
//! completed authorization-code callback into a token set plus the
//! principal that owns it. The registry resolves refresh requests by
//! provider name, so a manager can refresh through whichever client was
//! registered as `"salla"`.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use super::client::OAuthClientError;
use super::state::{generate_state, validate_state};
use super::traits::OAuthClientTrait;
use super::types::{Principal, TokenSet};

/// Provider name the Salla strategy is registered under
pub const SALLA_PROVIDER: &str = "salla";

/// Wraps the OAuth client for mounting into a login flow
pub struct StrategyAdapter<C: OAuthClientTrait + 'static> {
    client: Arc<C>,
    pending_state: Mutex<Option<String>>,
}

impl<C: OAuthClientTrait + 'static> StrategyAdapter<C> {
    /// Create an adapter around `client`
    #[must_use]
    pub fn new(client: C) -> Self {
        Self { client: Arc::new(client), pending_state: Mutex::new(None) }
    }

    /// Underlying OAuth client
    #[must_use]
    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    /// Start a login: issue a fresh CSRF state and the URL to redirect to
    ///
    /// A new call supersedes any login still pending.
    #[must_use]
    pub fn start_login(&self) -> (String, String) {
        let state = generate_state();
        *self.pending_state.lock() = Some(state.clone());
        (self.client.authorization_url(&state), state)
    }

    /// Complete a login from the callback's `code` and `state`
    ///
    /// # Errors
    /// Returns [`OAuthClientError::StateMismatch`] if `state` does not match
    /// the pending login, or the client's error if the exchange or the
    /// user-profile lookup fails
    pub async fn authenticate(
        &self,
        code: &str,
        state: &str,
    ) -> Result<(TokenSet, Principal), OAuthClientError> {
        let expected = self.pending_state.lock().take();
        match expected {
            Some(expected) if validate_state(&expected, state) => {}
            _ => {
                warn!("OAuth callback state did not match a pending login");
                return Err(OAuthClientError::StateMismatch);
            }
        }

        let tokens = self.client.exchange_code_for_tokens(code).await?;
        let principal = self.client.fetch_user_profile(&tokens.access_token).await?;

        debug!("Authorization code exchanged and principal resolved");
        Ok((tokens, principal))
    }
}

/// Refresh mechanisms keyed by provider name
#[derive(Default)]
pub struct RefreshRegistry {
    strategies: RwLock<HashMap<String, Arc<dyn OAuthClientTrait>>>,
}

impl RefreshRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `client` under `name`, replacing any previous registration
    pub fn register(&self, name: impl Into<String>, client: Arc<dyn OAuthClientTrait>) {
        self.strategies.write().insert(name.into(), client);
    }

    /// Mint a new token pair through the client registered under `name`
    ///
    /// # Errors
    /// Returns [`OAuthClientError::UnknownProvider`] if nothing is
    /// registered under `name`, or the client's refresh error
    pub async fn request_new_access_token(
        &self,
        name: &str,
        refresh_token: &str,
    ) -> Result<TokenSet, OAuthClientError> {
        let client = self
            .strategies
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| OAuthClientError::UnknownProvider(name.to_string()))?;

        client.refresh_access_token(refresh_token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockOAuthClient;

    #[tokio::test]
    async fn authenticate_returns_tokens_and_principal() {
        let adapter = StrategyAdapter::new(MockOAuthClient::new());
        let (url, state) = adapter.start_login();
        assert!(url.contains(&state));

        let (tokens, principal) = adapter.authenticate("code", &state).await.unwrap();

        assert_eq!(tokens.access_token, "mock_access_token");
        assert_eq!(principal.name.as_deref(), Some("Mock Store"));
    }

    #[tokio::test]
    async fn authenticate_rejects_unknown_state() {
        let adapter = StrategyAdapter::new(MockOAuthClient::new());
        let _ = adapter.start_login();

        let result = adapter.authenticate("code", "forged").await;
        assert!(matches!(result, Err(OAuthClientError::StateMismatch)));
    }

    #[tokio::test]
    async fn pending_state_is_single_use() {
        let adapter = StrategyAdapter::new(MockOAuthClient::new());
        let (_, state) = adapter.start_login();

        assert!(adapter.authenticate("code", &state).await.is_ok());
        let replay = adapter.authenticate("code", &state).await;
        assert!(matches!(replay, Err(OAuthClientError::StateMismatch)));
    }

    #[tokio::test]
    async fn registry_dispatches_by_name() {
        let registry = RefreshRegistry::new();
        let client = Arc::new(MockOAuthClient::new());
        registry.register(SALLA_PROVIDER, client.clone());

        let tokens = registry.request_new_access_token(SALLA_PROVIDER, "ref1").await.unwrap();

        assert_eq!(tokens.access_token, "refreshed_access_token");
        assert!(client.was_refresh_called());
    }

    #[tokio::test]
    async fn registry_rejects_unknown_provider() {
        let registry = RefreshRegistry::new();

        let result = registry.request_new_access_token("shopify", "ref1").await;
        assert!(matches!(
            result,
            Err(OAuthClientError::UnknownProvider(name)) if name == "shopify"
        ));
    }
}
