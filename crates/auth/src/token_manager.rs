//! Token lifecycle manager
//!
//! Orchestrates the credential transitions:
//! - Login callback (tokens + principal, then the auth observer)
//! - Refresh through the provider-keyed registry
//! - Logout and reset on failure
//!
//! No background refresh runs; `expires_in` is stored for callers that want
//! to schedule one themselves.

use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{info, warn};

use super::client::OAuthClientError;
use super::credentials::CredentialState;
use super::strategy::{RefreshRegistry, StrategyAdapter, SALLA_PROVIDER};
use super::traits::OAuthClientTrait;
use super::types::{Principal, TokenSet};

/// Observer invoked after every completed login with
/// `(access_token, refresh_token, expires_in, principal)`
pub type AuthObserver = Arc<dyn Fn(&str, &str, Option<i64>, &Principal) + Send + Sync>;

/// Error type for token manager operations
#[derive(Debug, Error)]
pub enum TokenManagerError {
    /// Refresh exchange rejected; credential state has been reset
    #[error("Error refreshing token: {message}")]
    RefreshFailed {
        message: String,
        #[source]
        source: OAuthClientError,
    },

    /// Authorization-code login failed; credential state is unchanged
    #[error("Login failed: {0}")]
    Login(#[source] OAuthClientError),
}

/// Token pair minted by a successful refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshedTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Token manager for the logged-in merchant
pub struct TokenManager<C: OAuthClientTrait + 'static> {
    strategy: StrategyAdapter<C>,
    registry: RefreshRegistry,
    credentials: Arc<CredentialState>,
    on_auth: Mutex<Option<AuthObserver>>,
}

impl<C: OAuthClientTrait + 'static> TokenManager<C> {
    /// Create a token manager over `credentials`
    ///
    /// The client is registered in the refresh registry under
    /// [`SALLA_PROVIDER`].
    #[must_use]
    pub fn new(oauth_client: C, credentials: Arc<CredentialState>) -> Self {
        let strategy = StrategyAdapter::new(oauth_client);
        let registry = RefreshRegistry::new();
        registry.register(SALLA_PROVIDER, strategy.client().clone());

        Self { strategy, registry, credentials, on_auth: Mutex::new(None) }
    }

    /// The authorization strategy adapter, for mounting into a login flow
    #[must_use]
    pub fn strategy(&self) -> &StrategyAdapter<C> {
        &self.strategy
    }

    /// Shared credential state
    #[must_use]
    pub fn credentials(&self) -> &Arc<CredentialState> {
        &self.credentials
    }

    /// Register the auth observer, replacing any previous one
    pub fn on_auth<F>(&self, callback: F)
    where
        F: Fn(&str, &str, Option<i64>, &Principal) + Send + Sync + 'static,
    {
        *self.on_auth.lock() = Some(Arc::new(callback));
    }

    /// Begin a login; returns `(authorization_url, state)`
    #[must_use]
    pub fn start_login(&self) -> (String, String) {
        self.strategy.start_login()
    }

    /// Complete a login from the OAuth callback
    ///
    /// # Errors
    /// Returns [`TokenManagerError::Login`] if the state is unknown, the
    /// exchange fails, or the provider issued no refresh token
    pub async fn complete_login(
        &self,
        code: &str,
        state: &str,
    ) -> Result<TokenSet, TokenManagerError> {
        let (tokens, principal) =
            self.strategy.authenticate(code, state).await.map_err(TokenManagerError::Login)?;

        let Some(refresh_token) = tokens.refresh_token.clone().filter(|t| !t.is_empty()) else {
            warn!("Provider issued no refresh token; login rejected");
            return Err(TokenManagerError::Login(OAuthClientError::NoRefreshToken));
        };

        self.on_login_callback(
            tokens.access_token.clone(),
            refresh_token,
            tokens.expires_in,
            principal,
        );

        Ok(tokens)
    }

    /// Record a completed authorization and notify the observer
    pub fn on_login_callback(
        &self,
        access_token: String,
        refresh_token: String,
        expires_in: Option<i64>,
        principal: Principal,
    ) {
        self.credentials.set_login(
            access_token.clone(),
            refresh_token.clone(),
            expires_in,
            Some(principal.clone()),
        );

        info!("Merchant authorized");

        let observer = self.on_auth.lock().clone();
        if let Some(observer) = observer {
            observer(&access_token, &refresh_token, expires_in, &principal);
        }
    }

    /// Mint a new token pair
    ///
    /// Uses `refresh_token` if given, else the current one. The principal is
    /// left untouched.
    ///
    /// # Errors
    /// Returns [`TokenManagerError::RefreshFailed`] after resetting the
    /// credential state if there is no refresh token or the provider rejects
    /// it
    pub async fn request_new_access_token(
        &self,
        refresh_token: Option<&str>,
    ) -> Result<RefreshedTokens, TokenManagerError> {
        let refresh_token = match refresh_token {
            Some(token) => token.to_string(),
            None => self.credentials.refresh_token().unwrap_or_default(),
        };

        let result = if refresh_token.is_empty() {
            Err(OAuthClientError::NoRefreshToken)
        } else {
            self.registry.request_new_access_token(SALLA_PROVIDER, &refresh_token).await
        };

        match result {
            Ok(tokens) => {
                let refreshed = RefreshedTokens {
                    refresh_token: tokens.refresh_token.clone().unwrap_or(refresh_token),
                    access_token: tokens.access_token,
                };
                self.credentials.set_access_token(
                    refreshed.access_token.clone(),
                    refreshed.refresh_token.clone(),
                    tokens.expires_in,
                    None,
                );
                info!("Successfully refreshed access token");
                Ok(refreshed)
            }
            Err(source) => {
                warn!(error = %source, "Token refresh failed; resetting credentials");
                self.credentials.reset();
                Err(TokenManagerError::RefreshFailed {
                    message: "Error Refreshing Your Token".to_string(),
                    source,
                })
            }
        }
    }

    /// Clear all credentials
    pub fn logout(&self) {
        self.credentials.reset();
        info!("Tokens cleared (logged out)");
    }

    /// Current access token
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.credentials.access_token()
    }

    /// Current refresh token
    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.credentials.refresh_token()
    }

    /// Advisory lifetime reported with the current token
    #[must_use]
    pub fn expires_in(&self) -> Option<i64> {
        self.credentials.expires_in()
    }

    /// Principal of the current login
    #[must_use]
    pub fn principal(&self) -> Option<Principal> {
        self.credentials.principal()
    }
}
