//! Top-level `Salla` handle
//!
//! Wires one credential state into the token manager, the request executor
//! and the inbound annotator. Each `Salla` value is an independent session;
//! nothing is global.

use std::sync::Arc;

use axum::Router;
use salla_auth::{
    CredentialState, OAuthClient, OAuthClientTrait, Principal, RefreshedTokens, StrategyAdapter,
    TokenManager,
};

use crate::client::SallaApi;
use crate::config::SallaConfig;
use crate::endpoints::BaseUrls;
use crate::errors::ApiError;
use crate::middleware::AnnotatorState;
use crate::routes::auth_router;
use crate::transport::{HttpTransport, ReqwestTransport};

/// Authenticated Salla session
pub struct Salla<C: OAuthClientTrait + 'static = OAuthClient> {
    tokens: Arc<TokenManager<C>>,
    api: SallaApi,
}

impl Salla<OAuthClient> {
    /// Build a session with the real OAuth client and reqwest transport
    ///
    /// # Errors
    /// Returns [`ApiError::Config`] if a configured URL is invalid or the
    /// HTTP client cannot be built
    pub fn from_config(config: &SallaConfig) -> Result<Self, ApiError> {
        config.validate().map_err(|e| ApiError::Config(e.to_string()))?;
        let transport = ReqwestTransport::new(config.api.timeout())
            .map_err(|e| ApiError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self::with_parts(
            OAuthClient::new(config.oauth_config()),
            Arc::new(transport),
            config.api.base_urls(),
        ))
    }
}

impl<C: OAuthClientTrait + 'static> Salla<C> {
    /// Assemble a session from its parts
    #[must_use]
    pub fn with_parts(oauth_client: C, transport: Arc<dyn HttpTransport>, base: BaseUrls) -> Self {
        let credentials = Arc::new(CredentialState::new());
        let tokens = Arc::new(TokenManager::new(oauth_client, credentials.clone()));
        let api = SallaApi::new(transport, credentials, base);
        Self { tokens, api }
    }

    /// Endpoint facade
    #[must_use]
    pub fn api(&self) -> &SallaApi {
        &self.api
    }

    #[must_use]
    pub fn token_manager(&self) -> &Arc<TokenManager<C>> {
        &self.tokens
    }

    /// Authorization strategy for mounting into a login flow
    #[must_use]
    pub fn strategy(&self) -> &StrategyAdapter<C> {
        self.tokens.strategy()
    }

    #[must_use]
    pub fn credentials(&self) -> &Arc<CredentialState> {
        self.tokens.credentials()
    }

    /// Register the auth observer, replacing any previous one
    pub fn on_auth<F>(&self, callback: F)
    where
        F: Fn(&str, &str, Option<i64>, &Principal) + Send + Sync + 'static,
    {
        self.tokens.on_auth(callback);
    }

    /// Record a completed authorization and notify the observer
    pub fn on_login_callback(
        &self,
        access_token: String,
        refresh_token: String,
        expires_in: Option<i64>,
        principal: Principal,
    ) {
        self.tokens.on_login_callback(access_token, refresh_token, expires_in, principal);
    }

    /// Mint a new token pair
    ///
    /// # Errors
    /// Returns [`ApiError::RefreshFailed`] after resetting the credentials
    pub async fn request_new_access_token(
        &self,
        refresh_token: Option<&str>,
    ) -> Result<RefreshedTokens, ApiError> {
        Ok(self.tokens.request_new_access_token(refresh_token).await?)
    }

    pub fn logout(&self) {
        self.tokens.logout();
    }

    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.tokens.access_token()
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.tokens.refresh_token()
    }

    #[must_use]
    pub fn expires_in(&self) -> Option<i64> {
        self.tokens.expires_in()
    }

    #[must_use]
    pub fn principal(&self) -> Option<Principal> {
        self.tokens.principal()
    }

    /// State for [`crate::middleware::annotate_middleware`]
    #[must_use]
    pub fn annotator(&self) -> AnnotatorState {
        AnnotatorState::new(self.credentials().clone())
    }

    /// `/login`, `/oauth/callback` and `/logout` bound to this session
    #[must_use]
    pub fn auth_router(&self) -> Router {
        auth_router(self.tokens.clone())
    }
}
