//! Traits for OAuth operations
//!
//! Abstracts the provider's OAuth endpoints so the token manager can be
//! driven by mock implementations in tests.

use async_trait::async_trait;

use super::client::OAuthClientError;
use super::types::{Principal, TokenSet};

/// Trait for OAuth client operations
#[async_trait]
pub trait OAuthClientTrait: Send + Sync {
    /// Build the browser authorization URL carrying the given CSRF `state`
    fn authorization_url(&self, state: &str) -> String;

    /// Exchange authorization code for tokens
    ///
    /// # Errors
    /// Returns error if the token exchange fails or the response cannot be
    /// parsed
    async fn exchange_code_for_tokens(&self, code: &str) -> Result<TokenSet, OAuthClientError>;

    /// Resolve the principal that owns `access_token`
    ///
    /// # Errors
    /// Returns error if the user-info request fails or cannot be parsed
    async fn fetch_user_profile(&self, access_token: &str)
        -> Result<Principal, OAuthClientError>;

    /// Refresh access token using refresh token
    ///
    /// # Errors
    /// Returns error if refresh fails or token is invalid/revoked
    async fn refresh_access_token(&self, refresh_token: &str)
        -> Result<TokenSet, OAuthClientError>;

    /// Get the configured redirect URI
    fn redirect_uri(&self) -> &str;
}
