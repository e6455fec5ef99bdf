//! OAuth 2.0 types and structures
//!
//! Token pairs as issued by the Salla accounts server, the provider
//! configuration, and the resolved principal returned by the user-info
//! endpoint.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default Salla accounts server (authorization, token, user-info).
pub const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.salla.sa";

/// OAuth 2.0 access and refresh tokens with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSet {
    /// Bearer token for API calls
    pub access_token: String,

    /// Refresh token for minting a new access token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Token type (always "Bearer" for OAuth 2.0)
    pub token_type: String,

    /// Access token lifetime in seconds, as reported at issuance
    ///
    /// Advisory; never compared against the clock.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,

    /// Granted scopes (space-separated)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl TokenSet {
    /// Create a new bearer `TokenSet`
    #[must_use]
    pub fn new(
        access_token: String,
        refresh_token: Option<String>,
        expires_in: Option<i64>,
        scope: Option<String>,
    ) -> Self {
        Self { access_token, refresh_token, token_type: "Bearer".to_string(), expires_in, scope }
    }
}

/// OAuth token response from the Salla accounts server
///
/// Standard OAuth 2.0 token response format (RFC 6749).
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl From<TokenResponse> for TokenSet {
    fn from(response: TokenResponse) -> Self {
        let mut tokens = Self::new(
            response.access_token,
            response.refresh_token,
            response.expires_in,
            response.scope,
        );
        tokens.token_type = response.token_type;
        tokens
    }
}

/// OAuth client configuration
///
/// `client_id`, `client_secret` and `callback_url` come from the Salla
/// partner portal; the endpoint URLs default to the public accounts server.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// OAuth client ID
    pub client_id: String,

    /// OAuth client secret
    pub client_secret: String,

    /// Redirect URI registered for the app
    pub callback_url: String,

    /// Scopes to request; empty means the app's configured defaults
    pub scopes: Vec<String>,

    /// Accounts server base URL (no trailing slash)
    pub accounts_url: String,
}

impl OAuthConfig {
    /// Create a configuration against the public Salla accounts server
    #[must_use]
    pub fn salla(client_id: String, client_secret: String, callback_url: String) -> Self {
        Self {
            client_id,
            client_secret,
            callback_url,
            scopes: vec!["offline_access".to_string()],
            accounts_url: DEFAULT_ACCOUNTS_URL.to_string(),
        }
    }

    /// Point the configuration at a different accounts server
    #[must_use]
    pub fn with_accounts_url(mut self, accounts_url: impl Into<String>) -> Self {
        self.accounts_url = accounts_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the requested scopes
    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Authorization endpoint (`/oauth2/auth`)
    #[must_use]
    pub fn authorization_url(&self) -> String {
        format!("{}/oauth2/auth", self.accounts_url)
    }

    /// Token endpoint (`/oauth2/token`)
    #[must_use]
    pub fn token_url(&self) -> String {
        format!("{}/oauth2/token", self.accounts_url)
    }

    /// Resource-owner endpoint (`/oauth2/user/info`)
    #[must_use]
    pub fn user_info_url(&self) -> String {
        format!("{}/oauth2/user/info", self.accounts_url)
    }

    /// Get scopes as space-separated string
    #[must_use]
    pub fn scope_string(&self) -> String {
        self.scopes.join(" ")
    }
}

/// OAuth error response from the authorization server
///
/// Standard OAuth 2.0 error response format (RFC 6749 §5.2).
#[derive(Debug, Deserialize)]
pub struct OAuthError {
    pub error: String,
    pub error_description: Option<String>,
}

impl fmt::Display for OAuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_description {
            Some(desc) => write!(f, "{}: {}", self.error, desc),
            None => write!(f, "{}", self.error),
        }
    }
}

impl std::error::Error for OAuthError {}

/// Resolved identity of the logged-in merchant user
///
/// Built from the `data` object of the user-info endpoint. Fields the
/// payload lacks stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    pub id: Option<Value>,
    pub name: Option<String>,
    pub store_id: Option<Value>,
    pub store_name: Option<String>,
    pub merchant_id: Option<Value>,
    pub merchant_name: Option<String>,
}

impl Principal {
    /// Project a user-info payload onto the fixed nested paths
    /// (`id`, `name`, `store.id`, `store.name`, `merchant.id`,
    /// `merchant.name`).
    #[must_use]
    pub fn from_user_info(data: &Value) -> Self {
        let text = |v: Option<&Value>| v.and_then(Value::as_str).map(str::to_string);
        let id = |v: Option<&Value>| v.filter(|v| !v.is_null()).cloned();

        Self {
            id: id(data.get("id")),
            name: text(data.get("name")),
            store_id: id(data.pointer("/store/id")),
            store_name: text(data.pointer("/store/name")),
            merchant_id: id(data.pointer("/merchant/id")),
            merchant_name: text(data.pointer("/merchant/name")),
        }
    }
}
