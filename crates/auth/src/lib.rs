//! OAuth 2.0 credential lifecycle for the Salla merchant API.
//!
//! Holds the single logged-in principal's access/refresh token pair in
//! process memory and drives its transitions: login through the
//! authorization-code callback, refresh through the provider's token
//! endpoint, and reset on logout or on any authorization failure.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │   TokenManager   │  login callback, refresh, logout, auth observer
//! └────────┬─────────┘
//!          │
//!          ├──► StrategyAdapter    (code exchange + user profile)
//!          │         │
//!          │         └──► OAuthClient  (HTTP OAuth flows)
//!          │
//!          ├──► RefreshRegistry    (refresh keyed by provider name)
//!          │
//!          └──► CredentialState    (shared token pair + principal)
//! ```
//!
//! # Usage Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use salla_auth::{CredentialState, OAuthClient, OAuthConfig, TokenManager};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = OAuthConfig::salla(
//!     "client_id".to_string(),
//!     "client_secret".to_string(),
//!     "http://localhost:8081/oauth/callback".to_string(),
//! );
//! let credentials = Arc::new(CredentialState::new());
//! let manager = TokenManager::new(OAuthClient::new(config), credentials);
//!
//! manager.on_auth(|access, _refresh, expires_in, principal| {
//!     println!("logged in as {principal:?}, token expires in {expires_in:?}s ({access})");
//! });
//!
//! let (url, state) = manager.start_login();
//! // ... redirect the merchant to `url`, receive `code` + `state` back ...
//! # let code = "code";
//! manager.complete_login(code, &state).await?;
//! println!("{url}: {:?}", manager.access_token());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod client;
pub mod credentials;
pub mod state;
pub mod strategy;
pub mod token_manager;
pub mod traits;
pub mod types;

#[cfg(any(feature = "test-utils", test))]
pub mod testing;

pub use client::{OAuthClient, OAuthClientError};
pub use credentials::{CredentialSnapshot, CredentialState};
pub use state::{generate_state, validate_state};
pub use strategy::{RefreshRegistry, StrategyAdapter, SALLA_PROVIDER};
pub use token_manager::{AuthObserver, RefreshedTokens, TokenManager, TokenManagerError};
pub use traits::OAuthClientTrait;
pub use types::{OAuthConfig, OAuthError, Principal, TokenResponse, TokenSet};
