//! In-memory credential state
//!
//! One `CredentialState` holds the access token, refresh token, advisory
//! expiry and resolved principal of the single logged-in merchant. It is
//! shared by `Arc` between the token manager, the request executor and the
//! inbound request annotator.
//!
//! Each transition takes the write lock once, so a reader never observes a
//! half-written token pair. Transitions across an `.await` are not
//! serialized: concurrent refresh and reset are last-writer-wins.

use parking_lot::RwLock;
use tracing::debug;

use super::types::Principal;

/// Point-in-time copy of the credential fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CredentialSnapshot {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub principal: Option<Principal>,
}

impl CredentialSnapshot {
    /// `true` when every field is cleared
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none()
            && self.refresh_token.is_none()
            && self.expires_in.is_none()
            && self.principal.is_none()
    }
}

/// Shared mutable credential state
#[derive(Debug, Default)]
pub struct CredentialState {
    inner: RwLock<CredentialSnapshot>,
}

impl CredentialState {
    /// Create an empty (unauthenticated) state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set all four fields at once (completed login)
    pub fn set_login(
        &self,
        access_token: String,
        refresh_token: String,
        expires_in: Option<i64>,
        principal: Option<Principal>,
    ) {
        *self.inner.write() = CredentialSnapshot {
            access_token: Some(access_token),
            refresh_token: Some(refresh_token),
            expires_in,
            principal,
        };
        debug!("Credential state populated from login");
    }

    /// Replace the token pair, keeping the existing expiry and principal
    /// unless new values are supplied
    pub fn set_access_token(
        &self,
        access_token: String,
        refresh_token: String,
        expires_in: Option<i64>,
        principal: Option<Principal>,
    ) {
        let mut state = self.inner.write();
        state.access_token = Some(access_token);
        state.refresh_token = Some(refresh_token);
        if expires_in.is_some() {
            state.expires_in = expires_in;
        }
        if principal.is_some() {
            state.principal = principal;
        }
    }

    /// Attach a principal resolved with `access_token`
    ///
    /// Written only while `access_token` is still the active token; returns
    /// `false` if the pair was replaced or cleared in the meantime.
    pub fn set_principal_if(&self, access_token: &str, principal: Principal) -> bool {
        let mut state = self.inner.write();
        if state.access_token.as_deref() != Some(access_token) {
            return false;
        }
        state.principal = Some(principal);
        true
    }

    /// Clear every field
    pub fn reset(&self) {
        *self.inner.write() = CredentialSnapshot::default();
        debug!("Credential state reset");
    }

    /// Current access token
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.inner.read().access_token.clone()
    }

    /// Current refresh token
    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.inner.read().refresh_token.clone()
    }

    /// Lifetime in seconds reported when the current token was issued
    #[must_use]
    pub fn expires_in(&self) -> Option<i64> {
        self.inner.read().expires_in
    }

    /// Principal of the current login
    #[must_use]
    pub fn principal(&self) -> Option<Principal> {
        self.inner.read().principal.clone()
    }

    /// Copy of all four fields taken under one read lock
    #[must_use]
    pub fn snapshot(&self) -> CredentialSnapshot {
        self.inner.read().clone()
    }

    /// `true` when a non-empty access token is present
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.read().access_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn principal() -> Principal {
        Principal { id: Some(json!(1)), name: Some("Store A".to_string()), ..Principal::default() }
    }

    #[test]
    fn starts_empty() {
        let state = CredentialState::new();

        assert!(state.snapshot().is_empty());
        assert!(!state.is_authenticated());
    }

    #[test]
    fn login_sets_all_fields() {
        let state = CredentialState::new();
        state.set_login("tok1".to_string(), "ref1".to_string(), Some(3600), Some(principal()));

        let snapshot = state.snapshot();
        assert_eq!(snapshot.access_token.as_deref(), Some("tok1"));
        assert_eq!(snapshot.refresh_token.as_deref(), Some("ref1"));
        assert_eq!(snapshot.expires_in, Some(3600));
        assert_eq!(snapshot.principal, Some(principal()));
        assert!(state.is_authenticated());
    }

    #[test]
    fn set_access_token_keeps_principal_and_expiry() {
        let state = CredentialState::new();
        state.set_login("tok1".to_string(), "ref1".to_string(), Some(3600), Some(principal()));

        state.set_access_token("tok2".to_string(), "ref2".to_string(), None, None);

        assert_eq!(state.access_token().as_deref(), Some("tok2"));
        assert_eq!(state.refresh_token().as_deref(), Some("ref2"));
        assert_eq!(state.expires_in(), Some(3600));
        assert_eq!(state.principal(), Some(principal()));
    }

    #[test]
    fn reset_clears_everything() {
        let state = CredentialState::new();
        state.set_login("tok1".to_string(), "ref1".to_string(), Some(3600), Some(principal()));

        state.reset();

        assert!(state.snapshot().is_empty());
    }

    #[test]
    fn principal_requires_matching_token() {
        let state = CredentialState::new();
        assert!(!state.set_principal_if("tok1", principal()));
        assert!(state.principal().is_none());

        state.set_login("tok1".to_string(), "ref1".to_string(), None, None);
        assert!(state.set_principal_if("tok1", principal()));
        assert_eq!(state.principal(), Some(principal()));
    }

    #[test]
    fn principal_for_replaced_token_is_dropped() {
        let state = CredentialState::new();
        state.set_login("tok2".to_string(), "ref2".to_string(), None, None);

        assert!(!state.set_principal_if("tok1", principal()));
        assert!(state.principal().is_none());
    }

    #[test]
    fn empty_access_token_is_not_authenticated() {
        let state = CredentialState::new();
        state.set_login(String::new(), "ref".to_string(), None, None);

        assert!(!state.is_authenticated());
    }
}
