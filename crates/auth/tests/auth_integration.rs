//! Integration tests for the credential lifecycle
//!
//! Drives `TokenManager` with the real `OAuthClient` against a wiremock
//! accounts server: login, refresh, and reset on a rejected refresh.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use salla_auth::{
    CredentialState, OAuthClient, OAuthClientError, OAuthConfig, TokenManager, TokenManagerError,
};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn manager_for(server: &MockServer) -> (TokenManager<OAuthClient>, Arc<CredentialState>) {
    let config = OAuthConfig::salla(
        "client".to_string(),
        "secret".to_string(),
        "http://localhost:8081/oauth/callback".to_string(),
    )
    .with_accounts_url(server.uri());

    let credentials = Arc::new(CredentialState::new());
    (TokenManager::new(OAuthClient::new(config), credentials.clone()), credentials)
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok1",
            "refresh_token": "ref1",
            "token_type": "bearer",
            "expires_in": 3600
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/oauth2/user/info"))
        .and(header("Authorization", "Bearer tok1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "id": 1,
                "name": "Store A",
                "store": { "id": 10, "name": "Store A" },
                "merchant": { "id": 20, "name": "Merchant A" }
            }
        })))
        .mount(server)
        .await;
}

/// Full login then refresh: tokens replaced, principal kept.
#[tokio::test(flavor = "multi_thread")]
async fn test_login_then_refresh() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=ref1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok2",
            "refresh_token": "ref2",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (manager, _) = manager_for(&server);
    let observed = Arc::new(AtomicUsize::new(0));
    let counter = observed.clone();
    manager.on_auth(move |access, refresh, expires_in, principal| {
        assert_eq!((access, refresh, expires_in), ("tok1", "ref1", Some(3600)));
        assert_eq!(principal.merchant_name.as_deref(), Some("Merchant A"));
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let (url, state) = manager.start_login();
    assert!(url.starts_with(&format!("{}/oauth2/auth?", server.uri())));

    manager.complete_login("auth-code", &state).await.expect("login");
    assert_eq!(observed.load(Ordering::SeqCst), 1);
    assert_eq!(manager.access_token().as_deref(), Some("tok1"));

    let principal_before = manager.principal();
    let refreshed = manager.request_new_access_token(None).await.expect("refresh");

    assert_eq!(refreshed.access_token, "tok2");
    assert_eq!(refreshed.refresh_token, "ref2");
    assert_eq!(manager.access_token().as_deref(), Some("tok2"));
    assert_eq!(manager.refresh_token().as_deref(), Some("ref2"));
    assert_eq!(manager.principal(), principal_before);
}

/// A rejected refresh clears every credential field.
#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_refresh_resets_credentials() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "refresh token revoked"
        })))
        .mount(&server)
        .await;

    let (manager, credentials) = manager_for(&server);
    let (_, state) = manager.start_login();
    manager.complete_login("auth-code", &state).await.expect("login");

    let result = manager.request_new_access_token(Some("revoked")).await;

    assert!(matches!(result, Err(TokenManagerError::RefreshFailed { .. })));
    assert!(credentials.snapshot().is_empty());
}

/// A token response without a refresh token does not log the merchant in.
#[tokio::test(flavor = "multi_thread")]
async fn test_login_without_refresh_token_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok1",
            "expires_in": 3600
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/oauth2/user/info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "id": 1 } })))
        .mount(&server)
        .await;

    let (manager, credentials) = manager_for(&server);
    let (_, state) = manager.start_login();

    let result = manager.complete_login("auth-code", &state).await;

    assert!(matches!(result, Err(TokenManagerError::Login(OAuthClientError::NoRefreshToken))));
    assert!(credentials.snapshot().is_empty());
}
