//! Login and OAuth callback routes
//!
//! `GET /login` redirects to the Salla consent screen with a fresh CSRF
//! state; `GET /oauth/callback` completes the code exchange and redirects
//! home. `GET /logout` clears the credentials.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use salla_auth::{OAuthClientTrait, TokenManager};
use tracing::{info, warn};

/// Where a completed login lands
pub const LOGIN_SUCCESS_REDIRECT: &str = "/";

/// Router with `/login`, `/oauth/callback` and `/logout`
pub fn auth_router<C: OAuthClientTrait + 'static>(manager: Arc<TokenManager<C>>) -> Router {
    Router::new()
        .route("/login", get(login::<C>))
        .route("/oauth/callback", get(oauth_callback::<C>))
        .route("/logout", get(logout::<C>))
        .with_state(manager)
}

async fn login<C: OAuthClientTrait + 'static>(
    State(manager): State<Arc<TokenManager<C>>>,
) -> Redirect {
    let (url, _state) = manager.start_login();
    Redirect::to(&url)
}

async fn oauth_callback<C: OAuthClientTrait + 'static>(
    State(manager): State<Arc<TokenManager<C>>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Some(error) = params.get("error") {
        warn!(%error, "Authorization denied by provider");
        return (StatusCode::UNAUTHORIZED, format!("Authorization failed: {error}"))
            .into_response();
    }

    let (Some(code), Some(state)) = (params.get("code"), params.get("state")) else {
        return (StatusCode::UNAUTHORIZED, "Missing code or state").into_response();
    };

    match manager.complete_login(code, state).await {
        Ok(_) => {
            info!("Login completed via OAuth callback");
            Redirect::to(LOGIN_SUCCESS_REDIRECT).into_response()
        }
        Err(err) => {
            warn!(error = %err, "OAuth callback rejected");
            (StatusCode::UNAUTHORIZED, err.to_string()).into_response()
        }
    }
}

async fn logout<C: OAuthClientTrait + 'static>(
    State(manager): State<Arc<TokenManager<C>>>,
) -> Redirect {
    manager.logout();
    Redirect::to("/login")
}
