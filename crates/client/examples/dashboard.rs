//! Example: merchant dashboard behind Salla login
//!
//! Serves `/login`, `/oauth/callback` and `/logout`, and a `/` page that
//! lists the merchant's orders once authorized.
//!
//! # Setup
//!
//! ```bash
//! export SALLA_CLIENT_ID=...
//! export SALLA_CLIENT_SECRET=...
//! export SALLA_CALLBACK_URL=http://localhost:8081/oauth/callback
//! cargo run -p salla-api --example dashboard
//! ```

use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Json, Router};
use salla_api::middleware::{annotate_middleware, AuthContext};
use salla_api::{config, Salla};

async fn dashboard(State(salla): State<Arc<Salla>>, auth: Option<AuthContext>) -> Response {
    let Some(auth) = auth else {
        return Redirect::to("/login").into_response();
    };

    match salla.api().get_all_orders(Some(&auth.code)).await {
        Ok(orders) => Json(orders).into_response(),
        Err(err) => {
            tracing::warn!(error = %err, kind = ?err.kind(), "Could not load orders");
            Redirect::to("/login").into_response()
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let salla = Arc::new(Salla::from_config(&config::load()?)?);
    salla.on_auth(|_, _, expires_in, principal| {
        tracing::info!(merchant = ?principal.merchant_name, ?expires_in, "Merchant connected");
    });

    let app = Router::new()
        .route("/", get(dashboard))
        .with_state(salla.clone())
        .merge(salla.auth_router())
        .layer(axum::middleware::from_fn_with_state(salla.annotator(), annotate_middleware));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:8081").await?;
    tracing::info!("Listening on http://localhost:8081");
    axum::serve(listener, app).await?;

    Ok(())
}
