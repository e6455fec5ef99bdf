//! Bearer-authenticated client for the Salla merchant API.
//!
//! Every call goes through one [`RequestExecutor`] that attaches the current
//! access token and unwraps the `{ "data": ... }` envelope. A failed fetch
//! resets the shared credentials, so the next request handler sees a
//! logged-out session and can send the merchant back through `/login`.
//!
//! # Architecture
//!
//! ```text
//!   Salla ──► TokenManager ──► CredentialState ◄── AnnotatorState (axum)
//!     │                              ▲
//!     └──► SallaApi ──► RequestExecutor ──► HttpTransport (reqwest)
//! ```
//!
//! # Usage Example
//!
//! ```no_run
//! use axum::routing::get;
//! use axum::Router;
//! use salla_api::middleware::{annotate_middleware, AuthContext};
//! use salla_api::{config, Salla};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let salla = Salla::from_config(&config::load()?)?;
//! salla.on_auth(|_, _, _, principal| println!("authorized: {principal:?}"));
//!
//! let app = Router::new()
//!     .route("/", get(|auth: AuthContext| async move { auth.code }))
//!     .merge(salla.auth_router())
//!     .layer(axum::middleware::from_fn_with_state(salla.annotator(), annotate_middleware));
//!
//! let orders = salla.api().get_all_orders(None).await?;
//! # let _ = (app, orders);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod client;
pub mod config;
pub mod endpoints;
pub mod errors;
pub mod executor;
pub mod middleware;
pub mod owner;
pub mod routes;
pub mod service;
pub mod transport;

#[cfg(test)]
mod testing;

pub use client::SallaApi;
pub use config::{ApiSettings, ConfigError, OAuthSettings, SallaConfig};
pub use endpoints::{BaseUrls, Endpoint};
pub use errors::{ApiError, ApiErrorKind};
pub use executor::RequestExecutor;
pub use middleware::{annotate, annotate_middleware, AnnotatorState, AuthContext, BypassRoutes};
pub use owner::ResourceOwner;
pub use routes::auth_router;
pub use service::Salla;
pub use transport::{ApiRequest, HttpTransport, ReqwestTransport, TransportError};

pub use salla_auth::{CredentialState, Principal, RefreshedTokens, TokenManager};
