//! Inbound request annotator
//!
//! axum middleware that copies the current credentials onto each inbound
//! request so handlers can read them without touching the shared state:
//!
//! - the query string is replaced with `code=<access token>`
//! - an [`AuthContext`] extension carries the token and principal
//!
//! Login and OAuth routes pass through untouched. The annotator never
//! rejects a request; a handler that needs credentials asks for
//! [`AuthContext`] and gets `401` when none were attached.
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/dashboard", get(dashboard))
//!     .layer(axum::middleware::from_fn_with_state(salla.annotator(), annotate_middleware));
//! ```

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{FromRequestParts, OptionalFromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::uri::PathAndQuery;
use axum::http::{StatusCode, Uri};
use axum::middleware::Next;
use axum::response::Response;
use salla_auth::{CredentialState, Principal};
use tracing::{debug, warn};

/// Paths the annotator leaves alone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BypassRoutes {
    /// Matched against the request path exactly
    pub exact: Vec<String>,
    /// Matched as a substring of the path and query
    pub contains: Vec<String>,
}

impl Default for BypassRoutes {
    fn default() -> Self {
        Self { exact: vec!["/login".to_string()], contains: vec!["/oauth".to_string()] }
    }
}

impl BypassRoutes {
    #[must_use]
    pub fn matches(&self, uri: &Uri) -> bool {
        let path = uri.path();
        let full = uri.path_and_query().map_or(path, PathAndQuery::as_str);

        self.exact.iter().any(|p| p == path)
            || self.contains.iter().any(|p| full.contains(p.as_str()))
    }
}

/// Credentials attached to an annotated request
#[derive(Debug, Clone, PartialEq)]
pub struct AuthContext {
    /// Access token current when the request arrived
    pub code: String,
    pub principal: Option<Principal>,
}

/// State for [`annotate_middleware`]
#[derive(Debug, Clone)]
pub struct AnnotatorState {
    credentials: Arc<CredentialState>,
    bypass: BypassRoutes,
}

impl AnnotatorState {
    #[must_use]
    pub fn new(credentials: Arc<CredentialState>) -> Self {
        Self { credentials, bypass: BypassRoutes::default() }
    }

    #[must_use]
    pub fn with_bypass(mut self, bypass: BypassRoutes) -> Self {
        self.bypass = bypass;
        self
    }
}

/// Annotate `request` in place; returns `true` if credentials were attached
pub fn annotate<B>(
    request: &mut axum::http::Request<B>,
    credentials: &CredentialState,
    bypass: &BypassRoutes,
) -> bool {
    if bypass.matches(request.uri()) {
        return false;
    }

    let snapshot = credentials.snapshot();
    let Some(code) = snapshot.access_token.filter(|token| !token.is_empty()) else {
        return false;
    };

    match replace_query(request.uri(), &code) {
        Ok(uri) => *request.uri_mut() = uri,
        Err(e) => warn!(error = %e, path = %request.uri().path(), "Could not rewrite query"),
    }

    request.extensions_mut().insert(AuthContext { code, principal: snapshot.principal });
    true
}

fn replace_query(uri: &Uri, code: &str) -> Result<Uri, axum::http::Error> {
    let path_and_query =
        PathAndQuery::try_from(format!("{}?code={}", uri.path(), urlencoding::encode(code)))?;

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(path_and_query);
    Ok(Uri::from_parts(parts)?)
}

/// axum middleware wrapper around [`annotate`]
pub async fn annotate_middleware(
    State(state): State<AnnotatorState>,
    mut request: Request,
    next: Next,
) -> Response {
    if annotate(&mut request, &state.credentials, &state.bypass) {
        debug!(path = %request.uri().path(), "Request annotated with credentials");
    }
    next.run(request).await
}

impl<S: Send + Sync> FromRequestParts<S> for AuthContext {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or((StatusCode::UNAUTHORIZED, "Not authorized with Salla"))
    }
}

impl<S: Send + Sync> OptionalFromRequestParts<S> for AuthContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<Self>().cloned())
    }
}
