//! API-specific error types
//!
//! Every facade call fails with one [`ApiError`]; [`ApiError::kind`] gives
//! the coarse classification callers branch on.

use salla_auth::TokenManagerError;
use thiserror::Error;

use crate::transport::TransportError;

/// Coarse classification of [`ApiError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Network failure or non-success status; credentials were reset
    Fetch,
    /// Response body was not JSON; credentials untouched
    Parse,
    /// Refresh exchange rejected; credentials were reset
    Refresh,
    /// Bad request body or client setup
    Config,
}

/// API operation errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}: {source}")]
    FetchFailed {
        message: String,
        #[source]
        source: TransportError,
    },

    #[error("{message}: {source}")]
    ParseFailed {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    RefreshFailed(#[from] TokenManagerError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request body: {0}")]
    InvalidBody(#[source] serde_json::Error),
}

impl ApiError {
    /// Get the error kind for this error
    #[must_use]
    pub fn kind(&self) -> ApiErrorKind {
        match self {
            Self::FetchFailed { .. } => ApiErrorKind::Fetch,
            Self::ParseFailed { .. } => ApiErrorKind::Parse,
            Self::RefreshFailed(_) => ApiErrorKind::Refresh,
            Self::Config(_) | Self::InvalidBody(_) => ApiErrorKind::Config,
        }
    }

    /// Whether the credential state was cleared before this error surfaced
    #[must_use]
    pub fn credentials_reset(&self) -> bool {
        matches!(self.kind(), ApiErrorKind::Fetch | ApiErrorKind::Refresh)
    }

    /// HTTP status of the failed call, if the remote answered
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::FetchFailed { source, .. } => source.status(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use salla_auth::OAuthClientError;

    use super::*;

    fn fetch_failed(status: u16) -> ApiError {
        ApiError::FetchFailed {
            message: "Fetch failed".to_string(),
            source: TransportError::Status { status, body: "nope".to_string() },
        }
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(fetch_failed(401).kind(), ApiErrorKind::Fetch);

        let parse = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        let err = ApiError::ParseFailed { message: "Parse failed".to_string(), source: parse };
        assert_eq!(err.kind(), ApiErrorKind::Parse);
        assert!(!err.credentials_reset());

        let refresh = ApiError::from(TokenManagerError::RefreshFailed {
            message: "Error Refreshing Your Token".to_string(),
            source: OAuthClientError::NoRefreshToken,
        });
        assert_eq!(refresh.kind(), ApiErrorKind::Refresh);
        assert!(refresh.credentials_reset());

        assert_eq!(ApiError::Config("missing".to_string()).kind(), ApiErrorKind::Config);
    }

    #[test]
    fn test_fetch_failed_status_and_message() {
        let err = fetch_failed(404);

        assert_eq!(err.status(), Some(404));
        assert!(err.credentials_reset());
        assert_eq!(err.to_string(), "Fetch failed: HTTP 404: nope");
    }
}
