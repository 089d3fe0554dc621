//! Unsplash API client error types.

use std::sync::Arc;

use pixcache_core::RemoteError;

/// Errors from the Unsplash search client.
#[derive(Debug, thiserror::Error)]
pub enum UnsplashError {
    /// No access key configured.
    #[error("missing access key: PIXCACHE_UNSPLASH_ACCESS_KEY not set")]
    MissingAccessKey,

    /// Invalid search query.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Page numbers start at 1.
    #[error("invalid page: must be at least 1")]
    InvalidPage,

    /// Invalid per_page parameter (must be 1-30).
    #[error("invalid per_page: must be 1-30")]
    InvalidPerPage,

    /// Authentication failed (invalid access key).
    #[error("authentication failed: invalid access key")]
    AuthError,

    /// Rate limited by the API (403, 429, or remaining quota at zero).
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// HTTP error response.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for UnsplashError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { UnsplashError::Timeout } else { UnsplashError::Network(Arc::new(err)) }
    }
}

impl From<UnsplashError> for RemoteError {
    fn from(err: UnsplashError) -> Self {
        match err {
            UnsplashError::RateLimited(msg) => RemoteError::RateLimited(msg),
            other => RemoteError::GeneralFailure(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = UnsplashError::MissingAccessKey;
        assert!(err.to_string().contains("access key"));

        let err = UnsplashError::InvalidQuery("test".to_string());
        assert!(err.to_string().contains("invalid query"));
    }

    #[test]
    fn test_classification_into_remote_error() {
        let limited: RemoteError = UnsplashError::RateLimited("quota".into()).into();
        assert_eq!(limited, RemoteError::RateLimited("quota".into()));

        for err in [UnsplashError::HttpError { status: 500 }, UnsplashError::Timeout, UnsplashError::AuthError] {
            assert!(matches!(RemoteError::from(err), RemoteError::GeneralFailure(_)));
        }
    }
}
