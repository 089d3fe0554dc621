//! Unified error types for pixcache.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

use crate::remote::RemoteError;

/// Unified error types for the pixcache engine and server.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty query).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// No cached item found for the given id.
    #[error("CACHE_MISS: {0}")]
    CacheMiss(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// A stored row could not be decoded.
    #[error("CACHE_ERROR: corrupt row: {0}")]
    CorruptRow(String),

    /// The remote search API refused the request because the quota is spent.
    #[error("RATE_LIMITED: {0}")]
    RateLimited(String),

    /// Network, server, or decoding failure from the remote search API.
    #[error("REMOTE_FAILURE: {0}")]
    RemoteFailure(String),

    /// No access key is configured for the remote search API.
    #[error("AUTH_ERROR: {0}")]
    AuthError(String),
}

impl Error {
    /// Whether this error came from the remote quota being exhausted.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::RateLimited(_))
    }

    /// Stable code string, matching the message prefix.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "INVALID_INPUT",
            Error::CacheMiss(_) => "CACHE_MISS",
            Error::Database(_) | Error::MigrationFailed(_) | Error::CorruptRow(_) => "CACHE_ERROR",
            Error::RateLimited(_) => "RATE_LIMITED",
            Error::RemoteFailure(_) => "REMOTE_FAILURE",
            Error::AuthError(_) => "AUTH_ERROR",
        }
    }

    /// Whether this error came from the remote source rather than the store.
    pub fn is_remote(&self) -> bool {
        matches!(self, Error::RateLimited(_) | Error::RemoteFailure(_))
    }
}

impl From<RemoteError> for Error {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::RateLimited(msg) => Error::RateLimited(msg),
            RemoteError::GeneralFailure(msg) => Error::RemoteFailure(msg),
        }
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::CacheMiss(msg) => (-32001, msg.clone()),
            Error::Database(e) => (-32002, e.to_string()),
            Error::MigrationFailed(msg) => (-32002, msg.clone()),
            Error::CorruptRow(msg) => (-32002, msg.clone()),
            Error::RemoteFailure(msg) => (-32008, msg.clone()),
            Error::AuthError(msg) => (-32009, msg.clone()),
            Error::RateLimited(msg) => (-32010, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}
