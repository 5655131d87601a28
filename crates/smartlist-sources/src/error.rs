use std::time::Duration;
use thiserror::Error;

/// Closed classification of collaborator failures, driving recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The upstream list no longer exists
    NotFound,
    /// Credentials rejected, access denied, or the account is locked
    AuthFailure,
    /// A parameter was out of range; benign for the current cycle
    InvalidArgument,
    /// Anything else; left to the caller's retry policy
    Unclassified,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    /// HTTP 423: the upstream account is locked
    #[error("account locked: {0}")]
    Locked(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl SourceError {
    /// Map a non-success HTTP status to its structured error.
    pub fn from_status(status: u16, body: String, retry_after: Option<Duration>) -> Self {
        match status {
            401 => SourceError::Unauthorized(body),
            403 => SourceError::Forbidden(body),
            404 => SourceError::NotFound(body),
            422 => SourceError::InvalidArgument(body),
            423 => SourceError::Locked(body),
            429 => SourceError::RateLimited { retry_after },
            _ => SourceError::Http { status, body },
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            SourceError::NotFound(_) => FailureKind::NotFound,
            SourceError::Unauthorized(_) | SourceError::Forbidden(_) | SourceError::Locked(_) => {
                FailureKind::AuthFailure
            }
            SourceError::InvalidArgument(_) => FailureKind::InvalidArgument,
            SourceError::RateLimited { .. }
            | SourceError::Http { .. }
            | SourceError::Transport(_)
            | SourceError::Decode(_) => FailureKind::Unclassified,
        }
    }
}
