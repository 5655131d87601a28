use smartlist_models::ListId;
use smartlist_sources::{FailureKind, SourceError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("list storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("list storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum HostError {
    #[error("job host is not accepting work: {0}")]
    Unavailable(String),
}

/// Failure of a processing pass.
#[derive(Debug, Error)]
pub enum PassError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("list {0} does not exist")]
    ListMissing(ListId),

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl PassError {
    pub fn kind(&self) -> FailureKind {
        match self {
            PassError::Source(err) => err.kind(),
            PassError::ListMissing(_) => FailureKind::NotFound,
            PassError::Repository(_) => FailureKind::Unclassified,
        }
    }
}

#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Host(#[from] HostError),
}
