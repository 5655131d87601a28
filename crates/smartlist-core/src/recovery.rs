use smartlist_sources::FailureKind;

/// What a failed pass does about its list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Drop the persisted record; the upstream list is gone
    DeleteList,
    /// Set `process = false` until an operator resumes the list
    PauseList,
    /// Treat the pass as a no-op
    Ignore,
    /// Hand the error back to the job host's retry policy
    Propagate,
}

impl RecoveryAction {
    pub fn for_failure(kind: FailureKind) -> Self {
        match kind {
            FailureKind::NotFound => RecoveryAction::DeleteList,
            FailureKind::AuthFailure => RecoveryAction::PauseList,
            FailureKind::InvalidArgument => RecoveryAction::Ignore,
            FailureKind::Unclassified => RecoveryAction::Propagate,
        }
    }
}

impl From<FailureKind> for RecoveryAction {
    fn from(kind: FailureKind) -> Self {
        Self::for_failure(kind)
    }
}
