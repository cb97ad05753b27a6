//! Error types for the pull request workflow.

use quire_types::PullRequestId;

use crate::pull_request::PullRequestStatus;

/// Errors that can occur during review operations.
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    /// No pull request with this id exists.
    #[error("pull request not found: {0}")]
    NotFound(PullRequestId),

    /// A pull request with this id is already stored.
    #[error("pull request already exists: {0}")]
    AlreadyExists(PullRequestId),

    /// The pull request has already reached a terminal status.
    #[error("pull request {id} is already {status}")]
    AlreadyResolved {
        id: PullRequestId,
        status: PullRequestStatus,
    },
}

/// Convenience alias for review results.
pub type ReviewResult<T> = Result<T, ReviewError>;
