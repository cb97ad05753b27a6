use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use quire_merge::Conflict;
use quire_refs::RegistryError;
use quire_review::{PullRequestStatus, ReviewError};
use quire_types::{CommitId, DocumentRef, PullRequestId, TypeError};

/// Coarse classification of an [`EngineError`], used at the HTTP boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    Conflict,
    InvalidState,
    Validation,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotFound => "not_found",
            Self::AlreadyExists => "already_exists",
            Self::Conflict => "conflict",
            Self::InvalidState => "invalid_state",
            Self::Validation => "validation",
            Self::Internal => "internal",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("document not found: {0}")]
    DocumentNotFound(DocumentRef),

    #[error("commit not found: {0}")]
    CommitNotFound(CommitId),

    #[error("commit {commit} is not in the history of {document}")]
    CommitNotInDocument {
        commit: CommitId,
        document: DocumentRef,
    },

    #[error("pull request not found: {0}")]
    PullRequestNotFound(PullRequestId),

    #[error("document already exists: {0}")]
    DocumentExists(DocumentRef),

    #[error("head of {document} moved: expected {expected}, found {actual}; reload and retry")]
    HeadMoved {
        document: DocumentRef,
        expected: CommitId,
        actual: CommitId,
    },

    #[error("merge has {} conflicting region(s)", .conflicts.len())]
    MergeConflict { conflicts: Vec<Conflict> },

    #[error("pull request {id} is already {status}")]
    AlreadyResolved {
        id: PullRequestId,
        status: PullRequestStatus,
    },

    #[error("document is not a fork: {0}")]
    NotAFork(DocumentRef),

    #[error("invalid request: {0}")]
    Validation(String),

    #[error("invalid input: {0}")]
    Type(#[from] TypeError),

    #[error("corrupted repository state: {0}")]
    Corrupted(String),

    #[error("store error: {0}")]
    Store(#[from] quire_store::StoreError),

    #[error("commit graph error: {0}")]
    Dag(#[from] quire_dag::DagError),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DocumentNotFound(_)
            | Self::CommitNotFound(_)
            | Self::CommitNotInDocument { .. }
            | Self::PullRequestNotFound(_) => ErrorKind::NotFound,
            Self::DocumentExists(_) => ErrorKind::AlreadyExists,
            Self::HeadMoved { .. } | Self::MergeConflict { .. } => ErrorKind::Conflict,
            Self::AlreadyResolved { .. } => ErrorKind::InvalidState,
            Self::NotAFork(_) | Self::Validation(_) | Self::Type(_) => ErrorKind::Validation,
            Self::Corrupted(_) | Self::Store(_) | Self::Dag(_) => ErrorKind::Internal,
        }
    }

    /// Conflicting regions, when this error is a merge conflict.
    pub fn conflicts(&self) -> Option<&[Conflict]> {
        match self {
            Self::MergeConflict { conflicts } => Some(conflicts),
            _ => None,
        }
    }
}

impl From<RegistryError> for EngineError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound { document } => Self::DocumentNotFound(document),
            RegistryError::AlreadyExists { document } => Self::DocumentExists(document),
            RegistryError::HeadMoved {
                document,
                expected,
                actual,
            } => Self::HeadMoved {
                document,
                expected,
                actual,
            },
            RegistryError::NotAFork { document } => Self::NotAFork(document),
        }
    }
}

impl From<ReviewError> for EngineError {
    fn from(err: ReviewError) -> Self {
        match err {
            ReviewError::NotFound(id) => Self::PullRequestNotFound(id),
            ReviewError::AlreadyResolved { id, status } => Self::AlreadyResolved { id, status },
            ReviewError::AlreadyExists(id) => {
                Self::Corrupted(format!("pull request id {id} allocated twice"))
            }
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
