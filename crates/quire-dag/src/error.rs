//! Error types for the commit graph.

use quire_types::{CommitId, DocumentRef};

/// Errors that can occur during commit graph operations.
#[derive(Debug, thiserror::Error)]
pub enum DagError {
    /// A referenced commit was not found in the document's log.
    #[error("commit {commit:?} not found in {document}")]
    NodeNotFound {
        document: DocumentRef,
        commit: CommitId,
    },

    /// A parent reference points to a commit that does not exist.
    #[error("dangling parent: {node:?} references missing {parent:?} in {parent_document}")]
    DanglingParent {
        node: CommitId,
        parent: CommitId,
        parent_document: DocumentRef,
    },

    /// Attempted to add a commit that already exists in the document's log.
    #[error("duplicate commit {commit:?} in {document}")]
    DuplicateNode {
        document: DocumentRef,
        commit: CommitId,
    },

    /// The first parent must be a sequential parent in the same document.
    #[error("commit {node:?} in {document} has a first parent outside its own log")]
    ForeignParent {
        node: CommitId,
        document: DocumentRef,
    },

    /// Commits have at most two parents.
    #[error("commit {node:?} has {count} parents; at most 2 are allowed")]
    TooManyParents { node: CommitId, count: usize },

    /// A document's log already has a root; later commits need a parent.
    #[error("document {document} already has a root commit; {node:?} must have a parent")]
    SecondRoot {
        node: CommitId,
        document: DocumentRef,
    },

    /// A child was stamped before one of its parents.
    #[error("temporal ordering violation: {child:?} is not after parent {parent:?}")]
    TemporalViolation { child: CommitId, parent: CommitId },
}

/// Convenience alias for commit graph results.
pub type DagResult<T> = Result<T, DagError>;
