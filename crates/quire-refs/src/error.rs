//! Error types for registry operations.

use quire_types::{CommitId, DocumentRef};
use thiserror::Error;

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No document is registered under this key.
    #[error("document not found: {document}")]
    NotFound { document: DocumentRef },

    /// A document with this key already exists.
    #[error("document already exists: {document}")]
    AlreadyExists { document: DocumentRef },

    /// The head moved since the caller last read it.
    #[error("head of {document} moved: expected {expected}, found {actual}")]
    HeadMoved {
        document: DocumentRef,
        expected: CommitId,
        actual: CommitId,
    },

    /// The operation requires a fork but the document has no upstream.
    #[error("document is not a fork: {document}")]
    NotAFork { document: DocumentRef },
}

/// Convenience type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
