//! Embedding API for Quire.
//!
//! [`Engine`] ties the object store, commit graph, document registry, and
//! pull request store together behind one set of operations: create, save,
//! fork, pull upstream, request and resolve merges.

pub mod config;
pub mod error;
pub mod locks;
pub mod repository;
pub mod types;

pub use config::EngineConfig;
pub use error::{EngineError, EngineResult, ErrorKind};
pub use locks::DocumentLocks;
pub use repository::Engine;
pub use types::{
    CommitSummary, DocumentSummary, DocumentView, ForkResult, MergeRequested, NewDocument,
    PullOutcome, SaveResult, VerifyReport, INITIAL_COMMIT_MESSAGE, PULL_REQUEST_SENT,
};

// Re-export key types
pub use quire_diff::{DiffResult, Hunk, HunkTag, LineRange};
pub use quire_merge::{Conflict, MergeOptions};
pub use quire_refs::Upstream;
pub use quire_review::{AuditAction, AuditEntry, AuditTrail, PullRequest, PullRequestStatus};
pub use quire_types::{
    CommitId, Decision, DocumentName, DocumentRef, PullRequestId, TemporalAnchor, TypeError,
    UserId, Visibility,
};
