//! The [`PullRequestStore`] trait defining pull request storage.

use quire_types::{DocumentRef, PullRequestId, UserId};

use crate::audit::{AuditEntry, AuditTrail};
use crate::error::{ReviewError, ReviewResult};
use crate::pull_request::PullRequest;

/// Storage backend for pull requests and their audit trails.
///
/// Implementations must be thread-safe (`Send + Sync`). A stored request
/// that has reached a terminal status is never overwritten.
pub trait PullRequestStore: Send + Sync {
    /// Store a new request. Fails with `AlreadyExists` on a duplicate id.
    fn insert(&self, pull_request: PullRequest) -> ReviewResult<()>;

    /// Read a request. Returns `Ok(None)` if it does not exist.
    fn get(&self, id: &PullRequestId) -> ReviewResult<Option<PullRequest>>;

    /// Replace a pending request with its updated version.
    ///
    /// Fails with `AlreadyResolved` if the stored request is terminal.
    fn update(&self, pull_request: PullRequest) -> ReviewResult<()>;

    /// Requests targeting `document`, newest first.
    fn list_for_target(&self, document: &DocumentRef) -> ReviewResult<Vec<PullRequest>>;

    /// Requests made by `requester`, newest first.
    fn list_by_requester(&self, requester: &UserId) -> ReviewResult<Vec<PullRequest>>;

    /// Append an entry to a request's audit trail.
    fn record(&self, id: &PullRequestId, entry: AuditEntry) -> ReviewResult<()>;

    /// The audit trail of a request.
    fn audit(&self, id: &PullRequestId) -> ReviewResult<AuditTrail>;

    /// Read a request, failing with `NotFound` if it does not exist.
    fn require(&self, id: &PullRequestId) -> ReviewResult<PullRequest> {
        self.get(id)?.ok_or(ReviewError::NotFound(*id))
    }
}
