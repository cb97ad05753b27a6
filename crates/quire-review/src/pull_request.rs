//! Pull request records and their state machine.

use std::fmt;

use serde::{Deserialize, Serialize};

use quire_types::{CommitId, DocumentRef, PullRequestId, TemporalAnchor, UserId};

use crate::error::{ReviewError, ReviewResult};

/// Lifecycle status of a pull request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestStatus {
    Pending,
    Accepted,
    Declined,
}

impl PullRequestStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for PullRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Accepted => write!(f, "accepted"),
            Self::Declined => write!(f, "declined"),
        }
    }
}

/// A request to merge a fork commit into the fork's upstream document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub id: PullRequestId,
    pub requester: UserId,
    /// The fork the change comes from.
    pub source: DocumentRef,
    /// The upstream document the change should land in.
    pub target: DocumentRef,
    /// The fork commit to merge.
    pub source_commit: CommitId,
    /// The fork's upstream base when the request was made.
    pub base: CommitId,
    pub message: Option<String>,
    pub status: PullRequestStatus,
    pub owner_message: Option<String>,
    pub created_at: TemporalAnchor,
    pub resolved_at: Option<TemporalAnchor>,
    /// The merge commit on the target, once accepted.
    pub merge_commit: Option<CommitId>,
}

impl PullRequest {
    /// A new pending pull request.
    pub fn new(
        requester: UserId,
        source: DocumentRef,
        target: DocumentRef,
        source_commit: CommitId,
        base: CommitId,
        message: Option<String>,
        created_at: TemporalAnchor,
    ) -> Self {
        Self {
            id: PullRequestId::new(),
            requester,
            source,
            target,
            source_commit,
            base,
            message,
            status: PullRequestStatus::Pending,
            owner_message: None,
            created_at,
            resolved_at: None,
            merge_commit: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == PullRequestStatus::Pending
    }

    /// Fail with `AlreadyResolved` unless the request is still pending.
    pub fn ensure_pending(&self) -> ReviewResult<()> {
        if self.status.is_terminal() {
            return Err(ReviewError::AlreadyResolved {
                id: self.id,
                status: self.status,
            });
        }
        Ok(())
    }

    /// Transition to `accepted`, recording the merge commit on the target.
    pub fn accept(
        &mut self,
        owner_message: Option<String>,
        merge_commit: CommitId,
        at: TemporalAnchor,
    ) -> ReviewResult<()> {
        self.resolve(PullRequestStatus::Accepted, owner_message, at)?;
        self.merge_commit = Some(merge_commit);
        Ok(())
    }

    /// Transition to `declined`.
    pub fn decline(&mut self, owner_message: Option<String>, at: TemporalAnchor) -> ReviewResult<()> {
        self.resolve(PullRequestStatus::Declined, owner_message, at)
    }

    fn resolve(
        &mut self,
        status: PullRequestStatus,
        owner_message: Option<String>,
        at: TemporalAnchor,
    ) -> ReviewResult<()> {
        self.ensure_pending()?;
        self.status = status;
        self.owner_message = owner_message;
        self.resolved_at = Some(at);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_types::ObjectId;

    fn cid(byte: u8) -> CommitId {
        CommitId::from_object_id(ObjectId::from_hash([byte; 32]))
    }

    fn pending() -> PullRequest {
        let target = DocumentRef::parse("sim", "notes").unwrap();
        let requester = UserId::new("tim").unwrap();
        PullRequest::new(
            requester.clone(),
            target.with_owner(requester),
            target,
            cid(2),
            cid(1),
            Some("fix typo".into()),
            TemporalAnchor::new(100, 0, 0),
        )
    }

    #[test]
    fn new_request_is_pending() {
        let pr = pending();
        assert!(pr.is_pending());
        assert!(pr.ensure_pending().is_ok());
        assert!(pr.resolved_at.is_none());
        assert!(pr.merge_commit.is_none());
    }

    #[test]
    fn accept_records_merge_commit() {
        let mut pr = pending();
        pr.accept(Some("thanks".into()), cid(9), TemporalAnchor::new(200, 0, 0))
            .unwrap();
        assert_eq!(pr.status, PullRequestStatus::Accepted);
        assert_eq!(pr.merge_commit, Some(cid(9)));
        assert_eq!(pr.owner_message.as_deref(), Some("thanks"));
        assert_eq!(pr.resolved_at, Some(TemporalAnchor::new(200, 0, 0)));
    }

    #[test]
    fn decline_leaves_merge_commit_empty() {
        let mut pr = pending();
        pr.decline(None, TemporalAnchor::new(200, 0, 0)).unwrap();
        assert_eq!(pr.status, PullRequestStatus::Declined);
        assert!(pr.merge_commit.is_none());
    }

    #[test]
    fn terminal_status_never_changes() {
        let mut pr = pending();
        pr.decline(Some("no".into()), TemporalAnchor::new(200, 0, 0))
            .unwrap();

        let err = pr
            .accept(None, cid(9), TemporalAnchor::new(300, 0, 0))
            .unwrap_err();
        assert!(matches!(
            err,
            ReviewError::AlreadyResolved {
                status: PullRequestStatus::Declined,
                ..
            }
        ));
        assert_eq!(pr.status, PullRequestStatus::Declined);
        assert_eq!(pr.owner_message.as_deref(), Some("no"));
        assert!(pr.decline(None, TemporalAnchor::new(400, 0, 0)).is_err());
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(PullRequestStatus::Accepted).unwrap(),
            "accepted"
        );
        assert!(PullRequestStatus::Declined.is_terminal());
        assert!(!PullRequestStatus::Pending.is_terminal());
    }
}
