//! Audit trail types.
//!
//! An [`AuditTrail`] records, in order, everything that happened to one pull
//! request: its creation, the owner's decision, and any accept attempt that
//! was rejected because the merge conflicted.

use std::fmt;

use serde::{Deserialize, Serialize};

use quire_types::{PullRequestId, TemporalAnchor, UserId};

/// What happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Requested,
    Accepted,
    Declined,
    /// An accept that failed because the merge conflicted.
    AcceptRejected,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Requested => write!(f, "requested"),
            Self::Accepted => write!(f, "accepted"),
            Self::Declined => write!(f, "declined"),
            Self::AcceptRejected => write!(f, "accept rejected"),
        }
    }
}

/// A single entry in an audit trail.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub action: AuditAction,
    /// Who triggered the event.
    pub actor: UserId,
    pub timestamp: TemporalAnchor,
    /// Human-readable summary of this entry.
    pub summary: String,
}

impl AuditEntry {
    pub fn new(
        action: AuditAction,
        actor: UserId,
        timestamp: TemporalAnchor,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            action,
            actor,
            timestamp,
            summary: summary.into(),
        }
    }
}

/// The full event history of one pull request, oldest first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrail {
    pub pull_request: PullRequestId,
    pub entries: Vec<AuditEntry>,
}

impl AuditTrail {
    pub fn new(pull_request: PullRequestId) -> Self {
        Self {
            pull_request,
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, entry: AuditEntry) {
        self.entries.push(entry);
    }

    pub fn last(&self) -> Option<&AuditEntry> {
        self.entries.last()
    }

    /// Returns all unique actors involved, sorted.
    pub fn actors(&self) -> Vec<UserId> {
        let mut actors: Vec<UserId> = self.entries.iter().map(|e| e.actor.clone()).collect();
        actors.sort();
        actors.dedup();
        actors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> UserId {
        UserId::new(name).unwrap()
    }

    #[test]
    fn empty_audit_trail() {
        let trail = AuditTrail::new(PullRequestId::new());
        assert!(trail.is_empty());
        assert_eq!(trail.len(), 0);
        assert!(trail.actors().is_empty());
        assert!(trail.last().is_none());
    }

    #[test]
    fn actors_deduplicates() {
        let mut trail = AuditTrail::new(PullRequestId::new());
        trail.push(AuditEntry::new(
            AuditAction::Requested,
            user("tim"),
            TemporalAnchor::new(1000, 0, 0),
            "tim requested a merge",
        ));
        trail.push(AuditEntry::new(
            AuditAction::AcceptRejected,
            user("sim"),
            TemporalAnchor::new(2000, 0, 0),
            "merge conflicted",
        ));
        trail.push(AuditEntry::new(
            AuditAction::Accepted,
            user("sim"),
            TemporalAnchor::new(3000, 0, 0),
            "accepted",
        ));
        assert_eq!(trail.actors(), vec![user("sim"), user("tim")]);
        assert_eq!(trail.last().unwrap().action, AuditAction::Accepted);
    }

    #[test]
    fn action_serializes_snake_case() {
        let json = serde_json::to_value(AuditAction::AcceptRejected).unwrap();
        assert_eq!(json, "accept_rejected");
        assert_eq!(AuditAction::AcceptRejected.to_string(), "accept rejected");
    }
}
