//! Values accepted and returned by [`Engine`](crate::Engine) operations.

use serde::{Deserialize, Serialize};

use quire_merge::Conflict;
use quire_refs::{DocumentRecord, Upstream};
use quire_review::PullRequest;
use quire_types::{
    CommitId, DocumentName, DocumentRef, TemporalAnchor, UserId, Visibility,
};

/// Message recorded on a document's root commit when none is supplied.
pub const INITIAL_COMMIT_MESSAGE: &str = "Initial version";

/// Confirmation returned when a pull request is created.
pub const PULL_REQUEST_SENT: &str = "Pull request sent";

/// A request to create a document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewDocument {
    pub owner: UserId,
    pub name: DocumentName,
    pub description: String,
    pub visibility: Visibility,
    pub content: String,
    pub message: Option<String>,
}

impl NewDocument {
    /// An empty public document with no description.
    pub fn new(owner: UserId, name: DocumentName) -> Self {
        Self {
            owner,
            name,
            description: String::new(),
            visibility: Visibility::default(),
            content: String::new(),
            message: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn reference(&self) -> DocumentRef {
        DocumentRef::new(self.owner.clone(), self.name.clone())
    }
}

/// Public view of a document's registry record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub owner: UserId,
    pub name: DocumentName,
    pub description: String,
    pub visibility: Visibility,
    pub head: CommitId,
    pub upstream: Option<Upstream>,
    pub created_at: TemporalAnchor,
    pub updated_at: TemporalAnchor,
}

impl DocumentSummary {
    pub fn reference(&self) -> DocumentRef {
        DocumentRef::new(self.owner.clone(), self.name.clone())
    }

    pub fn is_fork(&self) -> bool {
        self.upstream.is_some()
    }
}

impl From<DocumentRecord> for DocumentSummary {
    fn from(record: DocumentRecord) -> Self {
        Self {
            owner: record.reference.owner,
            name: record.reference.name,
            description: record.description,
            visibility: record.visibility,
            head: record.head,
            upstream: record.upstream,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// A document together with its content at head.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentView {
    pub document: DocumentSummary,
    pub content: String,
}

/// Result of a save.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResult {
    pub commit: CommitId,
    pub document: DocumentSummary,
}

/// Result of a fork: the new document plus every document its owner holds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForkResult {
    pub fork: DocumentSummary,
    pub documents: Vec<DocumentSummary>,
}

/// Result of pulling upstream changes into a fork.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PullOutcome {
    /// Upstream has not moved since the fork's base.
    UpToDate,
    /// A merge commit was recorded on the fork.
    Merged { commit: CommitId, content: String },
    /// Nothing changed; the fork owner must resolve and save first.
    Conflicted {
        conflicts: Vec<Conflict>,
        /// Merged text with conflict markers, for display.
        preview: String,
    },
}

impl PullOutcome {
    pub fn is_conflicted(&self) -> bool {
        matches!(self, Self::Conflicted { .. })
    }
}

/// One line of a document's commit log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSummary {
    pub id: CommitId,
    pub author: UserId,
    pub message: Option<String>,
    pub timestamp: TemporalAnchor,
    pub parents: usize,
}

impl CommitSummary {
    pub fn is_merge(&self) -> bool {
        self.parents > 1
    }
}

/// Result of requesting a merge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRequested {
    pub pull_request: PullRequest,
    pub confirmation: String,
}

/// Result of an integrity check.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyReport {
    pub documents: usize,
    pub commits: usize,
    pub objects: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_document_builder() {
        let request = NewDocument::new(
            UserId::new("sim").unwrap(),
            DocumentName::new("notes").unwrap(),
        )
        .description("weekly notes")
        .visibility(Visibility::Private)
        .content("hello\n");
        assert_eq!(request.reference().to_string(), "sim/notes");
        assert_eq!(request.visibility, Visibility::Private);
        assert!(request.message.is_none());
    }

    #[test]
    fn pull_outcome_tagged_by_status() {
        let json = serde_json::to_value(PullOutcome::UpToDate).unwrap();
        assert_eq!(json["status"], "up_to_date");

        let json = serde_json::to_value(PullOutcome::Conflicted {
            conflicts: vec![],
            preview: String::new(),
        })
        .unwrap();
        assert_eq!(json["status"], "conflicted");
    }
}
