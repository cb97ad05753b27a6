//! Commit graph node types.
//!
//! Each [`CommitNode`] corresponds to one commit in a document's history and
//! tracks its parents via [`ParentRef`] edges. The [`ParentRelation`] enum
//! records whether the edge is the document's own previous commit or the
//! commit that was merged in.

use std::fmt;

use serde::{Deserialize, Serialize};

use quire_types::{CommitId, DocumentRef, ObjectId, TemporalAnchor, UserId};

/// Composite key of a node: the owning document plus the commit id.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeKey {
    pub document: DocumentRef,
    pub commit: CommitId,
}

impl NodeKey {
    pub fn new(document: DocumentRef, commit: CommitId) -> Self {
        Self { document, commit }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.document, self.commit.short_hex())
    }
}

/// A node in the commit graph. Immutable once added.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitNode {
    pub id: CommitId,
    /// The document whose log this commit belongs to.
    pub document: DocumentRef,
    pub author: UserId,
    pub timestamp: TemporalAnchor,
    /// Parent references (empty only for a document's root commit).
    pub parents: Vec<ParentRef>,
    pub metadata: CommitMetadata,
}

impl CommitNode {
    pub fn key(&self) -> NodeKey {
        NodeKey::new(self.document.clone(), self.id)
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn is_merge(&self) -> bool {
        self.parents
            .iter()
            .any(|p| p.relation == ParentRelation::Merge)
    }

    /// The previous commit in this document's own log.
    pub fn first_parent(&self) -> Option<&ParentRef> {
        self.parents
            .iter()
            .find(|p| p.relation == ParentRelation::Sequential)
    }

    pub fn parent_keys(&self) -> Vec<NodeKey> {
        self.parents.iter().map(ParentRef::key).collect()
    }

    /// Human-readable one-line summary.
    pub fn summary(&self) -> String {
        let kind = if self.is_merge() { "merge" } else { "commit" };
        match &self.metadata.message {
            Some(message) => format!(
                "{kind} {} by {} on {}: {message}",
                self.id.short_hex(),
                self.author,
                self.document
            ),
            None => format!(
                "{kind} {} by {} on {}",
                self.id.short_hex(),
                self.author,
                self.document
            ),
        }
    }
}

/// A reference to a parent node, with the kind of relationship.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRef {
    pub document: DocumentRef,
    pub commit: CommitId,
    pub relation: ParentRelation,
}

impl ParentRef {
    /// The previous commit in the same document.
    pub fn sequential(document: DocumentRef, commit: CommitId) -> Self {
        Self {
            document,
            commit,
            relation: ParentRelation::Sequential,
        }
    }

    /// The commit merged in, possibly from another document.
    pub fn merge(document: DocumentRef, commit: CommitId) -> Self {
        Self {
            document,
            commit,
            relation: ParentRelation::Merge,
        }
    }

    pub fn key(&self) -> NodeKey {
        NodeKey::new(self.document.clone(), self.commit)
    }
}

/// The kind of parent edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParentRelation {
    /// Previous commit in the same document's log.
    Sequential,
    /// The other side of a merge.
    Merge,
}

impl fmt::Display for ParentRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential => write!(f, "Sequential"),
            Self::Merge => write!(f, "Merge"),
        }
    }
}

/// Descriptive data carried alongside the graph structure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitMetadata {
    pub message: Option<String>,
    /// Id of the content snapshot this commit records.
    pub content: ObjectId,
}
