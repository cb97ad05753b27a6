//! Registry record types.
//!
//! A [`DocumentRecord`] is the mutable part of a document: everything else
//! (content, history) lives in the content store and commit graph and is
//! reached through the record's head.

use serde::{Deserialize, Serialize};
use quire_types::{CommitId, DocumentRef, TemporalAnchor, UserId, Visibility};

/// Upstream linkage of a fork.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upstream {
    /// The document this fork was copied from.
    pub source: DocumentRef,
    /// The upstream head at fork time or at the last successful pull.
    pub base: CommitId,
    /// The upstream head when the fork was created. Never changes.
    pub forked_at: CommitId,
}

/// The registry entry for one document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub reference: DocumentRef,
    pub description: String,
    pub visibility: Visibility,
    /// Newest commit in this document's own log.
    pub head: CommitId,
    /// Present only for forks.
    pub upstream: Option<Upstream>,
    pub created_at: TemporalAnchor,
    /// When the head last moved.
    pub updated_at: TemporalAnchor,
}

impl DocumentRecord {
    /// A new record whose head is the document's root commit.
    pub fn new(
        reference: DocumentRef,
        description: impl Into<String>,
        visibility: Visibility,
        root: CommitId,
        created_at: TemporalAnchor,
    ) -> Self {
        Self {
            reference,
            description: description.into(),
            visibility,
            head: root,
            upstream: None,
            created_at,
            updated_at: created_at,
        }
    }

    /// Attach upstream linkage, turning the record into a fork.
    pub fn with_upstream(mut self, source: DocumentRef, base: CommitId) -> Self {
        self.upstream = Some(Upstream {
            source,
            base,
            forked_at: base,
        });
        self
    }

    pub fn owner(&self) -> &UserId {
        &self.reference.owner
    }

    pub fn is_fork(&self) -> bool {
        self.upstream.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_types::ObjectId;

    fn cid(byte: u8) -> CommitId {
        CommitId::from_object_id(ObjectId::from_hash([byte; 32]))
    }

    #[test]
    fn new_record_is_not_a_fork() {
        let doc = DocumentRef::parse("sim", "notes").unwrap();
        let record = DocumentRecord::new(
            doc.clone(),
            "shopping list",
            Visibility::Public,
            cid(1),
            TemporalAnchor::new(10, 0, 0),
        );
        assert!(!record.is_fork());
        assert_eq!(record.head, cid(1));
        assert_eq!(record.owner().as_str(), "sim");
        assert_eq!(record.created_at, record.updated_at);
    }

    #[test]
    fn with_upstream_records_source_and_base() {
        let source = DocumentRef::parse("sim", "notes").unwrap();
        let fork = source.with_owner(UserId::new("tim").unwrap());
        let record = DocumentRecord::new(
            fork,
            "",
            Visibility::Private,
            cid(2),
            TemporalAnchor::new(10, 0, 0),
        )
        .with_upstream(source.clone(), cid(1));
        let upstream = record.upstream.as_ref().unwrap();
        assert_eq!(upstream.source, source);
        assert_eq!(upstream.base, cid(1));
        assert_eq!(upstream.forked_at, cid(1));
    }

    #[test]
    fn record_serializes_visibility_lowercase() {
        let record = DocumentRecord::new(
            DocumentRef::parse("sim", "notes").unwrap(),
            "",
            Visibility::Private,
            cid(1),
            TemporalAnchor::new(10, 0, 0),
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["visibility"], "private");
        assert!(json["upstream"].is_null());
    }
}
