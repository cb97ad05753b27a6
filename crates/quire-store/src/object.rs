use serde::{Deserialize, Serialize};
use quire_crypto::ContentHasher;
use quire_types::{CommitId, DocumentRef, ObjectId, TemporalAnchor, UserId};

use crate::error::{StoreError, StoreResult};

/// The kind of object stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Full document text.
    Content,
    /// Canonical JSON commit header.
    Commit,
}

impl ObjectKind {
    fn hasher(&self) -> &'static ContentHasher {
        match self {
            Self::Content => &ContentHasher::CONTENT,
            Self::Commit => &ContentHasher::COMMIT,
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Content => write!(f, "content"),
            Self::Commit => write!(f, "commit"),
        }
    }
}

/// A stored object: kind tag + serialized data + cached size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    pub kind: ObjectKind,
    pub data: Vec<u8>,
    pub size: u64,
}

impl StoredObject {
    pub fn new(kind: ObjectKind, data: Vec<u8>) -> Self {
        let size = data.len() as u64;
        Self { kind, data, size }
    }

    /// Compute the content-addressed ID using the kind's hash domain.
    pub fn compute_id(&self) -> ObjectId {
        self.kind.hasher().hash(&self.data)
    }

    /// Whether the payload still hashes to `id`.
    pub fn verify(&self, id: &ObjectId) -> bool {
        self.kind.hasher().verify(&self.data, id)
    }

    fn expect_kind(&self, kind: ObjectKind) -> StoreResult<()> {
        if self.kind != kind {
            return Err(StoreError::CorruptObject {
                id: self.compute_id(),
                reason: format!("expected {kind}, got {}", self.kind),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

/// A document's full text at one point in its history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentObject {
    pub text: String,
}

impl ContentObject {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The id this content will be stored under.
    pub fn id(&self) -> ObjectId {
        ContentHasher::CONTENT.hash(self.text.as_bytes())
    }

    pub fn to_stored_object(&self) -> StoredObject {
        StoredObject::new(ObjectKind::Content, self.text.as_bytes().to_vec())
    }

    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        obj.expect_kind(ObjectKind::Content)?;
        let text = String::from_utf8(obj.data.clone()).map_err(|e| StoreError::CorruptObject {
            id: obj.compute_id(),
            reason: format!("content is not UTF-8: {e}"),
        })?;
        Ok(Self { text })
    }

    /// Number of lines, counting a trailing unterminated line.
    pub fn line_count(&self) -> usize {
        self.text.lines().count()
    }
}

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

/// A parent reference inside a commit header.
///
/// The first parent always lives in the committing document's own log. A
/// merge commit's second parent may point into another document's log,
/// which is why the document key travels with the id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentLink {
    pub document: DocumentRef,
    pub commit: CommitId,
}

impl ParentLink {
    pub fn new(document: DocumentRef, commit: CommitId) -> Self {
        Self { document, commit }
    }
}

/// Canonical commit header.
///
/// The commit id is `BLAKE3("quire-commit-v1:" || json(header))`. Field
/// order here is the canonical encoding order and must not change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitObject {
    pub document: DocumentRef,
    pub parents: Vec<ParentLink>,
    pub author: UserId,
    pub message: Option<String>,
    pub content: ObjectId,
    pub timestamp: TemporalAnchor,
}

impl CommitObject {
    /// Compute this header's commit id without storing it.
    pub fn id(&self) -> StoreResult<CommitId> {
        Ok(CommitId::from_object_id(self.to_stored_object()?.compute_id()))
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    pub fn to_stored_object(&self) -> StoreResult<StoredObject> {
        let data =
            serde_json::to_vec(self).map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(StoredObject::new(ObjectKind::Commit, data))
    }

    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        obj.expect_kind(ObjectKind::Commit)?;
        serde_json::from_slice(&obj.data).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}
