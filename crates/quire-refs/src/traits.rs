//! The [`RegistryStore`] trait defining the registry storage interface.

use quire_types::{CommitId, DocumentRef, TemporalAnchor, UserId};

use crate::error::Result;
use crate::types::DocumentRecord;

/// Storage backend for document records.
///
/// Implementations must be thread-safe (`Send + Sync`). Every head write is a
/// compare-and-swap against the head the caller last observed; records are
/// never removed.
pub trait RegistryStore: Send + Sync {
    /// Read a record by key. Returns `Ok(None)` if no such document exists.
    fn get(&self, document: &DocumentRef) -> Result<Option<DocumentRecord>>;

    /// Register a new document. Fails with `AlreadyExists` if the key is taken.
    fn insert(&self, record: DocumentRecord) -> Result<()>;

    /// Move the head from `expected` to `new`.
    ///
    /// Fails with `HeadMoved` if the current head is not `expected`.
    fn compare_and_swap_head(
        &self,
        document: &DocumentRef,
        expected: CommitId,
        new: CommitId,
        at: TemporalAnchor,
    ) -> Result<DocumentRecord>;

    /// Move a fork's head and its upstream base in one step.
    ///
    /// Fails with `HeadMoved` if the head is not `expected_head`, or with
    /// `NotAFork` if the document has no upstream.
    fn advance_fork(
        &self,
        document: &DocumentRef,
        expected_head: CommitId,
        new_head: CommitId,
        new_base: CommitId,
        at: TemporalAnchor,
    ) -> Result<DocumentRecord>;

    /// All documents owned by `owner`, sorted by name.
    fn list_owned(&self, owner: &UserId) -> Result<Vec<DocumentRecord>>;

    /// All forks whose upstream source is `source`, sorted by owner.
    fn list_forks_of(&self, source: &DocumentRef) -> Result<Vec<DocumentRecord>>;

    /// Read a record, failing with `NotFound` if it does not exist.
    fn require(&self, document: &DocumentRef) -> Result<DocumentRecord> {
        self.get(document)?
            .ok_or_else(|| crate::error::RegistryError::NotFound {
                document: document.clone(),
            })
    }

    /// Returns `true` if a document is registered under this key.
    fn contains(&self, document: &DocumentRef) -> Result<bool> {
        Ok(self.get(document)?.is_some())
    }
}
