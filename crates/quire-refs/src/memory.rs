//! In-memory document registry.
//!
//! [`InMemoryDocumentRegistry`] stores all records in a `HashMap` protected
//! by a `RwLock`. Lookups take the read lock, so listing and opening
//! documents never block each other; head updates take the write lock for
//! the duration of the compare-and-swap.

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::{debug, warn};

use quire_types::{CommitId, DocumentRef, TemporalAnchor, UserId};

use crate::error::{RegistryError, Result};
use crate::traits::RegistryStore;
use crate::types::DocumentRecord;

/// An in-memory implementation of [`RegistryStore`].
#[derive(Debug, Default)]
pub struct InMemoryDocumentRegistry {
    records: RwLock<HashMap<DocumentRef, DocumentRecord>>,
}

impl InMemoryDocumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered documents.
    pub fn len(&self) -> usize {
        self.records.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Check the current head against the caller's expectation.
fn check_head(record: &DocumentRecord, expected: CommitId) -> Result<()> {
    if record.head != expected {
        warn!(
            document = %record.reference,
            expected = %expected.short_hex(),
            actual = %record.head.short_hex(),
            "rejected stale head update"
        );
        return Err(RegistryError::HeadMoved {
            document: record.reference.clone(),
            expected,
            actual: record.head,
        });
    }
    Ok(())
}

impl RegistryStore for InMemoryDocumentRegistry {
    fn get(&self, document: &DocumentRef) -> Result<Option<DocumentRecord>> {
        let records = self.records.read().expect("lock poisoned");
        Ok(records.get(document).cloned())
    }

    fn insert(&self, record: DocumentRecord) -> Result<()> {
        let mut records = self.records.write().expect("lock poisoned");
        if records.contains_key(&record.reference) {
            return Err(RegistryError::AlreadyExists {
                document: record.reference,
            });
        }
        debug!(document = %record.reference, fork = record.is_fork(), "registered document");
        records.insert(record.reference.clone(), record);
        Ok(())
    }

    fn compare_and_swap_head(
        &self,
        document: &DocumentRef,
        expected: CommitId,
        new: CommitId,
        at: TemporalAnchor,
    ) -> Result<DocumentRecord> {
        let mut records = self.records.write().expect("lock poisoned");
        let record = records
            .get_mut(document)
            .ok_or_else(|| RegistryError::NotFound {
                document: document.clone(),
            })?;
        check_head(record, expected)?;

        record.head = new;
        record.updated_at = at;
        debug!(document = %document, head = %new.short_hex(), "advanced head");
        Ok(record.clone())
    }

    fn advance_fork(
        &self,
        document: &DocumentRef,
        expected_head: CommitId,
        new_head: CommitId,
        new_base: CommitId,
        at: TemporalAnchor,
    ) -> Result<DocumentRecord> {
        let mut records = self.records.write().expect("lock poisoned");
        let record = records
            .get_mut(document)
            .ok_or_else(|| RegistryError::NotFound {
                document: document.clone(),
            })?;
        check_head(record, expected_head)?;
        let Some(upstream) = record.upstream.as_mut() else {
            return Err(RegistryError::NotAFork {
                document: document.clone(),
            });
        };

        upstream.base = new_base;
        record.head = new_head;
        record.updated_at = at;
        debug!(
            document = %document,
            head = %new_head.short_hex(),
            base = %new_base.short_hex(),
            "advanced fork"
        );
        Ok(record.clone())
    }

    fn list_owned(&self, owner: &UserId) -> Result<Vec<DocumentRecord>> {
        let records = self.records.read().expect("lock poisoned");
        let mut result: Vec<DocumentRecord> = records
            .values()
            .filter(|r| &r.reference.owner == owner)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.reference.name.cmp(&b.reference.name));
        Ok(result)
    }

    fn list_forks_of(&self, source: &DocumentRef) -> Result<Vec<DocumentRecord>> {
        let records = self.records.read().expect("lock poisoned");
        let mut result: Vec<DocumentRecord> = records
            .values()
            .filter(|r| r.upstream.as_ref().is_some_and(|u| &u.source == source))
            .cloned()
            .collect();
        result.sort_by(|a, b| a.reference.owner.cmp(&b.reference.owner));
        Ok(result)
    }
}
