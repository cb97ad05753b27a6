use quire_types::ObjectId;

use crate::error::{StoreError, StoreResult};
use crate::object::{CommitObject, ContentObject, StoredObject};

/// Append-only, content-addressed object store.
///
/// All implementations must satisfy these invariants:
/// - Objects are immutable once written and are never removed.
/// - The same data always produces the same ID; rewriting is a no-op.
/// - Concurrent reads are always safe.
/// - `read` returns exactly the object whose hash is `id`, or an error.
pub trait ObjectStore: Send + Sync {
    /// Read an object by its content-addressed ID.
    ///
    /// Returns `Ok(None)` if the object does not exist.
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>>;

    /// Write an object and return its content-addressed ID.
    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId>;

    /// Check whether an object exists in the store.
    fn exists(&self, id: &ObjectId) -> StoreResult<bool>;

    /// Read multiple objects in a batch.
    fn read_batch(&self, ids: &[ObjectId]) -> StoreResult<Vec<Option<StoredObject>>> {
        ids.iter().map(|id| self.read(id)).collect()
    }

    /// Write multiple objects in a batch and return their IDs.
    fn write_batch(&self, objects: &[StoredObject]) -> StoreResult<Vec<ObjectId>> {
        objects.iter().map(|obj| self.write(obj)).collect()
    }

    /// Store document text and return its content id.
    fn put_content(&self, text: &str) -> StoreResult<ObjectId> {
        self.write(&ContentObject::new(text).to_stored_object())
    }

    /// Load document text, failing with [`StoreError::NotFound`] if absent.
    fn get_content(&self, id: &ObjectId) -> StoreResult<ContentObject> {
        let obj = self.read(id)?.ok_or(StoreError::NotFound(*id))?;
        ContentObject::from_stored_object(&obj)
    }

    /// Store a commit header; the returned id is the commit's identifier.
    fn put_commit(&self, commit: &CommitObject) -> StoreResult<ObjectId> {
        self.write(&commit.to_stored_object()?)
    }

    /// Load a commit header, failing with [`StoreError::NotFound`] if absent.
    fn get_commit(&self, id: &ObjectId) -> StoreResult<CommitObject> {
        let obj = self.read(id)?.ok_or(StoreError::NotFound(*id))?;
        CommitObject::from_stored_object(&obj)
    }
}
