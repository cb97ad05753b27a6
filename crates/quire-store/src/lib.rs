//! Content-addressed object storage for Quire.
//!
//! Every document content snapshot and every commit header is stored as an
//! immutable object identified by its BLAKE3 hash (domain-separated by
//! object kind). Commit ids are therefore the content addresses of their
//! headers.
//!
//! # Object Types
//!
//! - [`ContentObject`] -- a document's full text at one point in history
//! - [`CommitObject`] -- canonical commit header referencing content and parents
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written; there is no delete.
//! 2. Writes are idempotent: identical bytes map to the same id.
//! 3. Concurrent reads are always safe.
//! 4. The store never interprets object contents.

pub mod error;
pub mod memory;
pub mod object;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryObjectStore;
pub use object::{CommitObject, ContentObject, ObjectKind, ParentLink, StoredObject};
pub use traits::ObjectStore;
