//! Document registry for Quire.
//!
//! The registry holds one [`DocumentRecord`] per `(owner, name)` key. A record
//! names the document's head commit and, for forks, the [`Upstream`] it was
//! copied from together with the upstream commit it last synchronized with.
//!
//! # Architecture
//!
//! - **Heads** are mutable pointers to the newest commit in a document's log.
//!   They only move through [`RegistryStore::compare_and_swap_head`] or
//!   [`RegistryStore::advance_fork`], so a writer holding a stale head is
//!   rejected instead of silently overwriting a newer commit.
//! - **Upstream linkage** is fixed at fork time except for its base, which
//!   advances when the fork pulls from upstream.
//! - Records are never deleted.
//!
//! # Modules
//!
//! - [`error`]: Error types for registry operations
//! - [`types`]: [`DocumentRecord`] and [`Upstream`]
//! - [`traits`]: The [`RegistryStore`] trait defining the storage interface
//! - [`memory`]: In-memory [`InMemoryDocumentRegistry`]

pub mod error;
pub mod memory;
pub mod traits;
pub mod types;

pub use error::{RegistryError, Result};
pub use memory::InMemoryDocumentRegistry;
pub use traits::RegistryStore;
pub use types::{DocumentRecord, Upstream};
