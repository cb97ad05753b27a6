//! Foundation types for Quire.
//!
//! This crate provides the identity, key, and temporal types shared by every
//! other Quire crate. It has no knowledge of storage or merging.
//!
//! # Key Types
//!
//! - [`ObjectId`]: Content-addressed identifier (BLAKE3 hash)
//! - [`CommitId`]: Identifier of a commit in a document's history
//! - [`PullRequestId`]: UUID v7 pull request identifier
//! - [`UserId`] / [`DocumentName`] / [`DocumentRef`]: Validated document keys
//! - [`Visibility`] / [`Decision`]: Closed variants parsed at the boundary
//! - [`TemporalAnchor`] / [`HybridLogicalClock`]: Monotonic timestamps

pub mod clock;
pub mod commit;
pub mod error;
pub mod identity;
pub mod names;
pub mod object;
pub mod pull_request;
pub mod temporal;
pub mod variants;

pub use clock::HybridLogicalClock;
pub use commit::CommitId;
pub use error::TypeError;
pub use identity::{DocumentName, DocumentRef, UserId};
pub use object::ObjectId;
pub use pull_request::PullRequestId;
pub use temporal::TemporalAnchor;
pub use variants::{Decision, Visibility};
