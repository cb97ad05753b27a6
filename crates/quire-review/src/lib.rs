//! Pull request workflow for Quire.
//!
//! A [`PullRequest`] proposes merging one commit of a fork into the fork's
//! upstream document. It starts `pending` and moves exactly once to
//! `accepted` or `declined`; after that it never changes. Every request,
//! decision, and rejected accept attempt is appended to the request's
//! [`AuditTrail`].
//!
//! # Modules
//!
//! - [`error`]: Error types for review operations
//! - [`pull_request`]: [`PullRequest`] and its [`PullRequestStatus`] state machine
//! - [`audit`]: [`AuditTrail`] and [`AuditEntry`]
//! - [`traits`]: The [`PullRequestStore`] trait
//! - [`memory`]: In-memory [`InMemoryPullRequestStore`]

pub mod audit;
pub mod error;
pub mod memory;
pub mod pull_request;
pub mod traits;

pub use audit::{AuditAction, AuditEntry, AuditTrail};
pub use error::{ReviewError, ReviewResult};
pub use memory::InMemoryPullRequestStore;
pub use pull_request::{PullRequest, PullRequestStatus};
pub use traits::PullRequestStore;
