//! Merge engine for Quire.
//!
//! Implements a pure, line-based three-way merge. Edits made by each side
//! against a common base are grouped into clusters of overlapping base
//! ranges; clusters touched by one side apply automatically, clusters where
//! both sides agree apply once, and everything else becomes a [`Conflict`]
//! carrying both variants. Conflicts are never resolved silently.

pub mod error;
pub mod options;
pub mod three_way;

pub use error::{MergeError, MergeResult};
pub use options::MergeOptions;
pub use three_way::{merge, Conflict, MergeOutcome};
