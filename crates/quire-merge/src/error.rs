//! Error types for the merge engine.

/// Errors that can occur when consuming a merge outcome.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// The merge produced conflicts that must be resolved by hand.
    #[error("merge has {count} unresolved conflict(s)")]
    Conflicted { count: usize },
}

/// Convenience alias for merge results.
pub type MergeResult<T> = Result<T, MergeError>;
