//! Display helpers: unified diff text and summary counts.

use std::fmt;

use serde::{Deserialize, Serialize};
use similar::TextDiff;

/// Summary of a diff for display ("3 changes").
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    /// Number of contiguous edits.
    pub changes: usize,
    pub additions: usize,
    pub deletions: usize,
}

impl fmt::Display for DiffStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.changes == 1 { "change" } else { "changes" };
        write!(
            f,
            "{} {noun} (+{} -{})",
            self.changes, self.additions, self.deletions
        )
    }
}

/// Render a unified diff of `other` against `base` with `context` lines
/// around each change. Identical inputs render as an empty string.
pub fn unified(base: &str, other: &str, context: usize) -> String {
    if base == other {
        return String::new();
    }
    TextDiff::from_lines(base, other)
        .unified_diff()
        .context_radius(context)
        .header("base", "other")
        .to_string()
}
