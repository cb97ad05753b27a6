//! Line diff engine for Quire.
//!
//! Compares two texts line by line with the Myers algorithm and produces an
//! ordered, deterministic sequence of hunks. The same hunks drive upstream
//! review, pull request review, and the three-way merge.
//!
//! # Key Types
//!
//! - [`DiffResult`] / [`Hunk`] / [`HunkTag`] -- Ordered hunks with line ranges
//! - [`Edit`] -- A contiguous replacement of base lines, used by merge
//! - [`LineRange`] -- 0-based half-open line range
//! - [`DiffStats`] -- Summary counts for display

pub mod line_diff;
pub mod lines;
pub mod unified;

pub use line_diff::{diff, DiffResult, Edit, Hunk, HunkTag};
pub use lines::{join_lines, split_lines, LineRange};
pub use unified::{unified, DiffStats};
