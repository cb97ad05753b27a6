//! Line splitting and line ranges.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Split text into lines, keeping each line's terminating `\n`.
///
/// Keeping terminators means joining the lines reproduces the input exactly,
/// including a missing newline at end of file.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

/// Concatenate lines produced by [`split_lines`].
pub fn join_lines<S: AsRef<str>>(lines: &[S]) -> String {
    let mut out = String::with_capacity(lines.iter().map(|l| l.as_ref().len()).sum());
    for line in lines {
        out.push_str(line.as_ref());
    }
    out
}

/// A 0-based, half-open range of line indices.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "inverted line range {start}..{end}");
        Self { start, end }
    }

    /// An empty range positioned before line `at`.
    pub fn empty(at: usize) -> Self {
        Self { start: at, end: at }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Overlap between two edited ranges.
    ///
    /// Two non-empty ranges overlap when they intersect. An empty range at
    /// `k` (an insertion point) overlaps `[s, e)` when `s <= k < e`. Two
    /// insertion points overlap when they are equal. Adjacent ranges never
    /// overlap.
    pub fn overlaps(&self, other: &LineRange) -> bool {
        match (self.is_empty(), other.is_empty()) {
            (true, true) => self.start == other.start,
            (true, false) => other.start <= self.start && self.start < other.end,
            (false, true) => self.start <= other.start && other.start < self.end,
            (false, false) => self.start < other.end && other.start < self.end,
        }
    }

    /// Smallest range covering both.
    pub fn union(&self, other: &LineRange) -> LineRange {
        LineRange::new(self.start.min(other.start), self.end.max(other.end))
    }
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_keeps_terminators() {
        assert_eq!(split_lines("a\nb\n"), vec!["a\n", "b\n"]);
        assert_eq!(split_lines("a\nb"), vec!["a\n", "b"]);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn join_reverses_split() {
        for text in ["", "a", "a\n", "a\r\nb\n\nc"] {
            assert_eq!(join_lines(&split_lines(text)), text);
        }
    }

    #[test]
    fn non_empty_ranges_overlap_when_intersecting() {
        let a = LineRange::new(2, 5);
        assert!(a.overlaps(&LineRange::new(4, 6)));
        assert!(a.overlaps(&LineRange::new(0, 3)));
        assert!(!a.overlaps(&LineRange::new(5, 7)));
        assert!(!a.overlaps(&LineRange::new(0, 2)));
    }

    #[test]
    fn insertion_point_overlaps_covering_range() {
        let edit = LineRange::new(2, 5);
        assert!(LineRange::empty(2).overlaps(&edit));
        assert!(LineRange::empty(4).overlaps(&edit));
        assert!(!LineRange::empty(5).overlaps(&edit));
        assert!(edit.overlaps(&LineRange::empty(3)));
    }

    #[test]
    fn insertion_points_overlap_only_when_equal() {
        assert!(LineRange::empty(3).overlaps(&LineRange::empty(3)));
        assert!(!LineRange::empty(3).overlaps(&LineRange::empty(4)));
    }

    #[test]
    fn union_covers_both() {
        let u = LineRange::new(2, 4).union(&LineRange::empty(7));
        assert_eq!(u, LineRange::new(2, 7));
        assert_eq!(u.len(), 5);
        assert_eq!(u.to_string(), "2..7");
    }
}
