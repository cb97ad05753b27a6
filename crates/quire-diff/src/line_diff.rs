//! Line-level diff: ordered hunks between a base text and another text.
//!
//! Uses the `similar` crate (Myers diff algorithm). A replacement is
//! reported as a `delete` hunk immediately followed by an `insert` hunk
//! positioned at the end of the deleted range, so hunks are always in base
//! order and their `old` ranges tile the base text.

use serde::{Deserialize, Serialize};
use similar::{capture_diff_slices, Algorithm, DiffTag};

use crate::lines::{split_lines, LineRange};
use crate::unified::DiffStats;

/// Kind of a hunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HunkTag {
    /// Lines present unchanged on both sides.
    Equal,
    /// Lines only in the other text.
    Insert,
    /// Lines only in the base text.
    Delete,
    /// A region where two diverging edits disagree (produced by merge).
    Conflict,
}

/// A contiguous run of lines sharing one tag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hunk {
    pub tag: HunkTag,
    /// Range in the base text.
    pub old: LineRange,
    /// Range in the other text.
    pub new: LineRange,
    /// The lines this hunk carries, terminators included: base lines for
    /// `equal` and `delete`, other lines for `insert`, rendered text for
    /// `conflict`.
    pub lines: Vec<String>,
}

impl Hunk {
    pub fn new(tag: HunkTag, old: LineRange, new: LineRange, lines: Vec<String>) -> Self {
        Self {
            tag,
            old,
            new,
            lines,
        }
    }

    pub fn is_change(&self) -> bool {
        self.tag != HunkTag::Equal
    }

    pub fn text(&self) -> String {
        self.lines.concat()
    }
}

/// A contiguous replacement of base lines, the unit the merge engine works
/// with. Pure insertions have an empty `base` range; pure deletions have no
/// `lines`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    pub base: LineRange,
    pub lines: Vec<String>,
}

/// The result of diffing a base text against another text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    pub hunks: Vec<Hunk>,
    /// Number of lines in the base text.
    pub old_lines: usize,
    /// Number of lines in the other text.
    pub new_lines: usize,
}

impl DiffResult {
    /// Returns `true` if the two texts are identical.
    pub fn is_identical(&self) -> bool {
        self.hunks.iter().all(|h| !h.is_change())
    }

    /// Total number of lines added.
    pub fn additions(&self) -> usize {
        self.hunks
            .iter()
            .filter(|h| h.tag == HunkTag::Insert)
            .map(|h| h.new.len())
            .sum()
    }

    /// Total number of lines removed.
    pub fn deletions(&self) -> usize {
        self.hunks
            .iter()
            .filter(|h| h.tag == HunkTag::Delete)
            .map(|h| h.old.len())
            .sum()
    }

    pub fn changed_hunks(&self) -> impl Iterator<Item = &Hunk> {
        self.hunks.iter().filter(|h| h.is_change())
    }

    /// Collapse changed hunks into edits against the base text.
    ///
    /// A `delete` immediately followed by an `insert` at the end of the
    /// deleted range becomes one replacement.
    pub fn edits(&self) -> Vec<Edit> {
        let mut edits: Vec<Edit> = Vec::new();
        let mut pending: Option<Edit> = None;

        for hunk in &self.hunks {
            match hunk.tag {
                HunkTag::Equal => {
                    edits.extend(pending.take());
                }
                HunkTag::Delete => {
                    edits.extend(pending.take());
                    pending = Some(Edit {
                        base: hunk.old,
                        lines: Vec::new(),
                    });
                }
                HunkTag::Insert | HunkTag::Conflict => match pending.as_mut() {
                    Some(edit) if edit.base.end == hunk.old.start => {
                        edit.lines.extend(hunk.lines.iter().cloned());
                    }
                    _ => {
                        edits.extend(pending.take());
                        pending = Some(Edit {
                            base: hunk.old,
                            lines: hunk.lines.clone(),
                        });
                    }
                },
            }
        }
        edits.extend(pending);
        edits
    }

    pub fn stats(&self) -> DiffStats {
        DiffStats {
            changes: self.edits().len(),
            additions: self.additions(),
            deletions: self.deletions(),
        }
    }
}

fn owned(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|l| (*l).to_string()).collect()
}

/// Compute a line-by-line diff of `other` against `base`.
///
/// Deterministic: the same inputs always yield the same hunk sequence.
pub fn diff(base: &str, other: &str) -> DiffResult {
    let old = split_lines(base);
    let new = split_lines(other);

    let mut hunks = Vec::new();
    for op in capture_diff_slices(Algorithm::Myers, &old, &new) {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        let old_r = LineRange::new(old_range.start, old_range.end);
        let new_r = LineRange::new(new_range.start, new_range.end);
        match tag {
            DiffTag::Equal => {
                hunks.push(Hunk::new(HunkTag::Equal, old_r, new_r, owned(&old[old_range])));
            }
            DiffTag::Delete => {
                hunks.push(Hunk::new(
                    HunkTag::Delete,
                    old_r,
                    LineRange::empty(new_r.start),
                    owned(&old[old_range]),
                ));
            }
            DiffTag::Insert => {
                hunks.push(Hunk::new(
                    HunkTag::Insert,
                    LineRange::empty(old_r.start),
                    new_r,
                    owned(&new[new_range]),
                ));
            }
            DiffTag::Replace => {
                hunks.push(Hunk::new(
                    HunkTag::Delete,
                    old_r,
                    LineRange::empty(new_r.start),
                    owned(&old[old_range]),
                ));
                hunks.push(Hunk::new(
                    HunkTag::Insert,
                    LineRange::empty(old_r.end),
                    new_r,
                    owned(&new[new_range]),
                ));
            }
        }
    }

    DiffResult {
        hunks,
        old_lines: old.len(),
        new_lines: new.len(),
    }
}
