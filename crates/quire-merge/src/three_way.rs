//! Line-based three-way merge.
//!
//! Both sides are diffed against the base. Their edits are sorted by base
//! range and swept into clusters: an edit joins the current cluster when it
//! overlaps any edit already in it (see [`LineRange::overlaps`]). Each
//! cluster then resolves on its own:
//!
//! - touched by one side only: that side's lines win
//! - touched by both with identical results: applied once
//! - otherwise: a [`Conflict`] carrying the base, fork, and upstream lines
//!
//! Unchanged base lines between clusters are copied through. Sides are
//! treated symmetrically, so swapping fork and upstream changes only the
//! order of variants inside conflict blocks.

use serde::{Deserialize, Serialize};
use tracing::debug;

use quire_diff::{diff, join_lines, split_lines, DiffResult, Edit, Hunk, HunkTag, LineRange};

use crate::error::{MergeError, MergeResult};
use crate::options::MergeOptions;

/// A region where the two sides disagree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    /// Base lines covered by the conflicting edits.
    pub base_range: LineRange,
    pub base: Vec<String>,
    pub fork: Vec<String>,
    pub upstream: Vec<String>,
}

impl Conflict {
    pub fn base_text(&self) -> String {
        join_lines(&self.base)
    }

    pub fn fork_text(&self) -> String {
        join_lines(&self.fork)
    }

    pub fn upstream_text(&self) -> String {
        join_lines(&self.upstream)
    }

    /// Render the conflict as a marker block.
    pub fn render(&self, options: &MergeOptions) -> Vec<String> {
        let mut out = vec![marker("<<<<<<<", &options.fork_label)];
        push_terminated(&mut out, &self.fork);
        if options.show_base {
            out.push(marker("|||||||", "base"));
            push_terminated(&mut out, &self.base);
        }
        out.push("=======\n".to_string());
        push_terminated(&mut out, &self.upstream);
        out.push(marker(">>>>>>>", &options.upstream_label));
        out
    }
}

fn marker(prefix: &str, label: &str) -> String {
    if label.is_empty() {
        format!("{prefix}\n")
    } else {
        format!("{prefix} {label}\n")
    }
}

/// Copy lines, terminating the last one so the next marker starts a line.
fn push_terminated(out: &mut Vec<String>, lines: &[String]) {
    for line in lines {
        if line.ends_with('\n') {
            out.push(line.clone());
        } else {
            out.push(format!("{line}\n"));
        }
    }
}

/// The result of a three-way merge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOutcome {
    /// The merged text. When conflicts exist it contains marker blocks and
    /// is meant for display, not for committing.
    pub content: String,
    /// Empty if and only if every overlapping region resolved identically.
    pub conflicts: Vec<Conflict>,
    /// How the merged text relates to the base, as diff hunks; conflicted
    /// regions carry their rendered marker block.
    pub regions: Vec<Hunk>,
}

impl MergeOutcome {
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// The merged text, or an error if any conflict remains.
    pub fn into_clean(self) -> MergeResult<String> {
        if self.is_clean() {
            Ok(self.content)
        } else {
            Err(MergeError::Conflicted {
                count: self.conflicts.len(),
            })
        }
    }

    /// The regions as a [`DiffResult`] from base to merged text.
    pub fn as_diff(&self) -> DiffResult {
        DiffResult {
            hunks: self.regions.clone(),
            old_lines: self.regions.iter().map(|h| h.old.end).max().unwrap_or(0),
            new_lines: self.regions.iter().map(|h| h.new.end).max().unwrap_or(0),
        }
    }

    fn take_side(base: &str, side: &str) -> Self {
        Self {
            content: side.to_string(),
            conflicts: Vec::new(),
            regions: diff(base, side).hunks,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Fork,
    Upstream,
}

/// Overlapping edits from either side.
#[derive(Debug)]
struct Cluster {
    range: LineRange,
    fork: Vec<Edit>,
    upstream: Vec<Edit>,
}

impl Cluster {
    fn start(side: Side, edit: Edit) -> Self {
        let mut cluster = Self {
            range: edit.base,
            fork: Vec::new(),
            upstream: Vec::new(),
        };
        cluster.push(side, edit);
        cluster
    }

    fn overlaps(&self, range: &LineRange) -> bool {
        self.fork
            .iter()
            .chain(&self.upstream)
            .any(|e| e.base.overlaps(range))
    }

    fn push(&mut self, side: Side, edit: Edit) {
        self.range = self.range.union(&edit.base);
        match side {
            Side::Fork => self.fork.push(edit),
            Side::Upstream => self.upstream.push(edit),
        }
    }
}

fn clusters(fork: Vec<Edit>, upstream: Vec<Edit>) -> Vec<Cluster> {
    let mut all: Vec<(Side, Edit)> = fork
        .into_iter()
        .map(|e| (Side::Fork, e))
        .chain(upstream.into_iter().map(|e| (Side::Upstream, e)))
        .collect();
    all.sort_by(|a, b| a.1.base.cmp(&b.1.base));

    let mut out: Vec<Cluster> = Vec::new();
    for (side, edit) in all {
        match out.last_mut() {
            Some(cluster) if cluster.overlaps(&edit.base) => cluster.push(side, edit),
            _ => out.push(Cluster::start(side, edit)),
        }
    }
    out
}

/// One side's version of the base lines in `range`.
fn apply(base: &[&str], range: LineRange, edits: &[Edit]) -> Vec<String> {
    let mut out = Vec::new();
    let mut cursor = range.start;
    for edit in edits {
        out.extend(base[cursor..edit.base.start].iter().map(|l| (*l).to_string()));
        out.extend(edit.lines.iter().cloned());
        cursor = edit.base.end;
    }
    out.extend(base[cursor..range.end].iter().map(|l| (*l).to_string()));
    out
}

/// Accumulates merged lines and the regions describing them.
struct Output<'a> {
    base: &'a [&'a str],
    lines: Vec<String>,
    regions: Vec<Hunk>,
}

impl Output<'_> {
    fn copy_base(&mut self, range: LineRange) {
        if range.is_empty() {
            return;
        }
        let kept: Vec<String> = self.base[range.start..range.end]
            .iter()
            .map(|l| (*l).to_string())
            .collect();
        let new = LineRange::new(self.lines.len(), self.lines.len() + kept.len());
        self.lines.extend(kept.iter().cloned());
        self.regions.push(Hunk::new(HunkTag::Equal, range, new, kept));
    }

    fn replace(&mut self, range: LineRange, resolved: Vec<String>) {
        let at = self.lines.len();
        if !range.is_empty() {
            let removed = self.base[range.start..range.end]
                .iter()
                .map(|l| (*l).to_string())
                .collect();
            self.regions
                .push(Hunk::new(HunkTag::Delete, range, LineRange::empty(at), removed));
        }
        if !resolved.is_empty() {
            let new = LineRange::new(at, at + resolved.len());
            self.lines.extend(resolved.iter().cloned());
            self.regions.push(Hunk::new(
                HunkTag::Insert,
                LineRange::empty(range.end),
                new,
                resolved,
            ));
        }
    }

    fn conflict(&mut self, conflict: &Conflict, options: &MergeOptions) {
        let rendered = conflict.render(options);
        let new = LineRange::new(self.lines.len(), self.lines.len() + rendered.len());
        self.lines.extend(rendered.iter().cloned());
        self.regions
            .push(Hunk::new(HunkTag::Conflict, conflict.base_range, new, rendered));
    }
}

/// Three-way merge of `fork` and `upstream`, both descended from `base`.
pub fn merge(base: &str, fork: &str, upstream: &str, options: &MergeOptions) -> MergeOutcome {
    if fork == base {
        debug!("fork unchanged, taking upstream");
        return MergeOutcome::take_side(base, upstream);
    }
    if upstream == base {
        debug!("upstream unchanged, taking fork");
        return MergeOutcome::take_side(base, fork);
    }
    if fork == upstream {
        debug!("identical changes on both sides");
        return MergeOutcome::take_side(base, fork);
    }

    let base_lines = split_lines(base);
    let fork_edits = diff(base, fork).edits();
    let upstream_edits = diff(base, upstream).edits();

    let mut output = Output {
        base: &base_lines,
        lines: Vec::new(),
        regions: Vec::new(),
    };
    let mut conflicts = Vec::new();
    let mut cursor = 0;

    for cluster in clusters(fork_edits, upstream_edits) {
        output.copy_base(LineRange::new(cursor, cluster.range.start));

        let range = cluster.range;
        match (cluster.fork.is_empty(), cluster.upstream.is_empty()) {
            (false, true) => output.replace(range, apply(&base_lines, range, &cluster.fork)),
            (true, false) => output.replace(range, apply(&base_lines, range, &cluster.upstream)),
            _ => {
                let ours = apply(&base_lines, range, &cluster.fork);
                let theirs = apply(&base_lines, range, &cluster.upstream);
                if ours == theirs {
                    output.replace(range, ours);
                } else {
                    let conflict = Conflict {
                        base_range: range,
                        base: apply(&base_lines, range, &[]),
                        fork: ours,
                        upstream: theirs,
                    };
                    output.conflict(&conflict, options);
                    conflicts.push(conflict);
                }
            }
        }
        cursor = range.end;
    }
    output.copy_base(LineRange::new(cursor, base_lines.len()));

    debug!(
        regions = output.regions.len(),
        conflicts = conflicts.len(),
        "three-way merge complete"
    );

    MergeOutcome {
        content: join_lines(&output.lines),
        conflicts,
        regions: output.regions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const BASE: &str = "1\n2\n3\n4\n5\n6\n7\n8\n9\n10\n";

    fn opts() -> MergeOptions {
        MergeOptions::default()
    }

    fn edit_line(text: &str, line: usize, new: &str) -> String {
        text.lines()
            .enumerate()
            .map(|(i, l)| if i == line { format!("{new}\n") } else { format!("{l}\n") })
            .collect()
    }

    #[test]
    fn fork_unchanged_takes_upstream() {
        let upstream = edit_line(BASE, 0, "one");
        let outcome = merge(BASE, BASE, &upstream, &opts());
        assert!(outcome.is_clean());
        assert_eq!(outcome.content, upstream);
    }

    #[test]
    fn upstream_unchanged_takes_fork() {
        let fork = edit_line(BASE, 9, "ten");
        let outcome = merge(BASE, &fork, BASE, &opts());
        assert!(outcome.is_clean());
        assert_eq!(outcome.content, fork);
    }

    #[test]
    fn identical_edits_apply_once() {
        let side = edit_line(BASE, 4, "five");
        let outcome = merge(BASE, &side, &side, &opts());
        assert!(outcome.is_clean());
        assert_eq!(outcome.content, side);
    }

    #[test]
    fn disjoint_edits_both_apply() {
        let upstream = edit_line(&edit_line(BASE, 0, "one"), 1, "two");
        let fork = edit_line(BASE, 9, "ten");
        let outcome = merge(BASE, &fork, &upstream, &opts());

        assert!(outcome.is_clean());
        assert_eq!(outcome.content, "one\ntwo\n3\n4\n5\n6\n7\n8\n9\nten\n");
    }

    #[test]
    fn same_line_different_edits_conflict() {
        let fork = edit_line(BASE, 2, "three (fork)");
        let upstream = edit_line(BASE, 2, "three (upstream)");
        let outcome = merge(BASE, &fork, &upstream, &opts());

        assert_eq!(outcome.conflicts.len(), 1);
        let conflict = &outcome.conflicts[0];
        assert_eq!(conflict.base_range, LineRange::new(2, 3));
        assert_eq!(conflict.base_text(), "3\n");
        assert_eq!(conflict.fork_text(), "three (fork)\n");
        assert_eq!(conflict.upstream_text(), "three (upstream)\n");
        assert!(outcome.content.contains(
            "<<<<<<< fork\nthree (fork)\n=======\nthree (upstream)\n>>>>>>> upstream\n"
        ));
        assert!(matches!(
            outcome.into_clean(),
            Err(MergeError::Conflicted { count: 1 })
        ));
    }

    #[test]
    fn same_change_within_larger_cluster_agrees() {
        // Both sides delete line 5 and nothing else differs.
        let side = "1\n2\n3\n4\n6\n7\n8\n9\n10\n";
        let upstream = format!("{side}11\n");
        let outcome = merge(BASE, side, &upstream, &opts());
        assert!(outcome.is_clean());
        assert_eq!(outcome.content, upstream);
    }

    #[test]
    fn adjacent_edits_do_not_conflict() {
        let fork = edit_line(BASE, 3, "four");
        let upstream = edit_line(BASE, 4, "five");
        let outcome = merge(BASE, &fork, &upstream, &opts());
        assert!(outcome.is_clean());
        assert_eq!(outcome.content, "1\n2\n3\nfour\nfive\n6\n7\n8\n9\n10\n");
    }

    #[test]
    fn insertions_at_same_point_conflict() {
        let fork = "a\nfork\nb\n";
        let upstream = "a\nupstream\nb\n";
        let outcome = merge("a\nb\n", fork, upstream, &opts());
        assert_eq!(outcome.conflicts.len(), 1);
        assert_eq!(outcome.conflicts[0].base_range, LineRange::empty(1));
        assert!(outcome.conflicts[0].base.is_empty());
    }

    #[test]
    fn insertion_after_edited_range_does_not_conflict() {
        let outcome = merge("a\nb\nc\n", "a\nB\nc\n", "a\nb\nnew\nc\n", &opts());
        assert!(outcome.is_clean());
        assert_eq!(outcome.content, "a\nB\nnew\nc\n");
    }

    #[test]
    fn delete_versus_edit_conflicts() {
        let outcome = merge("a\nb\nc\n", "a\nc\n", "a\nB\nc\n", &opts());
        assert_eq!(outcome.conflicts.len(), 1);
        assert!(outcome.conflicts[0].fork.is_empty());
        assert_eq!(outcome.conflicts[0].upstream, vec!["B\n"]);
    }

    #[test]
    fn show_base_and_labels_render() {
        let options = MergeOptions {
            fork_label: "tim".into(),
            upstream_label: "sim".into(),
            show_base: true,
        };
        let outcome = merge("x\n", "y\n", "z\n", &options);
        assert_eq!(
            outcome.content,
            "<<<<<<< tim\ny\n||||||| base\nx\n=======\nz\n>>>>>>> sim\n"
        );
    }

    #[test]
    fn missing_trailing_newline_rendered_on_own_line() {
        let outcome = merge("x", "y", "z", &opts());
        assert_eq!(
            outcome.content,
            "<<<<<<< fork\ny\n=======\nz\n>>>>>>> upstream\n"
        );
        assert_eq!(outcome.conflicts[0].fork, vec!["y"]);
    }

    #[test]
    fn regions_tile_base_and_output() {
        let fork = edit_line(BASE, 1, "two");
        let upstream = edit_line(&edit_line(BASE, 1, "TWO"), 7, "eight");
        let outcome = merge(BASE, &fork, &upstream, &opts());
        let diff = outcome.as_diff();

        assert_eq!(diff.old_lines, 10);
        assert_eq!(diff.new_lines, split_lines(&outcome.content).len());
        assert!(diff.hunks.iter().any(|h| h.tag == HunkTag::Conflict));

        let mut old_cursor = 0;
        for hunk in &diff.hunks {
            assert_eq!(hunk.old.start, old_cursor);
            old_cursor = hunk.old.end;
        }
        assert_eq!(old_cursor, 10);
    }

    #[test]
    fn outcome_serializes_conflicts() {
        let outcome = merge("x\n", "y\n", "z\n", &opts());
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["conflicts"][0]["fork"][0], "y\n");
        assert_eq!(json["regions"][0]["tag"], "conflict");
    }

    fn lines_strategy() -> impl Strategy<Value = Vec<&'static str>> {
        prop::collection::vec(prop::sample::select(vec!["a\n", "b\n", "c\n", "d\n"]), 0..10)
    }

    proptest! {
        /// Swapping sides never changes whether a merge is clean, and clean
        /// merges produce the same text either way.
        #[test]
        fn merge_is_order_insensitive(
            base in lines_strategy(),
            a in lines_strategy(),
            b in lines_strategy(),
        ) {
            let (base, a, b) = (base.concat(), a.concat(), b.concat());
            let ab = merge(&base, &a, &b, &MergeOptions::default());
            let ba = merge(&base, &b, &a, &MergeOptions::default());
            prop_assert_eq!(ab.conflicts.len(), ba.conflicts.len());
            if ab.is_clean() {
                prop_assert_eq!(ab.content, ba.content);
            }
        }

        /// Merging a side with an unchanged counterpart yields that side.
        #[test]
        fn merge_with_unchanged_side(base in lines_strategy(), a in lines_strategy()) {
            let (base, a) = (base.concat(), a.concat());
            prop_assert_eq!(merge(&base, &a, &base, &MergeOptions::default()).content, a.clone());
            prop_assert_eq!(merge(&base, &base, &a, &MergeOptions::default()).content, a);
        }
    }
}
