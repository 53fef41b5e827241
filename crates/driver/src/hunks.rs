// SPDX-License-Identifier: MIT OR Apache-2.0
//! Unified-diff hunk partitioning and in-process patch reconstruction.
//!
//! [`partition_hunks`] windows a line-level diff into reviewable chunks (`similar`'s
//! `grouped_ops`, 3 lines of context either side, matching familiar `diff -u` output).
//! [`reconstruct`] rebuilds the final text from a per-hunk accept/reject decision list without
//! shelling out to an external `patch` binary (ยง9's Design Note on patch-application
//! determinism) — unaffected lines are copied straight from the original text, since a hunk's
//! `old_range`/`new_range` exactly bound where old and new diverge.

use std::ops::Range;

use similar::{ChangeTag, TextDiff};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Context,
    Removed,
    Added,
}

#[derive(Debug, Clone)]
pub struct HunkLine {
    pub kind: LineKind,
    pub text: String,
}

/// One reviewable chunk of a file's diff, with enough of the original's line range recorded to
/// reconstruct the file exactly whether this hunk is accepted or rejected.
#[derive(Debug, Clone)]
pub struct Hunk {
    pub header: String,
    pub lines: Vec<HunkLine>,
    pub old_range: Range<usize>,
    pub new_range: Range<usize>,
}

/// Splits the line-level diff between `old` and `new` into unified-diff-style hunks.
#[must_use]
pub fn partition_hunks(old: &str, new: &str) -> Vec<Hunk> {
    let diff = TextDiff::from_lines(old, new);
    diff.grouped_ops(3)
        .into_iter()
        .map(|group| {
            let mut lines = Vec::new();
            for op in &group {
                for change in diff.iter_changes(op) {
                    let kind = match change.tag() {
                        ChangeTag::Equal => LineKind::Context,
                        ChangeTag::Delete => LineKind::Removed,
                        ChangeTag::Insert => LineKind::Added,
                    };
                    lines.push(HunkLine { kind, text: change.value().to_string() });
                }
            }
            let old_start = group.iter().map(|op| op.old_range().start).min().unwrap_or(0);
            let old_end = group.iter().map(|op| op.old_range().end).max().unwrap_or(0);
            let new_start = group.iter().map(|op| op.new_range().start).min().unwrap_or(0);
            let new_end = group.iter().map(|op| op.new_range().end).max().unwrap_or(0);
            Hunk {
                header: format!(
                    "@@ -{},{} +{},{} @@",
                    old_start + 1,
                    old_end.saturating_sub(old_start),
                    new_start + 1,
                    new_end.saturating_sub(new_start)
                ),
                lines,
                old_range: old_start..old_end,
                new_range: new_start..new_end,
            }
        })
        .collect()
}

/// Rebuilds the final text from `old`/`new` given one accept/reject decision per hunk (same
/// order as [`partition_hunks`] returned them). Text outside any hunk's range is identical in
/// `old` and `new` by construction, so it's copied once from `old` regardless of any decision.
#[must_use]
pub fn reconstruct(old: &str, new: &str, hunks: &[Hunk], decisions: &[bool]) -> String {
    let old_lines: Vec<&str> = old.split_inclusive('\n').collect();
    let new_lines: Vec<&str> = new.split_inclusive('\n').collect();
    let mut out = String::with_capacity(new.len());
    let mut cursor = 0usize;
    for (hunk, &accept) in hunks.iter().zip(decisions) {
        out.extend(old_lines[cursor..hunk.old_range.start.min(old_lines.len())].iter().copied());
        if accept {
            out.extend(new_lines[hunk.new_range.start.min(new_lines.len())..hunk.new_range.end.min(new_lines.len())].iter().copied());
        } else {
            out.extend(old_lines[hunk.old_range.start.min(old_lines.len())..hunk.old_range.end.min(old_lines.len())].iter().copied());
        }
        cursor = hunk.old_range.end;
    }
    out.extend(old_lines[cursor.min(old_lines.len())..].iter().copied());
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn partitions_a_single_hunk_for_one_line_change() {
        let old = "a\nb\nc\n";
        let new = "a\nB\nc\n";
        let hunks = partition_hunks(old, new);
        assert_eq!(hunks.len(), 1);
        assert!(hunks[0].lines.iter().any(|l| l.kind == LineKind::Removed && l.text == "b\n"));
        assert!(hunks[0].lines.iter().any(|l| l.kind == LineKind::Added && l.text == "B\n"));
    }

    #[test]
    fn reconstruct_accepting_all_hunks_yields_new_text() {
        let old = "a\nb\nc\n";
        let new = "a\nB\nc\n";
        let hunks = partition_hunks(old, new);
        let decisions = vec![true; hunks.len()];
        assert_eq!(reconstruct(old, new, &hunks, &decisions), new);
    }

    #[test]
    fn reconstruct_rejecting_all_hunks_yields_old_text() {
        let old = "a\nb\nc\n";
        let new = "a\nB\nc\n";
        let hunks = partition_hunks(old, new);
        let decisions = vec![false; hunks.len()];
        assert_eq!(reconstruct(old, new, &hunks, &decisions), old);
    }

    #[test]
    fn reconstruct_handles_two_independent_hunks_separately() {
        let old: String = (1..=30).map(|n| format!("{n}\n")).collect();
        let mut new_lines: Vec<String> = (1..=30).map(|n| n.to_string()).collect();
        new_lines[1] = "X".to_string();
        new_lines[28] = "Y".to_string();
        let new: String = new_lines.iter().map(|l| format!("{l}\n")).collect();

        let hunks = partition_hunks(&old, &new);
        assert_eq!(hunks.len(), 2);
        // accept the first hunk only
        let decisions = vec![true, false];
        let result = reconstruct(&old, &new, &hunks, &decisions);
        assert!(result.contains("X\n"));
        assert!(result.contains("29\n"));
        assert!(!result.contains("Y\n"));
    }
}
