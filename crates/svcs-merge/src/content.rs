//! Three-way content merge using diff edit scripts.
//!
//! Diffs base→ours and base→theirs, interleaves non-overlapping changes,
//! and emits conflict markers for overlapping regions:
//!
//! ```text
//! <<<<<<< HEAD
//! <ours>
//! =======
//! <theirs>
//! >>>>>>> <label>
//! ```

use bstr::BString;
use svcs_diff::algorithm::{split_lines, Edit, EditOp};

use crate::{ConflictKind, LineRange, MergeConflict};

/// Result of a three-way content merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentMergeResult {
    /// Clean merge, no conflicts.
    Clean(Vec<u8>),
    /// Merge with conflict markers embedded in the content.
    Conflict {
        /// Merged content including conflict markers.
        content: Vec<u8>,
        /// The unreconciled regions. Paths are empty; the tree-level
        /// driver stamps them.
        conflicts: Vec<MergeConflict>,
    },
}

impl ContentMergeResult {
    /// Whether the merge was clean.
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::Clean(_))
    }

    /// The merged content (with or without conflict markers).
    pub fn content(&self) -> &[u8] {
        match self {
            Self::Clean(data) => data,
            Self::Conflict { content, .. } => content,
        }
    }

    /// The conflict records (empty for a clean merge).
    pub fn conflicts(&self) -> &[MergeConflict] {
        match self {
            Self::Clean(_) => &[],
            Self::Conflict { conflicts, .. } => conflicts,
        }
    }
}

/// Perform a three-way content merge of whole files.
///
/// `theirs_label` names the incoming side in the `>>>>>>>` marker; ours is
/// always labelled `HEAD`.
pub fn merge_content(
    base: &[u8],
    ours: &[u8],
    theirs: &[u8],
    theirs_label: &str,
) -> ContentMergeResult {
    // Trivial agreements need no line work.
    if ours == theirs {
        return ContentMergeResult::Clean(ours.to_vec());
    }
    if base == ours {
        return ContentMergeResult::Clean(theirs.to_vec());
    }
    if base == theirs {
        return ContentMergeResult::Clean(ours.to_vec());
    }

    let base_lines = split_lines(base);
    let ours_lines = split_lines(ours);
    let theirs_lines = split_lines(theirs);

    let regions_ours = collect_change_regions(&svcs_diff::diff_edits(base, ours));
    let regions_theirs = collect_change_regions(&svcs_diff::diff_edits(base, theirs));

    merge_regions(
        &base_lines,
        &ours_lines,
        &theirs_lines,
        &regions_ours,
        &regions_theirs,
        theirs_label,
    )
}

/// A contiguous region of changes relative to the base.
#[derive(Debug, Clone)]
struct ChangeRegion {
    /// Start line in base (0-indexed).
    base_start: usize,
    /// Number of lines removed from base.
    base_len: usize,
    /// Start line in the modified file (0-indexed).
    new_start: usize,
    /// Number of lines added.
    new_len: usize,
}

/// Collect contiguous change regions from a sequence of edit operations.
fn collect_change_regions(edits: &[Edit]) -> Vec<ChangeRegion> {
    let mut regions = Vec::new();
    let mut i = 0;

    while i < edits.len() {
        if edits[i].op == EditOp::Equal {
            i += 1;
            continue;
        }

        let base_start = edits[i].old_index;
        let new_start = edits[i].new_index;
        let mut base_end = base_start;
        let mut new_end = new_start;

        while i < edits.len() && edits[i].op != EditOp::Equal {
            match edits[i].op {
                EditOp::Delete => base_end = edits[i].old_index + 1,
                EditOp::Insert => new_end = edits[i].new_index + 1,
                EditOp::Equal => unreachable!(),
            }
            i += 1;
        }

        regions.push(ChangeRegion {
            base_start,
            base_len: base_end - base_start,
            new_start,
            new_len: new_end - new_start,
        });
    }

    regions
}

/// Merge change regions from ours and theirs against the base.
fn merge_regions(
    base_lines: &[&[u8]],
    ours_lines: &[&[u8]],
    theirs_lines: &[&[u8]],
    regions_ours: &[ChangeRegion],
    regions_theirs: &[ChangeRegion],
    theirs_label: &str,
) -> ContentMergeResult {
    let mut output: Vec<u8> = Vec::new();
    let mut conflicts: Vec<MergeConflict> = Vec::new();

    let mut base_pos = 0;
    let mut oi = 0;
    let mut ti = 0;

    while oi < regions_ours.len() || ti < regions_theirs.len() {
        let o_region = regions_ours.get(oi);
        let t_region = regions_theirs.get(ti);

        match (o_region, t_region) {
            (Some(o), Some(t)) => {
                let o_end = o.base_start + o.base_len;
                let t_end = t.base_start + t.base_len;

                if o_end < t.base_start || (o_end == t.base_start && o.base_start < t.base_start) {
                    // Ours comes strictly first, no overlap.
                    emit_base_range(&mut output, base_lines, base_pos, o.base_start);
                    emit_lines(&mut output, ours_lines, o.new_start, o.new_len);
                    base_pos = base_pos.max(o_end);
                    oi += 1;
                } else if t_end < o.base_start
                    || (t_end == o.base_start && t.base_start < o.base_start)
                {
                    // Theirs comes strictly first, no overlap.
                    emit_base_range(&mut output, base_lines, base_pos, t.base_start);
                    emit_lines(&mut output, theirs_lines, t.new_start, t.new_len);
                    base_pos = base_pos.max(t_end);
                    ti += 1;
                } else {
                    // Overlapping regions.
                    let ours_content = collect_lines(ours_lines, o.new_start, o.new_len);
                    let theirs_content = collect_lines(theirs_lines, t.new_start, t.new_len);

                    let overlap_base_start = o.base_start.min(t.base_start);
                    let overlap_base_end = o_end.max(t_end);

                    emit_base_range(&mut output, base_lines, base_pos, overlap_base_start);

                    if ours_content == theirs_content {
                        // Both sides made the same change.
                        output.extend_from_slice(&ours_content);
                    } else {
                        conflicts.push(MergeConflict {
                            path: BString::default(),
                            kind: ConflictKind::Content,
                            our_range: region_range(o),
                            their_range: region_range(t),
                            our_content: BString::from(ours_content.clone()),
                            their_content: BString::from(theirs_content.clone()),
                        });
                        emit_conflict(&mut output, &ours_content, &theirs_content, theirs_label);
                    }

                    base_pos = base_pos.max(overlap_base_end);
                    oi += 1;
                    ti += 1;
                }
            }
            (Some(o), None) => {
                emit_base_range(&mut output, base_lines, base_pos, o.base_start);
                emit_lines(&mut output, ours_lines, o.new_start, o.new_len);
                base_pos = base_pos.max(o.base_start + o.base_len);
                oi += 1;
            }
            (None, Some(t)) => {
                emit_base_range(&mut output, base_lines, base_pos, t.base_start);
                emit_lines(&mut output, theirs_lines, t.new_start, t.new_len);
                base_pos = base_pos.max(t.base_start + t.base_len);
                ti += 1;
            }
            (None, None) => unreachable!(),
        }
    }

    // Remaining unchanged base tail.
    emit_base_range(&mut output, base_lines, base_pos, base_lines.len());

    if conflicts.is_empty() {
        ContentMergeResult::Clean(output)
    } else {
        ContentMergeResult::Conflict {
            content: output,
            conflicts,
        }
    }
}

fn region_range(region: &ChangeRegion) -> LineRange {
    if region.new_len == 0 {
        LineRange::default()
    } else {
        LineRange::new(
            region.new_start as u32 + 1,
            (region.new_start + region.new_len) as u32,
        )
    }
}

/// Emit unchanged base lines from `from` to `to` (exclusive). A no-op when
/// the range is empty or inverted.
fn emit_base_range(output: &mut Vec<u8>, base_lines: &[&[u8]], from: usize, to: usize) {
    for i in from..to.min(base_lines.len()) {
        output.extend_from_slice(base_lines[i]);
        output.push(b'\n');
    }
}

/// Emit `count` lines starting at `start`, newline-terminating each.
fn emit_lines(output: &mut Vec<u8>, lines: &[&[u8]], start: usize, count: usize) {
    for line in lines.iter().skip(start).take(count) {
        output.extend_from_slice(line);
        output.push(b'\n');
    }
}

/// Collect lines into a single newline-terminated buffer.
fn collect_lines(lines: &[&[u8]], start: usize, count: usize) -> Vec<u8> {
    let mut buf = Vec::new();
    emit_lines(&mut buf, lines, start, count);
    buf
}

/// Emit one conflict region with markers.
fn emit_conflict(output: &mut Vec<u8>, ours: &[u8], theirs: &[u8], theirs_label: &str) {
    output.extend_from_slice(b"<<<<<<< HEAD\n");
    output.extend_from_slice(ours);
    output.extend_from_slice(b"=======\n");
    output.extend_from_slice(theirs);
    output.extend_from_slice(b">>>>>>> ");
    output.extend_from_slice(theirs_label.as_bytes());
    output.push(b'\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_three_identical() {
        let b = b"line1\nline2\n";
        let result = merge_content(b, b, b, "feature");
        assert!(result.is_clean());
        assert_eq!(result.content(), b);
    }

    #[test]
    fn only_ours_changed() {
        let base = b"line1\nline2\n";
        let ours = b"line1\nmodified\n";
        let result = merge_content(base, ours, base, "feature");
        assert!(result.is_clean());
        assert_eq!(result.content(), ours);
    }

    #[test]
    fn only_theirs_changed() {
        let base = b"line1\nline2\n";
        let theirs = b"line1\nmodified\n";
        let result = merge_content(base, base, theirs, "feature");
        assert!(result.is_clean());
        assert_eq!(result.content(), theirs);
    }

    #[test]
    fn non_overlapping_changes_interleave() {
        let base = b"line1\nline2\nline3\nline4\n";
        let ours = b"modified1\nline2\nline3\nline4\n";
        let theirs = b"line1\nline2\nline3\nmodified4\n";
        let result = merge_content(base, ours, theirs, "feature");
        assert!(result.is_clean());
        assert_eq!(result.content(), b"modified1\nline2\nline3\nmodified4\n");
    }

    #[test]
    fn overlapping_changes_conflict() {
        let base = b"line1\nline2\nline3\n";
        let ours = b"line1\nours_change\nline3\n";
        let theirs = b"line1\ntheirs_change\nline3\n";
        let result = merge_content(base, ours, theirs, "feature");
        assert!(!result.is_clean());

        let content = String::from_utf8_lossy(result.content());
        assert!(content.contains("<<<<<<< HEAD\nours_change\n"));
        assert!(content.contains("=======\ntheirs_change\n"));
        assert!(content.contains(">>>>>>> feature"));

        let conflicts = result.conflicts();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::Content);
        assert_eq!(conflicts[0].our_content, "ours_change\n");
        assert_eq!(conflicts[0].their_content, "theirs_change\n");
        assert_eq!(conflicts[0].our_range, LineRange::new(2, 2));
        assert_eq!(conflicts[0].their_range, LineRange::new(2, 2));
    }

    #[test]
    fn both_sides_same_change_is_clean() {
        let base = b"line1\noriginal\nline3\n";
        let changed = b"line1\nsame_change\nline3\n";
        let result = merge_content(base, changed, changed, "feature");
        assert!(result.is_clean());
        assert_eq!(result.content(), changed);
    }

    #[test]
    fn surrounding_context_survives_conflict() {
        let base = b"keep1\nmid\nkeep2\n";
        let ours = b"keep1\nA\nkeep2\n";
        let theirs = b"keep1\nB\nkeep2\n";
        let result = merge_content(base, ours, theirs, "x");
        let content = String::from_utf8_lossy(result.content());
        assert!(content.starts_with("keep1\n"));
        assert!(content.ends_with("keep2\n"));
    }

    #[test]
    fn empty_base_divergent_adds_conflict() {
        let result = merge_content(b"", b"ours line\n", b"theirs line\n", "x");
        assert!(!result.is_clean());
        assert_eq!(result.conflicts().len(), 1);
    }

    #[test]
    fn deletion_vs_edit_conflicts() {
        let base = b"a\nb\nc\n";
        let ours = b"a\nc\n"; // deleted b
        let theirs = b"a\nB\nc\n"; // edited b
        let result = merge_content(base, ours, theirs, "x");
        assert!(!result.is_clean());
        let conflicts = result.conflicts();
        assert!(conflicts[0].our_range.is_empty());
        assert!(!conflicts[0].their_range.is_empty());
    }

    #[test]
    fn two_independent_conflicts_both_reported() {
        let base = b"1\nx\n3\n4\ny\n6\n";
        let ours = b"1\nA\n3\n4\nC\n6\n";
        let theirs = b"1\nB\n3\n4\nD\n6\n";
        let result = merge_content(base, ours, theirs, "x");
        assert_eq!(result.conflicts().len(), 2);
        let content = String::from_utf8_lossy(result.content());
        assert_eq!(content.matches("<<<<<<< HEAD").count(), 2);
    }
}
