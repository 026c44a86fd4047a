//! Line-oriented diff for svcs.
//!
//! The edit script comes from a Myers difference computation; the public
//! output is a single whole-file hunk of typed lines, each carrying its
//! 1-based line number on the side(s) it appears on. Reconstructing the
//! non-Delete lines yields the new side; the non-Add lines yield the old
//! side.

pub mod algorithm;

use bstr::BString;

use algorithm::{myers, split_lines, Edit, EditOp};

/// One line of diff output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLine {
    /// Line present on both sides.
    Context {
        old_line: u32,
        new_line: u32,
        content: BString,
    },
    /// Line present only on the old side.
    Delete { old_line: u32, content: BString },
    /// Line present only on the new side.
    Add { new_line: u32, content: BString },
}

impl DiffLine {
    /// The line content, regardless of type.
    pub fn content(&self) -> &BString {
        match self {
            Self::Context { content, .. } => content,
            Self::Delete { content, .. } => content,
            Self::Add { content, .. } => content,
        }
    }

    /// Is this a context line?
    pub fn is_context(&self) -> bool {
        matches!(self, Self::Context { .. })
    }
}

/// A hunk covering the whole file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub old_start: u32,
    pub old_count: u32,
    pub new_start: u32,
    pub new_count: u32,
    pub lines: Vec<DiffLine>,
}

impl Hunk {
    /// Whether the two sides are identical (no Add/Delete lines).
    pub fn is_unchanged(&self) -> bool {
        self.lines.iter().all(DiffLine::is_context)
    }
}

/// Compute the line diff of two byte sequences as one whole-file hunk.
pub fn diff_lines(old: &[u8], new: &[u8]) -> Hunk {
    let old_lines = split_lines(old);
    let new_lines = split_lines(new);
    let edits = myers::diff(&old_lines, &new_lines);

    let mut lines = Vec::with_capacity(edits.len());
    for edit in &edits {
        match edit.op {
            EditOp::Equal => lines.push(DiffLine::Context {
                old_line: edit.old_index as u32 + 1,
                new_line: edit.new_index as u32 + 1,
                content: BString::from(old_lines[edit.old_index]),
            }),
            EditOp::Delete => lines.push(DiffLine::Delete {
                old_line: edit.old_index as u32 + 1,
                content: BString::from(old_lines[edit.old_index]),
            }),
            EditOp::Insert => lines.push(DiffLine::Add {
                new_line: edit.new_index as u32 + 1,
                content: BString::from(new_lines[edit.new_index]),
            }),
        }
    }

    Hunk {
        old_start: 1,
        old_count: old_lines.len() as u32,
        new_start: 1,
        new_count: new_lines.len() as u32,
        lines,
    }
}

/// Join lines back into file content, newline-terminated when non-empty.
pub fn join_lines<L: AsRef<[u8]>>(lines: &[L]) -> Vec<u8> {
    let mut out = Vec::new();
    for line in lines {
        out.extend_from_slice(line.as_ref());
        out.push(b'\n');
    }
    out
}

/// Raw edit script between two byte sequences.
pub fn diff_edits(old: &[u8], new: &[u8]) -> Vec<Edit> {
    myers::diff(&split_lines(old), &split_lines(new))
}

/// Format a hunk in unified style for terminal output.
pub fn format_unified(hunk: &Hunk, out: &mut Vec<u8>) {
    if hunk.is_unchanged() {
        return;
    }
    out.extend_from_slice(
        format!(
            "@@ -{},{} +{},{} @@\n",
            hunk.old_start, hunk.old_count, hunk.new_start, hunk.new_count
        )
        .as_bytes(),
    );
    for line in &hunk.lines {
        let prefix: &[u8] = match line {
            DiffLine::Context { .. } => b" ",
            DiffLine::Delete { .. } => b"-",
            DiffLine::Add { .. } => b"+",
        };
        out.extend_from_slice(prefix);
        out.extend_from_slice(line.content());
        out.push(b'\n');
    }
}
