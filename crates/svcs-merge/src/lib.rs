//! Merge engine for svcs: three-way content merge with conflict markers,
//! and tree-level merge classification driving per-file merges.

pub mod content;
pub mod tree;

use bstr::BString;

pub use content::{merge_content, ContentMergeResult};
pub use tree::{merge_trees, FileEntry, MergedFile, TreeMergeResult};

/// Kinds of merge conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// Both sides modified the same region of a file.
    Content,
    /// Both sides introduced the same path with differing content.
    AddAdd,
    /// Our side modified, their side deleted.
    ModifyDelete,
    /// Our side deleted, their side modified.
    DeleteModify,
    /// Both sides renamed the same file differently.
    RenameRename,
    /// Both sides changed the file mode in different ways.
    ModeChange,
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Content => "content",
            Self::AddAdd => "add/add",
            Self::ModifyDelete => "modify/delete",
            Self::DeleteModify => "delete/modify",
            Self::RenameRename => "rename/rename",
            Self::ModeChange => "mode change",
        })
    }
}

/// A 1-based, inclusive range of lines on one side of a conflict.
/// `(0, 0)` marks a side with no surviving lines (e.g. a deletion).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineRange {
    pub start: u32,
    pub end: u32,
}

impl LineRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Whether the range covers no lines.
    pub fn is_empty(&self) -> bool {
        self.end < self.start || (self.start == 0 && self.end == 0)
    }
}

/// One unreconciled region or file reported by a merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeConflict {
    /// Path of the conflicted file.
    pub path: BString,
    /// What kind of disagreement this is.
    pub kind: ConflictKind,
    /// Line range of the conflicting region on our side.
    pub our_range: LineRange,
    /// Line range of the conflicting region on their side.
    pub their_range: LineRange,
    /// Our side's content for the region.
    pub our_content: BString,
    /// Their side's content for the region.
    pub their_content: BString,
}

/// Errors produced by merge operations.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("expected blob at {path}, found {actual}")]
    NotABlob { path: BString, actual: String },

    #[error(transparent)]
    Odb(#[from] svcs_odb::OdbError),
}
