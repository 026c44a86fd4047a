use bstr::BString;
use svcs_hash::ObjectId;

/// A commit node in the in-memory graph.
///
/// `parents` and `children` are arena indices into the owning
/// [`CommitDag`](crate::CommitDag); `parents` are the owning forward edges,
/// `children` are lookup-only back edges.
#[derive(Debug, Clone)]
pub struct CommitNode {
    pub oid: ObjectId,
    pub message: BString,
    pub author: BString,
    /// Committer timestamp, Unix seconds.
    pub timestamp: i64,
    /// Committer timezone offset in minutes from UTC.
    pub tz_offset: i32,
    pub parents: Vec<usize>,
    pub children: Vec<usize>,
    /// Shortest child-path distance from any root. Recomputed after bulk
    /// load.
    pub depth: u32,
}

impl CommitNode {
    /// Is this a merge commit? (more than one parent)
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// Is this a root commit? (no parents)
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// Is this a head commit? (no children)
    pub fn is_head(&self) -> bool {
        self.children.is_empty()
    }

    /// First line of the message.
    pub fn summary(&self) -> &[u8] {
        match self.message.iter().position(|&b| b == b'\n') {
            Some(pos) => &self.message[..pos],
            None => &self.message,
        }
    }
}

/// Aggregate numbers over a loaded graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DagStatistics {
    pub total_commits: usize,
    pub merge_commits: usize,
    pub root_commits: usize,
    pub head_commits: usize,
    pub max_depth: u32,
    pub earliest_commit: i64,
    pub latest_commit: i64,
}
