//! In-memory commit graph for svcs.
//!
//! The graph is built on demand by walking branch tips through parent links.
//! Nodes live in an arena (`Vec`) keyed by object id; both parent and child
//! edges are arena indices, so the bidirectional structure carries no
//! reference cycles. Forward (child→parent) edges are the authoritative
//! ones; child edges exist for lookup only.

mod graph;
mod node;
mod range;

pub use graph::CommitDag;
pub use node::{CommitNode, DagStatistics};
pub use range::{CommitRange, TraversalOrder};

use svcs_hash::ObjectId;

/// Errors produced by commit-graph operations.
#[derive(Debug, thiserror::Error)]
pub enum DagError {
    #[error("unknown revision: {0}")]
    NotFound(String),

    #[error("ambiguous revision '{prefix}' ({count} matches)")]
    Ambiguous { prefix: String, count: usize },

    #[error("no merge base between {0} and {1}")]
    NoMergeBase(ObjectId, ObjectId),

    #[error("object is not a commit: {0}")]
    NotACommit(ObjectId),

    #[error(transparent)]
    Odb(#[from] svcs_odb::OdbError),

    #[error(transparent)]
    Ref(#[from] svcs_ref::RefError),
}
