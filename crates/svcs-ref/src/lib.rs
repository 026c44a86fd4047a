//! Reference store for svcs: HEAD and named branches.
//!
//! Branches are loose files under `.svcs/refs/heads/<name>` containing a hex
//! object id plus newline. HEAD is either symbolic (`ref: refs/heads/<name>`)
//! or a detached hex id.

mod loose;
mod store;

pub use store::{Branch, RefStore};

use std::path::PathBuf;

use svcs_hash::{HashError, ObjectId};

/// A reference — either direct (points to a commit id) or symbolic
/// (points to a branch ref).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// Direct reference to a commit (detached HEAD, or a branch file).
    Direct { target: ObjectId },
    /// Symbolic reference to another ref, e.g. `refs/heads/main`.
    Symbolic { target: String },
}

impl Reference {
    /// Is this a symbolic ref?
    pub fn is_symbolic(&self) -> bool {
        matches!(self, Reference::Symbolic { .. })
    }

    /// Get the target id if this is a direct ref.
    pub fn target_oid(&self) -> Option<ObjectId> {
        match self {
            Reference::Direct { target } => Some(*target),
            Reference::Symbolic { .. } => None,
        }
    }

    /// Get the branch name if this is a symbolic ref into `refs/heads/`.
    pub fn branch_name(&self) -> Option<&str> {
        match self {
            Reference::Symbolic { target } => target.strip_prefix("refs/heads/"),
            Reference::Direct { .. } => None,
        }
    }
}

/// Errors produced by reference operations.
#[derive(Debug, thiserror::Error)]
pub enum RefError {
    #[error("reference not found: {0}")]
    NotFound(String),

    #[error("reference already exists: {0}")]
    Exists(String),

    #[error("cannot delete the current branch '{0}'")]
    DeleteCurrent(String),

    #[error("invalid reference name: {0}")]
    InvalidName(String),

    #[error("malformed reference {name}: {reason}")]
    Parse { name: String, reason: String },

    #[error("i/o error on {path}: {source}")]
    IoPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Hash(#[from] HashError),

    #[error(transparent)]
    Lock(#[from] svcs_utils::UtilError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Validate a branch name: non-empty, no path escapes, no control bytes.
pub fn validate_branch_name(name: &str) -> Result<(), RefError> {
    let invalid = name.is_empty()
        || name.starts_with('.')
        || name.starts_with('/')
        || name.ends_with('/')
        || name.ends_with(".lock")
        || name.contains("..")
        || name.contains("//")
        || name
            .bytes()
            .any(|b| b.is_ascii_control() || b" ~^:?*[\\".contains(&b));
    if invalid {
        return Err(RefError::InvalidName(name.to_string()));
    }
    Ok(())
}
