use std::fs;
use std::path::{Path, PathBuf};

use svcs_hash::ObjectId;

use crate::loose::{enumerate_branches, read_loose_ref, write_loose_ref, write_symbolic_ref};
use crate::{validate_branch_name, RefError, Reference};

/// A named branch as reported by [`RefStore::branch_list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub name: String,
    pub oid: ObjectId,
    pub is_current: bool,
}

/// File-backed reference store rooted at the `.svcs` directory.
pub struct RefStore {
    svcs_dir: PathBuf,
}

impl RefStore {
    /// Open the ref store for the given `.svcs` directory.
    pub fn new(svcs_dir: impl AsRef<Path>) -> Self {
        Self {
            svcs_dir: svcs_dir.as_ref().to_path_buf(),
        }
    }

    fn head_path(&self) -> PathBuf {
        self.svcs_dir.join("HEAD")
    }

    fn heads_dir(&self) -> PathBuf {
        self.svcs_dir.join("refs").join("heads")
    }

    /// Path of a branch file.
    pub fn branch_path(&self, name: &str) -> PathBuf {
        self.heads_dir().join(name)
    }

    /// Read HEAD. A missing HEAD file is a [`RefError::NotFound`].
    pub fn read_head(&self) -> Result<Reference, RefError> {
        read_loose_ref(&self.head_path(), "HEAD")?
            .ok_or_else(|| RefError::NotFound("HEAD".into()))
    }

    /// Point HEAD at a branch (symbolic).
    pub fn set_head_to_branch(&self, name: &str) -> Result<(), RefError> {
        validate_branch_name(name)?;
        write_symbolic_ref(&self.head_path(), &format!("refs/heads/{name}"))
    }

    /// Point HEAD at a commit directly (detached).
    pub fn set_head_detached(&self, oid: &ObjectId) -> Result<(), RefError> {
        write_loose_ref(&self.head_path(), oid)
    }

    /// Resolve HEAD to a commit id, following a symbolic HEAD through its
    /// branch file. Yields `None` on an unborn branch (symbolic HEAD whose
    /// branch file does not exist yet).
    pub fn head_oid(&self) -> Result<Option<ObjectId>, RefError> {
        match self.read_head()? {
            Reference::Direct { target } => Ok(Some(target)),
            Reference::Symbolic { target } => {
                let name = target.strip_prefix("refs/heads/").unwrap_or(&target);
                self.branch_tip(name)
            }
        }
    }

    /// The current branch name, or `None` when HEAD is detached.
    pub fn current_branch(&self) -> Result<Option<String>, RefError> {
        Ok(self.read_head()?.branch_name().map(str::to_string))
    }

    /// Read a branch's tip commit id. `None` if the branch file is absent.
    pub fn branch_tip(&self, name: &str) -> Result<Option<ObjectId>, RefError> {
        match read_loose_ref(&self.branch_path(name), name)? {
            Some(Reference::Direct { target }) => Ok(Some(target)),
            Some(Reference::Symbolic { .. }) => Err(RefError::Parse {
                name: name.to_string(),
                reason: "branch file contains a symbolic ref".into(),
            }),
            None => Ok(None),
        }
    }

    /// Create a new branch pointing at `oid`.
    ///
    /// Fails with [`RefError::Exists`] if the branch file already exists.
    pub fn branch_create(&self, name: &str, oid: &ObjectId) -> Result<(), RefError> {
        validate_branch_name(name)?;
        let path = self.branch_path(name);
        if path.exists() {
            return Err(RefError::Exists(name.to_string()));
        }
        write_loose_ref(&path, oid)
    }

    /// Move an existing branch (or create it) to point at `oid`.
    ///
    /// This is the commit writer's "advance the tip" step: it must be the
    /// last mutation of the enclosing operation.
    pub fn branch_update(&self, name: &str, oid: &ObjectId) -> Result<(), RefError> {
        validate_branch_name(name)?;
        write_loose_ref(&self.branch_path(name), oid)
    }

    /// Enumerate branches, marking the one the symbolic HEAD names.
    ///
    /// A missing `refs/heads` directory yields an empty list.
    pub fn branch_list(&self) -> Result<Vec<Branch>, RefError> {
        let current = match self.read_head() {
            Ok(head) => head.branch_name().map(str::to_string),
            Err(RefError::NotFound(_)) => None,
            Err(e) => return Err(e),
        };

        let mut branches = Vec::new();
        for (name, path) in enumerate_branches(&self.heads_dir())? {
            let Some(reference) = read_loose_ref(&path, &name)? else {
                continue;
            };
            let Some(oid) = reference.target_oid() else {
                return Err(RefError::Parse {
                    name,
                    reason: "branch file contains a symbolic ref".into(),
                });
            };
            let is_current = current.as_deref() == Some(name.as_str());
            branches.push(Branch {
                name,
                oid,
                is_current,
            });
        }

        Ok(branches)
    }

    /// Delete a branch.
    ///
    /// Refuses with [`RefError::DeleteCurrent`] when `name` is the branch
    /// the symbolic HEAD names; fails with [`RefError::NotFound`] when the
    /// branch file is absent.
    pub fn branch_delete(&self, name: &str) -> Result<(), RefError> {
        validate_branch_name(name)?;

        if let Ok(Some(current)) = self.current_branch() {
            if current == name {
                return Err(RefError::DeleteCurrent(name.to_string()));
            }
        }

        let path = self.branch_path(name);
        if !path.is_file() {
            return Err(RefError::NotFound(name.to_string()));
        }
        fs::remove_file(&path).map_err(|e| RefError::IoPath {
            path: path.clone(),
            source: e,
        })?;

        // Prune now-empty parent directories under refs/heads.
        let heads = self.heads_dir();
        let mut dir = path.parent().map(Path::to_path_buf);
        while let Some(d) = dir {
            if d == heads {
                break;
            }
            if d.read_dir().map(|mut e| e.next().is_none()).unwrap_or(false) {
                let _ = fs::remove_dir(&d);
                dir = d.parent().map(Path::to_path_buf);
            } else {
                break;
            }
        }

        Ok(())
    }

    /// Retarget HEAD at an existing branch.
    ///
    /// Fails with [`RefError::NotFound`] if the branch file is absent.
    /// Working-tree synchronization is the repository's job.
    pub fn branch_checkout(&self, name: &str) -> Result<(), RefError> {
        validate_branch_name(name)?;
        if !self.branch_path(name).is_file() {
            return Err(RefError::NotFound(name.to_string()));
        }
        self.set_head_to_branch(name)
    }
}
