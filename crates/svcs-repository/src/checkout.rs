//! Checkout: retarget HEAD and synchronize the working tree.

use std::collections::BTreeMap;

use bstr::{BString, ByteSlice};
use svcs_hash::ObjectId;
use svcs_merge::FileEntry;
use svcs_object::FileMode;

use crate::{RepoError, Repository};

/// What a checkout resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutTarget {
    /// HEAD now points at this branch symbolically.
    Branch(String),
    /// HEAD is detached at this commit.
    Detached(ObjectId),
}

impl Repository {
    /// Check out a branch or a commit.
    ///
    /// `target` is tried as a branch name first, then as a commit id or
    /// unique id prefix (detached HEAD). With `create`, a new branch is
    /// created at the current HEAD and checked out.
    ///
    /// HEAD moves first; the working tree and index are then synchronized
    /// to the target commit's snapshot.
    pub fn checkout(&mut self, target: &str, create: bool) -> Result<CheckoutTarget, RepoError> {
        if create {
            let head = self.head_oid()?.ok_or(RepoError::UnbornHead)?;
            self.refs().branch_create(target, &head)?;
            self.refs().branch_checkout(target)?;
            // The new branch points at the snapshot already on disk.
            return Ok(CheckoutTarget::Branch(target.to_string()));
        }

        if let Some(tip) = self.refs().branch_tip(target)? {
            self.refs().branch_checkout(target)?;
            self.sync_working_tree(&tip)?;
            return Ok(CheckoutTarget::Branch(target.to_string()));
        }

        // Not a branch: try a commit id or prefix for a detached checkout.
        let oid = match self.odb().resolve_prefix(target) {
            Ok(oid) => oid,
            Err(e @ svcs_odb::OdbError::Ambiguous { .. }) => return Err(e.into()),
            Err(_) => return Err(RepoError::BranchNotFound(target.to_string())),
        };
        self.read_commit(&oid)?;
        self.refs().set_head_detached(&oid)?;
        self.sync_working_tree(&oid)?;
        Ok(CheckoutTarget::Detached(oid))
    }

    /// Make the working tree and index match `commit_oid`'s snapshot:
    /// previously tracked files missing from the target are removed, target
    /// files are written out, and the index is rebuilt.
    pub(crate) fn sync_working_tree(&mut self, commit_oid: &ObjectId) -> Result<(), RepoError> {
        let target_map = self.commit_file_map(commit_oid)?;

        // Remove tracked files that the target snapshot does not have.
        let stale: Vec<BString> = self
            .index()?
            .iter()
            .map(|e| e.path.clone())
            .filter(|path| !target_map.contains_key(path))
            .collect();
        for path in stale {
            let abs = self.work_dir().join(path.to_str_lossy().as_ref());
            match std::fs::remove_file(&abs) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        self.write_files_and_reindex(&target_map)
    }

    /// Write a file map into the working tree and rebuild the index from it.
    pub(crate) fn write_files_and_reindex(
        &mut self,
        files: &BTreeMap<BString, FileEntry>,
    ) -> Result<(), RepoError> {
        for (path, entry) in files {
            let content = match self.odb().read(&entry.oid)? {
                svcs_object::Object::Blob(blob) => blob.data,
                _ => {
                    return Err(RepoError::UnexpectedObjectType {
                        oid: entry.oid,
                        expected: "blob",
                    })
                }
            };
            self.write_work_file(path, &content, entry.mode)?;
        }

        self.with_index(|index, repo| {
            *index = svcs_index::Index::new();
            for path in files.keys() {
                index.add(repo.work_dir(), path.as_bstr(), repo.odb())?;
            }
            Ok(())
        })?;
        self.save_index()
    }

    /// Write one working-tree file, creating parent directories and setting
    /// the executable bit when the mode asks for it.
    pub(crate) fn write_work_file(
        &self,
        path: &BString,
        content: &[u8],
        mode: FileMode,
    ) -> Result<(), RepoError> {
        let abs = self.work_dir().join(path.to_str_lossy().as_ref());
        svcs_utils::fs::write_file(&abs, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let bits = if mode == FileMode::Executable {
                0o755
            } else {
                0o644
            };
            std::fs::set_permissions(&abs, std::fs::Permissions::from_mode(bits))?;
        }
        #[cfg(not(unix))]
        let _ = mode;

        Ok(())
    }
}
