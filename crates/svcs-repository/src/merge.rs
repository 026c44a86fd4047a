//! The merge driver: fast-forward detection, tree merge, conflict
//! materialization, merge commit.

use svcs_dag::CommitDag;
use svcs_hash::ObjectId;
use svcs_merge::{merge_trees, MergeConflict};

use crate::commit::resolve_author;
use crate::{RepoError, Repository};

/// Result of `merge`.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// True when the current branch was simply advanced to the target.
    pub is_fast_forward: bool,
    /// True when the target was already reachable from HEAD.
    pub already_up_to_date: bool,
    /// The merge commit (absent for fast-forward, up-to-date, and
    /// conflicted outcomes).
    pub commit: Option<ObjectId>,
    /// Unresolved conflicts; empty means the merge completed.
    pub conflicts: Vec<MergeConflict>,
}

impl MergeOutcome {
    /// Whether the merge finished without conflicts.
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }
}

impl Repository {
    /// Merge the named branch into the current branch.
    ///
    /// Fast-forwards when HEAD is an ancestor of the target. Otherwise runs
    /// a three-way tree merge against the merge base; a clean merge writes
    /// the merged files, creates a merge commit with both parents, and
    /// advances the branch. Conflicts are materialized into the working
    /// tree with markers and returned as data — no commit is created.
    pub fn merge(&mut self, branch: &str, author: Option<&str>) -> Result<MergeOutcome, RepoError> {
        let current = self
            .current_branch()?
            .ok_or(RepoError::UnbornHead)?;
        if current == branch {
            return Err(RepoError::MergeWithSelf);
        }

        let ours = self.head_oid()?.ok_or(RepoError::UnbornHead)?;
        let theirs = self
            .refs()
            .branch_tip(branch)?
            .ok_or_else(|| RepoError::BranchNotFound(branch.to_string()))?;

        let dag = CommitDag::load_from_repository(self.odb(), self.refs())?;

        if dag.is_ancestor(&theirs, &ours)? {
            // The target is already reachable: a degenerate fast-forward
            // that moves nothing.
            return Ok(MergeOutcome {
                is_fast_forward: true,
                already_up_to_date: true,
                commit: None,
                conflicts: Vec::new(),
            });
        }

        if dag.is_ancestor(&ours, &theirs)? {
            // Fast-forward: retarget the current branch, no new commit.
            self.refs().branch_update(&current, &theirs)?;
            self.sync_working_tree(&theirs)?;
            return Ok(MergeOutcome {
                is_fast_forward: true,
                already_up_to_date: false,
                commit: None,
                conflicts: Vec::new(),
            });
        }

        let base = dag.merge_base(&ours, &theirs)?.oid;

        let base_map = self.commit_file_map(&base)?;
        let ours_map = self.commit_file_map(&ours)?;
        let theirs_map = self.commit_file_map(&theirs)?;

        let result = merge_trees(self.odb(), &base_map, &ours_map, &theirs_map, branch)?;

        if !result.is_clean() {
            // Materialize the merged view, markers included, so the user
            // can inspect and resolve. No commit is created.
            for (path, file) in &result.files {
                self.write_work_file(path, &file.content, file.mode)?;
            }
            return Ok(MergeOutcome {
                is_fast_forward: false,
                already_up_to_date: false,
                commit: None,
                conflicts: result.conflicts,
            });
        }

        // Clean: stage the merged snapshot and record the merge commit.
        let merged_map: std::collections::BTreeMap<_, _> = result
            .files
            .iter()
            .map(|(path, file)| {
                let oid = self
                    .odb()
                    .write(&svcs_object::Object::Blob(svcs_object::Blob::new(
                        file.content.clone(),
                    )))?;
                Ok::<_, RepoError>((
                    path.clone(),
                    svcs_merge::FileEntry {
                        oid,
                        mode: file.mode,
                    },
                ))
            })
            .collect::<Result<_, _>>()?;
        self.write_files_and_reindex(&merged_map)?;

        let tree = self.with_index(|index, repo| Ok(index.write_tree(repo.odb())?))?;
        let author = resolve_author(author)?;
        let message = format!("Merge branch '{branch}'");
        let oid = self.write_commit_object(tree, vec![ours, theirs], &author, &message)?;

        // Ref update last.
        self.refs().branch_update(&current, &oid)?;

        Ok(MergeOutcome {
            is_fast_forward: false,
            already_up_to_date: false,
            commit: Some(oid),
            conflicts: Vec::new(),
        })
    }
}
