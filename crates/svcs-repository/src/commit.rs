//! The commit writer: tree from index, parent from HEAD, commit object,
//! branch advance.

use bstr::BString;
use svcs_hash::ObjectId;
use svcs_object::{Commit, Object};
use svcs_ref::Reference;
use svcs_utils::date::{Signature, Timestamp};

use crate::{RepoError, Repository, AUTHOR_ENV};

/// Upper bound on commit message size in bytes.
pub const MAX_MESSAGE_SIZE: usize = 1024;

/// Fallback identity when neither `--author` nor `SVCS_AUTHOR` is set.
const DEFAULT_AUTHOR: &str = "svcs <svcs@localhost>";

impl Repository {
    /// Record the staged snapshot as a new commit and advance the current
    /// ref. Returns the new commit id.
    ///
    /// `author` overrides the `SVCS_AUTHOR` environment variable. The ref
    /// update is the final step: any earlier failure leaves refs and the
    /// index untouched (at worst an unreachable object exists).
    pub fn commit(&mut self, message: &str, author: Option<&str>) -> Result<ObjectId, RepoError> {
        let author = resolve_author(author)?;
        self.commit_with_signature(message, author)
    }

    /// Like [`commit`](Repository::commit), with a fully specified author
    /// signature (identity and timestamp).
    pub fn commit_with_signature(
        &mut self,
        message: &str,
        author: Signature,
    ) -> Result<ObjectId, RepoError> {
        if message.len() > MAX_MESSAGE_SIZE {
            return Err(RepoError::MessageTooLong(message.len()));
        }

        // 1. Synthesize the snapshot tree from the index.
        let index_is_empty = self.index()?.is_empty();
        let tree = self.with_index(|index, repo| Ok(index.write_tree(repo.odb())?))?;

        // 2. Resolve the parent from HEAD.
        let head = self.refs().read_head()?;
        let parent = match &head {
            Reference::Symbolic { target } => {
                let name = target.strip_prefix("refs/heads/").unwrap_or(target);
                self.refs().branch_tip(name)?.unwrap_or(ObjectId::NULL)
            }
            Reference::Direct { target } => *target,
        };

        // Refuse empty commits: nothing staged on a root commit, or a tree
        // identical to the parent's.
        if parent.is_null() {
            if index_is_empty {
                return Err(RepoError::NothingToCommit);
            }
        } else {
            let parent_commit = self.read_commit(&parent)?;
            if parent_commit.tree == tree {
                return Err(RepoError::NothingToCommit);
            }
        }

        // 3–4. Build and write the commit object.
        let parents = if parent.is_null() {
            Vec::new()
        } else {
            vec![parent]
        };
        let oid = self.write_commit_object(tree, parents, &author, message)?;

        // 5. Advance the current ref — the last mutation.
        match &head {
            Reference::Symbolic { target } => {
                let name = target.strip_prefix("refs/heads/").unwrap_or(target);
                self.refs().branch_update(name, &oid)?;
            }
            Reference::Direct { .. } => {
                self.refs().set_head_detached(&oid)?;
            }
        }

        Ok(oid)
    }

    /// Build a commit object and write it to the store. Shared by the
    /// commit writer and the merge driver.
    pub(crate) fn write_commit_object(
        &self,
        tree: ObjectId,
        parents: Vec<ObjectId>,
        author: &Signature,
        message: &str,
    ) -> Result<ObjectId, RepoError> {
        let commit = Commit {
            tree,
            parents,
            author: author.clone(),
            committer: author.clone(),
            signature: None,
            message: BString::from(message),
        };
        Ok(self.odb().write(&Object::Commit(commit))?)
    }
}

/// Resolve the author identity: explicit override, then `SVCS_AUTHOR`,
/// then the built-in fallback.
pub(crate) fn resolve_author(explicit: Option<&str>) -> Result<Signature, RepoError> {
    let identity = match explicit {
        Some(s) => s.to_string(),
        None => std::env::var(AUTHOR_ENV).unwrap_or_else(|_| DEFAULT_AUTHOR.to_string()),
    };
    Signature::parse_identity(&identity, Timestamp::now())
        .map_err(|e| RepoError::InvalidAuthor(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Repository;

    fn repo() -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        (dir, repo)
    }

    #[test]
    fn first_commit_creates_branch_file() {
        let (dir, mut repo) = repo();
        std::fs::write(dir.path().join("a.txt"), b"hello\n").unwrap();
        repo.add("a.txt").unwrap();

        let oid = repo.commit("first", Some("T <t@x>")).unwrap();

        let main = dir.path().join(".svcs/refs/heads/main");
        assert!(main.is_file());
        let stored = std::fs::read_to_string(main).unwrap();
        assert_eq!(stored, format!("{}\n", oid.to_hex()));

        let commit = repo.read_commit(&oid).unwrap();
        assert!(commit.is_root());
        assert_eq!(commit.message, "first");
        assert_eq!(commit.author.name, "T");
        assert_eq!(commit.author.email, "t@x");
    }

    #[test]
    fn second_commit_links_parent() {
        let (dir, mut repo) = repo();
        std::fs::write(dir.path().join("a.txt"), b"one\n").unwrap();
        repo.add("a.txt").unwrap();
        let first = repo.commit("first", Some("T <t@x>")).unwrap();

        std::fs::write(dir.path().join("a.txt"), b"two\n").unwrap();
        repo.add("a.txt").unwrap();
        let second = repo.commit("second", Some("T <t@x>")).unwrap();

        let commit = repo.read_commit(&second).unwrap();
        assert_eq!(commit.parents, vec![first]);
    }

    #[test]
    fn empty_index_root_commit_is_refused() {
        let (_dir, mut repo) = repo();
        assert!(matches!(
            repo.commit("empty", Some("T <t@x>")),
            Err(RepoError::NothingToCommit)
        ));
    }

    #[test]
    fn unchanged_tree_is_refused() {
        let (dir, mut repo) = repo();
        std::fs::write(dir.path().join("a.txt"), b"same\n").unwrap();
        repo.add("a.txt").unwrap();
        repo.commit("first", Some("T <t@x>")).unwrap();

        assert!(matches!(
            repo.commit("no changes", Some("T <t@x>")),
            Err(RepoError::NothingToCommit)
        ));
    }

    #[test]
    fn oversized_message_is_refused() {
        let (_dir, mut repo) = repo();
        let long = "x".repeat(MAX_MESSAGE_SIZE + 1);
        assert!(matches!(
            repo.commit(&long, Some("T <t@x>")),
            Err(RepoError::MessageTooLong(_))
        ));
    }

    #[test]
    fn detached_head_commit_rewrites_head() {
        let (dir, mut repo) = repo();
        std::fs::write(dir.path().join("a.txt"), b"one\n").unwrap();
        repo.add("a.txt").unwrap();
        let first = repo.commit("first", Some("T <t@x>")).unwrap();

        repo.refs().set_head_detached(&first).unwrap();

        std::fs::write(dir.path().join("a.txt"), b"two\n").unwrap();
        repo.add("a.txt").unwrap();
        let second = repo.commit("second", Some("T <t@x>")).unwrap();

        assert_eq!(repo.current_branch().unwrap(), None);
        assert_eq!(repo.head_oid().unwrap(), Some(second));
        // The branch was not moved.
        assert_eq!(repo.refs().branch_tip("main").unwrap(), Some(first));
    }

    #[test]
    fn author_falls_back_when_not_given() {
        let sig = resolve_author(Some("Jane Dev <jane@dev>")).unwrap();
        assert_eq!(sig.name, "Jane Dev");
        assert_eq!(sig.email, "jane@dev");
    }
}
