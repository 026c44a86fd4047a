//! Repository discovery, initialization, and central access for all svcs
//! subsystems.
//!
//! A [`Repository`] owns the object store, the reference store, the staging
//! index, and the parsed config, and provides the multi-step operations
//! (commit, checkout, merge, status) that coordinate them. Handles are
//! single-threaded; independent handles in one process are independent.

mod checkout;
mod commit;
pub mod config;
mod init;
mod merge;
mod status;

pub use checkout::CheckoutTarget;
pub use commit::MAX_MESSAGE_SIZE;
pub use config::Config;
pub use merge::MergeOutcome;
pub use status::StatusEntry;

use std::path::{Path, PathBuf};

use bstr::BString;
use svcs_hash::ObjectId;
use svcs_index::Index;
use svcs_merge::MergeError;
use svcs_object::{Commit, Object, Tree};
use svcs_odb::ObjectStore;
use svcs_ref::RefStore;

/// Name of the repository metadata directory.
pub const SVCS_DIR: &str = ".svcs";

/// Environment variable providing the default author identity.
pub const AUTHOR_ENV: &str = "SVCS_AUTHOR";

/// Errors produced by repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("not an svcs repository: {0}")]
    NotARepository(PathBuf),

    #[error("branch not found: {0}")]
    BranchNotFound(String),

    #[error("nothing to commit")]
    NothingToCommit,

    #[error("commit message too long: {0} bytes (limit {MAX_MESSAGE_SIZE})")]
    MessageTooLong(usize),

    #[error("invalid author identity: {0}")]
    InvalidAuthor(String),

    #[error("HEAD does not point to a commit yet")]
    UnbornHead,

    #[error("cannot merge a branch into itself")]
    MergeWithSelf,

    #[error("object {oid} is not a {expected}")]
    UnexpectedObjectType { oid: ObjectId, expected: &'static str },

    #[error("config parse error at line {line}: {reason}")]
    ConfigParse { line: usize, reason: String },

    #[error(transparent)]
    Odb(#[from] svcs_odb::OdbError),

    #[error(transparent)]
    Object(#[from] svcs_object::ObjectError),

    #[error(transparent)]
    Index(#[from] svcs_index::IndexError),

    #[error(transparent)]
    Ref(#[from] svcs_ref::RefError),

    #[error(transparent)]
    Dag(#[from] svcs_dag::DagError),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error(transparent)]
    Util(#[from] svcs_utils::UtilError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The central repository handle.
pub struct Repository {
    /// Working tree root.
    work_dir: PathBuf,
    /// The `.svcs` metadata directory.
    svcs_dir: PathBuf,
    /// Object store.
    odb: ObjectStore,
    /// Reference store.
    refs: RefStore,
    /// Parsed configuration.
    config: Config,
    /// Staging index (lazy-loaded).
    index: Option<Index>,
    /// Path to the index file.
    index_path: PathBuf,
}

impl Repository {
    /// Open an existing repository whose working tree root is `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RepoError> {
        let work_dir = path.as_ref().to_path_buf();
        let svcs_dir = work_dir.join(SVCS_DIR);
        if !Self::is_valid(&work_dir) {
            return Err(RepoError::NotARepository(work_dir));
        }
        Self::from_dirs(work_dir, svcs_dir)
    }

    /// Discover a repository by walking up from `start`.
    pub fn discover(start: impl AsRef<Path>) -> Result<Self, RepoError> {
        let mut dir = Some(start.as_ref().to_path_buf());
        while let Some(current) = dir {
            if Self::is_valid(&current) {
                return Self::open(current);
            }
            dir = current.parent().map(Path::to_path_buf);
        }
        Err(RepoError::NotARepository(start.as_ref().to_path_buf()))
    }

    /// Initialize a new repository at `path`, creating the `.svcs` layout.
    /// Re-initializing an existing repository is a safe no-op.
    pub fn init(path: impl AsRef<Path>) -> Result<Self, RepoError> {
        let work_dir = path.as_ref().to_path_buf();
        let svcs_dir = init::init_layout(&work_dir)?;
        Self::from_dirs(work_dir, svcs_dir)
    }

    /// Does `path` hold a repository (a `.svcs` directory with a HEAD)?
    pub fn is_valid(path: impl AsRef<Path>) -> bool {
        let svcs_dir = path.as_ref().join(SVCS_DIR);
        svcs_dir.join("HEAD").is_file() && svcs_dir.join("objects").is_dir()
    }

    fn from_dirs(work_dir: PathBuf, svcs_dir: PathBuf) -> Result<Self, RepoError> {
        let odb = ObjectStore::open(svcs_dir.join("objects"));
        let refs = RefStore::new(&svcs_dir);
        let config = Config::load(svcs_dir.join("config"))?;
        let index_path = svcs_dir.join("index");

        Ok(Self {
            work_dir,
            svcs_dir,
            odb,
            refs,
            config,
            index: None,
            index_path,
        })
    }

    // --- Path accessors ---

    /// Working tree root.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// The `.svcs` directory.
    pub fn svcs_dir(&self) -> &Path {
        &self.svcs_dir
    }

    // --- Subsystem accessors ---

    /// Access the object store.
    pub fn odb(&self) -> &ObjectStore {
        &self.odb
    }

    /// Access the reference store.
    pub fn refs(&self) -> &RefStore {
        &self.refs
    }

    /// Access the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Access the index (lazy-loaded).
    pub fn index(&mut self) -> Result<&Index, RepoError> {
        self.load_index_if_needed()?;
        Ok(self.index.as_ref().unwrap())
    }

    /// Access the index mutably (lazy-loaded).
    pub fn index_mut(&mut self) -> Result<&mut Index, RepoError> {
        self.load_index_if_needed()?;
        Ok(self.index.as_mut().unwrap())
    }

    fn load_index_if_needed(&mut self) -> Result<(), RepoError> {
        if self.index.is_none() {
            self.index = Some(Index::read_from(&self.index_path)?);
        }
        Ok(())
    }

    /// Persist the in-memory index. Every index mutation goes through this
    /// so the on-disk file reflects each successful operation.
    pub fn save_index(&mut self) -> Result<(), RepoError> {
        let path = self.index_path.clone();
        if let Some(ref mut index) = self.index {
            index.write_to(&path)?;
        }
        Ok(())
    }

    /// Drop the cached index so the next access re-reads from disk.
    pub fn reload_index(&mut self) {
        self.index = None;
    }

    // --- Staging operations ---

    /// Stage a file: hash, store the blob, record the entry, persist.
    pub fn add(&mut self, rel_path: &str) -> Result<ObjectId, RepoError> {
        let result = self.with_index(|index, repo| {
            Ok(index.add(repo.work_dir(), rel_path.into(), repo.odb())?)
        })?;
        self.save_index()?;
        Ok(result)
    }

    /// Run `f` with the index taken out of the handle, so it can borrow the
    /// other subsystems at the same time.
    pub(crate) fn with_index<T>(
        &mut self,
        f: impl FnOnce(&mut Index, &Repository) -> Result<T, RepoError>,
    ) -> Result<T, RepoError> {
        self.load_index_if_needed()?;
        let mut index = self.index.take().unwrap();
        let result = f(&mut index, self);
        self.index = Some(index);
        result
    }

    /// Unstage a file and persist.
    pub fn remove(&mut self, rel_path: &str) -> Result<(), RepoError> {
        self.index_mut()?.remove(rel_path.into())?;
        self.save_index()?;
        Ok(())
    }

    // --- Convenience queries ---

    /// Resolve HEAD to a commit id (`None` on an unborn branch).
    pub fn head_oid(&self) -> Result<Option<ObjectId>, RepoError> {
        Ok(self.refs.head_oid()?)
    }

    /// The current branch name (`None` when HEAD is detached).
    pub fn current_branch(&self) -> Result<Option<String>, RepoError> {
        Ok(self.refs.current_branch()?)
    }

    /// Read a commit object, failing when the id names something else.
    pub fn read_commit(&self, oid: &ObjectId) -> Result<Commit, RepoError> {
        match self.odb.read(oid)? {
            Object::Commit(c) => Ok(c),
            _ => Err(RepoError::UnexpectedObjectType {
                oid: *oid,
                expected: "commit",
            }),
        }
    }

    /// Read a tree object. The null id yields the empty tree.
    pub fn read_tree(&self, oid: &ObjectId) -> Result<Tree, RepoError> {
        if oid.is_null() {
            return Ok(Tree::new());
        }
        match self.odb.read(oid)? {
            Object::Tree(t) => Ok(t),
            _ => Err(RepoError::UnexpectedObjectType {
                oid: *oid,
                expected: "tree",
            }),
        }
    }

    /// The flat file map of a commit's tree: path → (blob id, mode).
    pub fn commit_file_map(
        &self,
        commit_oid: &ObjectId,
    ) -> Result<std::collections::BTreeMap<BString, svcs_merge::FileEntry>, RepoError> {
        let commit = self.read_commit(commit_oid)?;
        let tree = self.read_tree(&commit.tree)?;
        Ok(tree
            .iter()
            .map(|e| {
                (
                    e.name.clone(),
                    svcs_merge::FileEntry {
                        oid: e.oid,
                        mode: e.mode,
                    },
                )
            })
            .collect())
    }
}
