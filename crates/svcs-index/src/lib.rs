//! Staging index for svcs.
//!
//! Provides reading, writing, and manipulation of the index file
//! (`.svcs/index`). The index sits between the working tree and the object
//! store, tracking which files are staged for the next commit, and is the
//! source from which snapshot trees are synthesized.

mod entry;
mod read;
mod write;

use std::path::Path;

use bstr::{BStr, BString, ByteSlice};
use svcs_hash::{Hasher, ObjectId};
use svcs_object::{Blob, Object};
use svcs_odb::ObjectStore;

pub use entry::{FileStatus, IndexEntry};

/// Errors produced by index operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("corrupt index: {0}")]
    Corrupt(String),

    #[error("unsupported index version: {0}")]
    UnsupportedVersion(u32),

    #[error("path not in index: {0}")]
    EntryNotFound(BString),

    #[error("working-tree file not found: {0}")]
    FileNotFound(BString),

    #[error("path too long for index record: {0} bytes")]
    PathTooLong(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Odb(#[from] svcs_odb::OdbError),

    #[error(transparent)]
    Hash(#[from] svcs_hash::HashError),

    #[error(transparent)]
    Lock(#[from] svcs_utils::UtilError),
}

/// The staging index.
///
/// Entries are kept sorted by path; paths are unique.
pub struct Index {
    entries: Vec<IndexEntry>,
    /// Unix seconds of the last successful save.
    last_write: i64,
}

impl Index {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            last_write: 0,
        }
    }

    /// Read the index from a file. A missing or empty file yields an empty
    /// index.
    pub fn read_from(path: impl AsRef<Path>) -> Result<Self, IndexError> {
        let file = match std::fs::File::open(path.as_ref()) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => return Err(e.into()),
        };
        if file.metadata()?.len() == 0 {
            return Ok(Self::new());
        }
        let data = unsafe { memmap2::Mmap::map(&file) }?;
        read::parse_index(&data)
    }

    /// Write the index to a file (atomic, using a lock file).
    pub fn write_to(&mut self, path: impl AsRef<Path>) -> Result<(), IndexError> {
        write::write_index(self, path.as_ref())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Is the index empty?
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Unix seconds of the last save (0 if never saved).
    pub fn last_write(&self) -> i64 {
        self.last_write
    }

    /// Get an entry by path.
    pub fn get(&self, path: &BStr) -> Option<&IndexEntry> {
        self.entries
            .binary_search_by(|e| e.path.as_bstr().cmp(path))
            .ok()
            .map(|pos| &self.entries[pos])
    }

    /// Iterate over all entries in path order.
    pub fn iter(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.iter()
    }

    /// Add or replace an entry, keeping the path order.
    pub fn upsert(&mut self, entry: IndexEntry) {
        match self
            .entries
            .binary_search_by(|e| e.path.cmp(&entry.path))
        {
            Ok(pos) => self.entries[pos] = entry,
            Err(pos) => self.entries.insert(pos, entry),
        }
    }

    /// Stage a working-tree file: hash its content, write the blob to the
    /// object store, and upsert the entry with status [`FileStatus::Added`].
    pub fn add(
        &mut self,
        work_dir: &Path,
        rel_path: &BStr,
        store: &ObjectStore,
    ) -> Result<ObjectId, IndexError> {
        let abs_path = work_dir.join(rel_path.to_str_lossy().as_ref());
        let data = match std::fs::read(&abs_path) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(IndexError::FileNotFound(BString::from(rel_path)))
            }
            Err(e) => return Err(e.into()),
        };

        let oid = store.write(&Object::Blob(Blob::new(data)))?;
        let meta = std::fs::metadata(&abs_path)?;

        self.upsert(IndexEntry {
            path: BString::from(rel_path),
            oid,
            mode: entry::mode_from_metadata(&meta),
            mtime: entry::mtime_from_metadata(&meta),
            size: meta.len(),
            status: FileStatus::Added,
        });

        Ok(oid)
    }

    /// Remove an entry by path. Fails with [`IndexError::EntryNotFound`] if
    /// the path is not staged.
    pub fn remove(&mut self, rel_path: &BStr) -> Result<(), IndexError> {
        match self
            .entries
            .binary_search_by(|e| e.path.as_bstr().cmp(rel_path))
        {
            Ok(pos) => {
                self.entries.remove(pos);
                Ok(())
            }
            Err(_) => Err(IndexError::EntryNotFound(BString::from(rel_path))),
        }
    }

    /// Return a copy of every entry with `status` recomputed against the
    /// working tree: [`FileStatus::Deleted`] if the file no longer exists,
    /// [`FileStatus::Modified`] if the mtime differs and the recomputed blob
    /// hash differs, unchanged otherwise.
    pub fn status(&self, work_dir: &Path) -> Result<Vec<IndexEntry>, IndexError> {
        let mut out = Vec::with_capacity(self.entries.len());

        for entry in &self.entries {
            let mut entry = entry.clone();
            let abs_path = work_dir.join(entry.path.to_str_lossy().as_ref());

            match std::fs::metadata(&abs_path) {
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    entry.status = FileStatus::Deleted;
                }
                Err(e) => return Err(e.into()),
                Ok(meta) => {
                    let mtime = entry::mtime_from_metadata(&meta);
                    if mtime != entry.mtime {
                        let oid = Hasher::hash_file(&abs_path)?;
                        if oid != entry.oid {
                            entry.status = FileStatus::Modified;
                        }
                    }
                }
            }

            out.push(entry);
        }

        Ok(out)
    }

    /// Synthesize a tree object from the index and write it to the store.
    ///
    /// Entries are emitted in path order, so identical index contents yield
    /// identical tree ids. An empty index yields the null id ("empty tree").
    pub fn write_tree(&self, store: &ObjectStore) -> Result<ObjectId, IndexError> {
        write::write_tree_from_index(self, store)
    }

    pub(crate) fn entries_mut(&mut self) -> &mut Vec<IndexEntry> {
        &mut self.entries
    }

    pub(crate) fn set_last_write(&mut self, secs: i64) {
        self.last_write = secs;
    }
}

impl Default for Index {
    fn default() -> Self {
        Self::new()
    }
}
