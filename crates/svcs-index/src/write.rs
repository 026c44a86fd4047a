//! Index file writing (format v1) and tree synthesis.

use std::path::Path;

use svcs_hash::ObjectId;
use svcs_object::{FileMode, Object, Tree, TreeEntry};
use svcs_odb::ObjectStore;
use svcs_utils::lockfile::write_atomic;

use crate::read::{ENTRY_RECORD_SIZE, INDEX_VERSION, PATH_FIELD_SIZE};
use crate::{Index, IndexError};

/// Write the index to `path` atomically through a lock file.
pub(crate) fn write_index(index: &mut Index, path: &Path) -> Result<(), IndexError> {
    let mut buf = Vec::with_capacity(8 + index.len() * ENTRY_RECORD_SIZE);
    buf.extend_from_slice(&INDEX_VERSION.to_le_bytes());
    buf.extend_from_slice(&(index.len() as u32).to_le_bytes());

    for entry in index.iter() {
        if entry.path.len() >= PATH_FIELD_SIZE {
            return Err(IndexError::PathTooLong(entry.path.len()));
        }

        let mut record = vec![0u8; ENTRY_RECORD_SIZE];
        record[..entry.path.len()].copy_from_slice(&entry.path);

        let mut cursor = PATH_FIELD_SIZE;
        record[cursor..cursor + 32].copy_from_slice(entry.oid.as_bytes());
        cursor += 32;
        record[cursor..cursor + 4].copy_from_slice(&entry.mode.to_le_bytes());
        cursor += 4;
        record[cursor..cursor + 8].copy_from_slice(&entry.mtime.to_le_bytes());
        cursor += 8;
        record[cursor..cursor + 8].copy_from_slice(&entry.size.to_le_bytes());
        cursor += 8;
        record[cursor..cursor + 4].copy_from_slice(&entry.status.as_u32().to_le_bytes());

        buf.extend_from_slice(&record);
    }

    write_atomic(path, &buf)?;

    index.set_last_write(now_secs());
    Ok(())
}

/// Synthesize a flat tree from the index, write it to the store, and return
/// its id. An empty index yields the null id.
pub(crate) fn write_tree_from_index(
    index: &Index,
    store: &ObjectStore,
) -> Result<ObjectId, IndexError> {
    if index.is_empty() {
        return Ok(ObjectId::NULL);
    }

    // Index entries are already in path order.
    let entries = index
        .iter()
        .map(|e| TreeEntry {
            mode: FileMode::from_raw(e.mode).unwrap_or(FileMode::Regular),
            name: e.path.clone(),
            oid: e.oid,
        })
        .collect();

    let tree = Object::Tree(Tree { entries });
    Ok(store.write(&tree)?)
}

fn now_secs() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
