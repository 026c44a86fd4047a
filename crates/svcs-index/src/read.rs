//! Index file reading (format v1).

use bstr::BString;
use svcs_hash::{ObjectId, HASH_SIZE};

use crate::entry::{FileStatus, IndexEntry};
use crate::{Index, IndexError};

/// Supported on-disk format version.
pub(crate) const INDEX_VERSION: u32 = 1;

/// Fixed width of the path field in an entry record.
pub(crate) const PATH_FIELD_SIZE: usize = 4096;

/// Size of one on-disk entry record:
/// path[4096] + hash[32] + mode(4) + mtime(8) + size(8) + status(4).
pub(crate) const ENTRY_RECORD_SIZE: usize = PATH_FIELD_SIZE + HASH_SIZE + 4 + 8 + 8 + 4;

/// Parse an index file from raw bytes.
pub(crate) fn parse_index(data: &[u8]) -> Result<Index, IndexError> {
    if data.len() < 8 {
        return Err(IndexError::Corrupt("index header truncated".into()));
    }

    let version = read_u32(&data[0..4]);
    if version != INDEX_VERSION {
        return Err(IndexError::UnsupportedVersion(version));
    }

    let entry_count = read_u32(&data[4..8]) as usize;
    let expected_len = 8 + entry_count * ENTRY_RECORD_SIZE;
    if data.len() != expected_len {
        return Err(IndexError::Corrupt(format!(
            "entry count mismatch: header declares {} entries ({} bytes), file is {} bytes",
            entry_count,
            expected_len,
            data.len()
        )));
    }

    let mut entries = Vec::with_capacity(entry_count);
    let mut cursor = 8;

    for _ in 0..entry_count {
        let record = &data[cursor..cursor + ENTRY_RECORD_SIZE];
        entries.push(parse_entry(record)?);
        cursor += ENTRY_RECORD_SIZE;
    }

    entries.sort_by(|a: &IndexEntry, b: &IndexEntry| a.path.cmp(&b.path));

    let mut index = Index::new();
    *index.entries_mut() = entries;
    Ok(index)
}

fn parse_entry(record: &[u8]) -> Result<IndexEntry, IndexError> {
    let path_field = &record[..PATH_FIELD_SIZE];
    let path_len = path_field
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(PATH_FIELD_SIZE);
    if path_len == 0 {
        return Err(IndexError::Corrupt("empty path in entry record".into()));
    }
    let path = BString::from(&path_field[..path_len]);

    let mut cursor = PATH_FIELD_SIZE;
    let oid = ObjectId::from_bytes(&record[cursor..cursor + HASH_SIZE])
        .map_err(|e| IndexError::Corrupt(e.to_string()))?;
    cursor += HASH_SIZE;

    let mode = read_u32(&record[cursor..cursor + 4]);
    cursor += 4;
    let mtime = read_i64(&record[cursor..cursor + 8]);
    cursor += 8;
    let size = read_u64(&record[cursor..cursor + 8]);
    cursor += 8;
    let status = FileStatus::from_u32(read_u32(&record[cursor..cursor + 4]))?;

    Ok(IndexEntry {
        path,
        oid,
        mode,
        mtime,
        size,
        status,
    })
}

fn read_u32(data: &[u8]) -> u32 {
    u32::from_le_bytes(data[..4].try_into().unwrap())
}

fn read_u64(data: &[u8]) -> u64 {
    u64::from_le_bytes(data[..8].try_into().unwrap())
}

fn read_i64(data: &[u8]) -> i64 {
    i64::from_le_bytes(data[..8].try_into().unwrap())
}
