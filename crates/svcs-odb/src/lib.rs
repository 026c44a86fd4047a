//! Content-addressed object storage: read, write, and enumerate
//! zlib-compressed objects.
//!
//! Each object lives at `.svcs/objects/XX/YYYY...` where `XX` is the first
//! byte of the id in hex and `YYYY...` is the rest. The file content is
//! zlib-compressed `"<type> <size>\0<payload>"`.

pub mod codec;
mod enumerate;
mod read;
mod write;

use std::path::{Path, PathBuf};

use svcs_hash::{HashError, ObjectId};

/// Interface to the objects directory (`.svcs/objects/`).
pub struct ObjectStore {
    /// Path to the objects directory.
    objects_dir: PathBuf,
    /// Zlib compression level.
    compression_level: flate2::Compression,
}

impl ObjectStore {
    /// Open the object store at the given objects directory.
    pub fn open(objects_dir: impl AsRef<Path>) -> Self {
        Self {
            objects_dir: objects_dir.as_ref().to_path_buf(),
            compression_level: flate2::Compression::default(),
        }
    }

    /// Set the zlib compression level (0–9).
    pub fn set_compression_level(&mut self, level: u32) {
        self.compression_level = flate2::Compression::new(level);
    }

    /// Get the file path for a given object id.
    pub fn object_path(&self, oid: &ObjectId) -> PathBuf {
        self.objects_dir.join(oid.fanout_path())
    }

    /// Path to the objects directory.
    pub fn objects_dir(&self) -> &Path {
        &self.objects_dir
    }
}

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum OdbError {
    #[error("object not found: {0}")]
    NotFound(ObjectId),

    #[error("corrupt object {oid}: {reason}")]
    Corrupt { oid: String, reason: String },

    #[error("decompression error for {oid}: {source}")]
    Decompress {
        oid: String,
        #[source]
        source: std::io::Error,
    },

    #[error("ambiguous object id prefix '{prefix}' ({count} matches)")]
    Ambiguous { prefix: String, count: usize },

    #[error("no object matches prefix '{0}'")]
    PrefixNotFound(String),

    #[error("invalid object id prefix '{0}'")]
    InvalidPrefix(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("object parse error: {0}")]
    Object(#[from] svcs_object::ObjectError),

    #[error("hash error: {0}")]
    Hash(#[from] HashError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_path_fanout() {
        let store = ObjectStore::open("/tmp/objects");
        let oid = svcs_hash::Hasher::digest(b"");
        let path = store.object_path(&oid);
        let hex = oid.to_hex();
        assert_eq!(
            path,
            PathBuf::from(format!("/tmp/objects/{}/{}", &hex[..2], &hex[2..]))
        );
    }
}
