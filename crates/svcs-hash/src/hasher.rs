use std::path::Path;

use digest::Digest;
use sha3::Sha3_256;

use crate::{HashError, ObjectId, HASH_SIZE};

/// Streaming SHA3-256 hash computation.
///
/// Data can be fed incrementally with [`update`](Hasher::update) or through
/// the [`std::io::Write`] implementation, then finalised into an
/// [`ObjectId`].
pub struct Hasher {
    inner: Sha3_256,
}

impl Hasher {
    /// Create a new hasher.
    pub fn new() -> Self {
        Self {
            inner: Sha3_256::new(),
        }
    }

    /// Feed data into the hasher.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    /// Finalize and return the ObjectId.
    pub fn finalize(self) -> ObjectId {
        let result = self.inner.finalize();
        let mut bytes = [0u8; HASH_SIZE];
        bytes.copy_from_slice(result.as_slice());
        ObjectId::new(bytes)
    }

    /// Convenience: hash data in one call.
    pub fn digest(data: &[u8]) -> ObjectId {
        let mut h = Self::new();
        h.update(data);
        h.finalize()
    }

    /// Hash a typed object payload: `"{type} {len}\0{content}"`.
    pub fn hash_object(type_name: &str, data: &[u8]) -> ObjectId {
        let header = format!("{} {}\0", type_name, data.len());
        let mut h = Self::new();
        h.update(header.as_bytes());
        h.update(data);
        h.finalize()
    }

    /// Hash a working-tree file as a blob.
    pub fn hash_file(path: impl AsRef<Path>) -> Result<ObjectId, HashError> {
        let data = std::fs::read(path)?;
        Ok(Self::hash_object("blob", &data))
    }
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::io::Write for Hasher {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
