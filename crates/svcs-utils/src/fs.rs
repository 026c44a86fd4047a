//! Whole-file and directory helpers used by the storage layers.

use std::path::Path;

use crate::error::UtilError;
use crate::Result;

/// Read an entire file. Missing files map to [`UtilError::NotFound`].
pub fn read_file(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    match std::fs::read(path) {
        Ok(data) => Ok(data),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(UtilError::NotFound(path.to_path_buf()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Write an entire file, creating parent directories as needed.
pub fn write_file(path: impl AsRef<Path>, data: &[u8]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, data)?;
    Ok(())
}

/// Create a directory and all missing parents.
pub fn mkdir_recursive(path: impl AsRef<Path>) -> Result<()> {
    std::fs::create_dir_all(path.as_ref())?;
    Ok(())
}

/// Check whether a path exists.
pub fn exists(path: impl AsRef<Path>) -> bool {
    path.as_ref().exists()
}

/// Modification time of a file as Unix seconds. Missing files map to
/// [`UtilError::NotFound`].
pub fn mtime(path: impl AsRef<Path>) -> Result<i64> {
    let path = path.as_ref();
    let meta = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(UtilError::NotFound(path.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };
    let modified = meta.modified()?;
    let secs = match modified.duration_since(std::time::UNIX_EPOCH) {
        Ok(d) => d.as_secs() as i64,
        Err(e) => -(e.duration().as_secs() as i64),
    };
    Ok(secs)
}
