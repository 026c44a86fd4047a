//! Atomic file replacement through a side lock file.
//!
//! Every writer in this codebase replaces a file's contents wholesale
//! (refs, HEAD, the index), so the protocol collapses to a single call:
//! create `<path>.lock` exclusively, write the new contents into it, sync,
//! and rename over the target. A `.lock` left behind by a crashed writer
//! blocks further updates until removed.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{LockError, UtilError};
use crate::Result;

const LOCK_SUFFIX: &str = ".lock";

/// The `<path>.lock` side path for a target file.
pub fn lock_path_for(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(LOCK_SUFFIX);
    PathBuf::from(os)
}

/// Atomically replace `path` with `contents`.
///
/// Fails with [`LockError::AlreadyLocked`] when another writer holds the
/// lock; that writer's lock file is left alone. On any failure after the
/// lock is taken, the lock file is removed and the target stays untouched.
pub fn write_atomic(path: impl AsRef<Path>, contents: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let lock_path = lock_path_for(path);

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&lock_path)
        .map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => UtilError::Lock(LockError::AlreadyLocked {
                path: lock_path.clone(),
            }),
            _ => UtilError::Lock(LockError::Create {
                path: lock_path.clone(),
                source: e,
            }),
        })?;

    let written = fill_and_sync(&mut file, contents);
    drop(file);
    let renamed = written.and_then(|()| fs::rename(&lock_path, path));

    match renamed {
        Ok(()) => Ok(()),
        Err(e) => {
            let _ = fs::remove_file(&lock_path);
            Err(UtilError::Lock(LockError::Commit {
                path: lock_path,
                source: e,
            }))
        }
    }
}

fn fill_and_sync(file: &mut File, contents: &[u8]) -> io::Result<()> {
    file.write_all(contents)?;
    file.sync_all()
}
