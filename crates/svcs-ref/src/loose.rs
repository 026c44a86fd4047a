use std::fs;
use std::path::{Path, PathBuf};

use svcs_hash::ObjectId;
use svcs_utils::lockfile::write_atomic;

use crate::{RefError, Reference};

/// Read a loose ref file and return the Reference.
///
/// A loose ref file contains either a hex object id or `ref: <target-ref>`,
/// each followed by a newline.
pub(crate) fn read_loose_ref(path: &Path, name: &str) -> Result<Option<Reference>, RefError> {
    let contents = match fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(RefError::IoPath {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };

    let trimmed = trim_ascii(&contents);

    if let Some(target) = trimmed.strip_prefix(b"ref: ") {
        let target = std::str::from_utf8(trim_ascii(target)).map_err(|_| RefError::Parse {
            name: name.to_string(),
            reason: "non-UTF-8 symbolic target".into(),
        })?;
        Ok(Some(Reference::Symbolic {
            target: target.to_string(),
        }))
    } else {
        let hex = std::str::from_utf8(trimmed).map_err(|_| RefError::Parse {
            name: name.to_string(),
            reason: "non-UTF-8 object id".into(),
        })?;
        let oid = ObjectId::from_hex(hex).map_err(|e| RefError::Parse {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(Reference::Direct { target: oid }))
    }
}

/// Write a direct ref file atomically, creating parent directories.
pub(crate) fn write_loose_ref(path: &Path, oid: &ObjectId) -> Result<(), RefError> {
    ensure_parent(path)?;
    write_atomic(path, format!("{}\n", oid.to_hex()).as_bytes())?;
    Ok(())
}

/// Write a symbolic ref file atomically.
pub(crate) fn write_symbolic_ref(path: &Path, target: &str) -> Result<(), RefError> {
    ensure_parent(path)?;
    write_atomic(path, format!("ref: {target}\n").as_bytes())?;
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<(), RefError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| RefError::IoPath {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}

/// Enumerate loose branch files under `refs/heads/`, recursing into
/// subdirectories so `feature/login` style names work. Dot-files and
/// `.lock` leftovers are skipped.
pub(crate) fn enumerate_branches(heads_dir: &Path) -> Result<Vec<(String, PathBuf)>, RefError> {
    let mut result = Vec::new();
    if heads_dir.is_dir() {
        collect_branches(heads_dir, heads_dir, &mut result)?;
    }
    result.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(result)
}

fn collect_branches(
    heads_dir: &Path,
    dir: &Path,
    result: &mut Vec<(String, PathBuf)>,
) -> Result<(), RefError> {
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(RefError::IoPath {
                path: dir.to_path_buf(),
                source: e,
            })
        }
    };

    for entry in entries {
        let entry = entry.map_err(|e| RefError::IoPath {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        if file_name.starts_with('.') || file_name.ends_with(".lock") {
            continue;
        }

        if path.is_dir() {
            collect_branches(heads_dir, &path, result)?;
        } else if path.is_file() {
            let rel = path
                .strip_prefix(heads_dir)
                .map_err(|_| RefError::Parse {
                    name: file_name.to_string(),
                    reason: "branch path outside refs/heads".into(),
                })?;
            if let Some(name) = rel.to_str() {
                result.push((name.replace('\\', "/"), path.clone()));
            }
        }
    }

    Ok(())
}

fn trim_ascii(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map(|p| p + 1)
        .unwrap_or(start);
    &bytes[start..end]
}
