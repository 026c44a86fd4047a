//! Working-tree status: tracked entry statuses plus the untracked scan.

use std::path::Path;

use bstr::{BString, ByteSlice};
use svcs_index::FileStatus;

use crate::{RepoError, Repository, SVCS_DIR};

/// One line of status output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    pub path: BString,
    pub status: FileStatus,
}

impl Repository {
    /// Compute the repository status: every tracked entry with its status
    /// recomputed against the working tree, followed by untracked files in
    /// path order.
    pub fn status(&mut self) -> Result<Vec<StatusEntry>, RepoError> {
        let work_dir = self.work_dir().to_path_buf();

        let tracked = self.with_index(|index, _| Ok(index.status(&work_dir)?))?;
        let mut entries: Vec<StatusEntry> = tracked
            .iter()
            .map(|e| StatusEntry {
                path: e.path.clone(),
                status: e.status,
            })
            .collect();

        let mut untracked = Vec::new();
        collect_untracked(&work_dir, &work_dir, &|path| {
            self.index_contains(path)
        }, &mut untracked)?;
        untracked.sort();

        entries.extend(untracked.into_iter().map(|path| StatusEntry {
            path,
            status: FileStatus::Untracked,
        }));

        Ok(entries)
    }

    fn index_contains(&self, path: &BString) -> bool {
        self.index
            .as_ref()
            .map(|index| index.get(path.as_bstr()).is_some())
            .unwrap_or(false)
    }
}

fn collect_untracked(
    work_dir: &Path,
    dir: &Path,
    is_tracked: &dyn Fn(&BString) -> bool,
    out: &mut Vec<BString>,
) -> Result<(), RepoError> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name();

        if name == SVCS_DIR {
            continue;
        }

        if path.is_dir() {
            collect_untracked(work_dir, &path, is_tracked, out)?;
        } else if path.is_file() {
            let Ok(rel) = path.strip_prefix(work_dir) else {
                continue;
            };
            let Some(rel_str) = rel.to_str() else {
                continue;
            };
            let rel_path = BString::from(rel_str.replace('\\', "/"));
            if !is_tracked(&rel_path) {
                out.push(rel_path);
            }
        }
    }
    Ok(())
}
