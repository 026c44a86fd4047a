use std::path::{Path, PathBuf};

use svcs_utils::fs::{mkdir_recursive, write_file};

use crate::{RepoError, SVCS_DIR};

/// Initialize the `.svcs` layout under `work_dir`:
///
/// ```text
/// .svcs/
///   HEAD            # ref: refs/heads/main
///   config
///   objects/
///   refs/heads/
///   refs/tags/
/// ```
///
/// Re-running init on an existing repository leaves it untouched.
pub(crate) fn init_layout(work_dir: &Path) -> Result<PathBuf, RepoError> {
    let svcs_dir = work_dir.join(SVCS_DIR);

    if svcs_dir.join("HEAD").is_file() {
        return Ok(svcs_dir);
    }

    mkdir_recursive(svcs_dir.join("objects"))?;
    mkdir_recursive(svcs_dir.join("refs").join("heads"))?;
    mkdir_recursive(svcs_dir.join("refs").join("tags"))?;

    write_file(svcs_dir.join("HEAD"), b"ref: refs/heads/main\n")?;
    write_file(
        svcs_dir.join("config"),
        b"[core]\n\trepositoryformatversion = 0\n\tfilemode = true\n",
    )?;

    Ok(svcs_dir)
}
