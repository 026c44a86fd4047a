use anyhow::Result;
use bstr::ByteSlice;
use clap::Args;
use svcs_object::Object;

use super::open_repo;

#[derive(Args)]
pub struct DiffArgs {
    /// Compare the index against HEAD instead of the working tree against
    /// the index
    #[arg(long)]
    cached: bool,
}

pub fn run(args: &DiffArgs) -> Result<i32> {
    let mut repo = open_repo()?;
    let mut out = Vec::new();

    if args.cached {
        diff_index_vs_head(&mut repo, &mut out)?;
    } else {
        diff_worktree_vs_index(&mut repo, &mut out)?;
    }

    print!("{}", out.as_bstr());
    Ok(0)
}

/// Index blob vs HEAD tree blob per staged path.
fn diff_index_vs_head(
    repo: &mut svcs_repository::Repository,
    out: &mut Vec<u8>,
) -> Result<()> {
    let head_map = match repo.head_oid()? {
        Some(head) => repo.commit_file_map(&head)?,
        None => Default::default(),
    };

    let staged: Vec<(bstr::BString, svcs_hash::ObjectId)> = repo
        .index()?
        .iter()
        .map(|e| (e.path.clone(), e.oid))
        .collect();

    for (path, staged_oid) in staged {
        let old = match head_map.get(&path) {
            Some(entry) => read_blob(repo, &entry.oid)?,
            None => Vec::new(),
        };
        let new = read_blob(repo, &staged_oid)?;
        emit_file_diff(out, &path, &old, &new);
    }
    Ok(())
}

/// Working-tree content vs index blob per staged path.
fn diff_worktree_vs_index(
    repo: &mut svcs_repository::Repository,
    out: &mut Vec<u8>,
) -> Result<()> {
    let staged: Vec<(bstr::BString, svcs_hash::ObjectId)> = repo
        .index()?
        .iter()
        .map(|e| (e.path.clone(), e.oid))
        .collect();

    for (path, staged_oid) in staged {
        let old = read_blob(repo, &staged_oid)?;
        let abs = repo.work_dir().join(path.to_str_lossy().as_ref());
        let new = std::fs::read(&abs).unwrap_or_default();
        emit_file_diff(out, &path, &old, &new);
    }
    Ok(())
}

fn emit_file_diff(out: &mut Vec<u8>, path: &bstr::BString, old: &[u8], new: &[u8]) {
    if old == new {
        return;
    }
    let hunk = svcs_diff::diff_lines(old, new);
    out.extend_from_slice(format!("--- a/{path}\n+++ b/{path}\n").as_bytes());
    svcs_diff::format_unified(&hunk, out);
}

fn read_blob(
    repo: &svcs_repository::Repository,
    oid: &svcs_hash::ObjectId,
) -> Result<Vec<u8>> {
    match repo.odb().read(oid)? {
        Object::Blob(blob) => Ok(blob.data.into()),
        _ => anyhow::bail!("object {oid} is not a blob"),
    }
}
