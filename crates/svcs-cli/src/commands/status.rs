use anyhow::Result;
use clap::Args;
use svcs_index::FileStatus;

use super::open_repo;

#[derive(Args)]
pub struct StatusArgs {
    /// Give the output in short format
    #[arg(long)]
    short: bool,

    /// Machine-readable output (same as --short)
    #[arg(long)]
    porcelain: bool,
}

pub fn run(args: &StatusArgs) -> Result<i32> {
    let mut repo = open_repo()?;
    let entries = repo.status()?;

    if args.short || args.porcelain {
        for entry in &entries {
            println!("{} {}", entry.status.short_code(), entry.path);
        }
        return Ok(0);
    }

    match repo.current_branch()? {
        Some(branch) => println!("On branch {branch}"),
        None => println!("HEAD detached"),
    }

    let staged: Vec<_> = entries
        .iter()
        .filter(|e| {
            matches!(
                e.status,
                FileStatus::Added | FileStatus::Renamed | FileStatus::Copied
            )
        })
        .collect();
    let changed: Vec<_> = entries
        .iter()
        .filter(|e| matches!(e.status, FileStatus::Modified | FileStatus::Deleted))
        .collect();
    let untracked: Vec<_> = entries
        .iter()
        .filter(|e| e.status == FileStatus::Untracked)
        .collect();

    if !staged.is_empty() {
        println!("\nChanges to be committed:");
        for entry in staged {
            println!("\tnew file:   {}", entry.path);
        }
    }
    if !changed.is_empty() {
        println!("\nChanges not staged for commit:");
        for entry in changed {
            let label = match entry.status {
                FileStatus::Deleted => "deleted: ",
                _ => "modified:",
            };
            println!("\t{label}  {}", entry.path);
        }
    }
    if !untracked.is_empty() {
        println!("\nUntracked files:");
        for entry in untracked {
            println!("\t{}", entry.path);
        }
    }

    if entries.is_empty() {
        println!("nothing to commit, working tree clean");
    }
    Ok(0)
}
