use anyhow::{bail, Result};
use clap::Args;

use super::open_repo;

#[derive(Args)]
pub struct BranchArgs {
    /// Branch to create at the current HEAD
    name: Option<String>,

    /// Delete a branch
    #[arg(short = 'd', long = "delete", value_name = "branch")]
    delete: Option<String>,

    /// Delete a branch irrespective of its merge status
    #[arg(short = 'D', value_name = "branch")]
    force_delete: Option<String>,
}

pub fn run(args: &BranchArgs) -> Result<i32> {
    let repo = open_repo()?;

    if let Some(name) = args.delete.as_deref().or(args.force_delete.as_deref()) {
        repo.refs().branch_delete(name)?;
        println!("Deleted branch {name}");
        return Ok(0);
    }

    if let Some(name) = &args.name {
        let Some(head) = repo.head_oid()? else {
            bail!("cannot create a branch before the first commit");
        };
        repo.refs().branch_create(name, &head)?;
        return Ok(0);
    }

    for branch in repo.refs().branch_list()? {
        let marker = if branch.is_current { "*" } else { " " };
        println!("{marker} {}", branch.name);
    }
    Ok(0)
}
