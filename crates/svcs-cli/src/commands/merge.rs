use anyhow::Result;
use clap::Args;

use super::open_repo;

#[derive(Args)]
pub struct MergeArgs {
    /// Branch to merge into the current branch
    branch: String,

    /// Override the committer identity for the merge commit
    #[arg(long, value_name = "author")]
    author: Option<String>,
}

pub fn run(args: &MergeArgs) -> Result<i32> {
    let mut repo = open_repo()?;
    let outcome = repo.merge(&args.branch, args.author.as_deref())?;

    if outcome.already_up_to_date {
        println!("Already up to date.");
        return Ok(0);
    }

    if outcome.is_fast_forward {
        println!("Fast-forward");
        return Ok(0);
    }

    if !outcome.is_clean() {
        for conflict in &outcome.conflicts {
            println!("CONFLICT ({}): {}", conflict.kind, conflict.path);
        }
        println!("Automatic merge failed; fix conflicts and commit the result.");
        return Ok(1);
    }

    if let Some(oid) = outcome.commit {
        println!("Merge made commit {}.", oid.short_hex());
    }
    Ok(0)
}
