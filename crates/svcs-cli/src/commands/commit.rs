use anyhow::Result;
use clap::Args;

use super::open_repo;

#[derive(Args)]
pub struct CommitArgs {
    /// Use the given message as the commit message
    #[arg(short = 'm', long = "message", required = true)]
    message: String,

    /// Override the author (format: "Name <email>"); defaults to
    /// the SVCS_AUTHOR environment variable
    #[arg(long, value_name = "author")]
    author: Option<String>,
}

pub fn run(args: &CommitArgs) -> Result<i32> {
    let mut repo = open_repo()?;
    let oid = repo.commit(&args.message, args.author.as_deref())?;

    let branch = repo
        .current_branch()?
        .unwrap_or_else(|| "detached HEAD".to_string());
    println!("[{branch} {}] {}", oid.short_hex(), args.message);
    Ok(0)
}
