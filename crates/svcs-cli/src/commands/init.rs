use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use svcs_repository::Repository;

#[derive(Args)]
pub struct InitArgs {
    /// Where to create the repository (default: current directory)
    path: Option<PathBuf>,
}

pub fn run(args: &InitArgs) -> Result<i32> {
    let path = match &args.path {
        Some(p) => p.clone(),
        None => std::env::current_dir()?,
    };
    let existed = Repository::is_valid(&path);
    let repo = Repository::init(&path)?;

    if existed {
        println!(
            "Reinitialized existing svcs repository in {}",
            repo.svcs_dir().display()
        );
    } else {
        println!(
            "Initialized empty svcs repository in {}",
            repo.svcs_dir().display()
        );
    }
    Ok(0)
}
