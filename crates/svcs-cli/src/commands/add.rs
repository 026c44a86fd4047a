use anyhow::{bail, Result};
use clap::Args;

use super::open_repo;

#[derive(Args)]
pub struct AddArgs {
    /// Files to stage
    #[arg(required = true)]
    paths: Vec<String>,
}

pub fn run(args: &AddArgs) -> Result<i32> {
    let mut repo = open_repo()?;

    // Paths are given relative to the invocation directory; store them
    // relative to the working tree root with forward slashes.
    let cwd = std::env::current_dir()?;
    for path in &args.paths {
        let abs = cwd.join(path);
        let rel = match abs.strip_prefix(repo.work_dir()) {
            Ok(rel) => rel.to_string_lossy().replace('\\', "/"),
            Err(_) => bail!("'{path}' is outside the repository"),
        };
        repo.add(&rel)?;
    }
    Ok(0)
}
