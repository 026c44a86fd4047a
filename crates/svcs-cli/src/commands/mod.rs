mod add;
mod branch;
mod checkout;
mod commit;
mod diff;
mod init;
mod log;
mod merge;
mod status;

use anyhow::Result;
use clap::Subcommand;
use svcs_repository::Repository;

#[derive(Subcommand)]
pub enum Commands {
    /// Create an empty repository or reinitialize an existing one
    Init(init::InitArgs),
    /// Add file contents to the staging index
    Add(add::AddArgs),
    /// Record the staged snapshot as a new commit
    Commit(commit::CommitArgs),
    /// Show the working tree status
    Status(status::StatusArgs),
    /// Show the commit history
    Log(log::LogArgs),
    /// List, create, or delete branches
    Branch(branch::BranchArgs),
    /// Switch branches or check out a commit
    Checkout(checkout::CheckoutArgs),
    /// Show changes between the working tree, the index, and HEAD
    Diff(diff::DiffArgs),
    /// Merge a branch into the current branch
    Merge(merge::MergeArgs),
}

/// Dispatch a parsed subcommand. Returns the process exit code.
pub fn run(command: &Commands) -> Result<i32> {
    match command {
        Commands::Init(args) => init::run(args),
        Commands::Add(args) => add::run(args),
        Commands::Commit(args) => commit::run(args),
        Commands::Status(args) => status::run(args),
        Commands::Log(args) => log::run(args),
        Commands::Branch(args) => branch::run(args),
        Commands::Checkout(args) => checkout::run(args),
        Commands::Diff(args) => diff::run(args),
        Commands::Merge(args) => merge::run(args),
    }
}

/// Open the repository enclosing the current directory.
pub(crate) fn open_repo() -> Result<Repository> {
    let cwd = std::env::current_dir()?;
    Ok(Repository::discover(&cwd)?)
}
