use anyhow::Result;
use clap::Args;
use svcs_repository::CheckoutTarget;

use super::open_repo;

#[derive(Args)]
pub struct CheckoutArgs {
    /// Branch name, commit id, or unique id prefix
    target: String,

    /// Create the branch at HEAD, then switch to it
    #[arg(short = 'b')]
    create: bool,
}

pub fn run(args: &CheckoutArgs) -> Result<i32> {
    let mut repo = open_repo()?;

    match repo.checkout(&args.target, args.create)? {
        CheckoutTarget::Branch(name) => println!("Switched to branch '{name}'"),
        CheckoutTarget::Detached(oid) => {
            println!("HEAD is now at {} (detached)", oid.short_hex())
        }
    }
    Ok(0)
}
