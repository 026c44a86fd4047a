use anyhow::Result;
use bstr::ByteSlice;
use clap::Args;
use svcs_dag::{CommitDag, CommitRange};
use svcs_utils::date::Timestamp;

use super::open_repo;

#[derive(Args)]
pub struct LogArgs {
    /// Limit the number of commits shown
    #[arg(short = 'n', long = "max-count")]
    max_count: Option<usize>,

    /// One line per commit
    #[arg(long)]
    oneline: bool,

    /// Draw a text-based graph next to the output
    #[arg(long)]
    graph: bool,
}

pub fn run(args: &LogArgs) -> Result<i32> {
    let repo = open_repo()?;
    let dag = CommitDag::load_from_repository(repo.odb(), repo.refs())?;

    let mut range = CommitRange::all();
    range.max_count = args.max_count;
    let commits = dag.commits_in_range(&range);

    for node in commits {
        let marker = if args.graph { "* " } else { "" };

        if args.oneline {
            println!(
                "{marker}{} {}",
                node.oid.short_hex(),
                node.summary().to_str_lossy()
            );
            continue;
        }

        println!("{marker}commit {}", node.oid);
        println!("Author: {}", node.author.to_str_lossy());
        println!(
            "Date:   {}",
            Timestamp::new(node.timestamp, node.tz_offset).format_default()
        );
        println!();
        for line in node.message.lines() {
            println!("    {}", line.to_str_lossy());
        }
        println!();
    }

    Ok(0)
}
