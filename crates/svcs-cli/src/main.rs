mod commands;

use std::process;

use clap::Parser;

use commands::Commands;

#[derive(Parser)]
#[command(
    name = "svcs",
    about = "A simple version control system",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() {
    // clap exits with code 2 on usage errors.
    let cli = Cli::parse();

    match commands::run(&cli.command) {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("svcs: {err:#}");
            process::exit(1);
        }
    }
}
