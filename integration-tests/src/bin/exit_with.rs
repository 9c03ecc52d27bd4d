//! Demo program: exit with the status given on the command line
//!
//! Usage: exit-with <code>

use clap::Parser;

#[derive(Parser)]
struct Cli {
    code: i32,
}

fn main() {
    let cli = Cli::parse();
    std::process::exit(cli.code);
}
