//! Demo program: record arguments and runfiles variables as JSON
//!
//! Usage: print-env --out <file> [args...]
//! Writes `{"args": [...], "env": {...}}` to <file>. Unset variables are
//! `null`.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde_json::{json, Map, Value};

const INTERESTING_VARS: &[&str] = &[
    "RUNFILES_DIR",
    "RUNFILES_MANIFEST_FILE",
    "RUNFILES_MANIFEST_ONLY",
];

#[derive(Parser)]
struct Cli {
    /// Where to write the JSON report
    #[arg(long)]
    out: PathBuf,

    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut env = Map::new();
    for var in INTERESTING_VARS {
        let value = std::env::var(var).map(Value::String).unwrap_or(Value::Null);
        env.insert(var.to_string(), value);
    }

    let report = json!({
        "args": cli.args,
        "env": env,
    });

    match fs::write(&cli.out, report.to_string()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Failed to write {}: {}", cli.out.display(), err);
            ExitCode::from(1)
        }
    }
}
