use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod repl;

use repl::Repl;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Arbitrary-precision pocket calculator.
///
/// Reads whitespace-separated key tokens from stdin (or a script file)
/// and prints the calculator screen after every line.
#[derive(Debug, Parser)]
struct Cli {
    /// Read tokens from this file instead of stdin.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Print only the final screen value.
    #[arg(long)]
    quiet: bool,
}

// ─── tracing ─────────────────────────────────────────────────────────────────

/// Initialise the tracing subscriber.
///
/// * Honours `RUST_LOG` when set.
/// * Falls back to `info` so normal runs are quiet.
/// * Strips timestamps and target names to keep CLI output clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_target(false)
        .init();
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let mut repl = Repl::new(cli.quiet);

    match cli.script {
        Some(path) => {
            let file = File::open(&path)
                .with_context(|| format!("opening script {}", path.display()))?;
            repl.run(BufReader::new(file))
        }
        None => repl.run(io::stdin().lock()),
    }
}
