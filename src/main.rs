use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod assignment;
mod calculus;
mod cli;
mod config;
mod diagnostics;
mod expr;
mod grade;
mod grader;
mod parse;
mod proof;
mod report;
mod strings;
mod util;
mod verify;

fn main() -> ExitCode {
    // RUST_LOG controls verbosity, e.g. RUST_LOG=fitch=debug
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    cli::run_cli()
}
