//! archcarectl - Arch Linux maintenance from the command line
//!
//! Diagnostics go to stderr through tracing (`ARCHCARE_LOG`, default warn);
//! the report goes to stdout.

use archcarectl::cli::Cli;
use archcarectl::errors::EXIT_GENERAL_ERROR;
use clap::Parser;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

fn main() {
    // Usage errors exit with status 2 before any check runs
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("ARCHCARE_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let code = match archcarectl::run::run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "[ERROR]".bright_red(), e);
            EXIT_GENERAL_ERROR
        }
    };
    std::process::exit(code);
}
