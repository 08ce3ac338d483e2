//! # yedit CLI Entry Point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use yedit_cli::check::{run_check, CheckArgs};
use yedit_cli::format::{run_format, FormatArgs};
use yedit_cli::resolve::{run_resolve, ResolveArgs};
use yedit_cli::Workspace;

/// Schema-aware YAML checks from the command line.
///
/// Reads the same props a host passes to the editor: schema associations,
/// remote fetch, YAML dialect, Kubernetes mode and feature toggles.
#[derive(Parser, Debug)]
#[command(name = "yedit", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Editor props file (YAML or JSON). Defaults to no schemas.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate files against their associated schemas.
    Check(CheckArgs),

    /// Print the schema governing each path.
    Resolve(ResolveArgs),

    /// Normalize indentation and trailing whitespace.
    Format(FormatArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over -v.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = Workspace::load(cli.config.as_deref()).and_then(|workspace| {
        let mut stdout = std::io::stdout().lock();
        match &cli.command {
            Commands::Check(args) => run_check(args, &workspace, &mut stdout),
            Commands::Resolve(args) => run_resolve(args, &workspace, &mut stdout),
            Commands::Format(args) => run_format(args, &workspace, &mut stdout),
        }
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}
