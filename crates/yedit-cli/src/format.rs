//! # Format Subcommand
//!
//! Normalizes indentation and trailing whitespace. Without `--write` the
//! files are left alone and the ones that would change are listed, so the
//! command can gate CI.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::{document_path, Workspace};

/// Arguments for the `yedit format` subcommand.
#[derive(Args, Debug)]
pub struct FormatArgs {
    /// Rewrite files in place.
    #[arg(long)]
    pub write: bool,

    /// Files to format.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Execute the format subcommand.
///
/// Returns 1 when a file needs formatting and `--write` was not given.
pub fn run_format(args: &FormatArgs, workspace: &Workspace, out: &mut dyn Write) -> Result<u8> {
    let service = workspace.service()?;
    let mut unformatted = 0usize;
    for file in &args.files {
        let content = std::fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        let Some(formatted) = service.format(&content) else {
            continue;
        };
        let path = document_path(file);
        if args.write {
            std::fs::write(file, formatted)
                .with_context(|| format!("failed to write {}", file.display()))?;
            writeln!(out, "formatted {path}")?;
        } else {
            unformatted += 1;
            writeln!(out, "would format {path}")?;
        }
    }
    Ok(u8::from(unformatted > 0))
}
