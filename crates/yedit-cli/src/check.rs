//! # Check Subcommand
//!
//! Validates files against the schemas the props associate with them.
//! Schemas fetched by identity are read through a `FileFetcher` rooted at
//! the config file's directory, and only when `enableSchemaRequest` is set.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use yedit_schema::{Analysis, FileFetcher, LanguageService, SchemaFetcher};

use crate::{document_path, Workspace};

/// Arguments for the `yedit check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Files to check.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Execute the check subcommand. Returns 1 when any error is reported.
pub fn run_check(args: &CheckArgs, workspace: &Workspace, out: &mut dyn Write) -> Result<u8> {
    let service = workspace.service()?;
    let fetcher = FileFetcher::new(workspace.base_dir.clone());

    let mut errors = 0usize;
    let mut warnings = 0usize;
    for file in &args.files {
        let content = std::fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        let path = document_path(file);
        let analysis = analyze_with_fetch(&service, &fetcher, &path, &content);
        tracing::debug!(file = %path, resolution = %analysis.resolution, "checked");

        for diagnostic in &analysis.diagnostics {
            if diagnostic.is_error() {
                errors += 1;
            } else {
                warnings += 1;
            }
            writeln!(out, "{path}:{diagnostic}")?;
        }
    }

    tracing::info!(files = args.files.len(), errors, warnings, "check finished");
    Ok(u8::from(errors > 0))
}

/// Analyze `content`, loading its schema first if it is fetched by identity.
fn analyze_with_fetch(
    service: &LanguageService,
    fetcher: &dyn SchemaFetcher,
    path: &str,
    content: &str,
) -> Analysis {
    let analysis = service.analyze(path, content);
    match &analysis.pending_fetch {
        Some(schema) if !service.has_fetched(schema) => {
            service.store_fetched(schema, fetcher.fetch(schema));
            service.analyze(path, content)
        }
        _ => analysis,
    }
}

/// Output lines for a single file, for callers that only need the text.
pub fn check_file(workspace: &Workspace, file: &Path) -> Result<Vec<String>> {
    let mut buf = Vec::new();
    run_check(
        &CheckArgs {
            files: vec![file.to_path_buf()],
        },
        workspace,
        &mut buf,
    )?;
    let text = String::from_utf8(buf).context("diagnostic output is not UTF-8")?;
    Ok(text.lines().map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROPS: &str = "\
schemas:
  - identity: svc
    pathPatterns: ['*.svc.yaml']
    body:
      type: object
      properties:
        port: {type: integer}
      required: [name]
";

    fn workspace(dir: &Path, props: &str) -> Workspace {
        let config = dir.join("editor.yaml");
        std::fs::write(&config, props).unwrap();
        Workspace::load(Some(&config)).unwrap()
    }

    fn run(ws: &Workspace, files: Vec<PathBuf>) -> (u8, String) {
        let mut out = Vec::new();
        let code = run_check(&CheckArgs { files }, ws, &mut out).unwrap();
        (code, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_clean_file_exits_zero() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path(), PROPS);
        let file = dir.path().join("api.svc.yaml");
        std::fs::write(&file, "name: api\nport: 80\n").unwrap();
        let (code, out) = run(&ws, vec![file]);
        assert_eq!(code, 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_violations_printed_with_position() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path(), PROPS);
        let file = dir.path().join("api.svc.yaml");
        std::fs::write(&file, "name: api\nport: http\n").unwrap();
        let (code, out) = run(&ws, vec![file.clone()]);
        assert_eq!(code, 1);
        let line = out.lines().next().unwrap();
        assert!(line.starts_with(&format!("{}:2:1: error:", document_path(&file))));
        assert!(line.ends_with("[schema]"));
    }

    #[test]
    fn test_unmatched_file_gets_syntax_checks_only() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path(), PROPS);
        let loose = dir.path().join("notes.yaml");
        std::fs::write(&loose, "port: http\n").unwrap();
        let broken = dir.path().join("broken.yaml");
        std::fs::write(&broken, "a: [1, 2\n").unwrap();
        let (code, out) = run(&ws, vec![loose, broken]);
        assert_eq!(code, 1);
        assert_eq!(out.lines().count(), 1);
        assert!(out.contains("[syntax]"));
    }

    #[test]
    fn test_remote_schema_read_relative_to_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("svc.schema.json"),
            r#"{"properties": {"port": {"type": "integer"}}}"#,
        )
        .unwrap();
        let ws = workspace(
            dir.path(),
            "enableSchemaRequest: true\nschemas:\n  - identity: svc.schema.json\n",
        );
        let file = dir.path().join("a.yaml");
        std::fs::write(&file, "port: http\n").unwrap();
        let lines = check_file(&ws, &file).unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("[schema]"));
    }

    #[test]
    fn test_missing_remote_schema_is_warning() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(
            dir.path(),
            "enableSchemaRequest: true\nschemas:\n  - identity: missing.json\n",
        );
        let file = dir.path().join("a.yaml");
        std::fs::write(&file, "port: http\n").unwrap();
        let (code, out) = run(&ws, vec![file]);
        assert_eq!(code, 0);
        assert!(out.contains("warning"));
        assert!(out.contains("[schema-fetch]"));
    }

    #[test]
    fn test_unreadable_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path(), PROPS);
        let mut out = Vec::new();
        let err = run_check(
            &CheckArgs {
                files: vec![dir.path().join("absent.yaml")],
            },
            &ws,
            &mut out,
        )
        .unwrap_err();
        assert!(err.to_string().contains("absent.yaml"));
    }
}
