//! # Resolve Subcommand
//!
//! Reports which schema governs each path, without reading the files. With
//! Kubernetes mode on, the reported layer is the Kubernetes layer as a
//! whole; the per-kind schema is chosen when a document is checked.

use std::io::Write;

use anyhow::Result;
use clap::Args;

use crate::Workspace;

/// Arguments for the `yedit resolve` subcommand.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Document paths to resolve.
    #[arg(required = true)]
    pub paths: Vec<String>,
}

/// Execute the resolve subcommand. Always returns 0; a miss is not an error.
pub fn run_resolve(args: &ResolveArgs, workspace: &Workspace, out: &mut dyn Write) -> Result<u8> {
    let service = workspace.service()?;
    for path in &args.paths {
        let resolution = service.resolve(path);
        writeln!(out, "{path}: {resolution}")?;
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(props: &str, paths: &[&str]) -> String {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("editor.yaml");
        std::fs::write(&config, props).unwrap();
        let ws = Workspace::load(Some(&config)).unwrap();
        let mut out = Vec::new();
        let args = ResolveArgs {
            paths: paths.iter().map(|p| p.to_string()).collect(),
        };
        assert_eq!(run_resolve(&args, &ws, &mut out).unwrap(), 0);
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_pattern_and_miss() {
        let out = run(
            "schemas:\n  - identity: s1\n    pathPatterns: ['*.pipeline.yaml']\n    body: {type: object}\n",
            &["a.pipeline.yaml", "b.txt"],
        );
        assert_eq!(out, "a.pipeline.yaml: s1 (explicit)\nb.txt: no schema\n");
    }

    #[test]
    fn test_catch_all_and_kubernetes() {
        let out = run("isKubernetes: true\n", &["deploy/web.yaml"]);
        assert_eq!(out, "deploy/web.yaml: builtin:kubernetes (kubernetes)\n");

        let out = run(
            "isKubernetes: true\nschemas:\n  - identity: all\n    body: {}\n",
            &["deploy/web.yaml"],
        );
        assert_eq!(out, "deploy/web.yaml: all (catch-all)\n");
    }

    #[test]
    fn test_remote_fetch_disabled_reported() {
        let out = run("schemas:\n  - identity: remote.json\n", &["a.yaml"]);
        assert!(out.starts_with("a.yaml: no schema (remote.json requires remote fetch"));
    }
}
