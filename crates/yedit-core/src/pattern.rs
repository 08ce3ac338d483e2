//! # Document Path Patterns
//!
//! Glob-style patterns that bind a schema association to documents.
//!
//! ## Matching Rules
//!
//! - Document paths are normalized first: a `scheme://` prefix is removed,
//!   backslashes become `/`, and leading `/` is ignored. `file:///a/b.yaml`
//!   and `/a/b.yaml` both normalize to `a/b.yaml`.
//! - A pattern without `/` matches the file name only, so `*.pipeline.yaml`
//!   matches `a.pipeline.yaml` and `jobs/a.pipeline.yaml` alike.
//! - A pattern with `/` matches the whole normalized path. `*` never
//!   crosses a separator; `**` spans directories.

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

const MATCH_OPTIONS: glob::MatchOptions = glob::MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A compiled document path pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PathPattern {
    raw: String,
    compiled: glob::Pattern,
    file_name_only: bool,
}

impl PathPattern {
    /// Compile a pattern. Invalid globs are a configuration error.
    pub fn new(pattern: impl Into<String>) -> Result<Self, ConfigurationError> {
        let raw = pattern.into();
        let trimmed = raw.trim_start_matches("./").trim_start_matches('/');
        let compiled =
            glob::Pattern::new(trimmed).map_err(|e| ConfigurationError::InvalidPattern {
                pattern: raw.clone(),
                reason: e.msg.to_string(),
            })?;
        let file_name_only = !trimmed.contains('/');
        Ok(Self {
            raw,
            compiled,
            file_name_only,
        })
    }

    /// The pattern as supplied.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether the document at `path` is matched by this pattern.
    pub fn matches(&self, path: &str) -> bool {
        let normalized = normalize_document_path(path);
        let subject = if self.file_name_only {
            normalized.rsplit('/').next().unwrap_or(&normalized)
        } else {
            normalized.as_str()
        };
        self.compiled.matches_with(subject, MATCH_OPTIONS)
    }
}

impl TryFrom<String> for PathPattern {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PathPattern> for String {
    fn from(pattern: PathPattern) -> Self {
        pattern.raw
    }
}

impl std::fmt::Display for PathPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Normalize a document identity into the form patterns are matched against.
pub fn normalize_document_path(path: &str) -> String {
    let without_scheme = match path.find("://") {
        Some(idx) if idx > 0 && is_scheme(&path[..idx]) => &path[idx + 3..],
        _ => path,
    };
    without_scheme
        .replace('\\', "/")
        .trim_start_matches('/')
        .to_string()
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pat(p: &str) -> PathPattern {
        PathPattern::new(p).unwrap()
    }

    // ── Normalization ────────────────────────────────────────────────

    #[test]
    fn test_normalize_strips_scheme_and_root() {
        assert_eq!(normalize_document_path("file:///work/a.yaml"), "work/a.yaml");
        assert_eq!(normalize_document_path("inmemory://model/1"), "model/1");
        assert_eq!(normalize_document_path("/abs/b.yaml"), "abs/b.yaml");
        assert_eq!(normalize_document_path("c:\\dir\\c.yaml"), "c:/dir/c.yaml");
    }

    #[test]
    fn test_normalize_keeps_non_scheme_colons() {
        assert_eq!(normalize_document_path("a:b/c.yaml"), "a:b/c.yaml");
    }

    // ── Matching ─────────────────────────────────────────────────────

    #[test]
    fn test_file_name_pattern_matches_any_directory() {
        let p = pat("*.pipeline.yaml");
        assert!(p.matches("a.pipeline.yaml"));
        assert!(p.matches("jobs/nightly/a.pipeline.yaml"));
        assert!(p.matches("file:///repo/a.pipeline.yaml"));
        assert!(!p.matches("b.txt"));
        assert!(!p.matches("a.pipeline.yaml.bak"));
    }

    #[test]
    fn test_path_pattern_respects_separators() {
        let p = pat("configs/*.yaml");
        assert!(p.matches("configs/a.yaml"));
        assert!(p.matches("/configs/a.yaml"));
        assert!(!p.matches("configs/nested/a.yaml"));
        assert!(!p.matches("other/configs/a.yaml"));
    }

    #[test]
    fn test_double_star_spans_directories() {
        let p = pat("manifests/**/*.yaml");
        assert!(p.matches("manifests/a.yaml"));
        assert!(p.matches("manifests/x/y/a.yaml"));
        assert!(!p.matches("a.yaml"));
    }

    #[test]
    fn test_invalid_glob_is_configuration_error() {
        let err = PathPattern::new("[unclosed").unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidPattern { .. }));
    }

    #[test]
    fn test_serde_round_trips_raw_text() {
        let p: PathPattern = serde_json::from_str("\"./jobs/*.yaml\"").unwrap();
        assert_eq!(p.as_str(), "./jobs/*.yaml");
        assert!(p.matches("jobs/x.yaml"));
        assert_eq!(serde_json::to_string(&p).unwrap(), "\"./jobs/*.yaml\"");
    }
}
