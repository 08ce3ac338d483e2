//! # Diagnostics
//!
//! Positioned findings produced for a document. Positions are 0-based
//! line/character pairs, the convention editor platforms use for markers.

use serde::{Deserialize, Serialize};

use crate::identity::SchemaId;

/// A 0-based line/character position in a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// 0-based line.
    pub line: u32,
    /// 0-based character offset within the line.
    pub character: u32,
}

impl Position {
    /// Construct a position.
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// A half-open range between two positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TextRange {
    /// Inclusive start.
    pub start: Position,
    /// Exclusive end.
    pub end: Position,
}

impl TextRange {
    /// Construct a range.
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// A range covering `len` characters of a single line.
    pub fn on_line(line: u32, character: u32, len: u32) -> Self {
        Self {
            start: Position::new(line, character),
            end: Position::new(line, character + len),
        }
    }
}

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Rendered as an error marker.
    Error,
    /// Rendered as a warning marker.
    Warning,
    /// Informational.
    Information,
    /// Faint hint.
    Hint,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Information => "info",
            Self::Hint => "hint",
        };
        f.write_str(s)
    }
}

/// Which check produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticSource {
    /// YAML parse failure.
    Syntax,
    /// Structural schema violation.
    Schema,
    /// A remote schema could not be loaded.
    SchemaFetch,
}

impl std::fmt::Display for DiagnosticSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Syntax => "syntax",
            Self::Schema => "schema",
            Self::SchemaFetch => "schema-fetch",
        };
        f.write_str(s)
    }
}

/// A single finding attached to a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Where the finding applies.
    pub range: TextRange,
    /// How it is rendered.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
    /// The check that produced it.
    pub source: DiagnosticSource,
    /// Schema that governed the document, when one did.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaId>,
}

impl Diagnostic {
    /// Whether this diagnostic is an error.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}: {}: {} [{}]",
            self.range.start.line + 1,
            self.range.start.character + 1,
            self.severity,
            self.message,
            self.source
        )
    }
}
