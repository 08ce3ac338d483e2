//! # Hover and Completion
//!
//! Editor assistance driven by the governing schema. Both work from the
//! source outline rather than the parsed document, so they keep working
//! while the buffer is temporarily invalid.

use serde::Serialize;
use serde_json::Value;
use yedit_core::{Position, SchemaId, TextRange};

use crate::locate::{cursor_context, CursorContext, DocumentChunk, Outline, Segment};
use crate::navigate::{allowed_values, first_str, properties, type_label, SchemaGraph};

/// Markdown shown when hovering a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hover {
    /// Markdown contents.
    pub contents: String,
    /// The key the hover applies to.
    pub range: TextRange,
    /// Schema the contents were read from.
    pub schema: SchemaId,
}

/// What a completion inserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionKind {
    /// A mapping key.
    Property,
    /// A scalar value.
    Value,
}

/// One completion proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionItem {
    /// Text shown in the list.
    pub label: String,
    /// Property or value.
    pub kind: CompletionKind,
    /// Short type hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Longer description from the schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    /// Text inserted on accept.
    pub insert_text: String,
}

/// Hover for the key under `position`.
pub fn hover_at(
    graph: &SchemaGraph,
    schema: &SchemaId,
    root: &Value,
    outline: &Outline,
    position: Position,
) -> Option<Hover> {
    let entry = outline.entry_at(position)?;
    let nodes = graph.at(root, &entry.path);
    if nodes.is_empty() {
        return None;
    }

    let description = first_str(&nodes, "description");
    let ty = type_label(&nodes);
    let values = allowed_values(&nodes);
    if description.is_none() && ty.is_none() && values.is_empty() {
        return None;
    }

    let heading = first_str(&nodes, "title")
        .map(str::to_string)
        .or_else(|| match entry.path.last() {
            Some(Segment::Key(k)) => Some(k.clone()),
            _ => None,
        });

    let mut sections = Vec::new();
    if let Some(heading) = heading {
        sections.push(format!("**{heading}**"));
    }
    if let Some(description) = description {
        sections.push(description.to_string());
    }
    if let Some(ty) = ty {
        sections.push(format!("Type: `{ty}`"));
    }
    if !values.is_empty() {
        let rendered: Vec<String> = values.iter().map(|v| format!("`{}`", render(v))).collect();
        sections.push(format!("Allowed values: {}", rendered.join(", ")));
    }

    Some(Hover {
        contents: sections.join("\n\n"),
        range: TextRange::on_line(entry.line, entry.start, entry.end - entry.start),
        schema: schema.clone(),
    })
}

/// Completions at `position` inside `chunk`.
pub fn complete_at(
    graph: &SchemaGraph,
    root: &Value,
    chunk: &DocumentChunk,
    outline: &Outline,
    position: Position,
) -> Vec<CompletionItem> {
    match cursor_context(chunk, position) {
        Some(CursorContext::Property { parent, prefix }) => {
            let nodes = graph.at(root, &parent);
            let present = outline.keys_under(&parent);
            let mut props: Vec<_> = properties(&nodes)
                .into_iter()
                .filter(|p| !present.contains(&p.name) && p.name.starts_with(prefix.as_str()))
                .collect();
            props.sort_by_key(|p| !p.required);
            props
                .into_iter()
                .map(|p| {
                    let child = graph.at(root, &child_path(&parent, p.name));
                    CompletionItem {
                        label: p.name.to_string(),
                        kind: CompletionKind::Property,
                        detail: type_label(&child),
                        documentation: first_str(&child, "description").map(str::to_string),
                        insert_text: format!("{}: ", p.name),
                    }
                })
                .collect()
        }
        Some(CursorContext::Value { path, prefix }) => {
            let nodes = graph.at(root, &path);
            let documentation = first_str(&nodes, "description").map(str::to_string);
            allowed_values(&nodes)
                .iter()
                .map(render)
                .filter(|label| label.starts_with(prefix.as_str()))
                .map(|label| CompletionItem {
                    insert_text: label.clone(),
                    label,
                    kind: CompletionKind::Value,
                    detail: type_label(&nodes),
                    documentation: documentation.clone(),
                })
                .collect()
        }
        None => Vec::new(),
    }
}

fn child_path(parent: &[Segment], key: &str) -> Vec<Segment> {
    let mut path = parent.to_vec();
    path.push(Segment::Key(key.to_string()));
    path
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
