//! # Schema Navigation
//!
//! Walks a schema alongside a document path to find the sub-schemas that
//! govern a key. Hover and completion read titles, descriptions, enums and
//! property lists from the result.
//!
//! Navigation follows `properties`, `additionalProperties`, `items`,
//! `prefixItems` and the `allOf`/`anyOf`/`oneOf` combinators. `$ref` is
//! followed within the same document (`#/...`) and across documents known
//! to the engine (`<identity>#/...`). Anything else is ignored, so an
//! unresolvable reference narrows the result instead of failing.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::locate::Segment;

/// Reference chains deeper than this are treated as cycles.
const MAX_REF_DEPTH: usize = 32;

/// A schema node together with the document it was found in.
#[derive(Debug, Clone, Copy)]
pub struct Node<'a> {
    root: &'a Value,
    /// The sub-schema itself.
    pub schema: &'a Value,
}

/// Schema documents known to the engine, keyed by identity.
#[derive(Debug, Clone, Default)]
pub struct SchemaGraph {
    documents: HashMap<String, Arc<Value>>,
}

impl SchemaGraph {
    /// An empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document under `identity`.
    pub fn insert(&mut self, identity: impl Into<String>, body: Arc<Value>) {
        self.documents.insert(identity.into(), body);
    }

    /// Look up a document.
    pub fn get(&self, identity: &str) -> Option<&Arc<Value>> {
        self.documents.get(identity)
    }

    /// Every candidate sub-schema governing `path` under `root`.
    ///
    /// The first candidate is the most direct one; combinator branches
    /// follow in declaration order.
    pub fn at<'a>(&'a self, root: &'a Value, path: &[Segment]) -> Vec<Node<'a>> {
        let mut current = self.expand(Node { root, schema: root });
        for segment in path {
            let mut next = Vec::new();
            for node in &current {
                if let Some(child) = self.child(node, segment) {
                    next.extend(self.expand(child));
                }
            }
            if next.is_empty() {
                return next;
            }
            current = next;
        }
        current
    }

    fn child<'a>(&'a self, node: &Node<'a>, segment: &Segment) -> Option<Node<'a>> {
        let schema = node.schema;
        let found = match segment {
            Segment::Key(key) => schema
                .get("properties")
                .and_then(|p| p.get(key))
                .or_else(|| schema.get("additionalProperties").filter(|v| v.is_object())),
            Segment::Index(idx) => schema
                .get("prefixItems")
                .and_then(|p| p.get(*idx))
                .or_else(|| match schema.get("items") {
                    Some(Value::Array(tuple)) => tuple.get(*idx),
                    Some(items @ Value::Object(_)) => Some(items),
                    _ => None,
                }),
        }?;
        Some(Node {
            root: node.root,
            schema: found,
        })
    }

    /// The node plus everything reachable through `$ref` and combinators.
    fn expand<'a>(&'a self, node: Node<'a>) -> Vec<Node<'a>> {
        let mut out = Vec::new();
        self.expand_into(node, 0, &mut out);
        out
    }

    fn expand_into<'a>(&'a self, node: Node<'a>, depth: usize, out: &mut Vec<Node<'a>>) {
        if depth > MAX_REF_DEPTH {
            return;
        }
        out.push(node);
        if let Some(target) = node
            .schema
            .get("$ref")
            .and_then(Value::as_str)
            .and_then(|r| self.follow(node.root, r))
        {
            self.expand_into(target, depth + 1, out);
        }
        for key in ["allOf", "anyOf", "oneOf"] {
            if let Some(Value::Array(branches)) = node.schema.get(key) {
                for branch in branches {
                    self.expand_into(
                        Node {
                            root: node.root,
                            schema: branch,
                        },
                        depth + 1,
                        out,
                    );
                }
            }
        }
    }

    fn follow<'a>(&'a self, root: &'a Value, reference: &str) -> Option<Node<'a>> {
        let (document, fragment) = match reference.split_once('#') {
            Some((doc, frag)) => (doc, frag),
            None => (reference, ""),
        };
        let target_root = if document.is_empty() {
            root
        } else {
            self.documents.get(document)?.as_ref()
        };
        let schema = if fragment.is_empty() {
            target_root
        } else {
            target_root.pointer(fragment)?
        };
        Some(Node {
            root: target_root,
            schema,
        })
    }
}

// ─── Reading candidates ──────────────────────────────────────────────

/// First string found under `key` across the candidates.
pub fn first_str<'a>(nodes: &[Node<'a>], key: &str) -> Option<&'a str> {
    nodes
        .iter()
        .find_map(|n| n.schema.get(key).and_then(Value::as_str))
}

/// Rendered `type` of the first candidate declaring one.
pub fn type_label(nodes: &[Node<'_>]) -> Option<String> {
    nodes.iter().find_map(|n| match n.schema.get("type")? {
        Value::String(s) => Some(s.clone()),
        Value::Array(types) => Some(
            types
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(" | "),
        ),
        _ => None,
    })
}

/// Allowed values: `enum`, `const`, or `true`/`false` for booleans.
pub fn allowed_values(nodes: &[Node<'_>]) -> Vec<Value> {
    if let Some(values) = nodes
        .iter()
        .find_map(|n| n.schema.get("enum").and_then(Value::as_array))
    {
        return values.clone();
    }
    if let Some(value) = nodes.iter().find_map(|n| n.schema.get("const")) {
        return vec![value.clone()];
    }
    let is_bool = nodes
        .iter()
        .any(|n| n.schema.get("type").and_then(Value::as_str) == Some("boolean"));
    if is_bool {
        return vec![Value::Bool(true), Value::Bool(false)];
    }
    Vec::new()
}

/// A property declared by any candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyInfo<'a> {
    /// Property name.
    pub name: &'a str,
    /// The property's sub-schema.
    pub schema: &'a Value,
    /// Whether a candidate lists it as required.
    pub required: bool,
}

/// Properties declared across the candidates, first declaration wins.
pub fn properties<'a>(nodes: &[Node<'a>]) -> Vec<PropertyInfo<'a>> {
    let required: Vec<&str> = nodes
        .iter()
        .filter_map(|n| n.schema.get("required").and_then(Value::as_array))
        .flatten()
        .filter_map(Value::as_str)
        .collect();

    let mut out: Vec<PropertyInfo<'a>> = Vec::new();
    for node in nodes {
        if let Some(props) = node.schema.get("properties").and_then(Value::as_object) {
            for (name, schema) in props {
                if out.iter().all(|p| p.name != name.as_str()) {
                    out.push(PropertyInfo {
                        name,
                        schema,
                        required: required.contains(&name.as_str()),
                    });
                }
            }
        }
    }
    out
}
