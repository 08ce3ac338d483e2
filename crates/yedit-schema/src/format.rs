//! # Whitespace Formatting
//!
//! A conservative formatter: it only touches whitespace, never the
//! document's structure or scalar text, so it is safe on buffers that do
//! not parse.
//!
//! - tabs in leading indentation become two spaces each
//! - trailing whitespace is stripped
//! - trailing blank lines collapse, leaving exactly one final newline
//!
//! Lines inside block scalars are left exactly as written, tabs and
//! trailing whitespace included, since both are part of the scalar's value.

/// Format `content`, or `None` when it is already formatted.
pub fn format_yaml(content: &str) -> Option<String> {
    let formatted = format_text(content);
    (formatted != content).then_some(formatted)
}

fn format_text(content: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut block_indent: Option<usize> = None;

    for raw in content.split('\n') {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        let expanded = expand_leading_tabs(line);
        let indent = expanded.len() - expanded.trim_start_matches(' ').len();
        let blank = expanded.trim().is_empty();

        if let Some(block) = block_indent {
            // Tabs after a block scalar's indentation are content.
            let raw_indent = line.len() - line.trim_start_matches(' ').len();
            if blank || raw_indent > block {
                lines.push(if blank { String::new() } else { line.to_string() });
                continue;
            }
            block_indent = None;
        }

        let trimmed = expanded.trim_end().to_string();
        if opens_block_scalar(&trimmed) {
            block_indent = Some(indent);
        }
        lines.push(trimmed);
    }

    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    if lines.is_empty() {
        return String::new();
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn expand_leading_tabs(line: &str) -> String {
    let indent_len = line.len() - line.trim_start_matches([' ', '\t']).len();
    let (indent, rest) = line.split_at(indent_len);
    let mut out = String::with_capacity(line.len() + indent.len());
    for c in indent.chars() {
        if c == '\t' {
            out.push_str("  ");
        } else {
            out.push(c);
        }
    }
    out.push_str(rest);
    out
}

fn opens_block_scalar(line: &str) -> bool {
    let value = match line.trim_start().strip_prefix("- ") {
        Some(item) => item,
        None => line.trim_start(),
    };
    let tail = match value.find(": ") {
        Some(idx) => value[idx + 2..].trim_start(),
        None => value,
    };
    let indicator = tail.split(" #").next().unwrap_or(tail).trim_end();
    let mut chars = indicator.chars();
    matches!(chars.next(), Some('|') | Some('>'))
        && chars.all(|c| matches!(c, '+' | '-' | '1'..='9'))
}
