//! # Source Outline
//!
//! Maps JSON pointers to positions in the YAML text. The parser does not
//! report spans for values, so the outline is rebuilt from indentation:
//! every block mapping key and every block sequence entry gets an entry
//! carrying its pointer, its line and the columns of its key or dash.
//!
//! The outline is deliberately forgiving. It works on text that fails to
//! parse, which is what lets hover and completion keep working while the
//! user is mid-edit. Flow collections (`[a, b]`, `{a: 1}`) get no entries
//! of their own; pointers inside them resolve to the nearest enclosing
//! block entry. They are still scanned, possibly across lines, so the
//! outline knows which scalars inside them were quoted.

use std::collections::HashSet;

use yedit_core::Position;

use crate::convert::escape_pointer_segment;

/// One step of a path into a YAML document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Mapping key.
    Key(String),
    /// Sequence index.
    Index(usize),
}

impl Segment {
    fn push_pointer(&self, out: &mut String) {
        out.push('/');
        match self {
            Segment::Key(k) => out.push_str(&escape_pointer_segment(k)),
            Segment::Index(i) => out.push_str(&i.to_string()),
        }
    }
}

/// Render segments as a JSON pointer.
pub fn pointer_of(path: &[Segment]) -> String {
    let mut out = String::new();
    for seg in path {
        seg.push_pointer(&mut out);
    }
    out
}

/// An inline scalar written on the same line as its key or dash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarSpan {
    /// Column where the scalar text starts.
    pub start: u32,
    /// The scalar as written, comment stripped.
    pub raw: String,
}

impl ScalarSpan {
    /// Whether the scalar was written without quotes.
    pub fn is_plain(&self) -> bool {
        !self.raw.starts_with(['"', '\''])
    }
}

/// A block mapping key or block sequence entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    /// Path from the document root.
    pub path: Vec<Segment>,
    /// The same path as a JSON pointer.
    pub pointer: String,
    /// Absolute buffer line.
    pub line: u32,
    /// Column of the key's first character or of the dash.
    pub start: u32,
    /// Column just past the key or dash.
    pub end: u32,
    /// Inline scalar value, if any.
    pub value: Option<ScalarSpan>,
}

/// One YAML document of a `---` separated stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChunk {
    /// Absolute line the chunk's text starts at.
    pub start_line: u32,
    /// Chunk text. Separator and end markers are blanked so columns match.
    pub text: String,
}

impl DocumentChunk {
    /// Number of lines in the chunk.
    pub fn line_count(&self) -> u32 {
        self.text.split('\n').count() as u32
    }

    /// Whether `line` (absolute) falls inside this chunk.
    pub fn contains_line(&self, line: u32) -> bool {
        line >= self.start_line && line < self.start_line + self.line_count()
    }

    /// First line carrying content, used for whole-document diagnostics.
    pub fn first_content_line(&self) -> u32 {
        self.text
            .split('\n')
            .position(|l| !is_ignorable(l.trim_start()))
            .map_or(self.start_line, |i| self.start_line + i as u32)
    }

    fn is_blank(&self) -> bool {
        self.text.split('\n').all(|l| {
            let t = l.trim_start();
            is_ignorable(t) || t.starts_with('%')
        })
    }
}

/// Split a buffer into its YAML documents.
///
/// Documents containing nothing but blanks, comments and directives are
/// dropped.
pub fn split_documents(text: &str) -> Vec<DocumentChunk> {
    let mut chunks = Vec::new();
    let mut start_line = 0u32;
    let mut lines: Vec<String> = Vec::new();

    for (idx, raw) in text.split('\n').enumerate() {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        if is_document_start(line) {
            chunks.push(DocumentChunk {
                start_line,
                text: lines.join("\n"),
            });
            start_line = idx as u32;
            lines = vec![format!("   {}", &line[3..])];
        } else if line == "..." {
            lines.push(String::new());
        } else {
            lines.push(line.to_string());
        }
    }
    chunks.push(DocumentChunk {
        start_line,
        text: lines.join("\n"),
    });
    chunks.retain(|c| !c.is_blank());
    chunks
}

fn is_document_start(line: &str) -> bool {
    line == "---" || line.starts_with("--- ") || line.starts_with("---\t")
}

fn is_ignorable(content: &str) -> bool {
    content.trim().is_empty() || content.starts_with('#')
}

/// Indentation-derived index of a document's keys and sequence entries.
#[derive(Debug, Clone, Default)]
pub struct Outline {
    entries: Vec<OutlineEntry>,
    /// Pointers of quoted scalars inside flow collections.
    flow_quoted: HashSet<String>,
}

impl Outline {
    /// Build the outline of one document.
    pub fn build(chunk: &DocumentChunk) -> Self {
        let mut walker = Walker::default();
        for (offset, line) in chunk.text.split('\n').enumerate() {
            walker.feed(chunk.start_line + offset as u32, line);
        }
        walker.finish();
        Self {
            entries: walker.entries,
            flow_quoted: walker.flow_quoted.into_iter().collect(),
        }
    }

    /// All entries in source order.
    pub fn entries(&self) -> &[OutlineEntry] {
        &self.entries
    }

    /// The entry at `pointer`, or the nearest enclosing entry.
    ///
    /// Returns `None` for the document root or when nothing encloses it.
    pub fn locate(&self, pointer: &str) -> Option<&OutlineEntry> {
        let mut current = pointer;
        while !current.is_empty() {
            if let Some(entry) = self.entries.iter().find(|e| e.pointer == current) {
                return Some(entry);
            }
            current = match current.rfind('/') {
                Some(idx) => &current[..idx],
                None => "",
            };
        }
        None
    }

    /// The inline scalar written at exactly `pointer`.
    pub fn scalar(&self, pointer: &str) -> Option<&ScalarSpan> {
        self.entries
            .iter()
            .find(|e| e.pointer == pointer)
            .and_then(|e| e.value.as_ref())
    }

    /// Whether the scalar at `pointer` was unquoted.
    pub fn is_plain(&self, pointer: &str) -> bool {
        if self.flow_quoted.contains(pointer) {
            return false;
        }
        self.scalar(pointer).map_or(true, ScalarSpan::is_plain)
    }

    /// The entry under the cursor on `position.line`.
    pub fn entry_at(&self, position: Position) -> Option<&OutlineEntry> {
        let on_line: Vec<&OutlineEntry> = self
            .entries
            .iter()
            .filter(|e| e.line == position.line)
            .collect();
        on_line
            .iter()
            .find(|e| position.character >= e.start && position.character < e.end)
            .or_else(|| {
                on_line
                    .iter()
                    .rev()
                    .find(|e| e.start <= position.character)
            })
            .copied()
    }

    /// Keys already present directly under `parent`.
    pub fn keys_under(&self, parent: &[Segment]) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.path.len() == parent.len() + 1 && e.path.starts_with(parent))
            .filter_map(|e| match e.path.last() {
                Some(Segment::Key(k)) => Some(k.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// What the cursor is positioned to type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorContext {
    /// A new key inside the mapping at `parent`.
    Property {
        /// Path of the enclosing mapping.
        parent: Vec<Segment>,
        /// Text typed so far.
        prefix: String,
    },
    /// The value of the key at `path`.
    Value {
        /// Path of the key whose value is being typed.
        path: Vec<Segment>,
        /// Text typed so far.
        prefix: String,
    },
}

/// Work out what the cursor at `position` is typing inside `chunk`.
pub fn cursor_context(chunk: &DocumentChunk, position: Position) -> Option<CursorContext> {
    let lines: Vec<&str> = chunk.text.split('\n').collect();
    let rel = position.line.checked_sub(chunk.start_line)? as usize;
    let current = *lines.get(rel)?;

    let mut walker = Walker::default();
    for (offset, line) in lines.iter().take(rel).enumerate() {
        walker.feed(chunk.start_line + offset as u32, line);
    }

    let cursor = (position.character as usize).min(current.chars().count());
    let before: String = current.chars().take(cursor).collect();
    let indent = before.len() - before.trim_start_matches(' ').len();
    let mut col = indent;
    let mut rest = &before[indent..];

    while rest == "-" || rest.starts_with("- ") {
        walker.open_sequence_item(col);
        let inner = rest[1..].trim_start();
        col += rest.len() - inner.len();
        rest = inner;
    }

    if let Some(key) = split_key(rest) {
        if let Some((offset, _)) = key.value_offset {
            walker.pop_to(col);
            let mut path = walker.path();
            path.push(Segment::Key(key.name));
            let prefix: String = rest.chars().skip(offset).collect();
            return Some(CursorContext::Value {
                path,
                prefix: prefix.trim().to_string(),
            });
        }
        if rest.trim_end().ends_with(':') {
            walker.pop_to(col);
            let mut path = walker.path();
            path.push(Segment::Key(key.name));
            return Some(CursorContext::Value {
                path,
                prefix: String::new(),
            });
        }
    }

    walker.pop_to(col);
    Some(CursorContext::Property {
        parent: walker.path(),
        prefix: rest.trim().to_string(),
    })
}

// ─── Indentation walker ──────────────────────────────────────────────

#[derive(Debug)]
struct Frame {
    indent: usize,
    segment: Segment,
    /// A key with nothing after its colon; may own a same-indent sequence.
    open: bool,
}

/// A flow collection whose closing bracket has not been seen yet.
#[derive(Debug)]
struct PendingFlow {
    /// Pointer of the entry the collection is the value of.
    pointer: String,
    /// Column of the owning key or dash.
    owner: usize,
    text: String,
}

#[derive(Debug, Default)]
struct Walker {
    stack: Vec<Frame>,
    entries: Vec<OutlineEntry>,
    block_scalar_indent: Option<usize>,
    flow: Option<PendingFlow>,
    flow_quoted: Vec<String>,
}

impl Walker {
    fn feed(&mut self, line_no: u32, line: &str) {
        let indent = line.len() - line.trim_start_matches(' ').len();
        let content = &line[indent..];

        if let Some(mut flow) = self.flow.take() {
            if content.trim().is_empty() || indent > flow.owner {
                flow.text.push('\n');
                flow.text.push_str(line);
                if flow_is_closed(&flow.text) {
                    self.scan_flow(&flow);
                } else {
                    self.flow = Some(flow);
                }
                return;
            }
            // Unterminated; the collection ends where the block resumes.
            self.scan_flow(&flow);
        }

        if let Some(block) = self.block_scalar_indent {
            if content.trim().is_empty() || indent > block {
                return;
            }
            self.block_scalar_indent = None;
        }
        if is_ignorable(content) {
            return;
        }

        let mut col = indent;
        let mut rest = content;
        loop {
            if rest == "-" || rest.starts_with("- ") {
                self.open_sequence_item(col);
                let inner = rest[1..].trim_start();
                let inner_col = col + rest[..rest.len() - inner.len()].chars().count();
                let nested = inner == "-" || inner.starts_with("- ") || split_key(inner).is_some();
                let value = if is_ignorable(inner) || nested {
                    None
                } else {
                    Some(ScalarSpan {
                        start: inner_col as u32,
                        raw: strip_comment(inner).to_string(),
                    })
                };
                if value.as_ref().is_some_and(|v| is_block_indicator(&v.raw)) {
                    self.block_scalar_indent = Some(col);
                }
                let flow_start = value.as_ref().filter(|v| is_flow_start(&v.raw)).map(|v| v.start);
                self.push_entry(line_no, col, col + 1, value);
                if let Some(start) = flow_start {
                    self.open_flow(line, start as usize, col);
                }
                if !nested {
                    return;
                }
                col = inner_col;
                rest = inner;
                continue;
            }

            if let Some(key) = split_key(rest) {
                self.pop_to(col);
                let value = key.value_offset.map(|(offset, raw)| ScalarSpan {
                    start: (col + offset) as u32,
                    raw,
                });
                if value.as_ref().is_some_and(|v| is_block_indicator(&v.raw)) {
                    self.block_scalar_indent = Some(col);
                }
                let flow_start = value.as_ref().filter(|v| is_flow_start(&v.raw)).map(|v| v.start);
                self.stack.push(Frame {
                    indent: col,
                    segment: Segment::Key(key.name),
                    open: value.is_none(),
                });
                self.push_entry(line_no, col, col + key.len, value);
                if let Some(start) = flow_start {
                    self.open_flow(line, start as usize, col);
                }
            }
            return;
        }
    }

    /// Start scanning the flow collection at column `start` of `line`,
    /// owned by the entry just pushed.
    fn open_flow(&mut self, line: &str, start: usize, owner: usize) {
        let flow = PendingFlow {
            pointer: self
                .entries
                .last()
                .map(|e| e.pointer.clone())
                .unwrap_or_default(),
            owner,
            text: line.chars().skip(start).collect(),
        };
        if flow_is_closed(&flow.text) {
            self.scan_flow(&flow);
        } else {
            self.flow = Some(flow);
        }
    }

    fn scan_flow(&mut self, flow: &PendingFlow) {
        FlowScanner::scan(&flow.text, &flow.pointer, &mut self.flow_quoted);
    }

    /// Flush a collection left open at the end of the document.
    fn finish(&mut self) {
        if let Some(flow) = self.flow.take() {
            self.scan_flow(&flow);
        }
    }

    /// Enter a sequence entry whose dash sits at `col`.
    fn open_sequence_item(&mut self, col: usize) {
        while self.stack.last().is_some_and(|top| top.indent > col) {
            self.stack.pop();
        }
        let mut next = 0;
        if let Some(top) = self.stack.last() {
            if top.indent == col {
                match top.segment {
                    Segment::Index(i) => {
                        next = i + 1;
                        self.stack.pop();
                    }
                    Segment::Key(_) if top.open => {}
                    Segment::Key(_) => {
                        self.stack.pop();
                    }
                }
            }
        }
        self.stack.push(Frame {
            indent: col,
            segment: Segment::Index(next),
            open: false,
        });
    }

    /// Drop frames a key at `col` would close.
    fn pop_to(&mut self, col: usize) {
        while self.stack.last().is_some_and(|top| top.indent >= col) {
            self.stack.pop();
        }
    }

    fn path(&self) -> Vec<Segment> {
        self.stack.iter().map(|f| f.segment.clone()).collect()
    }

    fn push_entry(&mut self, line: u32, start: usize, end: usize, value: Option<ScalarSpan>) {
        let path = self.path();
        self.entries.push(OutlineEntry {
            pointer: pointer_of(&path),
            path,
            line,
            start: start as u32,
            end: end as u32,
            value,
        });
    }
}

// ─── Line scanning ───────────────────────────────────────────────────

struct KeySpan {
    name: String,
    /// Width of the key token in characters, quotes included.
    len: usize,
    /// Character offset and raw text of an inline value.
    value_offset: Option<(usize, String)>,
}

fn split_key(content: &str) -> Option<KeySpan> {
    let first = content.chars().next()?;
    let (name, key_end) = match first {
        '"' | '\'' => {
            let close = closing_quote(content, first)?;
            let inner = &content[1..close];
            let name = if first == '\'' {
                inner.replace("''", "'")
            } else {
                inner.replace("\\\"", "\"")
            };
            (name, close + 1)
        }
        '[' | '{' | '#' | '&' | '*' | '!' | '|' | '>' | '%' | '@' | '`' | '?' | ',' => return None,
        _ => {
            let colon = plain_key_colon(content)?;
            let name = content[..colon].trim_end();
            (name.to_string(), name.len())
        }
    };

    let after_key = &content[key_end..];
    let spaces = after_key.len() - after_key.trim_start_matches([' ', '\t']).len();
    let colon = key_end + spaces;
    if !content[colon..].starts_with(':') {
        return None;
    }
    let after_colon = &content[colon + 1..];
    if !(after_colon.is_empty() || after_colon.starts_with([' ', '\t'])) {
        return None;
    }

    let trimmed = after_colon.trim_start();
    let value_offset = if is_ignorable(trimmed) {
        None
    } else {
        let byte_offset = content.len() - trimmed.len();
        let char_offset = content[..byte_offset].chars().count();
        Some((char_offset, strip_comment(trimmed).to_string()))
    };

    Some(KeySpan {
        len: content[..key_end].chars().count(),
        name,
        value_offset,
    })
}

fn plain_key_colon(content: &str) -> Option<usize> {
    let bytes = content.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'#' if i > 0 && matches!(bytes[i - 1], b' ' | b'\t') => return None,
            b':' if matches!(bytes.get(i + 1), None | Some(b' ') | Some(b'\t')) => {
                return Some(i);
            }
            _ => {}
        }
    }
    None
}

fn closing_quote(content: &str, quote: char) -> Option<usize> {
    let bytes = content.as_bytes();
    let q = quote as u8;
    let mut i = 1;
    while i < bytes.len() {
        if quote == '"' && bytes[i] == b'\\' {
            i += 2;
            continue;
        }
        if bytes[i] == q {
            if quote == '\'' && bytes.get(i + 1) == Some(&b'\'') {
                i += 2;
                continue;
            }
            return Some(i);
        }
        i += 1;
    }
    None
}

fn strip_comment(value: &str) -> &str {
    let end = match value.chars().next() {
        Some(q @ ('"' | '\'')) => closing_quote(value, q).map_or(value.len(), |c| c + 1),
        _ => {
            let bytes = value.as_bytes();
            (1..bytes.len())
                .find(|&i| bytes[i] == b'#' && matches!(bytes[i - 1], b' ' | b'\t'))
                .unwrap_or(bytes.len())
        }
    };
    value[..end].trim_end()
}

fn is_block_indicator(raw: &str) -> bool {
    raw.starts_with(['|', '>'])
}

fn is_flow_start(raw: &str) -> bool {
    raw.starts_with(['[', '{'])
}

// ─── Flow collections ────────────────────────────────────────────────

/// Whether the outermost bracket of `text` has been closed.
fn flow_is_closed(text: &str) -> bool {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut in_comment = false;
    let mut prev = ' ';
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_comment {
            in_comment = c != '\n';
        } else if let Some(q) = quote {
            if q == '"' && c == '\\' {
                chars.next();
            } else if c == q {
                if q == '\'' && chars.peek() == Some(&'\'') {
                    chars.next();
                } else {
                    quote = None;
                }
            }
        } else {
            match c {
                '"' | '\'' if matches!(prev, ' ' | '\t' | '\n' | '[' | '{' | ',' | ':') => {
                    quote = Some(c);
                }
                '#' if matches!(prev, ' ' | '\t' | '\n') => in_comment = true,
                '[' | '{' => depth += 1,
                ']' | '}' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return true;
                    }
                }
                _ => {}
            }
        }
        prev = c;
    }
    false
}

/// Walks flow collection text and records the pointer of every quoted
/// scalar. Malformed input stops the scan without error.
struct FlowScanner<'a> {
    chars: Vec<char>,
    pos: usize,
    quoted: &'a mut Vec<String>,
}

impl FlowScanner<'_> {
    fn scan(text: &str, pointer: &str, quoted: &mut Vec<String>) {
        let mut scanner = FlowScanner {
            chars: text.chars().collect(),
            pos: 0,
            quoted,
        };
        scanner.node(&mut pointer.to_string(), true);
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_space(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\n' | '\r' => self.pos += 1,
                '#' if self.pos == 0 || matches!(self.chars[self.pos - 1], ' ' | '\t' | '\n') => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.pos += 1;
                    }
                }
                _ => return,
            }
        }
    }

    /// Scan one node. Returns the scalar's text so a caller can use it as
    /// a key; collections and aliases return `None`.
    fn node(&mut self, pointer: &mut String, record: bool) -> Option<String> {
        self.skip_space();
        match self.peek()? {
            '[' => {
                self.pos += 1;
                self.sequence(pointer);
                None
            }
            '{' => {
                self.pos += 1;
                self.mapping(pointer);
                None
            }
            q @ ('"' | '\'') => {
                let text = self.quoted_scalar(q);
                if record {
                    self.quoted.push(pointer.clone());
                }
                Some(text)
            }
            '&' | '!' => {
                self.skip_token();
                self.node(pointer, record)
            }
            '*' => {
                self.skip_token();
                None
            }
            _ => Some(self.plain_scalar()),
        }
    }

    fn sequence(&mut self, pointer: &mut String) {
        let mut index = 0usize;
        loop {
            self.skip_space();
            match self.peek() {
                None => return,
                Some(']') => {
                    self.pos += 1;
                    return;
                }
                _ => {}
            }
            let len = pointer.len();
            pointer.push('/');
            pointer.push_str(&index.to_string());
            let key = self.node(pointer, true);
            self.skip_space();
            if self.peek() == Some(':') {
                // `[key: value]` is a single-pair mapping.
                self.pos += 1;
                self.entry_value(pointer, key);
            }
            pointer.truncate(len);

            self.skip_space();
            match self.peek() {
                Some(',') => {
                    self.pos += 1;
                    index += 1;
                }
                Some(']') => {
                    self.pos += 1;
                    return;
                }
                _ => return,
            }
        }
    }

    fn mapping(&mut self, pointer: &mut String) {
        loop {
            self.skip_space();
            match self.peek() {
                None => return,
                Some('}') => {
                    self.pos += 1;
                    return;
                }
                _ => {}
            }
            let key = self.node(&mut String::new(), false);
            self.skip_space();
            if self.peek() == Some(':') {
                self.pos += 1;
                self.entry_value(pointer, key);
            }

            self.skip_space();
            match self.peek() {
                Some(',') => self.pos += 1,
                Some('}') => {
                    self.pos += 1;
                    return;
                }
                _ => return,
            }
        }
    }

    /// Scan the value after a key's colon.
    fn entry_value(&mut self, pointer: &mut String, key: Option<String>) {
        self.skip_space();
        if matches!(self.peek(), None | Some(',' | ']' | '}')) {
            return;
        }
        match key {
            Some(key) => {
                let len = pointer.len();
                pointer.push('/');
                pointer.push_str(&escape_pointer_segment(&key));
                self.node(pointer, true);
                pointer.truncate(len);
            }
            None => {
                self.node(&mut String::new(), false);
            }
        }
    }

    fn quoted_scalar(&mut self, quote: char) -> String {
        self.pos += 1;
        let mut out = String::new();
        while let Some(c) = self.peek() {
            self.pos += 1;
            if c == quote {
                if quote == '\'' && self.peek() == Some('\'') {
                    self.pos += 1;
                    out.push('\'');
                    continue;
                }
                return out;
            }
            if quote == '"' && c == '\\' {
                if let Some(next) = self.peek() {
                    self.pos += 1;
                    out.push(match next {
                        'n' => '\n',
                        't' => '\t',
                        other => other,
                    });
                }
                continue;
            }
            out.push(c);
        }
        out
    }

    fn plain_scalar(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            let ends = match c {
                ',' | '[' | ']' | '{' | '}' => true,
                ':' => matches!(
                    self.chars.get(self.pos + 1),
                    None | Some(' ' | '\t' | '\n' | '\r' | ',' | '[' | ']' | '{' | '}')
                ),
                '#' => self.pos > start && matches!(self.chars[self.pos - 1], ' ' | '\t'),
                _ => false,
            };
            if ends {
                break;
            }
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn skip_token(&mut self) {
        while self
            .peek()
            .is_some_and(|c| !matches!(c, ' ' | '\t' | '\n' | '\r' | ',' | ']' | '}'))
        {
            self.pos += 1;
        }
    }
}
