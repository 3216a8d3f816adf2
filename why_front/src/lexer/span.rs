//! Source positions and spans.
//!
//! A [`Position`] is the (file, line, column, byte offset) quadruple from
//! which every diagnostic and every AST node's [`Span`] is built. Lines and
//! columns are 1-based; byte offsets are 0-based, matching the rest of the
//! pack's lexer/parser split (position tracking lives here, not in the
//! parser or the AST).

use std::{fmt, rc::Rc};

#[derive(Debug, Clone, Eq, serde::Serialize, serde::Deserialize)]
pub struct Position {
    pub file: Rc<str>,
    pub line: usize,
    pub column: usize,
    pub byte_offset: usize,
}

impl Position {
    pub fn start_of(file: impl Into<Rc<str>>) -> Self {
        Position {
            file: file.into(),
            line: 1,
            column: 1,
            byte_offset: 0,
        }
    }
}

impl PartialEq for Position {
    fn eq(&self, _other: &Self) -> bool {
        // Positions are diagnostic metadata, not semantic content: two AST
        // nodes parsed from different source text (e.g. before/after a
        // pretty-print round trip) must compare equal structurally.
        true
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// An ordered pair of positions over the same file.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Span { start, end }
    }

    /// A span that encloses both `self` and `other`; used to build a
    /// parent's span out of the spans of its first and last child.
    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.clone(),
            end: other.end.clone(),
        }
    }

    /// Whether `self` strictly encloses `child` (the span-enclosure
    /// invariant every AST node must satisfy with respect to its children).
    pub fn encloses(&self, child: &Span) -> bool {
        (self.start.byte_offset <= child.start.byte_offset)
            && (child.end.byte_offset <= self.end.byte_offset)
    }

    pub fn dummy() -> Span {
        let pos = Position::start_of("<unknown>");
        Span {
            start: pos.clone(),
            end: pos,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start)
    }
}

/// Renders a one-line `^^^` snippet under the offending span. Takes the
/// source text as a parameter instead of carrying a clone of it in every
/// token and AST node.
pub fn render_snippet(source: &str, span: &Span, message: &str) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let Some(line_str) = lines.get(span.start.line.saturating_sub(1)) else {
        return message.to_string();
    };
    let col = span.start.column.saturating_sub(1);
    let width = if span.start.line == span.end.line {
        (span.end.column.saturating_sub(span.start.column)).max(1)
    } else {
        line_str.len().saturating_sub(col).max(1)
    };
    let margin = format!("{}", span.start.line).len();
    let fill = " ".repeat(margin);
    let caret_pad = " ".repeat(col);
    let carets = "^".repeat(width);
    format!(
        "{fill} |\n{line} | {line_str}\n{fill} | {caret_pad}{carets} {message}",
        line = span.start.line
    )
}
