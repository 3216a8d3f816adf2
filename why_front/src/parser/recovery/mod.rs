//! Error-recovery and suggestion engine (spec.md §4.4).
//!
//! Grounded in the grounding repo's `ParseError { message, position }` +
//! `Span::to_string` source-context renderer, generalized into a full
//! `Diagnostic`/`Suggestion` record pair, three recovery strategies, a
//! fixed pattern matcher over the cursor's recent-token ring buffer, and
//! hand-rolled fuzzy keyword correction (no `strsim`/`regex` dependency --
//! none of the retrieval pack reaches for a crate for this).

pub mod fuzzy;
pub mod patterns;

use std::fmt;

use crate::lexer::{render_snippet, Span, TokenKind};

use super::cursor::Cursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Severity {
    Error,
    Warning,
    /// Advisory only -- e.g. the optional end-of-line `;` style suggestion
    /// (spec.md §4.2, §6: "severity (error | warning | info)").
    Info,
}

/// Which strategy produced/would produce a given recovery. Panic mode
/// discards tokens until a synchronization point; phrase mode repairs a
/// single malformed phrase in place (insert/replace/delete one token);
/// global mode falls back to panic-mode resynchronization at the nearest
/// enclosing declaration when phrase-level repair does not apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RecoveryMode {
    Panic,
    Phrase,
    Global,
}

/// spec.md §4.4's suggestion-kind vocabulary. Declaration order doubles as
/// the ranking tie-break ("fixes before completions", spec.md §8): a
/// concrete error fix always outranks a completion or a style nudge at
/// equal confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SuggestionKind {
    /// A concrete repair for a diagnosed error: insert, replace or remove
    /// one token, or correct a misspelled keyword.
    ErrorFix,
    /// Derived from the expected-token set intersected with the
    /// contextually plausible follow-tokens of the last consumed token
    /// (spec.md §4.4 "expected-token tracking"), rather than from a
    /// specific malformed-phrase pattern.
    Completion,
    /// A structural rework that doesn't fix an error by itself.
    Refactor,
    /// Advisory only, e.g. the optional end-of-line `;` nudge -- never
    /// attached to an error diagnostic.
    Style,
}

/// spec.md §4.4's suggestion-category vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SuggestionCategory {
    Syntax,
    Type,
    Name,
    Scope,
    Style,
    Perf,
}

/// A single ranked repair suggestion attached to a [`Diagnostic`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Suggestion {
    pub kind: SuggestionKind,
    pub message: String,
    pub position: Span,
    pub replacement: Option<String>,
    pub confidence: f64,
    pub category: SuggestionCategory,
    pub fix_template: Option<String>,
}

impl Suggestion {
    pub fn dedup_key(&self) -> (String, Option<String>) {
        (self.message.clone(), self.replacement.clone())
    }
}

/// Default acceptance floor for [`rank_and_filter`] (spec.md §4.4).
pub const DEFAULT_CONFIDENCE_FLOOR: f64 = 0.5;

/// Sorts by descending confidence (ties broken by suggestion kind, in
/// declaration order of [`SuggestionKind`]), drops anything below
/// `floor`, and removes duplicate (message, replacement) pairs, keeping
/// the first (highest-ranked) occurrence.
pub fn rank_and_filter(mut suggestions: Vec<Suggestion>, floor: f64) -> Vec<Suggestion> {
    suggestions.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| (a.kind as u8).cmp(&(b.kind as u8)))
    });
    suggestions.retain(|s| s.confidence >= floor);
    let mut seen = std::collections::HashSet::new();
    suggestions.retain(|s| seen.insert(s.dedup_key()));
    suggestions
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: Span,
    pub expected: Vec<String>,
    pub found: Option<String>,
    pub hint: Option<String>,
    pub suggestions: Vec<Suggestion>,
}

impl Diagnostic {
    pub fn render_for_cli(&self, source: &str) -> String {
        let label = render_snippet(source, &self.span, &self.message);
        let header = match self.severity {
            Severity::Error => format!("error: {}", self.message),
            Severity::Warning => format!("warning: {}", self.message),
            Severity::Info => format!("info: {}", self.message),
        };
        format!("{header}\n{label}")
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.severity {
            Severity::Error => "Parse error",
            Severity::Warning => "Parse warning",
            Severity::Info => "Parse info",
        };
        let hint = self.hint.as_deref().unwrap_or("none");
        write!(
            f,
            "{kind} at {}: {} (hint: {hint})",
            self.span, self.message
        )
    }
}

impl std::error::Error for Diagnostic {}

/// Phrase-mode repair (spec.md §4.4): attempts one localized fix in place
/// of discarding tokens until a synchronization point. Returns `true` when
/// a repair applied -- the caller can let its own loop retry without
/// resynchronizing -- and `false` when nothing applied, meaning the caller
/// should fall back to panic-mode resynchronization.
///
/// Two repairs are recognized, in order: (1) the current token is an
/// identifier immediately after a declaration-starting keyword -- a
/// do-nothing repair, since the outer declaration loop already retries
/// from here; (2) the cursor is stuck at an unclosed `(`/`[`/`{` -- scan
/// forward balancing depth until the matching close (or EOF).
pub fn phrase_repair(cursor: &mut Cursor) -> bool {
    if current_is_ident_after_declaration_head(cursor) {
        return true;
    }
    balance_unclosed_delimiter(cursor)
}

fn current_is_ident_after_declaration_head(cursor: &Cursor) -> bool {
    if !matches!(cursor.peek().kind, TokenKind::Ident(_)) {
        return false;
    }
    cursor
        .recent_tokens(1)
        .last()
        .map(|t| t.starts_declaration())
        .unwrap_or(false)
}

fn balance_unclosed_delimiter(cursor: &mut Cursor) -> bool {
    let (opener, closer) = match cursor.peek().kind {
        TokenKind::LParen => (TokenKind::LParen, TokenKind::RParen),
        TokenKind::LBracket => (TokenKind::LBracket, TokenKind::RBracket),
        TokenKind::LBrace => (TokenKind::LBrace, TokenKind::RBrace),
        _ => return false,
    };
    let mut depth = 0usize;
    while !cursor.is_at_end() {
        let kind = cursor.peek().kind.clone();
        cursor.advance();
        if kind == opener {
            depth += 1;
        } else if kind == closer {
            depth -= 1;
            if depth == 0 {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{Lexer, Span};

    fn cursor_for(source: &str) -> Cursor {
        let tokens = Lexer::with_file(source, "<t>").lex_significant().unwrap();
        Cursor::new(tokens)
    }

    #[test]
    fn phrase_repair_balances_unclosed_paren() {
        let mut cursor = cursor_for("(1, 2, 3)) rest");
        assert!(phrase_repair(&mut cursor));
        assert!(matches!(cursor.peek().kind, TokenKind::RParen));
    }

    #[test]
    fn phrase_repair_does_nothing_after_a_declaration_head() {
        let mut cursor = cursor_for("fn broke");
        cursor.advance();
        assert!(phrase_repair(&mut cursor));
    }

    #[test]
    fn phrase_repair_reports_no_repair_otherwise() {
        let mut cursor = cursor_for("1 + 2");
        assert!(!phrase_repair(&mut cursor));
    }

    #[test]
    fn rank_and_filter_ranks_fixes_before_completions_at_equal_confidence() {
        let fix = Suggestion {
            kind: SuggestionKind::ErrorFix,
            message: "insert".into(),
            position: Span::dummy(),
            replacement: None,
            confidence: 0.7,
            category: SuggestionCategory::Syntax,
            fix_template: None,
        };
        let completion = Suggestion {
            kind: SuggestionKind::Completion,
            message: "complete".into(),
            position: Span::dummy(),
            replacement: None,
            confidence: 0.7,
            category: SuggestionCategory::Syntax,
            fix_template: None,
        };
        let ranked = rank_and_filter(vec![completion, fix], 0.5);
        assert_eq!(ranked[0].kind, SuggestionKind::ErrorFix);
        assert_eq!(ranked[1].kind, SuggestionKind::Completion);
    }
}
