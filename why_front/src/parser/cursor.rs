//! Token cursor. Grounded in the grounding repo's `ParseState<T>`
//! (`tokens`, `index`, `errors`, `peek`, `peek_reverse`, `get_index`/
//! `set_index` for speculative backtracking, `add_error`, `last_token`),
//! extended with a fixed-size ring buffer of recently consumed tokens
//! (the recovery engine's pattern matcher looks back across it), the
//! resource caps spec.md §4.4/§5 require, and the session-wide
//! expected-token/frequency bookkeeping spec.md §4.4's "context update
//! order" and §6 Query interface need.

use std::collections::{HashMap, VecDeque};

use crate::lexer::{contextual_follow_set, Span, Token, TokenKind};

use super::recovery::{
    Diagnostic, RecoveryMode, Severity, Suggestion, SuggestionCategory, SuggestionKind,
};
use super::{ParseStatistics, ParserConfig};

/// Maximum number of recently-consumed tokens kept for the recovery
/// pattern matcher (spec.md §4.4).
pub const RING_BUFFER_SIZE: usize = 10;

pub struct Cursor {
    tokens: Vec<Token>,
    /// Parallel to `tokens`: whether a `Newline` token was scanned (and
    /// dropped) immediately before the token at the same index. Built once
    /// in [`Cursor::with_config`] from the raw `lex_significant` stream, so
    /// every other part of the cursor keeps working over a newline-free
    /// token vector.
    newline_before: Vec<bool>,
    index: usize,
    eof: Token,
    ring: VecDeque<Token>,
    pub diagnostics: Vec<Diagnostic>,
    pub truncated: bool,
    consumed_count: usize,

    pub recovery_mode: RecoveryMode,
    max_errors: usize,
    max_suggestions: usize,
    suggestions_enabled: bool,
    profiling_enabled: bool,

    /// Set once the session-wide suggestion cap is hit; the engine then
    /// disables itself for the remainder of the session rather than
    /// keep checking a cap it has already exceeded (spec.md §4.4).
    suggestions_disabled: bool,
    suggestion_total: usize,
    suggestion_truncated: bool,

    /// Session-wide accumulated set of expected-token tags (spec.md
    /// §4.4 "expected-token tracking"): every expectation failure pushes
    /// the tag it wanted onto this set.
    expected_tokens: Vec<String>,

    /// "Internal statistics table" Global mode keeps (spec.md §4.4):
    /// how often each token tag, and each consecutive pair of tags, has
    /// been consumed this session.
    token_frequency: HashMap<&'static str, usize>,
    token_pair_frequency: HashMap<(&'static str, &'static str), usize>,
    last_tag: Option<&'static str>,

    /// Contextually-expected follow-tokens recomputed from the last
    /// consumed token on every advance (context update order step 3).
    contextual_next: Vec<&'static str>,

    global_recoveries: usize,
}

impl Cursor {
    /// Builds a cursor over already-filtered significant tokens (trivia
    /// stripped by the caller, matching `Lexer::lex_significant`), with
    /// default configuration. Kept for callers (and the many inline unit
    /// tests across the parser) that don't need to select a recovery
    /// mode or resource limits explicitly.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self::with_config(tokens, &ParserConfig::default())
    }

    pub fn with_config(tokens: Vec<Token>, config: &ParserConfig) -> Self {
        let mut filtered = Vec::with_capacity(tokens.len());
        let mut newline_before = Vec::with_capacity(tokens.len());
        let mut pending_newline = false;
        for tok in tokens {
            if matches!(tok.kind, TokenKind::Newline) {
                pending_newline = true;
                continue;
            }
            newline_before.push(pending_newline);
            pending_newline = false;
            filtered.push(tok);
        }
        let eof = filtered
            .last()
            .cloned()
            .unwrap_or_else(|| Token::new(TokenKind::Eof, "", crate::lexer::Span::dummy()));
        Cursor {
            tokens: filtered,
            newline_before,
            index: 0,
            eof,
            ring: VecDeque::with_capacity(RING_BUFFER_SIZE),
            diagnostics: vec![],
            truncated: false,
            consumed_count: 0,
            recovery_mode: config.recovery_mode,
            max_errors: config.max_errors,
            max_suggestions: config.max_suggestions,
            suggestions_enabled: config.suggestions_enabled,
            profiling_enabled: config.profiling_enabled,
            suggestions_disabled: false,
            suggestion_total: 0,
            suggestion_truncated: false,
            expected_tokens: vec![],
            token_frequency: HashMap::new(),
            token_pair_frequency: HashMap::new(),
            last_tag: None,
            contextual_next: vec![],
            global_recoveries: 0,
        }
    }

    pub fn peek(&self) -> &Token {
        self.tokens.get(self.index).unwrap_or(&self.eof)
    }

    pub fn peek_at(&self, offset: usize) -> &Token {
        self.tokens.get(self.index + offset).unwrap_or(&self.eof)
    }

    pub fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    /// The cursor's position in the underlying token vector, for
    /// speculative parses that may need to backtrack.
    pub fn mark(&self) -> usize {
        self.index
    }

    pub fn reset_to(&mut self, mark: usize) {
        self.index = mark;
    }

    /// Advances past the current token. Applies spec.md §4.4's three-step
    /// "context update order" on every advance: (1) push the token onto
    /// the ring buffer the pattern matcher consults; (2) bump its
    /// token-frequency and token-pair-frequency counters, when profiling
    /// is enabled -- these feed the Query interface's statistics and
    /// Global mode's internal table; (3) recompute the contextually
    /// expected follow-tokens from this token's tag, unconditionally,
    /// since completion suggestions depend on it regardless of whether
    /// profiling is on.
    pub fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if !matches!(tok.kind, TokenKind::Eof) {
            self.index += 1;
        }
        self.consumed_count += 1;

        // Step 1: ring buffer.
        if self.ring.len() == RING_BUFFER_SIZE {
            self.ring.pop_front();
        }
        self.ring.push_back(tok.clone());

        // Step 2: frequency counters.
        let tag = tok.kind.tag();
        if self.profiling_enabled {
            *self.token_frequency.entry(tag).or_insert(0) += 1;
            if let Some(prev) = self.last_tag {
                *self.token_pair_frequency.entry((prev, tag)).or_insert(0) += 1;
            }
        }

        // Step 3: contextually-expected tokens.
        self.contextual_next = contextual_follow_set(tag).to_vec();
        self.last_tag = Some(tag);

        tok
    }

    /// The last `n` consumed tokens, oldest first, for the recovery
    /// pattern matcher.
    pub fn recent_tokens(&self, n: usize) -> Vec<&Token> {
        let len = self.ring.len();
        self.ring.iter().skip(len.saturating_sub(n)).collect()
    }

    pub fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(kind)
    }

    pub fn eat(&mut self, kind: &TokenKind) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    /// Records a diagnostic, honoring the configured max-error cap: once
    /// hit, further diagnostics are dropped and `truncated` is set
    /// instead of growing the report without bound.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        if self.diagnostics.len() >= self.max_errors {
            self.truncated = true;
            return;
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn error_at_current(&mut self, message: impl Into<String>, suggestions: Vec<Suggestion>) {
        let span = self.peek().span.clone();
        let found = Some(self.peek().text.clone());
        let expected = self.expected_tokens.clone();
        let suggestions = self.record_suggestions(suggestions);
        self.report(Diagnostic {
            severity: Severity::Error,
            message: message.into(),
            span,
            expected,
            found,
            hint: None,
            suggestions,
        });
    }

    /// Pushes `tag` onto the session's accumulated expected-token set
    /// (spec.md §4.4 "expected-token tracking"), deduplicated, called on
    /// every expectation failure across the recursive-descent and Pratt
    /// layers.
    pub fn note_expected(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !self.expected_tokens.contains(&tag) {
            self.expected_tokens.push(tag);
        }
    }

    /// Completion suggestions derived from the expected-token set
    /// intersected with the contextually plausible follow-tokens of the
    /// last consumed token (spec.md §4.4), not from any fixed pattern.
    /// Confidence is fixed below the fixed-pattern suggestions' typical
    /// range so a concrete fix always outranks a bare completion at the
    /// tie-break (`SuggestionKind` declaration order already handles
    /// equal-confidence ties; this keeps the common case unambiguous
    /// too).
    pub fn completion_suggestions(&self) -> Vec<Suggestion> {
        if !self.suggestions_enabled {
            return vec![];
        }
        self.contextual_next
            .iter()
            .filter(|tag| self.expected_tokens.iter().any(|e| e == *tag))
            .map(|tag| Suggestion {
                kind: SuggestionKind::Completion,
                message: format!("expected {tag} here"),
                position: self.peek().span.clone(),
                replacement: Some((*tag).to_string()),
                confidence: 0.55,
                category: SuggestionCategory::Syntax,
                fix_template: Some(format!("insert {tag}")),
            })
            .collect()
    }

    /// Applies the session-wide suggestion cap (spec.md §5): once the
    /// running total of suggestions emitted this session reaches
    /// `max_suggestions`, the suggestion engine disables itself for the
    /// remainder of the session (rather than continuing to cap each
    /// diagnostic individually), and `suggestion_truncated` is recorded
    /// for the Query interface.
    pub fn record_suggestions(&mut self, suggestions: Vec<Suggestion>) -> Vec<Suggestion> {
        if !self.suggestions_enabled || self.suggestions_disabled {
            return vec![];
        }
        let remaining = self.max_suggestions.saturating_sub(self.suggestion_total);
        if remaining == 0 {
            self.suggestions_disabled = true;
            self.suggestion_truncated = true;
            return vec![];
        }
        let offered = suggestions.len();
        let kept: Vec<Suggestion> = suggestions.into_iter().take(remaining).collect();
        self.suggestion_total += kept.len();
        if offered > kept.len() || self.suggestion_total >= self.max_suggestions {
            self.suggestions_disabled = true;
            if offered > kept.len() {
                self.suggestion_truncated = true;
            }
        }
        kept
    }

    /// Whether a newline was scanned immediately before the current token
    /// (spec.md §4.2: "absence [of `;`] before newline yields a
    /// low-confidence style suggestion" rather than an error). Consulted
    /// only by statement/declaration terminator call sites -- every other
    /// part of the grammar is newline-insensitive.
    pub fn newline_before_current(&self) -> bool {
        self.newline_before.get(self.index).copied().unwrap_or(false)
    }

    /// Records the low-confidence style suggestion for an omitted
    /// terminator `;` at end of line (spec.md §4.2, §4.4). Unlike
    /// [`Cursor::error_at_current`], this never raises a [`Severity::Error`]
    /// diagnostic -- the statement parsed fine, the suggestion is purely
    /// advisory -- so it goes through `record_suggestions`' cap directly
    /// rather than the recovery pattern matcher.
    pub fn note_omitted_semicolon(&mut self, span: Span) {
        let suggestion = Suggestion {
            kind: SuggestionKind::Style,
            message: "';' omitted at end of line".to_string(),
            position: span.clone(),
            replacement: Some(";".to_string()),
            confidence: 0.3,
            category: SuggestionCategory::Style,
            fix_template: Some("insert ';'".to_string()),
        };
        let suggestions = self.record_suggestions(vec![suggestion]);
        if suggestions.is_empty() {
            return;
        }
        self.report(Diagnostic {
            severity: Severity::Info,
            message: "statement terminator ';' is optional at end of line".to_string(),
            span,
            expected: vec![],
            found: None,
            hint: suggestions.first().map(|s| s.message.clone()),
            suggestions,
        });
    }

    /// Counts one application of Global mode's panic-mode safety net,
    /// exposed via the Query interface as `global_recoveries`.
    pub fn record_global_recovery(&mut self) {
        self.global_recoveries += 1;
    }

    /// Consumes tokens until one `starts_declaration`/`starts_statement`
    /// (panic-mode resynchronization, spec.md §4.4), without consuming the
    /// synchronization token itself.
    pub fn synchronize_to_statement(&mut self) {
        while !self.is_at_end() && !self.peek().starts_statement() {
            self.advance();
        }
    }

    pub fn synchronize_to_declaration(&mut self) {
        while !self.is_at_end() && !self.peek().starts_declaration() {
            self.advance();
        }
    }

    /// Snapshots the Query interface's statistics (spec.md §6). Node
    /// count is supplied by the caller, which walks the finished AST --
    /// the cursor itself never sees nodes, only tokens.
    pub fn statistics(&self, nodes_created: usize) -> ParseStatistics {
        let error_count = self.diagnostics.iter().filter(|d| d.severity == Severity::Error).count();
        let approx_memory_bytes = self.consumed_count * std::mem::size_of::<Token>()
            + nodes_created * std::mem::size_of::<usize>() * 4;
        ParseStatistics {
            tokens_processed: self.consumed_count,
            nodes_created,
            error_count,
            suggestion_count: self.suggestion_total,
            error_cap_hit: self.truncated,
            suggestion_cap_hit: self.suggestion_truncated,
            approx_memory_bytes,
            global_recoveries: self.global_recoveries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn cursor_for(source: &str) -> Cursor {
        let tokens = Lexer::with_file(source, "<t>").lex_significant().unwrap();
        Cursor::new(tokens)
    }

    #[test]
    fn completion_suggestions_need_both_expected_and_contextual_match() {
        let mut cursor = cursor_for("let");
        cursor.advance();
        assert!(cursor.completion_suggestions().is_empty());
        cursor.note_expected("identifier");
        let suggestions = cursor.completion_suggestions();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].kind, SuggestionKind::Completion);
    }

    #[test]
    fn record_suggestions_disables_itself_once_the_session_cap_is_hit() {
        let mut config = ParserConfig::default();
        config.max_suggestions = 1;
        let mut cursor = Cursor::with_config(vec![], &config);
        let make = || Suggestion {
            kind: SuggestionKind::ErrorFix,
            message: "x".into(),
            position: crate::lexer::Span::dummy(),
            replacement: None,
            confidence: 0.9,
            category: SuggestionCategory::Syntax,
            fix_template: None,
        };
        let first = cursor.record_suggestions(vec![make()]);
        assert_eq!(first.len(), 1);
        let second = cursor.record_suggestions(vec![make()]);
        assert!(second.is_empty());
        assert!(cursor.statistics(0).suggestion_cap_hit);
    }

    #[test]
    fn report_honors_the_configured_max_errors() {
        let mut config = ParserConfig::default();
        config.max_errors = 1;
        let mut cursor = Cursor::with_config(vec![], &config);
        let diag = Diagnostic {
            severity: Severity::Error,
            message: "e".into(),
            span: crate::lexer::Span::dummy(),
            expected: vec![],
            found: None,
            hint: None,
            suggestions: vec![],
        };
        cursor.report(diag.clone());
        cursor.report(diag);
        assert_eq!(cursor.diagnostics.len(), 1);
        assert!(cursor.truncated);
    }
}
