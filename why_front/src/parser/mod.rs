//! Recursive-descent parser, Pratt expression core, and error-recovery
//! engine (spec.md §4.2-§4.4), plus the Configure/Query surface spec.md
//! §6 exposes around a parse session.
//!
//! Grounded in the grounding repo's `parser` module split (`parse_state`,
//! `direct_parsing`, `ast`) but rebuilt from scratch against this
//! language's own grammar surface: the grounding repo's parser depends on
//! a rust-sitter-generated `grammar` module this retrieval never captured
//! (no `build.rs`, no checked-in generated code), so nothing here imports
//! from or extends that path. The recursive-descent/Pratt split and the
//! cursor's `peek`/`get_index`/`set_index`/`add_error` shape are kept;
//! the grammar, the combinator DSL, and the rebalancing-based binary
//! expression parser are not.

pub mod cursor;
pub mod declarations;
pub mod pratt;
pub mod precedence;
pub mod recovery;
pub mod statements;
#[cfg(test)]
pub mod test_helpers;
pub mod types;

use std::rc::Rc;

use crate::ast::Module;
use crate::lexer::{Lexer, LexError};
use crate::optimizer::validator;

use cursor::Cursor;
use recovery::{Diagnostic, RecoveryMode, Suggestion};

/// Session-wide Configure interface (spec.md §6): selects the recovery
/// strategy and bounds how much work a single parse will do before
/// giving up and reporting `truncated`/`suggestion_cap_hit` instead of
/// growing without bound. Defaults match spec.md §5's stated 5000-each
/// resource caps -- high enough that ordinary programs never see them,
/// low enough that a pathological input can't run the recovery engine
/// unbounded.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ParserConfig {
    pub recovery_mode: RecoveryMode,
    pub max_errors: usize,
    pub max_suggestions: usize,
    pub suggestions_enabled: bool,
    pub profiling_enabled: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            recovery_mode: RecoveryMode::Global,
            max_errors: 5000,
            max_suggestions: 5000,
            suggestions_enabled: true,
            profiling_enabled: false,
        }
    }
}

/// Session-wide Query interface (spec.md §6): what a parse actually did,
/// independent of the resulting tree -- how much work it performed, how
/// much it reported, and whether either resource cap was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ParseStatistics {
    pub tokens_processed: usize,
    pub nodes_created: usize,
    pub error_count: usize,
    pub suggestion_count: usize,
    pub error_cap_hit: bool,
    pub suggestion_cap_hit: bool,
    pub approx_memory_bytes: usize,
    pub global_recoveries: usize,
}

/// Everything a single parse produced: the (possibly partial) module tree,
/// every diagnostic raised along the way, and (via [`parse_with_config`])
/// the session's suggestions and statistics.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ParseOutcome {
    pub module: Module,
    pub diagnostics: Vec<Diagnostic>,
    pub truncated: bool,
    pub suggestions: Vec<Suggestion>,
    pub statistics: ParseStatistics,
}

impl ParseOutcome {
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == recovery::Severity::Error)
    }
}

fn lex_error_outcome(message: String) -> ParseOutcome {
    ParseOutcome {
        module: vec![],
        diagnostics: vec![Diagnostic {
            severity: recovery::Severity::Error,
            message,
            span: crate::lexer::Span::dummy(),
            expected: vec![],
            found: None,
            hint: None,
            suggestions: vec![],
        }],
        truncated: false,
        suggestions: vec![],
        statistics: ParseStatistics {
            tokens_processed: 0,
            nodes_created: 0,
            error_count: 1,
            suggestion_count: 0,
            error_cap_hit: false,
            suggestion_cap_hit: false,
            approx_memory_bytes: 0,
            global_recoveries: 0,
        },
    }
}

/// Parses a whole source file into a [`ParseOutcome`] using the default
/// [`ParserConfig`]. Lexer errors short-circuit into a single diagnostic
/// and an empty module, since a lex failure means there is no reliable
/// token stream to recover over.
pub fn parse(source: &str, file: impl Into<Rc<str>>) -> ParseOutcome {
    parse_with_config(source, file, &ParserConfig::default())
}

/// Parses a whole source file with an explicit [`ParserConfig`],
/// selecting the recovery strategy and resource caps spec.md §6's
/// Configure interface exposes.
pub fn parse_with_config(
    source: &str,
    file: impl Into<Rc<str>>,
    config: &ParserConfig,
) -> ParseOutcome {
    let file: Rc<str> = file.into();
    let tokens = match Lexer::with_file(source, file.clone()).lex_significant() {
        Ok(tokens) => tokens,
        Err(LexError { message }) => return lex_error_outcome(message),
    };
    let mut cursor = Cursor::with_config(tokens, config);
    let (module, diagnostics) = declarations::parse_module(&mut cursor, &file);
    let nodes_created = validator::count_nodes(&module);
    let statistics = cursor.statistics(nodes_created);
    let suggestions = diagnostics.iter().flat_map(|d| d.suggestions.clone()).collect();
    ParseOutcome {
        module,
        diagnostics,
        truncated: cursor.truncated,
        suggestions,
        statistics,
    }
}
