//! Fixed pattern matcher over the cursor's recent-token ring buffer
//! (spec.md §4.4): a small table of known malformed-phrase shapes, each
//! producing a targeted [`Suggestion`] instead of falling through to a
//! generic "unexpected token" message.

use crate::lexer::{Token, TokenKind};

use super::{fuzzy, Suggestion, SuggestionCategory, SuggestionKind};

/// Looks at the tokens consumed so far (`recent`, oldest first) and the
/// token the parser is currently stuck on (`current`) and returns any
/// suggestions a known pattern recognizes. Order in the returned vector is
/// not significant -- [`super::rank_and_filter`] re-sorts by confidence.
pub fn detect(recent: &[&Token], current: &Token) -> Vec<Suggestion> {
    let mut out = vec![];

    if let Some(s) = missing_semicolon(recent, current) {
        out.push(s);
    }
    if let Some(s) = single_equals_in_condition(recent, current) {
        out.push(s);
    }
    if let Some(s) = unclosed_brace_at_eof(recent, current) {
        out.push(s);
    }
    if let Some(s) = unclosed_paren_before_semicolon(recent, current) {
        out.push(s);
    }
    if let Some(s) = two_consecutive_identifiers(recent) {
        out.push(s);
    }
    if let TokenKind::Ident(name) = &current.kind {
        if let Some((keyword, distance)) = fuzzy::closest_keyword(name) {
            let confidence = fuzzy::confidence_for_distance(name, distance);
            if confidence >= fuzzy::FUZZY_CONFIDENCE_FLOOR {
                out.push(Suggestion {
                    kind: SuggestionKind::ErrorFix,
                    message: format!("unknown identifier '{name}', did you mean keyword '{keyword}'?"),
                    position: current.span.clone(),
                    replacement: Some(keyword.to_string()),
                    confidence,
                    category: SuggestionCategory::Syntax,
                    fix_template: Some(format!("replace '{name}' with '{keyword}'")),
                });
            }
        }
    }

    out
}

/// `}` (or an expression-shaped token) immediately followed, on a new
/// source line, by a token that starts a new statement/declaration with no
/// intervening `;` -- the most common phrase-mode repair.
fn missing_semicolon(recent: &[&Token], current: &Token) -> Option<Suggestion> {
    let last = *recent.last()?;
    let ends_expression = matches!(
        last.kind,
        TokenKind::RParen
            | TokenKind::RBracket
            | TokenKind::Ident(_)
            | TokenKind::Integer(_)
            | TokenKind::Float(_)
            | TokenKind::Str(_)
    );
    if !ends_expression {
        return None;
    }
    if !(current.starts_statement() || matches!(current.kind, TokenKind::RBrace)) {
        return None;
    }
    if last.span.end.line == current.span.start.line {
        return None;
    }
    Some(Suggestion {
        kind: SuggestionKind::ErrorFix,
        message: "expected ';' after statement".to_string(),
        position: last.span.clone(),
        replacement: Some(";".to_string()),
        confidence: 0.75,
        category: SuggestionCategory::Syntax,
        fix_template: Some("insert ';'".to_string()),
    })
}

/// `if x = y` / `while x = y`: a bare `=` where `==` was almost certainly
/// intended, recognized by the ring buffer holding `if`/`while` followed
/// eventually by a single `=` before any `{`.
fn single_equals_in_condition(recent: &[&Token], current: &Token) -> Option<Suggestion> {
    if !matches!(current.kind, TokenKind::LBrace) {
        return None;
    }
    let opens_condition = recent
        .iter()
        .any(|t| matches!(t.kind, TokenKind::If | TokenKind::While));
    if !opens_condition {
        return None;
    }
    let assign = recent
        .iter()
        .rev()
        .take_while(|t| !matches!(t.kind, TokenKind::If | TokenKind::While))
        .find(|t| matches!(t.kind, TokenKind::Assign))?;
    Some(Suggestion {
        kind: SuggestionKind::ErrorFix,
        message: "'=' is assignment; did you mean '==' for comparison?".to_string(),
        position: assign.span.clone(),
        replacement: Some("==".to_string()),
        confidence: 0.6,
        category: SuggestionCategory::Syntax,
        fix_template: Some("replace '=' with '=='".to_string()),
    })
}

/// `{` ... EOF with no matching `}` seen yet -- an unclosed brace that ran
/// off the end of the file rather than hitting a mismatched token.
fn unclosed_brace_at_eof(recent: &[&Token], current: &Token) -> Option<Suggestion> {
    if !matches!(current.kind, TokenKind::Eof) {
        return None;
    }
    let opens = recent.iter().filter(|t| matches!(t.kind, TokenKind::LBrace)).count();
    let closes = recent.iter().filter(|t| matches!(t.kind, TokenKind::RBrace)).count();
    if opens <= closes {
        return None;
    }
    let unclosed = recent.iter().rev().find(|t| matches!(t.kind, TokenKind::LBrace))?;
    Some(Suggestion {
        kind: SuggestionKind::ErrorFix,
        message: "expected '}' before end of file".to_string(),
        position: unclosed.span.clone(),
        replacement: Some("}".to_string()),
        confidence: 0.7,
        category: SuggestionCategory::Syntax,
        fix_template: Some("insert '}'".to_string()),
    })
}

/// `(` opened earlier in the ring buffer with no matching `)` yet, and the
/// parser is now stuck at a `;` -- almost always a forgotten close paren
/// before the statement terminator.
fn unclosed_paren_before_semicolon(recent: &[&Token], current: &Token) -> Option<Suggestion> {
    if !matches!(current.kind, TokenKind::Semicolon) {
        return None;
    }
    let opens = recent.iter().filter(|t| matches!(t.kind, TokenKind::LParen)).count();
    let closes = recent.iter().filter(|t| matches!(t.kind, TokenKind::RParen)).count();
    if opens <= closes {
        return None;
    }
    Some(Suggestion {
        kind: SuggestionKind::ErrorFix,
        message: "expected ')' before ';'".to_string(),
        position: current.span.clone(),
        replacement: Some(")".to_string()),
        confidence: 0.65,
        category: SuggestionCategory::Syntax,
        fix_template: Some("insert ')'".to_string()),
    })
}

/// Two identifiers consumed back to back on the same source line -- most
/// often a missing `,` in a parameter list, array literal, or struct
/// literal.
fn two_consecutive_identifiers(recent: &[&Token]) -> Option<Suggestion> {
    let n = recent.len();
    if n < 2 {
        return None;
    }
    let (a, b) = (recent[n - 2], recent[n - 1]);
    if !matches!(a.kind, TokenKind::Ident(_)) || !matches!(b.kind, TokenKind::Ident(_)) {
        return None;
    }
    if a.span.end.line != b.span.start.line {
        return None;
    }
    Some(Suggestion {
        kind: SuggestionKind::ErrorFix,
        message: format!("expected ',' between '{}' and '{}'", a.text, b.text),
        position: a.span.clone(),
        replacement: Some(",".to_string()),
        confidence: 0.55,
        category: SuggestionCategory::Syntax,
        fix_template: Some("insert ','".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn tokens_for(source: &str) -> Vec<Token> {
        Lexer::with_file(source, "<t>").lex_significant().unwrap()
    }

    #[test]
    fn detects_unclosed_brace_at_eof() {
        let tokens = tokens_for("fn f() {");
        let (current, recent) = tokens.split_last().unwrap();
        let recent: Vec<&Token> = recent.iter().collect();
        let out = detect(&recent, current);
        assert!(out.iter().any(|s| s.message.contains("'}'")));
    }

    #[test]
    fn detects_unclosed_paren_before_semicolon() {
        let tokens = tokens_for("f(1, 2;");
        let semicolon_idx = tokens.iter().position(|t| matches!(t.kind, TokenKind::Semicolon)).unwrap();
        let recent: Vec<&Token> = tokens[..semicolon_idx].iter().collect();
        let out = detect(&recent, &tokens[semicolon_idx]);
        assert!(out.iter().any(|s| s.message.contains("')'")));
    }

    #[test]
    fn detects_two_consecutive_identifiers() {
        let tokens = tokens_for("a b");
        let recent: Vec<&Token> = tokens[..2].iter().collect();
        let out = detect(&recent, &tokens[2]);
        assert!(out.iter().any(|s| s.message.contains("','")));
    }
}
