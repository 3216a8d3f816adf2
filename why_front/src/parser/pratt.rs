//! Pratt (precedence-climbing) expression core (spec.md §4.3).
//!
//! Grounded in the precedence-climbing shape used by the retrieval pack's
//! dedicated Pratt references, composed with the grounding repo's
//! `BinaryExpression`/`BinaryOperator` node fields (an `info`-free node
//! carrying `left`, `right`, `operator`, `position`). The grounding repo
//! itself does not do precedence climbing -- it parses flat and rebalances
//! after the fact (`BinaryExpression::balance`) -- so this module departs
//! from the grounding repo's own algorithm while keeping its node shapes,
//! per the decision recorded in DESIGN.md.

use crate::ast::{
    BinaryOperator, CompoundAssignOperator, Expression, Ident, Path, StructLiteralField,
    TemplateStringPart,
};
use crate::lexer::{Lexer, Span, Token, TokenKind};

use super::cursor::Cursor;
use super::precedence::{
    self, compound_assign_operator, infix_binding_power, prefix_binding_power, Associativity,
};
use super::recovery::{patterns, Diagnostic, Severity};

pub struct ExprParser<'a> {
    pub cursor: &'a mut Cursor,
    pub file: std::rc::Rc<str>,
}

type PResult<T> = Result<T, Diagnostic>;

impl<'a> ExprParser<'a> {
    pub fn new(cursor: &'a mut Cursor, file: impl Into<std::rc::Rc<str>>) -> Self {
        ExprParser {
            cursor,
            file: file.into(),
        }
    }

    fn error(&mut self, message: impl Into<String>) -> Diagnostic {
        let mut suggestions = {
            let recent = self.cursor.recent_tokens(super::cursor::RING_BUFFER_SIZE);
            patterns::detect(&recent, self.cursor.peek())
        };
        suggestions.extend(self.cursor.completion_suggestions());
        let suggestions = super::recovery::rank_and_filter(suggestions, super::recovery::DEFAULT_CONFIDENCE_FLOOR);
        let suggestions = self.cursor.record_suggestions(suggestions);
        Diagnostic {
            severity: Severity::Error,
            message: message.into(),
            span: self.cursor.peek().span.clone(),
            expected: vec![],
            found: Some(self.cursor.peek().text.clone()),
            hint: suggestions.first().map(|s| s.message.clone()),
            suggestions,
        }
    }

    fn expect(&mut self, kind: TokenKind) -> PResult<Token> {
        if self.cursor.check(&kind) {
            Ok(self.cursor.advance())
        } else {
            self.cursor.note_expected(kind.tag());
            let found = self.cursor.peek().kind.tag();
            let mut diag = self.error(format!("expected {}, found {found}", kind.tag()));
            diag.expected = vec![kind.tag().to_string()];
            Err(diag)
        }
    }

    pub fn parse_expression(&mut self) -> PResult<Expression> {
        self.parse_assignment(true)
    }

    /// Entry point used when parsing a loop/if/while condition: struct
    /// literals are suppressed so `if x {` parses `x` as the condition and
    /// `{` as the block opener, not `x {}` as a struct literal.
    pub fn parse_condition(&mut self) -> PResult<Expression> {
        self.parse_assignment(false)
    }

    fn parse_assignment(&mut self, allow_struct_literal: bool) -> PResult<Expression> {
        let left = self.parse_ternary(allow_struct_literal)?;
        if self.cursor.check(&TokenKind::Assign) {
            self.cursor.advance();
            let value = self.parse_assignment(allow_struct_literal)?;
            let span = left.span().merge(value.span());
            return Ok(Expression::Assignment {
                target: Box::new(left),
                value: Box::new(value),
                span,
            });
        }
        if let Some(op) = compound_assign_operator(&self.cursor.peek().kind) {
            self.cursor.advance();
            let value = self.parse_assignment(allow_struct_literal)?;
            let span = left.span().merge(value.span());
            return Ok(Expression::CompoundAssignment {
                operator: op,
                target: Box::new(left),
                value: Box::new(value),
                span,
            });
        }
        Ok(left)
    }

    fn parse_ternary(&mut self, allow_struct_literal: bool) -> PResult<Expression> {
        let condition = self.parse_binary(0, allow_struct_literal)?;
        if self.cursor.check(&TokenKind::Question) {
            self.cursor.advance();
            let then_branch = self.parse_assignment(allow_struct_literal)?;
            self.expect(TokenKind::Colon)?;
            let else_branch = self.parse_ternary(allow_struct_literal)?;
            let span = condition.span().merge(else_branch.span());
            return Ok(Expression::Ternary {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
                span,
            });
        }
        Ok(condition)
    }

    fn parse_binary(&mut self, min_bp: u8, allow_struct_literal: bool) -> PResult<Expression> {
        let mut left = self.parse_unary(allow_struct_literal)?;
        let mut chain_guard: Option<(BinaryOperator, u8)> = None;

        loop {
            let kind = self.cursor.peek().kind.clone();
            let Some((op, bp, assoc)) = infix_binding_power(&kind) else {
                break;
            };
            if bp < min_bp {
                break;
            }
            if let Some((guard_op, guard_bp)) = chain_guard {
                if guard_bp == bp && op == guard_op && assoc == Associativity::None {
                    let diag = self.error(format!(
                        "'{kind:?}' is non-associative; parenthesize to chain it"
                    ));
                    self.cursor.report(diag);
                    break;
                }
            }

            self.cursor.advance();
            let next_min = match assoc {
                Associativity::Left => bp + 1,
                Associativity::Right => bp,
                Associativity::None => bp + 1,
            };
            let right = self.parse_binary(next_min, allow_struct_literal)?;
            let span = left.span().merge(right.span());
            left = Expression::Binary {
                operator: op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
            chain_guard = if assoc == Associativity::None {
                Some((op, bp))
            } else {
                None
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self, allow_struct_literal: bool) -> PResult<Expression> {
        let kind = self.cursor.peek().kind.clone();
        if let Some((op, bp)) = prefix_binding_power(&kind) {
            let start = self.cursor.peek().span.clone();
            self.cursor.advance();
            let operand = self.parse_binary(bp, allow_struct_literal)?;
            let span = start.merge(operand.span());
            return Ok(Expression::Unary {
                operator: op,
                operand: Box::new(operand),
                span,
            });
        }
        self.parse_postfix(allow_struct_literal)
    }

    fn parse_postfix(&mut self, allow_struct_literal: bool) -> PResult<Expression> {
        let mut expr = self.parse_primary(allow_struct_literal)?;
        loop {
            match &self.cursor.peek().kind {
                TokenKind::LParen => {
                    self.cursor.advance();
                    let args = self.parse_comma_separated(TokenKind::RParen, allow_struct_literal)?;
                    let end = self.expect(TokenKind::RParen)?;
                    let span = expr.span().merge(&end.span);
                    expr = Expression::Call {
                        callee: Box::new(expr),
                        args,
                        span,
                    };
                }
                TokenKind::LBracket => {
                    self.cursor.advance();
                    let index = self.parse_expression()?;
                    let end = self.expect(TokenKind::RBracket)?;
                    let span = expr.span().merge(&end.span);
                    expr = Expression::Index {
                        target: Box::new(expr),
                        index: Box::new(index),
                        span,
                    };
                }
                TokenKind::Dot => {
                    self.cursor.advance();
                    let name = self.expect_ident()?;
                    let span = expr.span().merge(&name.span);
                    expr = Expression::Member {
                        target: Box::new(expr),
                        member: name,
                        span,
                    };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_comma_separated(
        &mut self,
        terminator: TokenKind,
        allow_struct_literal: bool,
    ) -> PResult<Vec<Expression>> {
        let mut out = vec![];
        if self.cursor.check(&terminator) {
            return Ok(out);
        }
        loop {
            out.push(self.parse_assignment(allow_struct_literal)?);
            if self.cursor.check(&TokenKind::Comma) {
                self.cursor.advance();
                if self.cursor.check(&terminator) {
                    break;
                }
                continue;
            }
            break;
        }
        Ok(out)
    }

    fn expect_ident(&mut self) -> PResult<Ident> {
        let tok = self.cursor.peek().clone();
        if let TokenKind::Ident(name) = &tok.kind {
            self.cursor.advance();
            Ok(Ident::new(name.clone(), tok.span))
        } else {
            self.cursor.note_expected("identifier");
            let mut diag = self.error(format!("expected identifier, found {}", tok.kind.tag()));
            diag.expected = vec!["identifier".to_string()];
            Err(diag)
        }
    }

    fn parse_path(&mut self, first: Ident) -> PResult<Path> {
        let mut segments = vec![first];
        while self.cursor.check(&TokenKind::ColonColon) {
            self.cursor.advance();
            segments.push(self.expect_ident()?);
        }
        let span = segments.first().unwrap().span.merge(&segments.last().unwrap().span);
        Ok(Path { segments, span })
    }

    fn parse_primary(&mut self, allow_struct_literal: bool) -> PResult<Expression> {
        let tok = self.cursor.peek().clone();
        match tok.kind.clone() {
            TokenKind::Integer(value) => {
                self.cursor.advance();
                Ok(Expression::Integer { value, span: tok.span })
            }
            TokenKind::Float(value) => {
                self.cursor.advance();
                Ok(Expression::Float { value, span: tok.span })
            }
            TokenKind::Str(value) => {
                self.cursor.advance();
                Ok(Expression::Str { value, span: tok.span })
            }
            TokenKind::RawStr(value) => {
                self.cursor.advance();
                Ok(Expression::Str { value, span: tok.span })
            }
            TokenKind::Char(value) => {
                self.cursor.advance();
                Ok(Expression::Char { value, span: tok.span })
            }
            TokenKind::Bool(value) => {
                self.cursor.advance();
                Ok(Expression::Bool { value, span: tok.span })
            }
            TokenKind::Null => {
                self.cursor.advance();
                Ok(Expression::Null { span: tok.span })
            }
            TokenKind::TemplateStr(raw) => {
                self.cursor.advance();
                self.parse_template_string(&raw, tok.span)
            }
            TokenKind::Ident(name) => {
                self.cursor.advance();
                let ident = Ident::new(name, tok.span.clone());
                if self.cursor.check(&TokenKind::Bang) && matches!(self.cursor.peek_at(1).kind, TokenKind::LParen) {
                    self.cursor.advance();
                    self.cursor.advance();
                    let args = self.parse_comma_separated(TokenKind::RParen, allow_struct_literal)?;
                    let end = self.expect(TokenKind::RParen)?;
                    let span = tok.span.merge(&end.span);
                    return Ok(Expression::MacroInvocation { name: ident, args, span });
                }
                let path = self.parse_path(ident)?;
                if allow_struct_literal && self.cursor.check(&TokenKind::LBrace) {
                    return self.parse_struct_literal(path);
                }
                Ok(Expression::Path { span: path.span.clone(), path })
            }
            TokenKind::Underscore => {
                self.cursor.advance();
                Ok(Expression::Path {
                    path: Path::single(Ident::new("_", tok.span.clone())),
                    span: tok.span,
                })
            }
            TokenKind::LParen => {
                self.cursor.advance();
                let inner = self.parse_expression()?;
                let end = self.expect(TokenKind::RParen)?;
                let span = tok.span.merge(&end.span);
                Ok(Expression::Grouping { inner: Box::new(inner), span })
            }
            TokenKind::LBracket => {
                self.cursor.advance();
                let elements = self.parse_comma_separated(TokenKind::RBracket, true)?;
                let end = self.expect(TokenKind::RBracket)?;
                let span = tok.span.merge(&end.span);
                Ok(Expression::ArrayLiteral { elements, span })
            }
            TokenKind::LBrace => {
                if matches!(self.cursor.peek_at(1).kind, TokenKind::Ident(_))
                    && matches!(self.cursor.peek_at(2).kind, TokenKind::Colon)
                {
                    let ty = super::types::parse_refinement(self.cursor, tok.span)?;
                    let span = ty.span().clone();
                    return Ok(Expression::TypeLiteral { ty: Box::new(ty), span });
                }
                self.parse_block()
            }
            TokenKind::If => self.parse_if(),
            // Keyword-expression positions the grammar does not yet give
            // real semantics to (spec.md §9: "do not guess intent") --
            // degrade to a placeholder identifier carrying the keyword's
            // own spelling rather than failing the parse outright.
            TokenKind::Match
            | TokenKind::While
            | TokenKind::For
            | TokenKind::Async
            | TokenKind::Await
            | TokenKind::Unsafe
            | TokenKind::As
            | TokenKind::Let
            | TokenKind::In
            | TokenKind::Mut
            | TokenKind::Error => {
                self.cursor.advance();
                let name = tok.kind.keyword_spelling().unwrap_or("error").to_string();
                Ok(Expression::Path {
                    path: Path::single(Ident::new(name, tok.span.clone())),
                    span: tok.span,
                })
            }
            // `#[...]` attribute-shaped token run in expression position --
            // consumed whole by bracket-depth balancing and degraded to a
            // single placeholder identifier, same rationale as above.
            TokenKind::Hash => {
                self.cursor.advance();
                let mut end_span = tok.span.clone();
                if self.cursor.check(&TokenKind::LBracket) {
                    let mut depth = 0usize;
                    loop {
                        let kind = self.cursor.peek().kind.clone();
                        let consumed = self.cursor.advance();
                        end_span = consumed.span;
                        if kind == TokenKind::LBracket {
                            depth += 1;
                        } else if kind == TokenKind::RBracket {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        if self.cursor.is_at_end() {
                            break;
                        }
                    }
                }
                let span = tok.span.merge(&end_span);
                Ok(Expression::Path {
                    path: Path::single(Ident::new("attribute", span.clone())),
                    span,
                })
            }
            _ => Err(self.error(format!("unexpected token {:?} in expression position", tok.kind))),
        }
    }

    fn parse_struct_literal(&mut self, path: Path) -> PResult<Expression> {
        let start = self.expect(TokenKind::LBrace)?;
        let mut fields = vec![];
        while !self.cursor.check(&TokenKind::RBrace) && !self.cursor.is_at_end() {
            let name = self.expect_ident()?;
            self.expect(TokenKind::Colon)?;
            let value = self.parse_assignment(true)?;
            let span = name.span.merge(value.span());
            fields.push(StructLiteralField { name, value, span });
            if self.cursor.check(&TokenKind::Comma) {
                self.cursor.advance();
            } else {
                break;
            }
        }
        let end = self.expect(TokenKind::RBrace)?;
        let span = path.span.merge(&start.span).merge(&end.span);
        Ok(Expression::StructLiteral { path, fields, span })
    }

    pub fn parse_block(&mut self) -> PResult<Expression> {
        let start = self.expect(TokenKind::LBrace)?;
        let mut statements = vec![];
        let mut trailing = None;
        while !self.cursor.check(&TokenKind::RBrace) && !self.cursor.is_at_end() {
            match super::statements::parse_statement_or_trailing(self.cursor, &self.file)? {
                super::statements::StatementOrTrailing::Statement(stmt) => statements.push(stmt),
                super::statements::StatementOrTrailing::Trailing(expr) => {
                    trailing = Some(Box::new(expr));
                    break;
                }
            }
        }
        let end = self.expect(TokenKind::RBrace)?;
        let span = start.span.merge(&end.span);
        Ok(Expression::Block { statements, trailing, span })
    }

    fn parse_if(&mut self) -> PResult<Expression> {
        let start = self.expect(TokenKind::If)?;
        let condition = self.parse_condition()?;
        let then_branch = self.parse_block()?;
        let else_branch = if self.cursor.check(&TokenKind::Else) {
            self.cursor.advance();
            if self.cursor.check(&TokenKind::If) {
                Some(Box::new(self.parse_if()?))
            } else {
                Some(Box::new(self.parse_block()?))
            }
        } else {
            None
        };
        let end_span = else_branch
            .as_ref()
            .map(|e| e.span().clone())
            .unwrap_or_else(|| then_branch.span().clone());
        let span = start.span.merge(&end_span);
        Ok(Expression::If {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch,
            span,
        })
    }

    /// Splits a template string's raw text (the lexer keeps `${...}`
    /// fragments unparsed) into literal-text and interpolation parts,
    /// recursively parsing each `${...}` fragment with its own scanner and
    /// cursor sharing this parser's file name for diagnostics.
    fn parse_template_string(&mut self, raw: &str, span: Span) -> PResult<Expression> {
        let mut parts = vec![];
        let mut text = String::new();
        let chars: Vec<char> = raw.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            if chars[i] == '$' && chars.get(i + 1) == Some(&'{') {
                if !text.is_empty() {
                    parts.push(TemplateStringPart::Text(std::mem::take(&mut text)));
                }
                let mut depth = 1;
                let mut j = i + 2;
                let fragment_start = j;
                while j < chars.len() && depth > 0 {
                    match chars[j] {
                        '{' => depth += 1,
                        '}' => depth -= 1,
                        _ => {}
                    }
                    if depth > 0 {
                        j += 1;
                    }
                }
                let fragment: String = chars[fragment_start..j].iter().collect();
                let expr = parse_source_fragment(&fragment, self.file.clone())?;
                parts.push(TemplateStringPart::Interpolation(Box::new(expr)));
                i = j + 1;
            } else {
                text.push(chars[i]);
                i += 1;
            }
        }
        if !text.is_empty() {
            parts.push(TemplateStringPart::Text(text));
        }
        Ok(Expression::TemplateString { parts, span })
    }
}

/// Lexes and parses a standalone expression fragment (used for template
/// string interpolations). Errors are reported against the enclosing
/// file name since the fragment has no file of its own.
pub fn parse_source_fragment(source: &str, file: std::rc::Rc<str>) -> PResult<Expression> {
    let tokens = Lexer::with_file(source, file.clone())
        .lex_significant()
        .map_err(|e| Diagnostic {
            severity: Severity::Error,
            message: e.message,
            span: Span::dummy(),
            expected: vec![],
            found: None,
            hint: None,
            suggestions: vec![],
        })?;
    let mut cursor = Cursor::new(tokens);
    let mut parser = ExprParser::new(&mut cursor, file);
    parser.parse_expression()
}

#[allow(dead_code)]
pub fn precedence_of(kind: &TokenKind) -> Option<u8> {
    infix_binding_power(kind).map(|(_, bp, _)| bp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinaryOperator;

    fn parse(src: &str) -> Expression {
        parse_source_fragment(src, "<test>".into()).unwrap()
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let expr = parse("1 + 2 * 3");
        match expr {
            Expression::Binary { operator: BinaryOperator::Add, right, .. } => {
                assert!(matches!(*right, Expression::Binary { operator: BinaryOperator::Multiply, .. }));
            }
            other => panic!("expected Add at top, got {other:?}"),
        }
    }

    #[test]
    fn power_is_right_associative() {
        let expr = parse("2 ** 3 ** 2");
        match expr {
            Expression::Binary { operator: BinaryOperator::Power, right, .. } => {
                assert!(matches!(*right, Expression::Binary { operator: BinaryOperator::Power, .. }));
            }
            other => panic!("expected Power at top, got {other:?}"),
        }
    }

    #[test]
    fn addition_is_left_associative() {
        let expr = parse("1 - 2 - 3");
        match expr {
            Expression::Binary { operator: BinaryOperator::Subtract, left, .. } => {
                assert!(matches!(*left, Expression::Binary { operator: BinaryOperator::Subtract, .. }));
            }
            other => panic!("expected Subtract at top, got {other:?}"),
        }
    }

    #[test]
    fn ternary_is_right_associative_and_lowest() {
        let expr = parse("a ? b : c ? d : e");
        assert!(matches!(expr, Expression::Ternary { .. }));
    }

    #[test]
    fn call_and_member_chain() {
        let expr = parse("a.b(1, 2).c");
        assert!(matches!(expr, Expression::Member { .. }));
    }

    #[test]
    fn keyword_expression_positions_degrade_to_placeholder_identifiers() {
        for src in ["match", "while", "for", "async", "await", "unsafe", "as", "let", "in", "mut", "error"] {
            match parse(src) {
                Expression::Path { path, .. } => assert_eq!(path.last().name, src),
                other => panic!("expected placeholder path for {src:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn attribute_shaped_token_degrades_to_a_placeholder_identifier() {
        let expr = parse("#[inline]");
        assert!(matches!(expr, Expression::Path { .. }));
    }

    #[test]
    fn refinement_type_literal_is_reachable_from_expression_position() {
        let expr = parse("{ x: i32 | x > 0 }");
        assert!(matches!(expr, Expression::TypeLiteral { .. }));
    }

    #[test]
    fn brace_without_a_colon_after_the_leading_ident_is_still_a_block() {
        let expr = parse("{ 1 }");
        assert!(matches!(expr, Expression::Block { .. }));
    }
}
