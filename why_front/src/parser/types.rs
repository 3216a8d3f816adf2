//! Type parsing: dispatch over the type sum's concrete syntax (spec.md
//! §4.2's "type parsing dispatch"), grounded in the grounding repo's
//! `TypeName` parse shape (`&T`, `(T1, T2)`, `(T1, T2) -> R`, `[T]`)
//! generalized with pointer, generic-application, refinement and
//! dependent forms.

use crate::ast::{Ident, Path, Type};
use crate::lexer::TokenKind;

use super::cursor::Cursor;
use super::recovery::{patterns, Diagnostic, Severity};

type PResult<T> = Result<T, Diagnostic>;

pub fn parse_type(cursor: &mut Cursor) -> PResult<Type> {
    let tok = cursor.peek().clone();
    match &tok.kind {
        TokenKind::Amp => {
            cursor.advance();
            let inner = parse_type(cursor)?;
            let span = tok.span.merge(inner.span());
            Ok(Type::Reference { inner: Box::new(inner), span })
        }
        TokenKind::Star => {
            cursor.advance();
            let inner = parse_type(cursor)?;
            let span = tok.span.merge(inner.span());
            Ok(Type::Pointer { inner: Box::new(inner), span })
        }
        TokenKind::LBracket => {
            cursor.advance();
            let element = parse_type(cursor)?;
            let mut size = None;
            if cursor.check(&TokenKind::Semicolon) {
                cursor.advance();
                let file = tok.span.start.file.clone();
                let mut expr_parser = super::pratt::ExprParser::new(cursor, file);
                size = Some(Box::new(expr_parser.parse_expression()?));
            }
            let end = expect(cursor, TokenKind::RBracket)?;
            let span = tok.span.merge(&end.span);
            Ok(Type::Array { element: Box::new(element), size, span })
        }
        TokenKind::LParen => parse_tuple_or_function(cursor, tok.span),
        TokenKind::LBrace => parse_refinement(cursor, tok.span),
        TokenKind::Func => parse_func_type(cursor, tok.span, false),
        TokenKind::Async => parse_func_type(cursor, tok.span, true),
        TokenKind::Ident(_) => parse_basic_or_dependent(cursor),
        _ => Err(error(cursor, format!("expected type, found {}", tok.kind.tag()))),
    }
}

fn expect(cursor: &mut Cursor, kind: TokenKind) -> PResult<crate::lexer::Token> {
    if cursor.check(&kind) {
        Ok(cursor.advance())
    } else {
        cursor.note_expected(kind.tag());
        let mut diag = error(cursor, format!("expected {}, found {}", kind.tag(), cursor.peek().kind.tag()));
        diag.expected = vec![kind.tag().to_string()];
        Err(diag)
    }
}

fn error(cursor: &mut Cursor, message: impl Into<String>) -> Diagnostic {
    let recent = cursor.recent_tokens(super::cursor::RING_BUFFER_SIZE);
    let mut suggestions = patterns::detect(&recent, cursor.peek());
    suggestions.extend(cursor.completion_suggestions());
    let suggestions = super::recovery::rank_and_filter(suggestions, super::recovery::DEFAULT_CONFIDENCE_FLOOR);
    let suggestions = cursor.record_suggestions(suggestions);
    Diagnostic {
        severity: Severity::Error,
        message: message.into(),
        span: cursor.peek().span.clone(),
        expected: vec![],
        found: Some(cursor.peek().text.clone()),
        hint: suggestions.first().map(|s| s.message.clone()),
        suggestions,
    }
}

fn expect_ident(cursor: &mut Cursor) -> PResult<Ident> {
    let tok = cursor.peek().clone();
    if let TokenKind::Ident(name) = &tok.kind {
        cursor.advance();
        Ok(Ident::new(name.clone(), tok.span))
    } else {
        cursor.note_expected("identifier");
        let mut diag = error(cursor, format!("expected identifier, found {}", tok.kind.tag()));
        diag.expected = vec!["identifier".to_string()];
        Err(diag)
    }
}

fn parse_tuple_or_function(cursor: &mut Cursor, start: crate::lexer::Span) -> PResult<Type> {
    cursor.advance();
    let mut elements = vec![];
    if !cursor.check(&TokenKind::RParen) {
        loop {
            elements.push(parse_type(cursor)?);
            if cursor.check(&TokenKind::Comma) {
                cursor.advance();
                if cursor.check(&TokenKind::RParen) {
                    break;
                }
                continue;
            }
            break;
        }
    }
    let end = expect(cursor, TokenKind::RParen)?;
    if cursor.check(&TokenKind::Arrow) {
        cursor.advance();
        let return_type = parse_type(cursor)?;
        let span = start.merge(return_type.span());
        return Ok(Type::Function {
            params: elements,
            return_type: Some(Box::new(return_type)),
            is_async: false,
            span,
        });
    }
    let span = start.merge(&end.span);
    Ok(Type::Tuple { elements, span })
}

/// `[async] func(params) [-> R]` -- the direct function-type spelling,
/// as opposed to the parenthesized tuple-or-function form above.
fn parse_func_type(cursor: &mut Cursor, start: crate::lexer::Span, is_async: bool) -> PResult<Type> {
    if is_async {
        cursor.advance();
    }
    expect(cursor, TokenKind::Func)?;
    expect(cursor, TokenKind::LParen)?;
    let mut params = vec![];
    if !cursor.check(&TokenKind::RParen) {
        loop {
            params.push(parse_type(cursor)?);
            if cursor.check(&TokenKind::Comma) {
                cursor.advance();
                if cursor.check(&TokenKind::RParen) {
                    break;
                }
                continue;
            }
            break;
        }
    }
    let close = expect(cursor, TokenKind::RParen)?;
    let mut end_span = close.span;
    let mut return_type = None;
    if cursor.check(&TokenKind::Arrow) {
        cursor.advance();
        let r = parse_type(cursor)?;
        end_span = r.span().clone();
        return_type = Some(Box::new(r));
    }
    let span = start.merge(&end_span);
    Ok(Type::Function { params, return_type, is_async, span })
}

/// `{ x: Base | predicate }` -- a refinement type literal. The predicate
/// is a full expression, so this reaches into [`super::pratt`] rather than
/// staying purely within the type grammar. Visible to the Pratt core too,
/// since `{ ident :` also opens a refinement-type expression in value
/// position.
pub(crate) fn parse_refinement(cursor: &mut Cursor, start: crate::lexer::Span) -> PResult<Type> {
    cursor.advance();
    let binder = expect_ident(cursor)?;
    expect(cursor, TokenKind::Colon)?;
    let base = parse_type(cursor)?;
    expect(cursor, TokenKind::Pipe)?;
    let file = binder.span.start.file.clone();
    let mut expr_parser = super::pratt::ExprParser::new(cursor, file);
    let predicate = expr_parser.parse_expression()?;
    let end = expect(cursor, TokenKind::RBrace)?;
    let span = start.merge(&end.span);
    Ok(Type::Refinement {
        base: Box::new(base),
        binder: Box::new(binder),
        predicate: Box::new(predicate),
        span,
    })
}

fn parse_basic_or_dependent(cursor: &mut Cursor) -> PResult<Type> {
    let first = expect_ident(cursor)?;
    let mut segments = vec![first];
    while cursor.check(&TokenKind::ColonColon) {
        cursor.advance();
        segments.push(expect_ident(cursor)?);
    }
    let path_span = segments.first().unwrap().span.merge(&segments.last().unwrap().span);
    let path = Path { segments, span: path_span.clone() };

    let mut args = vec![];
    let mut end_span = path_span.clone();
    if cursor.check(&TokenKind::Lt) {
        cursor.advance();
        if !cursor.check(&TokenKind::Gt) {
            loop {
                args.push(parse_type(cursor)?);
                if cursor.check(&TokenKind::Comma) {
                    cursor.advance();
                    continue;
                }
                break;
            }
        }
        let end = expect(cursor, TokenKind::Gt)?;
        end_span = end.span;
    }

    let base = Type::Basic { path, args, span: path_span.merge(&end_span) };

    if cursor.check(&TokenKind::Where) {
        cursor.advance();
        let file = base.span().start.file.clone();
        let mut expr_parser = super::pratt::ExprParser::new(cursor, file);
        let predicate = expr_parser.parse_expression()?;
        let span = base.span().merge(predicate.span());
        return Ok(Type::Dependent {
            base: Box::new(base),
            predicate: Box::new(predicate),
            span,
        });
    }

    Ok(base)
}

#[cfg(test)]
mod tests {
    use crate::ast::Type;
    use crate::parser::test_helpers::parse_type_name;

    #[test]
    fn parses_simple_type() {
        assert!(matches!(parse_type_name("i32"), Type::Basic { .. }));
    }

    #[test]
    fn parses_reference_type() {
        assert!(matches!(parse_type_name("&str"), Type::Reference { .. }));
    }

    #[test]
    fn parses_array_type() {
        assert!(matches!(parse_type_name("[i32]"), Type::Array { .. }));
    }

    #[test]
    fn parses_tuple_type() {
        match parse_type_name("(i32, i32)") {
            Type::Tuple { elements, .. } => assert_eq!(elements.len(), 2),
            other => panic!("expected tuple, got {other:?}"),
        }
    }

    #[test]
    fn parses_function_type() {
        match parse_type_name("(i32, i32) -> i32") {
            Type::Function { params, .. } => assert_eq!(params.len(), 2),
            other => panic!("expected function type, got {other:?}"),
        }
    }

    #[test]
    fn parses_generic_application() {
        match parse_type_name("Vec<i32>") {
            Type::Basic { args, .. } => assert_eq!(args.len(), 1),
            other => panic!("expected basic type with generic args, got {other:?}"),
        }
    }

    #[test]
    fn parses_sized_array_type() {
        match parse_type_name("[i32; 4]") {
            Type::Array { size: Some(_), .. } => {}
            other => panic!("expected sized array, got {other:?}"),
        }
    }

    #[test]
    fn parses_direct_func_type() {
        match parse_type_name("func(i32) -> i32") {
            Type::Function { params, return_type: Some(_), is_async: false, .. } => assert_eq!(params.len(), 1),
            other => panic!("expected func type, got {other:?}"),
        }
    }

    #[test]
    fn parses_async_func_type_with_no_return() {
        match parse_type_name("async func()") {
            Type::Function { is_async: true, return_type: None, .. } => {}
            other => panic!("expected async func type, got {other:?}"),
        }
    }

    #[test]
    fn parses_dependent_where_type() {
        match parse_type_name("i32 where x > 0") {
            Type::Dependent { .. } => {}
            other => panic!("expected dependent where-type, got {other:?}"),
        }
    }
}
