//! Top-level declaration parsing (spec.md §4.2): the module-scope loop,
//! generalized off the grounding repo's `TopLevelStatement::parse`
//! dispatch-by-peek-token idiom across every declaration keyword spec.md's
//! grammar surface lists, with order-insensitive `pub`/`async` modifiers
//! and panic-mode resynchronization on failure (the loop itself never
//! consumes the synchronization token, so the caller can report and
//! retry cleanly).

use crate::ast::{
    Declaration, EffectAnnotation, EnumDeclaration, EnumVariant, EnumVariantKind, ExportDeclaration,
    FunctionDeclaration, GenericParam, Ident, ImplDeclaration, ImportDeclaration, MacroDefinition,
    Module, NewtypeDeclaration, Parameter, Path, StructDeclaration, StructField, TraitDeclaration,
    TraitMethodSignature, TypeAliasDeclaration, VariableDeclaration, WherePredicate,
};
use crate::lexer::TokenKind;

use super::cursor::Cursor;
use super::pratt::ExprParser;
use super::recovery::{patterns, Diagnostic, Severity};
use super::statements::parse_block_statements;
use super::types::parse_type;

type PResult<T> = Result<T, Diagnostic>;

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

/// The statement terminator `;` is optional at end of line (spec.md
/// §4.2): consume it if present, otherwise require a newline to have
/// preceded the current token and record the low-confidence style
/// suggestion instead of erroring.
fn expect_terminator(cursor: &mut Cursor, last_span: crate::lexer::Span) -> PResult<crate::lexer::Span> {
    if cursor.check(&TokenKind::Semicolon) {
        return Ok(cursor.advance().span);
    }
    if cursor.newline_before_current() {
        cursor.note_omitted_semicolon(last_span.clone());
        return Ok(last_span);
    }
    cursor.note_expected(TokenKind::Semicolon.tag());
    let mut diag = error(cursor, format!("expected {}, found {}", TokenKind::Semicolon.tag(), cursor.peek().kind.tag()));
    diag.expected = vec![TokenKind::Semicolon.tag().to_string()];
    Err(diag)
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

/// Parses a whole file: a sequence of top-level declarations. Any
/// declaration that fails to parse is recovered from according to the
/// cursor's selected [`super::recovery::RecoveryMode`] (spec.md §4.4):
/// Panic mode always resynchronizes to the next declaration-starting
/// keyword; Phrase mode first tries a single localized in-place repair
/// and only resynchronizes if that doesn't apply; Global mode does the
/// same phrase-level attempt but always falls back to panic-mode
/// resynchronization as a safety net even when the repair "succeeded",
/// and records the fallback via `record_global_recovery`.
pub fn parse_module(cursor: &mut Cursor, file: &std::rc::Rc<str>) -> (Module, Vec<Diagnostic>) {
    let mut module = vec![];
    while !cursor.is_at_end() {
        match parse_declaration(cursor, file) {
            Ok(decl) => module.push(decl),
            Err(diag) => {
                cursor.report(diag);
                recover(cursor);
                if cursor.check(&TokenKind::Eof) {
                    break;
                }
            }
        }
    }
    (module, std::mem::take(&mut cursor.diagnostics))
}

fn recover(cursor: &mut Cursor) {
    use super::recovery::RecoveryMode;
    match cursor.recovery_mode {
        RecoveryMode::Panic => cursor.synchronize_to_declaration(),
        RecoveryMode::Phrase => {
            if !super::recovery::phrase_repair(cursor) {
                cursor.synchronize_to_declaration();
            }
        }
        RecoveryMode::Global => {
            super::recovery::phrase_repair(cursor);
            cursor.record_global_recovery();
            cursor.synchronize_to_declaration();
        }
    }
}

fn parse_declaration(cursor: &mut Cursor, file: &std::rc::Rc<str>) -> PResult<Declaration> {
    let mut is_public = false;
    let mut is_async = false;
    loop {
        match cursor.peek().kind {
            TokenKind::Pub => {
                is_public = true;
                cursor.advance();
            }
            TokenKind::Async => {
                is_async = true;
                cursor.advance();
            }
            _ => break,
        }
    }

    match &cursor.peek().kind {
        TokenKind::Func | TokenKind::Fn => {
            parse_function(cursor, file, is_public, is_async).map(Declaration::Function)
        }
        TokenKind::Let | TokenKind::Var | TokenKind::Const => {
            parse_variable(cursor, file, is_public).map(Declaration::Variable)
        }
        TokenKind::Struct => parse_struct(cursor, is_public).map(Declaration::Struct),
        TokenKind::Enum => parse_enum(cursor, is_public).map(Declaration::Enum),
        TokenKind::Trait => parse_trait(cursor, file, is_public).map(Declaration::Trait),
        TokenKind::Impl => parse_impl(cursor, file).map(Declaration::Impl),
        TokenKind::Type => parse_type_alias(cursor, is_public).map(Declaration::TypeAlias),
        TokenKind::Newtype => parse_newtype(cursor, is_public).map(Declaration::Newtype),
        TokenKind::Import => parse_import(cursor).map(Declaration::Import),
        TokenKind::Export => parse_export(cursor).map(Declaration::Export),
        TokenKind::Macro => parse_macro_definition(cursor, file).map(Declaration::Macro),
        other => Err(error(cursor, format!("expected a declaration, found {other:?}"))),
    }
}

fn parse_generics(cursor: &mut Cursor) -> PResult<Vec<GenericParam>> {
    let mut generics = vec![];
    if !cursor.check(&TokenKind::Lt) {
        return Ok(generics);
    }
    cursor.advance();
    while !cursor.check(&TokenKind::Gt) {
        let start_span = cursor.peek().span.clone();
        let (kind, name) = if cursor.check(&TokenKind::Const) {
            cursor.advance();
            let name = expect_ident(cursor)?;
            expect(cursor, TokenKind::Colon)?;
            let type_annotation = parse_type(cursor)?;
            (crate::ast::GenericParamKind::Const { type_annotation }, name)
        } else if let TokenKind::Lifetime(text) = cursor.peek().kind.clone() {
            let tok = cursor.advance();
            (crate::ast::GenericParamKind::Lifetime, Ident::new(text, tok.span))
        } else {
            (crate::ast::GenericParamKind::Type, expect_ident(cursor)?)
        };
        let mut bounds = vec![];
        if cursor.check(&TokenKind::Colon) {
            cursor.advance();
            loop {
                bounds.push(parse_bound_path(cursor)?);
                if cursor.check(&TokenKind::Plus) {
                    cursor.advance();
                    continue;
                }
                break;
            }
        }
        let default = if cursor.check(&TokenKind::Assign) {
            cursor.advance();
            Some(match &kind {
                crate::ast::GenericParamKind::Const { .. } => {
                    let file = start_span.start.file.clone();
                    let mut expr_parser = ExprParser::new(cursor, file);
                    crate::ast::GenericParamDefault::Const(expr_parser.parse_expression()?)
                }
                _ => crate::ast::GenericParamDefault::Type(parse_type(cursor)?),
            })
        } else {
            None
        };
        let end_span = default
            .as_ref()
            .map(|d| match d {
                crate::ast::GenericParamDefault::Type(t) => t.span().clone(),
                crate::ast::GenericParamDefault::Const(e) => e.span().clone(),
            })
            .or_else(|| bounds.last().map(|b: &Path| b.span.clone()))
            .unwrap_or_else(|| name.span.clone());
        let span = start_span.merge(&end_span);
        generics.push(GenericParam { kind, name, bounds, default, span });
        if cursor.check(&TokenKind::Comma) {
            cursor.advance();
            continue;
        }
        break;
    }
    expect(cursor, TokenKind::Gt)?;
    Ok(generics)
}

fn parse_bound_path(cursor: &mut Cursor) -> PResult<Path> {
    let first = expect_ident(cursor)?;
    let mut segments = vec![first];
    while cursor.check(&TokenKind::ColonColon) {
        cursor.advance();
        segments.push(expect_ident(cursor)?);
    }
    let span = segments.first().unwrap().span.merge(&segments.last().unwrap().span);
    Ok(Path { segments, span })
}

fn parse_where_clause(cursor: &mut Cursor) -> PResult<Vec<WherePredicate>> {
    let mut predicates = vec![];
    if !cursor.check(&TokenKind::Where) {
        return Ok(predicates);
    }
    cursor.advance();
    loop {
        let subject = parse_type(cursor)?;
        expect(cursor, TokenKind::Colon)?;
        let mut bounds = vec![parse_bound_path(cursor)?];
        while cursor.check(&TokenKind::Plus) {
            cursor.advance();
            bounds.push(parse_bound_path(cursor)?);
        }
        let span = subject.span().merge(&bounds.last().unwrap().span);
        predicates.push(WherePredicate { subject, bounds, span });
        if cursor.check(&TokenKind::Comma) {
            cursor.advance();
            continue;
        }
        break;
    }
    Ok(predicates)
}

fn parse_params(cursor: &mut Cursor) -> PResult<Vec<Parameter>> {
    expect(cursor, TokenKind::LParen)?;
    let mut params = vec![];
    while !cursor.check(&TokenKind::RParen) {
        let start = cursor.peek().span.clone();
        let is_mut = if cursor.check(&TokenKind::Mut) {
            cursor.advance();
            true
        } else {
            false
        };
        let name = expect_ident(cursor)?;
        expect(cursor, TokenKind::Colon)?;
        let type_annotation = parse_type(cursor)?;
        let span = start.merge(type_annotation.span());
        params.push(Parameter { name, is_mut, type_annotation, span });
        if cursor.check(&TokenKind::Comma) {
            cursor.advance();
            continue;
        }
        break;
    }
    expect(cursor, TokenKind::RParen)?;
    Ok(params)
}

fn parse_effects(cursor: &mut Cursor) -> PResult<Option<EffectAnnotation>> {
    if !cursor.check(&TokenKind::Effects) {
        return Ok(None);
    }
    let start = cursor.advance();
    expect(cursor, TokenKind::LBracket)?;
    let mut effects = vec![];
    while !cursor.check(&TokenKind::RBracket) {
        effects.push(expect_ident(cursor)?);
        if cursor.check(&TokenKind::Comma) {
            cursor.advance();
            continue;
        }
        break;
    }
    let end = expect(cursor, TokenKind::RBracket)?;
    let span = start.span.merge(&end.span);
    Ok(Some(EffectAnnotation { effects, span }))
}

fn parse_function(
    cursor: &mut Cursor,
    file: &std::rc::Rc<str>,
    is_public: bool,
    is_async: bool,
) -> PResult<FunctionDeclaration> {
    let start = cursor.advance();
    let name = expect_ident(cursor)?;
    let generics = parse_generics(cursor)?;
    let params = parse_params(cursor)?;
    let return_type = if cursor.check(&TokenKind::Arrow) {
        cursor.advance();
        Some(parse_type(cursor)?)
    } else {
        None
    };
    let effects = parse_effects(cursor)?;
    let where_clause = parse_where_clause(cursor)?;
    let body = parse_block_statements(cursor, file)?;
    let end_span = body
        .last()
        .map(|s| s.span().clone())
        .unwrap_or_else(|| start.span.clone());
    let span = start.span.merge(&end_span);
    Ok(FunctionDeclaration {
        name,
        generics,
        params,
        return_type,
        effects,
        where_clause,
        body,
        is_public,
        is_async,
        span,
    })
}

fn parse_variable(
    cursor: &mut Cursor,
    file: &std::rc::Rc<str>,
    is_public: bool,
) -> PResult<VariableDeclaration> {
    let start = cursor.advance();
    let is_mut = matches!(start.kind, TokenKind::Var);
    let name = expect_ident(cursor)?;
    let type_annotation = if cursor.check(&TokenKind::Colon) {
        cursor.advance();
        Some(parse_type(cursor)?)
    } else {
        None
    };
    expect(cursor, TokenKind::Assign)?;
    let value = ExprParser::new(cursor, file.clone()).parse_expression()?;
    let end_span = expect_terminator(cursor, value.span().clone())?;
    let span = start.span.merge(&end_span);
    Ok(VariableDeclaration { name, is_mut, type_annotation, value, is_public, span })
}

fn parse_struct(cursor: &mut Cursor, is_public: bool) -> PResult<StructDeclaration> {
    let start = cursor.advance();
    let name = expect_ident(cursor)?;
    let generics = parse_generics(cursor)?;
    let where_clause = parse_where_clause(cursor)?;
    expect(cursor, TokenKind::LBrace)?;
    let mut fields = vec![];
    while !cursor.check(&TokenKind::RBrace) {
        let field_start = cursor.peek().span.clone();
        let field_public = if cursor.check(&TokenKind::Pub) {
            cursor.advance();
            true
        } else {
            false
        };
        let field_name = expect_ident(cursor)?;
        expect(cursor, TokenKind::Colon)?;
        let type_annotation = parse_type(cursor)?;
        let span = field_start.merge(type_annotation.span());
        fields.push(StructField { name: field_name, type_annotation, is_public: field_public, span });
        if cursor.check(&TokenKind::Comma) {
            cursor.advance();
            continue;
        }
        break;
    }
    let end = expect(cursor, TokenKind::RBrace)?;
    let span = start.span.merge(&end.span);
    Ok(StructDeclaration { name, generics, fields, where_clause, is_public, span })
}

fn parse_enum(cursor: &mut Cursor, is_public: bool) -> PResult<EnumDeclaration> {
    let start = cursor.advance();
    let name = expect_ident(cursor)?;
    let generics = parse_generics(cursor)?;
    expect(cursor, TokenKind::LBrace)?;
    let mut variants = vec![];
    while !cursor.check(&TokenKind::RBrace) {
        let variant_name = expect_ident(cursor)?;
        let (kind, end_span) = if cursor.check(&TokenKind::LParen) {
            cursor.advance();
            let mut types = vec![];
            while !cursor.check(&TokenKind::RParen) {
                types.push(parse_type(cursor)?);
                if cursor.check(&TokenKind::Comma) {
                    cursor.advance();
                    continue;
                }
                break;
            }
            let end = expect(cursor, TokenKind::RParen)?;
            (EnumVariantKind::Tuple(types), end.span)
        } else if cursor.check(&TokenKind::LBrace) {
            cursor.advance();
            let mut fields = vec![];
            while !cursor.check(&TokenKind::RBrace) {
                let field_name = expect_ident(cursor)?;
                expect(cursor, TokenKind::Colon)?;
                let type_annotation = parse_type(cursor)?;
                let span = field_name.span.merge(type_annotation.span());
                fields.push(StructField { name: field_name, type_annotation, is_public: false, span });
                if cursor.check(&TokenKind::Comma) {
                    cursor.advance();
                    continue;
                }
                break;
            }
            let end = expect(cursor, TokenKind::RBrace)?;
            (EnumVariantKind::Struct(fields), end.span)
        } else {
            (EnumVariantKind::Unit, variant_name.span.clone())
        };
        let span = variant_name.span.merge(&end_span);
        variants.push(EnumVariant { name: variant_name, kind, span });
        if cursor.check(&TokenKind::Comma) {
            cursor.advance();
            continue;
        }
        break;
    }
    let end = expect(cursor, TokenKind::RBrace)?;
    let span = start.span.merge(&end.span);
    Ok(EnumDeclaration { name, generics, variants, is_public, span })
}

fn parse_trait(cursor: &mut Cursor, file: &std::rc::Rc<str>, is_public: bool) -> PResult<TraitDeclaration> {
    let start = cursor.advance();
    let name = expect_ident(cursor)?;
    let generics = parse_generics(cursor)?;
    expect(cursor, TokenKind::LBrace)?;
    let mut methods = vec![];
    while !cursor.check(&TokenKind::RBrace) {
        let method_start = cursor.peek().span.clone();
        expect(cursor, TokenKind::Fn)?;
        let method_name = expect_ident(cursor)?;
        let params = parse_params(cursor)?;
        let return_type = if cursor.check(&TokenKind::Arrow) {
            cursor.advance();
            Some(parse_type(cursor)?)
        } else {
            None
        };
        let (default_body, end_span) = if cursor.check(&TokenKind::LBrace) {
            let body = parse_block_statements(cursor, file)?;
            let span = body.last().map(|s| s.span().clone()).unwrap_or_else(|| method_start.clone());
            (Some(body), span)
        } else {
            let sig_end = return_type.as_ref().map(|t| t.span().clone()).unwrap_or_else(|| method_name.span.clone());
            let end_span = expect_terminator(cursor, sig_end)?;
            (None, end_span)
        };
        let span = method_start.merge(&end_span);
        methods.push(TraitMethodSignature { name: method_name, params, return_type, default_body, span });
    }
    let end = expect(cursor, TokenKind::RBrace)?;
    let span = start.span.merge(&end.span);
    Ok(TraitDeclaration { name, generics, methods, is_public, span })
}

fn parse_impl(cursor: &mut Cursor, file: &std::rc::Rc<str>) -> PResult<ImplDeclaration> {
    let start = cursor.advance();
    let generics = parse_generics(cursor)?;
    let first = parse_type(cursor)?;
    let (trait_name, target) = if cursor.check(&TokenKind::For) {
        cursor.advance();
        let target = parse_type(cursor)?;
        let path = match &first {
            crate::ast::Type::Basic { path, .. } => path.clone(),
            other => {
                return Err(error(cursor, format!("expected a trait path before 'for', found {other}")))
            }
        };
        (Some(path), target)
    } else {
        (None, first)
    };
    let where_clause = parse_where_clause(cursor)?;
    expect(cursor, TokenKind::LBrace)?;
    let mut methods = vec![];
    while !cursor.check(&TokenKind::RBrace) {
        let mut is_public = false;
        while cursor.check(&TokenKind::Pub) {
            is_public = true;
            cursor.advance();
        }
        methods.push(parse_function(cursor, file, is_public, false)?);
    }
    let end = expect(cursor, TokenKind::RBrace)?;
    let span = start.span.merge(&end.span);
    Ok(ImplDeclaration { trait_name, target, generics, methods, where_clause, span })
}

fn parse_type_alias(cursor: &mut Cursor, is_public: bool) -> PResult<TypeAliasDeclaration> {
    let start = cursor.advance();
    let name = expect_ident(cursor)?;
    let generics = parse_generics(cursor)?;
    expect(cursor, TokenKind::Assign)?;
    let aliased = parse_type(cursor)?;
    let end_span = expect_terminator(cursor, aliased.span().clone())?;
    let span = start.span.merge(&end_span);
    Ok(TypeAliasDeclaration { name, generics, aliased, is_public, span })
}

fn parse_newtype(cursor: &mut Cursor, is_public: bool) -> PResult<NewtypeDeclaration> {
    let start = cursor.advance();
    let name = expect_ident(cursor)?;
    expect(cursor, TokenKind::Assign)?;
    let wrapped = parse_type(cursor)?;
    let end_span = expect_terminator(cursor, wrapped.span().clone())?;
    let span = start.span.merge(&end_span);
    Ok(NewtypeDeclaration { name, wrapped, is_public, span })
}

fn parse_import(cursor: &mut Cursor) -> PResult<ImportDeclaration> {
    let start = cursor.advance();
    let first = expect_ident(cursor)?;
    let mut segments = vec![first];
    let mut is_wildcard = false;
    while cursor.check(&TokenKind::ColonColon) {
        cursor.advance();
        if cursor.check(&TokenKind::Star) {
            cursor.advance();
            is_wildcard = true;
            break;
        }
        segments.push(expect_ident(cursor)?);
    }
    let path_span = segments.first().unwrap().span.merge(&segments.last().unwrap().span);
    let path = Path { segments, span: path_span };
    let alias = if !is_wildcard && cursor.check(&TokenKind::As) {
        cursor.advance();
        Some(expect_ident(cursor)?)
    } else {
        None
    };
    let last_span = alias.as_ref().map(|a| a.span.clone()).unwrap_or_else(|| path.span.clone());
    let end_span = expect_terminator(cursor, last_span)?;
    let span = start.span.merge(&end_span);
    Ok(ImportDeclaration { path, alias, is_wildcard, span })
}

fn parse_export_item(cursor: &mut Cursor) -> PResult<crate::ast::ExportItem> {
    let name = expect_ident(cursor)?;
    let alias = if cursor.check(&TokenKind::As) {
        cursor.advance();
        Some(expect_ident(cursor)?)
    } else {
        None
    };
    Ok(crate::ast::ExportItem { name, alias })
}

/// `export name;`, `export name as alias;`, or the braced-list form
/// `export { a, b as c };` -- all three build the same [`ExportDeclaration`]
/// shape, the bare forms simply producing a single-element list.
fn parse_export(cursor: &mut Cursor) -> PResult<ExportDeclaration> {
    let start = cursor.advance();
    let items = if cursor.check(&TokenKind::LBrace) {
        cursor.advance();
        let mut items = vec![];
        while !cursor.check(&TokenKind::RBrace) {
            items.push(parse_export_item(cursor)?);
            if cursor.check(&TokenKind::Comma) {
                cursor.advance();
                continue;
            }
            break;
        }
        expect(cursor, TokenKind::RBrace)?;
        items
    } else {
        vec![parse_export_item(cursor)?]
    };
    let last_span = items
        .last()
        .map(|i| i.alias.as_ref().unwrap_or(&i.name).span.clone())
        .unwrap_or_else(|| start.span.clone());
    let end_span = expect_terminator(cursor, last_span)?;
    let span = start.span.merge(&end_span);
    Ok(ExportDeclaration { items, span })
}

/// One `@name:kind` or `@name:kind*`/`+`/`?` pattern parameter.
fn parse_macro_pattern_element(cursor: &mut Cursor) -> PResult<crate::ast::MacroPatternElement> {
    use crate::ast::{MacroParamKind, MacroQuantifier};
    let start = expect(cursor, TokenKind::At)?;
    let name = expect_ident(cursor)?;
    expect(cursor, TokenKind::Colon)?;
    let kind_ident = expect_ident(cursor)?;
    let kind = match kind_ident.name.as_str() {
        "expr" => MacroParamKind::Expr,
        "stmt" => MacroParamKind::Stmt,
        "type" => MacroParamKind::Type,
        "ident" => MacroParamKind::Ident,
        "block" => MacroParamKind::Block,
        "tokens" => MacroParamKind::Tokens,
        other => {
            return Err(error(cursor, format!("unknown macro parameter kind '{other}'")));
        }
    };
    let (quantifier, end_span) = if cursor.check(&TokenKind::Star) {
        let tok = cursor.advance();
        (MacroQuantifier::ZeroOrMore, tok.span)
    } else if cursor.check(&TokenKind::Plus) {
        let tok = cursor.advance();
        (MacroQuantifier::OneOrMore, tok.span)
    } else if cursor.check(&TokenKind::Question) {
        let tok = cursor.advance();
        (MacroQuantifier::ZeroOrOne, tok.span)
    } else {
        (MacroQuantifier::Once, kind_ident.span.clone())
    };
    let span = start.span.merge(&end_span);
    Ok(crate::ast::MacroPatternElement { name, kind, quantifier, span })
}

/// One `(pattern) => { body }` matcher arm, or a bare `(...) => { body }`
/// variadic catch-all.
fn parse_macro_matcher(cursor: &mut Cursor, file: &std::rc::Rc<str>) -> PResult<crate::ast::MacroMatcher> {
    let start = expect(cursor, TokenKind::LParen)?;
    let mut pattern = vec![];
    let mut variadic = false;
    while !cursor.check(&TokenKind::RParen) {
        if cursor.check(&TokenKind::DotDot) && matches!(cursor.peek_at(1).kind, TokenKind::Dot) {
            cursor.advance();
            cursor.advance();
            variadic = true;
            break;
        }
        pattern.push(parse_macro_pattern_element(cursor)?);
        if cursor.check(&TokenKind::Comma) {
            cursor.advance();
            continue;
        }
        break;
    }
    expect(cursor, TokenKind::RParen)?;
    expect(cursor, TokenKind::FatArrow)?;
    let body = parse_block_statements(cursor, file)?;
    let end_span = body.last().map(|s| s.span().clone()).unwrap_or_else(|| start.span.clone());
    let span = start.span.merge(&end_span);
    Ok(crate::ast::MacroMatcher { pattern, variadic, body, span })
}

fn parse_macro_definition(cursor: &mut Cursor, file: &std::rc::Rc<str>) -> PResult<MacroDefinition> {
    let start = cursor.advance();
    let name = expect_ident(cursor)?;
    let hygienic = if cursor.check(&TokenKind::Unsafe) {
        cursor.advance();
        false
    } else {
        true
    };
    expect(cursor, TokenKind::LBrace)?;
    let mut matchers = vec![];
    while !cursor.check(&TokenKind::RBrace) {
        matchers.push(parse_macro_matcher(cursor, file)?);
    }
    let end = expect(cursor, TokenKind::RBrace)?;
    let span = start.span.merge(&end.span);
    Ok(MacroDefinition { name, matchers, hygienic, span })
}

#[cfg(test)]
mod tests {
    use crate::ast::Declaration;
    use crate::parser::test_helpers::parse_module_single;

    #[test]
    fn parses_plain_function() {
        match parse_module_single("fn add(a: i32, b: i32) -> i32 {\nreturn a + b;\n}") {
            Declaration::Function(f) => {
                assert_eq!(f.name.name, "add");
                assert_eq!(f.params.len(), 2);
            }
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn parses_pub_async_modifiers_in_either_order() {
        let a = parse_module_single("pub async fn f() {\n}");
        let b = parse_module_single("async pub fn f() {\n}");
        match (a, b) {
            (Declaration::Function(a), Declaration::Function(b)) => {
                assert!(a.is_public && a.is_async);
                assert!(b.is_public && b.is_async);
            }
            _ => panic!("expected function declarations"),
        }
    }

    #[test]
    fn parses_struct_with_generics() {
        match parse_module_single("struct Pair<T> {\nfirst: T,\nsecond: T,\n}") {
            Declaration::Struct(s) => {
                assert_eq!(s.generics.len(), 1);
                assert_eq!(s.fields.len(), 2);
            }
            other => panic!("expected struct, got {other:?}"),
        }
    }

    #[test]
    fn parses_enum_with_mixed_variants() {
        match parse_module_single("enum Shape {\nCircle(f64),\nRectangle { w: f64, h: f64 },\nPoint,\n}") {
            Declaration::Enum(e) => assert_eq!(e.variants.len(), 3),
            other => panic!("expected enum, got {other:?}"),
        }
    }

    #[test]
    fn parses_import_with_alias() {
        match parse_module_single("import std::collections as collections;") {
            Declaration::Import(i) => assert!(i.alias.is_some()),
            other => panic!("expected import, got {other:?}"),
        }
    }

    #[test]
    fn parses_type_alias() {
        match parse_module_single("type Meters = f64;") {
            Declaration::TypeAlias(t) => assert_eq!(t.name.name, "Meters"),
            other => panic!("expected type alias, got {other:?}"),
        }
    }

    #[test]
    fn parses_impl_block() {
        match parse_module_single("impl Greet for Person {\nfn greet() {\n}\n}") {
            Declaration::Impl(i) => {
                assert!(i.trait_name.is_some());
                assert_eq!(i.methods.len(), 1);
            }
            other => panic!("expected impl, got {other:?}"),
        }
    }

    #[test]
    fn parses_wildcard_import() {
        match parse_module_single("import std::collections::*;") {
            Declaration::Import(i) => {
                assert!(i.is_wildcard);
                assert!(i.alias.is_none());
                assert_eq!(i.path.segments.len(), 2);
            }
            other => panic!("expected import, got {other:?}"),
        }
    }

    #[test]
    fn parses_braced_export_list() {
        match parse_module_single("export { a, b as c };") {
            Declaration::Export(e) => {
                assert_eq!(e.items.len(), 2);
                assert_eq!(e.items[0].name.name, "a");
                assert!(e.items[0].alias.is_none());
                assert_eq!(e.items[1].name.name, "b");
                assert_eq!(e.items[1].alias.as_ref().unwrap().name, "c");
            }
            other => panic!("expected export, got {other:?}"),
        }
    }

    #[test]
    fn parses_generics_with_const_lifetime_and_default() {
        match parse_module_single("struct Buf<'a, T = i32, const N: usize> {\nfield: T,\n}") {
            Declaration::Struct(s) => {
                assert_eq!(s.generics.len(), 3);
                assert!(matches!(s.generics[0].kind, crate::ast::GenericParamKind::Lifetime));
                assert_eq!(s.generics[0].name.name, "a");
                assert!(matches!(s.generics[1].kind, crate::ast::GenericParamKind::Type));
                assert!(matches!(
                    s.generics[1].default,
                    Some(crate::ast::GenericParamDefault::Type(_))
                ));
                assert!(matches!(
                    s.generics[2].kind,
                    crate::ast::GenericParamKind::Const { .. }
                ));
            }
            other => panic!("expected struct, got {other:?}"),
        }
    }

    #[test]
    fn parses_macro_with_quantified_pattern_element() {
        match parse_module_single("macro repeat {\n(@items:expr*) => {\nreturn items;\n}\n}") {
            Declaration::Macro(m) => {
                assert!(m.hygienic);
                assert_eq!(m.matchers.len(), 1);
                let matcher = &m.matchers[0];
                assert!(!matcher.variadic);
                assert_eq!(matcher.pattern.len(), 1);
                assert_eq!(matcher.pattern[0].name.name, "items");
                assert!(matches!(matcher.pattern[0].kind, crate::ast::MacroParamKind::Expr));
                assert!(matches!(matcher.pattern[0].quantifier, crate::ast::MacroQuantifier::ZeroOrMore));
            }
            other => panic!("expected macro, got {other:?}"),
        }
    }

    #[test]
    fn parses_unsafe_macro_with_variadic_matcher() {
        match parse_module_single("macro log unsafe {\n(...) => {\nreturn 0;\n}\n}") {
            Declaration::Macro(m) => {
                assert!(!m.hygienic);
                assert!(m.matchers[0].variadic);
                assert!(m.matchers[0].pattern.is_empty());
            }
            other => panic!("expected macro, got {other:?}"),
        }
    }
}
