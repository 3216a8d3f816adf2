//! Validator (spec.md §4.5's validator contract, exposed per spec.md §6):
//! structural invariant checks the optimizer can run between passes, plus
//! the read-only tree queries (`CountNodes`, `GetDepth`,
//! `FindNodesByType`, `PrettyPrint`) spec.md §6 lists as its own entry
//! points.
//!
//! Most of spec.md's "missing required child" checks are unreachable here
//! by construction -- a [`crate::ast::Expression::Binary`] simply cannot
//! be built without both operands, since the field isn't an `Option` -- so
//! this validator's real job is the checks the type system can't already
//! guarantee: non-empty identifiers (unless wildcard), and an empty
//! program, which spec.md calls out by name as a warning promotable to an
//! error in strict mode.

use crate::ast::{
    BinaryOperator, CompoundAssignOperator, Declaration, EnumVariantKind, Expression, Module,
    Pattern, Statement, TemplateStringPart, Type, UnaryOperator,
};
use crate::lexer::Span;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ValidationError {
    pub message: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ValidationWarning {
    pub message: String,
    pub span: Span,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

/// Runs the full set of structural checks and returns the first error, if
/// any -- the spec's `Validate(node) -> Error?` entry point.
pub fn validate(module: &Module) -> Option<ValidationError> {
    collect_reports(module, false).errors.into_iter().next()
}

/// The spec's `CollectReports(node) -> ([Error], [Warning])` entry point.
/// In `strict` mode every warning is additionally appended to `errors`.
pub fn collect_reports(module: &Module, strict: bool) -> ValidationReport {
    let mut report = ValidationReport::default();

    if module.is_empty() {
        report.warnings.push(ValidationWarning {
            message: "empty program".to_string(),
            span: Span::dummy(),
        });
    }

    for decl in module {
        check_declaration(decl, &mut report);
    }

    if strict {
        for warning in &report.warnings {
            report.errors.push(ValidationError { message: warning.message.clone(), span: warning.span.clone() });
        }
    }

    report
}

fn require_nonempty_ident(ident: &crate::ast::Ident, report: &mut ValidationReport) {
    if ident.name.is_empty() && !ident.is_wildcard() {
        report.errors.push(ValidationError {
            message: "identifier must not be empty".to_string(),
            span: ident.span.clone(),
        });
    }
}

fn check_declaration(decl: &Declaration, report: &mut ValidationReport) {
    match decl {
        Declaration::Function(f) => {
            require_nonempty_ident(&f.name, report);
            for p in &f.generics {
                require_nonempty_ident(&p.name, report);
            }
            for p in &f.params {
                require_nonempty_ident(&p.name, report);
            }
            for stmt in &f.body {
                check_statement(stmt, report);
            }
        }
        Declaration::Variable(v) => {
            require_nonempty_ident(&v.name, report);
            check_expression(&v.value, report);
        }
        Declaration::Struct(s) => {
            require_nonempty_ident(&s.name, report);
            for field in &s.fields {
                require_nonempty_ident(&field.name, report);
            }
        }
        Declaration::Enum(e) => {
            require_nonempty_ident(&e.name, report);
            for variant in &e.variants {
                require_nonempty_ident(&variant.name, report);
                if let EnumVariantKind::Struct(fields) = &variant.kind {
                    for field in fields {
                        require_nonempty_ident(&field.name, report);
                    }
                }
            }
        }
        Declaration::Trait(t) => {
            require_nonempty_ident(&t.name, report);
            for method in &t.methods {
                require_nonempty_ident(&method.name, report);
                if let Some(body) = &method.default_body {
                    for stmt in body {
                        check_statement(stmt, report);
                    }
                }
            }
        }
        Declaration::Impl(i) => {
            for method in &i.methods {
                require_nonempty_ident(&method.name, report);
                for stmt in &method.body {
                    check_statement(stmt, report);
                }
            }
        }
        Declaration::TypeAlias(t) => require_nonempty_ident(&t.name, report),
        Declaration::Newtype(n) => require_nonempty_ident(&n.name, report),
        Declaration::Import(i) => {
            for seg in &i.path.segments {
                require_nonempty_ident(seg, report);
            }
        }
        Declaration::Export(e) => {
            if e.items.is_empty() {
                report.errors.push(ValidationError {
                    message: "export list must name at least one item".to_string(),
                    span: e.span.clone(),
                });
            }
            for item in &e.items {
                require_nonempty_ident(&item.name, report);
                if let Some(alias) = &item.alias {
                    require_nonempty_ident(alias, report);
                }
            }
        }
        Declaration::Macro(m) => {
            require_nonempty_ident(&m.name, report);
            if m.matchers.is_empty() {
                report.errors.push(ValidationError {
                    message: format!("macro '{}' has no matcher arms", m.name.name),
                    span: m.span.clone(),
                });
            }
            for matcher in &m.matchers {
                if matcher.body.is_empty() && !matcher.variadic {
                    report.errors.push(ValidationError {
                        message: format!("macro '{}' has an empty matcher body", m.name.name),
                        span: matcher.span.clone(),
                    });
                }
                for stmt in &matcher.body {
                    check_statement(stmt, report);
                }
            }
        }
    }
}

fn check_statement(stmt: &Statement, report: &mut ValidationReport) {
    match stmt {
        Statement::Expression { expression, .. } => check_expression(expression, report),
        Statement::VarDecl { name, value, .. } => {
            require_nonempty_ident(name, report);
            if let Some(v) = value {
                check_expression(v, report);
            }
        }
        Statement::Return { value, .. } => {
            if let Some(v) = value {
                check_expression(v, report);
            }
        }
        Statement::If { condition, then_branch, else_branch, .. } => {
            check_expression(condition, report);
            for s in then_branch {
                check_statement(s, report);
            }
            if let Some(b) = else_branch {
                for s in b {
                    check_statement(s, report);
                }
            }
        }
        Statement::While { condition, body, .. } => {
            check_expression(condition, report);
            for s in body {
                check_statement(s, report);
            }
        }
        Statement::Loop { body, .. } => {
            for s in body {
                check_statement(s, report);
            }
        }
        Statement::For { init, condition, step, body, .. } => {
            if let Some(s) = init {
                check_statement(s, report);
            }
            if let Some(c) = condition {
                check_expression(c, report);
            }
            if let Some(s) = step {
                check_expression(s, report);
            }
            for s in body {
                check_statement(s, report);
            }
        }
        Statement::ForIn { binding, iterable, body, .. } => {
            require_nonempty_ident(binding, report);
            check_expression(iterable, report);
            for s in body {
                check_statement(s, report);
            }
        }
        Statement::Match { scrutinee, arms, .. } => {
            check_expression(scrutinee, report);
            for arm in arms {
                if let Some(g) = &arm.guard {
                    check_expression(g, report);
                }
                check_statement(&arm.body, report);
            }
        }
        Statement::Break { label, value, .. } => {
            if let Some(l) = label {
                require_nonempty_ident(l, report);
            }
            if let Some(v) = value {
                check_expression(v, report);
            }
        }
        Statement::Continue { label, .. } => {
            if let Some(l) = label {
                require_nonempty_ident(l, report);
            }
        }
        Statement::Defer { expression, .. } => check_expression(expression, report),
        Statement::Block { statements, .. } => {
            for s in statements {
                check_statement(s, report);
            }
        }
    }
}

fn check_expression(expr: &Expression, report: &mut ValidationReport) {
    match expr {
        Expression::Path { path, .. } => {
            for seg in &path.segments {
                require_nonempty_ident(seg, report);
            }
        }
        Expression::Unary { operand, .. } => check_expression(operand, report),
        Expression::Binary { left, right, .. } => {
            check_expression(left, report);
            check_expression(right, report);
        }
        Expression::Assignment { target, value, .. } | Expression::CompoundAssignment { target, value, .. } => {
            check_expression(target, report);
            check_expression(value, report);
        }
        Expression::Ternary { condition, then_branch, else_branch, .. } => {
            check_expression(condition, report);
            check_expression(then_branch, report);
            check_expression(else_branch, report);
        }
        Expression::Call { callee, args, .. } => {
            check_expression(callee, report);
            for a in args {
                check_expression(a, report);
            }
        }
        Expression::Index { target, index, .. } => {
            check_expression(target, report);
            check_expression(index, report);
        }
        Expression::Member { target, member, .. } => {
            check_expression(target, report);
            require_nonempty_ident(member, report);
        }
        Expression::ArrayLiteral { elements, .. } => {
            for e in elements {
                check_expression(e, report);
            }
        }
        Expression::StructLiteral { fields, .. } => {
            for f in fields {
                require_nonempty_ident(&f.name, report);
                check_expression(&f.value, report);
            }
        }
        Expression::TemplateString { parts, .. } => {
            for p in parts {
                if let TemplateStringPart::Interpolation(e) = p {
                    check_expression(e, report);
                }
            }
        }
        Expression::MacroInvocation { name, args, .. } => {
            require_nonempty_ident(name, report);
            for a in args {
                check_expression(a, report);
            }
        }
        Expression::Grouping { inner, .. } => check_expression(inner, report),
        Expression::Block { statements, trailing, .. } => {
            for s in statements {
                check_statement(s, report);
            }
            if let Some(t) = trailing {
                check_expression(t, report);
            }
        }
        Expression::If { condition, then_branch, else_branch, .. } => {
            check_expression(condition, report);
            check_expression(then_branch, report);
            if let Some(b) = else_branch {
                check_expression(b, report);
            }
        }
        Expression::TypeLiteral { .. } => {}
        Expression::Integer { .. }
        | Expression::Float { .. }
        | Expression::Str { .. }
        | Expression::Char { .. }
        | Expression::Bool { .. }
        | Expression::Null { .. } => {}
    }
}

/// Total node count across every declaration/statement/expression/type in
/// the tree (spec.md §6 `CountNodes`).
pub fn count_nodes(module: &Module) -> usize {
    module.iter().map(count_declaration).sum()
}

fn count_declaration(decl: &Declaration) -> usize {
    1 + match decl {
        Declaration::Function(f) => {
            f.generics.len() + f.params.len() + f.body.iter().map(count_statement).sum::<usize>()
        }
        Declaration::Variable(v) => count_expression(&v.value),
        Declaration::Struct(s) => s.generics.len() + s.fields.len(),
        Declaration::Enum(e) => e.generics.len() + e.variants.len(),
        Declaration::Trait(t) => {
            t.generics.len()
                + t
                    .methods
                    .iter()
                    .map(|m| m.params.len() + m.default_body.as_ref().map_or(0, |b| b.iter().map(count_statement).sum()))
                    .sum::<usize>()
        }
        Declaration::Impl(i) => i.methods.iter().map(|m| count_declaration(&Declaration::Function(m.clone()))).sum(),
        Declaration::TypeAlias(_) | Declaration::Newtype(_) | Declaration::Import(_) | Declaration::Export(_) => 0,
        Declaration::Macro(m) => m
            .matchers
            .iter()
            .map(|matcher| matcher.pattern.len() + matcher.body.iter().map(count_statement).sum::<usize>())
            .sum::<usize>(),
    }
}

fn count_statement(stmt: &Statement) -> usize {
    1 + match stmt {
        Statement::Expression { expression, .. } => count_expression(expression),
        Statement::VarDecl { value, .. } => value.as_ref().map_or(0, count_expression),
        Statement::Return { value, .. } | Statement::Break { value, .. } => value.as_ref().map_or(0, count_expression),
        Statement::If { condition, then_branch, else_branch, .. } => {
            count_expression(condition)
                + then_branch.iter().map(count_statement).sum::<usize>()
                + else_branch.as_ref().map_or(0, |b| b.iter().map(count_statement).sum())
        }
        Statement::While { condition, body, .. } => count_expression(condition) + body.iter().map(count_statement).sum::<usize>(),
        Statement::Loop { body, .. } => body.iter().map(count_statement).sum(),
        Statement::For { init, condition, step, body, .. } => {
            init.as_ref().map_or(0, |s| count_statement(s))
                + condition.as_ref().map_or(0, count_expression)
                + step.as_ref().map_or(0, count_expression)
                + body.iter().map(count_statement).sum::<usize>()
        }
        Statement::ForIn { iterable, body, .. } => count_expression(iterable) + body.iter().map(count_statement).sum::<usize>(),
        Statement::Match { scrutinee, arms, .. } => {
            count_expression(scrutinee)
                + arms
                    .iter()
                    .map(|a| a.guard.as_ref().map_or(0, count_expression) + count_statement(&a.body))
                    .sum::<usize>()
        }
        Statement::Continue { .. } => 0,
        Statement::Defer { expression, .. } => count_expression(expression),
        Statement::Block { statements, .. } => statements.iter().map(count_statement).sum(),
    }
}

fn count_expression(expr: &Expression) -> usize {
    1 + match expr {
        Expression::Unary { operand, .. } => count_expression(operand),
        Expression::Binary { left, right, .. } => count_expression(left) + count_expression(right),
        Expression::Assignment { target, value, .. } | Expression::CompoundAssignment { target, value, .. } => {
            count_expression(target) + count_expression(value)
        }
        Expression::Ternary { condition, then_branch, else_branch, .. } => {
            count_expression(condition) + count_expression(then_branch) + count_expression(else_branch)
        }
        Expression::Call { callee, args, .. } => count_expression(callee) + args.iter().map(count_expression).sum::<usize>(),
        Expression::Index { target, index, .. } => count_expression(target) + count_expression(index),
        Expression::Member { target, .. } => count_expression(target),
        Expression::ArrayLiteral { elements, .. } => elements.iter().map(count_expression).sum(),
        Expression::StructLiteral { fields, .. } => fields.iter().map(|f| count_expression(&f.value)).sum(),
        Expression::TemplateString { parts, .. } => parts
            .iter()
            .map(|p| match p {
                TemplateStringPart::Interpolation(e) => count_expression(e),
                TemplateStringPart::Text(_) => 0,
            })
            .sum(),
        Expression::MacroInvocation { args, .. } => args.iter().map(count_expression).sum(),
        Expression::Grouping { inner, .. } => count_expression(inner),
        Expression::Block { statements, trailing, .. } => {
            statements.iter().map(count_statement).sum::<usize>() + trailing.as_ref().map_or(0, |t| count_expression(t))
        }
        Expression::If { condition, then_branch, else_branch, .. } => {
            count_expression(condition) + count_expression(then_branch) + else_branch.as_ref().map_or(0, |b| count_expression(b))
        }
        Expression::Integer { .. }
        | Expression::Float { .. }
        | Expression::Str { .. }
        | Expression::Char { .. }
        | Expression::Bool { .. }
        | Expression::Null { .. }
        | Expression::Path { .. }
        | Expression::TypeLiteral { .. } => 0,
    }
}

/// Maximum nesting depth across the whole module (spec.md §6 `GetDepth`).
pub fn get_depth(module: &Module) -> usize {
    module.iter().map(declaration_depth).max().unwrap_or(0)
}

fn declaration_depth(decl: &Declaration) -> usize {
    1 + match decl {
        Declaration::Function(f) => statements_depth(&f.body),
        Declaration::Variable(v) => expression_depth(&v.value),
        Declaration::Impl(i) => i.methods.iter().map(|m| statements_depth(&m.body)).max().unwrap_or(0),
        Declaration::Trait(t) => t
            .methods
            .iter()
            .map(|m| m.default_body.as_ref().map_or(0, |b| statements_depth(b)))
            .max()
            .unwrap_or(0),
        Declaration::Macro(m) => m.matchers.iter().map(|matcher| statements_depth(&matcher.body)).max().unwrap_or(0),
        _ => 0,
    }
}

fn statements_depth(stmts: &[Statement]) -> usize {
    stmts.iter().map(statement_depth).max().unwrap_or(0)
}

fn statement_depth(stmt: &Statement) -> usize {
    1 + match stmt {
        Statement::Expression { expression, .. } => expression_depth(expression),
        Statement::VarDecl { value, .. } => value.as_ref().map_or(0, expression_depth),
        Statement::Return { value, .. } | Statement::Break { value, .. } => value.as_ref().map_or(0, expression_depth),
        Statement::If { condition, then_branch, else_branch, .. } => *[
            expression_depth(condition),
            statements_depth(then_branch),
            else_branch.as_ref().map_or(0, |b| statements_depth(b)),
        ]
        .iter()
        .max()
        .unwrap(),
        Statement::While { condition, body, .. } => expression_depth(condition).max(statements_depth(body)),
        Statement::Loop { body, .. } => statements_depth(body),
        Statement::For { condition, body, .. } => condition.as_ref().map_or(0, expression_depth).max(statements_depth(body)),
        Statement::ForIn { iterable, body, .. } => expression_depth(iterable).max(statements_depth(body)),
        Statement::Match { scrutinee, arms, .. } => {
            let arm_depth = arms.iter().map(|a| statement_depth(&a.body)).max().unwrap_or(0);
            expression_depth(scrutinee).max(arm_depth)
        }
        Statement::Continue { .. } => 0,
        Statement::Defer { expression, .. } => expression_depth(expression),
        Statement::Block { statements, .. } => statements_depth(statements),
    }
}

fn expression_depth(expr: &Expression) -> usize {
    1 + match expr {
        Expression::Unary { operand, .. } => expression_depth(operand),
        Expression::Binary { left, right, .. } => expression_depth(left).max(expression_depth(right)),
        Expression::Assignment { target, value, .. } | Expression::CompoundAssignment { target, value, .. } => {
            expression_depth(target).max(expression_depth(value))
        }
        Expression::Ternary { condition, then_branch, else_branch, .. } => {
            [expression_depth(condition), expression_depth(then_branch), expression_depth(else_branch)]
                .into_iter()
                .max()
                .unwrap()
        }
        Expression::Call { callee, args, .. } => {
            args.iter().map(expression_depth).max().unwrap_or(0).max(expression_depth(callee))
        }
        Expression::Index { target, index, .. } => expression_depth(target).max(expression_depth(index)),
        Expression::Member { target, .. } => expression_depth(target),
        Expression::ArrayLiteral { elements, .. } => elements.iter().map(expression_depth).max().unwrap_or(0),
        Expression::StructLiteral { fields, .. } => fields.iter().map(|f| expression_depth(&f.value)).max().unwrap_or(0),
        Expression::Grouping { inner, .. } => expression_depth(inner),
        Expression::Block { statements, trailing, .. } => {
            statements_depth(statements).max(trailing.as_ref().map_or(0, |t| expression_depth(t)))
        }
        Expression::If { condition, then_branch, else_branch, .. } => [
            expression_depth(condition),
            expression_depth(then_branch),
            else_branch.as_ref().map_or(0, |b| expression_depth(b)),
        ]
        .into_iter()
        .max()
        .unwrap(),
        _ => 0,
    }
}

/// A coarse node-kind tag used by `find_nodes_by_type` -- not the AST's
/// own type (which is four separate sum types), just a flat label for a
/// debugging/tooling query across all of them.
pub fn find_nodes_by_type(module: &Module, kind: &str) -> Vec<Span> {
    let mut out = vec![];
    for decl in module {
        walk_declaration(decl, kind, &mut out);
    }
    out
}

fn walk_declaration(decl: &Declaration, kind: &str, out: &mut Vec<Span>) {
    let name = match decl {
        Declaration::Function(_) => "function",
        Declaration::Variable(_) => "variable",
        Declaration::Struct(_) => "struct",
        Declaration::Enum(_) => "enum",
        Declaration::Trait(_) => "trait",
        Declaration::Impl(_) => "impl",
        Declaration::TypeAlias(_) => "type_alias",
        Declaration::Newtype(_) => "newtype",
        Declaration::Import(_) => "import",
        Declaration::Export(_) => "export",
        Declaration::Macro(_) => "macro",
    };
    if name == kind {
        out.push(decl.span().clone());
    }
    match decl {
        Declaration::Function(f) => walk_statements(&f.body, kind, out),
        Declaration::Variable(v) => walk_expression(&v.value, kind, out),
        Declaration::Impl(i) => {
            for m in &i.methods {
                walk_statements(&m.body, kind, out);
            }
        }
        Declaration::Trait(t) => {
            for m in &t.methods {
                if let Some(body) = &m.default_body {
                    walk_statements(body, kind, out);
                }
            }
        }
        Declaration::Macro(m) => {
            for matcher in &m.matchers {
                walk_statements(&matcher.body, kind, out);
            }
        }
        _ => {}
    }
}

fn walk_statements(stmts: &[Statement], kind: &str, out: &mut Vec<Span>) {
    for s in stmts {
        walk_statement(s, kind, out);
    }
}

fn walk_statement(stmt: &Statement, kind: &str, out: &mut Vec<Span>) {
    let name = match stmt {
        Statement::Expression { .. } => "expression_statement",
        Statement::VarDecl { .. } => "var_decl",
        Statement::Return { .. } => "return",
        Statement::If { .. } => "if",
        Statement::While { .. } => "while",
        Statement::Loop { .. } => "loop",
        Statement::For { .. } => "for",
        Statement::ForIn { .. } => "for_in",
        Statement::Match { .. } => "match",
        Statement::Break { .. } => "break",
        Statement::Continue { .. } => "continue",
        Statement::Defer { .. } => "defer",
        Statement::Block { .. } => "block",
    };
    if name == kind {
        out.push(stmt.span().clone());
    }
    match stmt {
        Statement::Expression { expression, .. } => walk_expression(expression, kind, out),
        Statement::VarDecl { value, .. } => {
            if let Some(v) = value {
                walk_expression(v, kind, out);
            }
        }
        Statement::Return { value, .. } | Statement::Break { value, .. } => {
            if let Some(v) = value {
                walk_expression(v, kind, out);
            }
        }
        Statement::If { condition, then_branch, else_branch, .. } => {
            walk_expression(condition, kind, out);
            walk_statements(then_branch, kind, out);
            if let Some(b) = else_branch {
                walk_statements(b, kind, out);
            }
        }
        Statement::While { condition, body, .. } => {
            walk_expression(condition, kind, out);
            walk_statements(body, kind, out);
        }
        Statement::Loop { body, .. } => walk_statements(body, kind, out),
        Statement::For { init, condition, step, body, .. } => {
            if let Some(s) = init {
                walk_statement(s, kind, out);
            }
            if let Some(c) = condition {
                walk_expression(c, kind, out);
            }
            if let Some(s) = step {
                walk_expression(s, kind, out);
            }
            walk_statements(body, kind, out);
        }
        Statement::ForIn { iterable, body, .. } => {
            walk_expression(iterable, kind, out);
            walk_statements(body, kind, out);
        }
        Statement::Match { scrutinee, arms, .. } => {
            walk_expression(scrutinee, kind, out);
            for arm in arms {
                if let Some(g) = &arm.guard {
                    walk_expression(g, kind, out);
                }
                walk_statement(&arm.body, kind, out);
            }
        }
        Statement::Continue { .. } => {}
        Statement::Defer { expression, .. } => walk_expression(expression, kind, out),
        Statement::Block { statements, .. } => walk_statements(statements, kind, out),
    }
}

fn walk_expression(expr: &Expression, kind: &str, out: &mut Vec<Span>) {
    let name = match expr {
        Expression::Integer { .. } => "integer",
        Expression::Float { .. } => "float",
        Expression::Str { .. } => "string",
        Expression::Char { .. } => "char",
        Expression::Bool { .. } => "bool",
        Expression::Null { .. } => "null",
        Expression::Path { .. } => "path",
        Expression::Unary { .. } => "unary",
        Expression::Binary { .. } => "binary",
        Expression::Assignment { .. } => "assignment",
        Expression::CompoundAssignment { .. } => "compound_assignment",
        Expression::Ternary { .. } => "ternary",
        Expression::Call { .. } => "call",
        Expression::Index { .. } => "index",
        Expression::Member { .. } => "member",
        Expression::ArrayLiteral { .. } => "array_literal",
        Expression::StructLiteral { .. } => "struct_literal",
        Expression::TemplateString { .. } => "template_string",
        Expression::MacroInvocation { .. } => "macro_invocation",
        Expression::Grouping { .. } => "grouping",
        Expression::Block { .. } => "block",
        Expression::If { .. } => "if_expr",
        Expression::TypeLiteral { .. } => "type_literal",
    };
    if name == kind {
        out.push(expr.span().clone());
    }
    match expr {
        Expression::Unary { operand, .. } | Expression::Grouping { inner: operand, .. } => {
            walk_expression(operand, kind, out)
        }
        Expression::Binary { left, right, .. } => {
            walk_expression(left, kind, out);
            walk_expression(right, kind, out);
        }
        Expression::Assignment { target, value, .. } | Expression::CompoundAssignment { target, value, .. } => {
            walk_expression(target, kind, out);
            walk_expression(value, kind, out);
        }
        Expression::Ternary { condition, then_branch, else_branch, .. } => {
            walk_expression(condition, kind, out);
            walk_expression(then_branch, kind, out);
            walk_expression(else_branch, kind, out);
        }
        Expression::Call { callee, args, .. } => {
            walk_expression(callee, kind, out);
            for a in args {
                walk_expression(a, kind, out);
            }
        }
        Expression::Index { target, index, .. } => {
            walk_expression(target, kind, out);
            walk_expression(index, kind, out);
        }
        Expression::Member { target, .. } => walk_expression(target, kind, out),
        Expression::ArrayLiteral { elements, .. } => {
            for e in elements {
                walk_expression(e, kind, out);
            }
        }
        Expression::StructLiteral { fields, .. } => {
            for f in fields {
                walk_expression(&f.value, kind, out);
            }
        }
        Expression::TemplateString { parts, .. } => {
            for p in parts {
                if let TemplateStringPart::Interpolation(e) = p {
                    walk_expression(e, kind, out);
                }
            }
        }
        Expression::MacroInvocation { args, .. } => {
            for a in args {
                walk_expression(a, kind, out);
            }
        }
        Expression::Block { statements, trailing, .. } => {
            walk_statements(statements, kind, out);
            if let Some(t) = trailing {
                walk_expression(t, kind, out);
            }
        }
        Expression::If { condition, then_branch, else_branch, .. } => {
            walk_expression(condition, kind, out);
            walk_expression(then_branch, kind, out);
            if let Some(b) = else_branch {
                walk_expression(b, kind, out);
            }
        }
        _ => {}
    }
}

const INDENT_UNIT: &str = "    ";

fn indent(level: usize) -> String {
    INDENT_UNIT.repeat(level)
}

/// Re-serializes a module back to source text (spec.md §6 `PrettyPrint`,
/// and the vehicle for the §8 round-trip property: parsing this output
/// again must yield a structurally-equal module).
pub fn pretty_print(module: &Module) -> String {
    module.iter().map(|d| print_declaration(d, 0)).collect::<Vec<_>>().join("\n\n")
}

fn print_generics(generics: &[crate::ast::GenericParam]) -> String {
    use crate::ast::{GenericParamDefault, GenericParamKind};

    if generics.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = generics
        .iter()
        .map(|g| {
            let mut out = match &g.kind {
                GenericParamKind::Type => g.name.name.clone(),
                GenericParamKind::Lifetime => format!("'{}", g.name.name),
                GenericParamKind::Const { type_annotation } => {
                    format!("const {}: {}", g.name.name, print_type(type_annotation))
                }
            };
            if !g.bounds.is_empty() {
                out.push_str(&format!(": {}", print_bounds(&g.bounds)));
            }
            if let Some(default) = &g.default {
                let rendered = match default {
                    GenericParamDefault::Type(t) => print_type(t),
                    GenericParamDefault::Const(e) => print_expression(e),
                };
                out.push_str(&format!(" = {rendered}"));
            }
            out
        })
        .collect();
    format!("<{}>", parts.join(", "))
}

fn print_bounds(bounds: &[crate::ast::Path]) -> String {
    bounds.iter().map(print_path).collect::<Vec<_>>().join(" + ")
}

fn print_path(path: &crate::ast::Path) -> String {
    path.segments.iter().map(|s| s.name.as_str()).collect::<Vec<_>>().join("::")
}

fn print_where_clause(predicates: &[crate::ast::WherePredicate]) -> String {
    if predicates.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = predicates
        .iter()
        .map(|p| format!("{}: {}", print_type(&p.subject), print_bounds(&p.bounds)))
        .collect();
    format!(" where {}", parts.join(", "))
}

fn print_type(ty: &Type) -> String {
    match ty {
        Type::Basic { path, args, .. } => {
            if args.is_empty() {
                print_path(path)
            } else {
                format!("{}<{}>", print_path(path), args.iter().map(print_type).collect::<Vec<_>>().join(", "))
            }
        }
        Type::Tuple { elements, .. } => format!("({})", elements.iter().map(print_type).collect::<Vec<_>>().join(", ")),
        Type::Array { element, size, .. } => match size {
            Some(size) => format!("[{}; {}]", print_type(element), print_expression(size)),
            None => format!("[{}]", print_type(element)),
        },
        Type::Reference { inner, .. } => format!("&{}", print_type(inner)),
        Type::Pointer { inner, .. } => format!("*{}", print_type(inner)),
        Type::Function { params, return_type, is_async, .. } => {
            let async_kw = if *is_async { "async " } else { "" };
            let params = params.iter().map(print_type).collect::<Vec<_>>().join(", ");
            match return_type {
                Some(r) => format!("{async_kw}func({params}) -> {}", print_type(r)),
                None => format!("{async_kw}func({params})"),
            }
        }
        Type::Refinement { base, binder, predicate, .. } => {
            format!("{{ {}: {} | {} }}", binder.name, print_type(base), print_expression(predicate))
        }
        Type::Dependent { base, predicate, .. } => format!("{} where {}", print_type(base), print_expression(predicate)),
    }
}

fn binary_op_text(op: BinaryOperator) -> &'static str {
    use BinaryOperator::*;
    match op {
        Add => "+",
        Subtract => "-",
        Multiply => "*",
        Divide => "/",
        Modulo => "%",
        Power => "**",
        Equals => "==",
        NotEquals => "!=",
        LessThan => "<",
        GreaterThan => ">",
        LessOrEqual => "<=",
        GreaterOrEqual => ">=",
        And => "&&",
        Or => "||",
        BitAnd => "&",
        BitOr => "|",
        BitXor => "^",
        Shl => "<<",
        Shr => ">>",
        Range => "..",
        RangeInclusive => "..=",
    }
}

fn unary_op_text(op: UnaryOperator) -> &'static str {
    match op {
        UnaryOperator::Negate => "-",
        UnaryOperator::Not => "!",
        UnaryOperator::BitNot => "~",
        UnaryOperator::Deref => "*",
        UnaryOperator::Ref => "&",
    }
}

fn compound_op_text(op: CompoundAssignOperator) -> &'static str {
    use CompoundAssignOperator::*;
    match op {
        Add => "+=",
        Subtract => "-=",
        Multiply => "*=",
        Divide => "/=",
        Modulo => "%=",
        Power => "**=",
        BitAnd => "&=",
        BitOr => "|=",
        BitXor => "^=",
        Shl => "<<=",
        Shr => ">>=",
    }
}

/// Binding power used for parenthesization decisions only -- mirrors
/// [`crate::parser::precedence::infix_binding_power`]'s table so that
/// `pretty_print` emits parens exactly where the grammar requires them and
/// nowhere else. Printing every binary node fully parenthesized would
/// reparse each one back as an extra [`Expression::Grouping`] wrapper that
/// the original (unparenthesized) source never had, breaking the
/// round-trip property (spec.md §8) for anything but a single operator.
fn binary_bp(op: BinaryOperator) -> (u8, crate::parser::precedence::Associativity) {
    use crate::parser::precedence::Associativity as A;
    use BinaryOperator::*;
    match op {
        Or => (4, A::Left),
        And => (6, A::Left),
        BitOr => (8, A::Left),
        BitXor => (10, A::Left),
        BitAnd => (12, A::Left),
        Equals | NotEquals => (14, A::None),
        LessThan | GreaterThan | LessOrEqual | GreaterOrEqual => (16, A::None),
        Range | RangeInclusive => (18, A::None),
        Shl | Shr => (20, A::Left),
        Add | Subtract => (22, A::Left),
        Multiply | Divide | Modulo => (24, A::Left),
        Power => (26, A::Right),
    }
}

/// Matches [`crate::parser::precedence::prefix_binding_power`], which
/// assigns every prefix operator the same binding power.
const PREFIX_BP: u8 = 25;

/// The binding power of `expr` as a would-be operand, for parenthesization
/// purposes. Anything that isn't itself an operator application (calls,
/// literals, indexing, ...) is already unambiguous wherever it appears, so
/// it reports the maximum and is never wrapped.
fn own_bp(expr: &Expression) -> u8 {
    match expr {
        Expression::Binary { operator, .. } => binary_bp(*operator).0,
        Expression::Unary { .. } => PREFIX_BP,
        Expression::Assignment { .. } | Expression::CompoundAssignment { .. } => {
            crate::parser::precedence::ASSIGNMENT_BP
        }
        Expression::Ternary { .. } => crate::parser::precedence::TERNARY_BP,
        _ => u8::MAX,
    }
}

/// Prints `expr` as an operand that requires at least `min_bp` to appear
/// unparenthesized, wrapping it in parens if its own binding power falls
/// short.
fn print_operand(expr: &Expression, min_bp: u8) -> String {
    let rendered = print_expression(expr);
    if own_bp(expr) < min_bp {
        format!("({rendered})")
    } else {
        rendered
    }
}

fn print_expression(expr: &Expression) -> String {
    use crate::parser::precedence::{Associativity as A, ASSIGNMENT_BP, TERNARY_BP};

    match expr {
        Expression::Integer { value, .. } => value.to_string(),
        Expression::Float { value, .. } => value.to_string(),
        Expression::Str { value, .. } => format!("{value:?}"),
        Expression::Char { value, .. } => format!("'{value}'"),
        Expression::Bool { value, .. } => value.to_string(),
        Expression::Null { .. } => "null".to_string(),
        Expression::Path { path, .. } => print_path(path),
        Expression::Unary { operator, operand, .. } => {
            format!("{}{}", unary_op_text(*operator), print_operand(operand, PREFIX_BP))
        }
        Expression::Binary { operator, left, right, .. } => {
            let (bp, assoc) = binary_bp(*operator);
            let (left_min, right_min) = match assoc {
                A::Left => (bp, bp + 1),
                A::Right => (bp + 1, bp),
                A::None => (bp + 1, bp + 1),
            };
            format!(
                "{} {} {}",
                print_operand(left, left_min),
                binary_op_text(*operator),
                print_operand(right, right_min)
            )
        }
        Expression::Assignment { target, value, .. } => {
            format!("{} = {}", print_expression(target), print_operand(value, ASSIGNMENT_BP))
        }
        Expression::CompoundAssignment { operator, target, value, .. } => {
            format!("{} {} {}", print_expression(target), compound_op_text(*operator), print_operand(value, ASSIGNMENT_BP))
        }
        Expression::Ternary { condition, then_branch, else_branch, .. } => {
            format!(
                "{} ? {} : {}",
                print_operand(condition, TERNARY_BP + 1),
                print_operand(then_branch, TERNARY_BP + 1),
                print_operand(else_branch, TERNARY_BP)
            )
        }
        Expression::Call { callee, args, .. } => {
            format!("{}({})", print_expression(callee), args.iter().map(print_expression).collect::<Vec<_>>().join(", "))
        }
        Expression::Index { target, index, .. } => format!("{}[{}]", print_expression(target), print_expression(index)),
        Expression::Member { target, member, .. } => format!("{}.{}", print_expression(target), member.name),
        Expression::ArrayLiteral { elements, .. } => {
            format!("[{}]", elements.iter().map(print_expression).collect::<Vec<_>>().join(", "))
        }
        Expression::StructLiteral { path, fields, .. } => format!(
            "{} {{ {} }}",
            print_path(path),
            fields.iter().map(|f| format!("{}: {}", f.name.name, print_expression(&f.value))).collect::<Vec<_>>().join(", ")
        ),
        Expression::TemplateString { parts, .. } => {
            let mut out = String::from("f\"");
            for part in parts {
                match part {
                    TemplateStringPart::Text(t) => out.push_str(t),
                    TemplateStringPart::Interpolation(e) => {
                        out.push_str("${");
                        out.push_str(&print_expression(e));
                        out.push('}');
                    }
                }
            }
            out.push('"');
            out
        }
        Expression::MacroInvocation { name, args, .. } => {
            format!("{}!({})", name.name, args.iter().map(print_expression).collect::<Vec<_>>().join(", "))
        }
        Expression::Grouping { inner, .. } => format!("({})", print_expression(inner)),
        Expression::Block { statements, trailing, .. } => {
            let mut body = print_block(statements, 0);
            if let Some(t) = trailing {
                body.push_str(&print_expression(t));
                body.push('\n');
            }
            format!("{{\n{body}}}")
        }
        Expression::If { condition, then_branch, else_branch, .. } => match else_branch {
            Some(e) => format!(
                "if {} {} else {}",
                print_expression(condition),
                print_expression(then_branch),
                print_expression(e)
            ),
            None => format!("if {} {}", print_expression(condition), print_expression(then_branch)),
        },
        Expression::TypeLiteral { ty, .. } => print_type(ty),
    }
}

fn print_pattern(pattern: &Pattern) -> String {
    match pattern {
        Pattern::Wildcard(_) => "_".to_string(),
        Pattern::Binding(ident) => ident.name.clone(),
        Pattern::Literal(expr) => print_expression(expr),
        Pattern::Path { path, .. } => print_path(path),
    }
}

fn print_block(stmts: &[Statement], level: usize) -> String {
    let mut out = String::new();
    for stmt in stmts {
        out.push_str(&indent(level + 1));
        out.push_str(&print_statement(stmt, level + 1));
        out.push('\n');
    }
    out
}

fn print_statement(stmt: &Statement, level: usize) -> String {
    match stmt {
        Statement::Expression { expression, .. } => format!("{};", print_expression(expression)),
        Statement::VarDecl { name, is_mut, type_annotation, value, .. } => {
            let keyword = if *is_mut { "var" } else { "let" };
            let ty = type_annotation.as_ref().map(|t| format!(": {}", print_type(t))).unwrap_or_default();
            let val = value.as_ref().map(|v| format!(" = {}", print_expression(v))).unwrap_or_default();
            format!("{keyword} {}{ty}{val};", name.name)
        }
        Statement::Return { value, .. } => match value {
            Some(v) => format!("return {};", print_expression(v)),
            None => "return;".to_string(),
        },
        Statement::If { condition, then_branch, else_branch, .. } => {
            let mut out = format!("if {} {{\n{}{}}}", print_expression(condition), print_block(then_branch, level), indent(level));
            if let Some(else_stmts) = else_branch {
                out.push_str(&format!(" else {{\n{}{}}}", print_block(else_stmts, level), indent(level)));
            }
            out
        }
        Statement::While { condition, body, .. } => {
            format!("while {} {{\n{}{}}}", print_expression(condition), print_block(body, level), indent(level))
        }
        Statement::Loop { body, .. } => format!("loop {{\n{}{}}}", print_block(body, level), indent(level)),
        Statement::For { init, condition, step, body, .. } => {
            let init = init.as_ref().map(|s| print_statement(s, level)).unwrap_or_else(|| ";".to_string());
            let cond = condition.as_ref().map(print_expression).unwrap_or_default();
            let step = step.as_ref().map(print_expression).unwrap_or_default();
            format!("for {init} {cond}; {step} {{\n{}{}}}", print_block(body, level), indent(level))
        }
        Statement::ForIn { binding, iterable, body, .. } => format!(
            "for {} in {} {{\n{}{}}}",
            binding.name,
            print_expression(iterable),
            print_block(body, level),
            indent(level)
        ),
        Statement::Match { scrutinee, arms, .. } => {
            let mut out = format!("match ({}) {{\n", print_expression(scrutinee));
            for arm in arms {
                out.push_str(&indent(level + 1));
                out.push_str(&print_pattern(&arm.pattern));
                if let Some(guard) = &arm.guard {
                    out.push_str(&format!(" if {}", print_expression(guard)));
                }
                out.push_str(&format!(" => {},\n", print_statement(&arm.body, level + 1)));
            }
            out.push_str(&indent(level));
            out.push('}');
            out
        }
        Statement::Break { label, value, .. } => {
            let label = label.as_ref().map(|l| format!(" '{}", l.name)).unwrap_or_default();
            match value {
                Some(v) => format!("break{label} {};", print_expression(v)),
                None => format!("break{label};"),
            }
        }
        Statement::Continue { label, .. } => match label {
            Some(l) => format!("continue '{};", l.name),
            None => "continue;".to_string(),
        },
        Statement::Defer { expression, .. } => format!("defer {};", print_expression(expression)),
        Statement::Block { statements, .. } => format!("{{\n{}{}}}", print_block(statements, level), indent(level)),
    }
}

fn print_declaration(decl: &Declaration, level: usize) -> String {
    match decl {
        Declaration::Function(f) => {
            let pub_kw = if f.is_public { "pub " } else { "" };
            let async_kw = if f.is_async { "async " } else { "" };
            let params = f
                .params
                .iter()
                .map(|p| {
                    let mutkw = if p.is_mut { "mut " } else { "" };
                    format!("{mutkw}{}: {}", p.name.name, print_type(&p.type_annotation))
                })
                .collect::<Vec<_>>()
                .join(", ");
            let ret = f.return_type.as_ref().map(|t| format!(" -> {}", print_type(t))).unwrap_or_default();
            let where_clause = print_where_clause(&f.where_clause);
            format!(
                "{pub_kw}{async_kw}func {}{}({params}){ret}{where_clause} {{\n{}{}}}",
                f.name.name,
                print_generics(&f.generics),
                print_block(&f.body, level),
                indent(level)
            )
        }
        Declaration::Variable(v) => {
            let pub_kw = if v.is_public { "pub " } else { "" };
            let keyword = if v.is_mut { "var" } else { "let" };
            let ty = v.type_annotation.as_ref().map(|t| format!(": {}", print_type(t))).unwrap_or_default();
            format!("{pub_kw}{keyword} {}{ty} = {};", v.name.name, print_expression(&v.value))
        }
        Declaration::Struct(s) => {
            let pub_kw = if s.is_public { "pub " } else { "" };
            let fields = s
                .fields
                .iter()
                .map(|f| {
                    let fpub = if f.is_public { "pub " } else { "" };
                    format!("{}{fpub}{}: {}", indent(level + 1), f.name.name, print_type(&f.type_annotation))
                })
                .collect::<Vec<_>>()
                .join(",\n");
            format!(
                "{pub_kw}struct {}{}{} {{\n{fields}\n{}}}",
                s.name.name,
                print_generics(&s.generics),
                print_where_clause(&s.where_clause),
                indent(level)
            )
        }
        Declaration::Enum(e) => {
            let pub_kw = if e.is_public { "pub " } else { "" };
            let variants = e
                .variants
                .iter()
                .map(|v| format!("{}{}", indent(level + 1), print_enum_variant(v)))
                .collect::<Vec<_>>()
                .join(",\n");
            format!("{pub_kw}enum {}{} {{\n{variants}\n{}}}", e.name.name, print_generics(&e.generics), indent(level))
        }
        Declaration::Trait(t) => {
            let pub_kw = if t.is_public { "pub " } else { "" };
            let methods = t
                .methods
                .iter()
                .map(|m| print_trait_method(m, level + 1))
                .collect::<Vec<_>>()
                .join("\n");
            format!("{pub_kw}trait {}{} {{\n{methods}\n{}}}", t.name.name, print_generics(&t.generics), indent(level))
        }
        Declaration::Impl(i) => {
            let head = match &i.trait_name {
                Some(path) => format!("{} for {}", print_path(path), print_type(&i.target)),
                None => print_type(&i.target),
            };
            let methods = i
                .methods
                .iter()
                .map(|m| print_declaration(&Declaration::Function(m.clone()), level + 1))
                .collect::<Vec<_>>()
                .join("\n\n");
            format!(
                "impl {}{head}{} {{\n{methods}\n{}}}",
                print_generics(&i.generics),
                print_where_clause(&i.where_clause),
                indent(level)
            )
        }
        Declaration::TypeAlias(t) => {
            let pub_kw = if t.is_public { "pub " } else { "" };
            format!("{pub_kw}type {}{} = {};", t.name.name, print_generics(&t.generics), print_type(&t.aliased))
        }
        Declaration::Newtype(n) => {
            let pub_kw = if n.is_public { "pub " } else { "" };
            format!("{pub_kw}newtype {} = {};", n.name.name, print_type(&n.wrapped))
        }
        Declaration::Import(i) => {
            let path = print_path(&i.path);
            let wildcard = if i.is_wildcard { "::*" } else { "" };
            match &i.alias {
                Some(alias) => format!("import {path}{wildcard} as {};", alias.name),
                None => format!("import {path}{wildcard};"),
            }
        }
        Declaration::Export(e) => {
            if let [item] = e.items.as_slice() {
                match &item.alias {
                    Some(alias) => format!("export {} as {};", item.name.name, alias.name),
                    None => format!("export {};", item.name.name),
                }
            } else {
                let items = e
                    .items
                    .iter()
                    .map(|item| match &item.alias {
                        Some(alias) => format!("{} as {}", item.name.name, alias.name),
                        None => item.name.name.clone(),
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("export {{ {items} }};")
            }
        }
        Declaration::Macro(m) => {
            let matchers = m
                .matchers
                .iter()
                .map(|matcher| {
                    let pattern = matcher
                        .pattern
                        .iter()
                        .map(print_macro_pattern_element)
                        .collect::<Vec<_>>()
                        .join(", ");
                    let variadic = if matcher.variadic {
                        if pattern.is_empty() { "...".to_string() } else { format!("{pattern}, ...") }
                    } else {
                        pattern
                    };
                    format!(
                        "{}({variadic}) => {{\n{}{}}}",
                        indent(level + 1),
                        print_block(&matcher.body, level + 1),
                        indent(level + 1)
                    )
                })
                .collect::<Vec<_>>()
                .join("\n");
            let hygiene = if m.hygienic { "" } else { " unsafe" };
            format!("macro {}{hygiene} {{\n{matchers}\n{}}}", m.name.name, indent(level))
        }
    }
}

fn print_macro_pattern_element(element: &crate::ast::MacroPatternElement) -> String {
    use crate::ast::{MacroParamKind, MacroQuantifier};
    let kind = match element.kind {
        MacroParamKind::Expr => "expr",
        MacroParamKind::Stmt => "stmt",
        MacroParamKind::Type => "type",
        MacroParamKind::Ident => "ident",
        MacroParamKind::Block => "block",
        MacroParamKind::Tokens => "tokens",
    };
    let quantifier = match element.quantifier {
        MacroQuantifier::Once => "",
        MacroQuantifier::ZeroOrMore => "*",
        MacroQuantifier::OneOrMore => "+",
        MacroQuantifier::ZeroOrOne => "?",
    };
    format!("@{}:{kind}{quantifier}", element.name.name)
}

fn print_enum_variant(variant: &crate::ast::EnumVariant) -> String {
    match &variant.kind {
        EnumVariantKind::Unit => variant.name.name.clone(),
        EnumVariantKind::Tuple(types) => {
            format!("{}({})", variant.name.name, types.iter().map(print_type).collect::<Vec<_>>().join(", "))
        }
        EnumVariantKind::Struct(fields) => format!(
            "{} {{ {} }}",
            variant.name.name,
            fields.iter().map(|f| format!("{}: {}", f.name.name, print_type(&f.type_annotation))).collect::<Vec<_>>().join(", ")
        ),
    }
}

fn print_trait_method(method: &crate::ast::TraitMethodSignature, level: usize) -> String {
    let params = method
        .params
        .iter()
        .map(|p| format!("{}: {}", p.name.name, print_type(&p.type_annotation)))
        .collect::<Vec<_>>()
        .join(", ");
    let ret = method.return_type.as_ref().map(|t| format!(" -> {}", print_type(t))).unwrap_or_default();
    match &method.default_body {
        Some(body) => format!(
            "{}fn {}({params}){ret} {{\n{}{}}}",
            indent(level),
            method.name.name,
            print_block(body, level),
            indent(level)
        ),
        None => format!("{}fn {}({params}){ret};", indent(level), method.name.name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn flags_empty_program_as_warning_not_error() {
        let report = collect_reports(&vec![], false);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn strict_mode_promotes_warnings_to_errors() {
        let report = collect_reports(&vec![], true);
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn clean_program_has_no_errors() {
        let outcome = parse("fn add(a: i32, b: i32) -> i32 {\nreturn a + b;\n}", "<t>");
        assert!(validate(&outcome.module).is_none());
    }

    #[test]
    fn count_nodes_counts_declaration_and_its_body() {
        let outcome = parse("fn f() {\nlet x = 1;\n}", "<t>");
        assert!(count_nodes(&outcome.module) >= 3);
    }

    #[test]
    fn pretty_print_round_trips_a_simple_function() {
        let outcome = parse("fn add(a: i32, b: i32) -> i32 {\nreturn (a + b);\n}", "<t>");
        let printed = pretty_print(&outcome.module);
        let reparsed = parse(&printed, "<t2>");
        assert!(!reparsed.has_errors(), "reparse failed: {:#?}\nprinted:\n{printed}", reparsed.diagnostics);
        assert_eq!(outcome.module, reparsed.module);
    }

    #[test]
    fn find_nodes_by_type_locates_every_function() {
        let outcome = parse("fn a() {\n}\nfn b() {\n}", "<t>");
        assert_eq!(find_nodes_by_type(&outcome.module, "function").len(), 2);
    }
}
