//! Wrap-and-extract test helpers: parse a small snippet inside the
//! minimal surrounding context it needs (a function body for a statement
//! or expression, a bare module for a declaration) and pull the node back
//! out. Generalized off the grounding repo's `parser::test_helpers`
//! module, which does the same thing against its own (grammar-dependent)
//! parser.

use crate::ast::{Declaration, Expression, Statement};

use super::{parse, ParseOutcome};

fn assert_clean(outcome: &ParseOutcome) {
    assert!(
        !outcome.has_errors(),
        "expected no parse errors, got: {:#?}",
        outcome.diagnostics
    );
}

pub fn parse_module_single(source: &str) -> Declaration {
    let outcome = parse(source, "<test>");
    assert_clean(&outcome);
    assert_eq!(outcome.module.len(), 1, "expected exactly one declaration");
    outcome.module.into_iter().next().unwrap()
}

pub fn parse_function(source: &str) -> crate::ast::FunctionDeclaration {
    match parse_module_single(source) {
        Declaration::Function(f) => f,
        other => panic!("expected a function declaration, got {other:?}"),
    }
}

/// Wraps `body` as the block of a throwaway function and returns the
/// parsed statements of that block.
pub fn parse_statements(body: &str) -> Vec<Statement> {
    let wrapped = format!("fn main() {{\n{body}\n}}");
    parse_function(&wrapped).body
}

pub fn parse_statement(source: &str) -> Statement {
    let mut statements = parse_statements(source);
    assert_eq!(statements.len(), 1, "expected exactly one statement");
    statements.remove(0)
}

/// Wraps `source` as a single return expression inside a throwaway
/// function and returns the parsed expression.
pub fn parse_expression(source: &str) -> Expression {
    let wrapped = format!("fn main() {{\nreturn {source};\n}}");
    match parse_function(&wrapped).body.into_iter().next() {
        Some(Statement::Return { value: Some(expr), .. }) => expr,
        other => panic!("expected a single return statement, got {other:?}"),
    }
}

pub fn parse_type_name(source: &str) -> crate::ast::Type {
    let wrapped = format!("fn main() {{\nvar __probe: {source};\n}}");
    match parse_function(&wrapped).body.into_iter().next() {
        Some(Statement::VarDecl { type_annotation: Some(ty), .. }) => ty,
        other => panic!("expected a var declaration with a type annotation, got {other:?}"),
    }
}
