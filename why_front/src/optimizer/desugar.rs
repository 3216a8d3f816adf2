//! De-sugaring (spec.md §4.5 level 3): rewrites syntactic sugar into the
//! plainer forms the rest of the pipeline (and any downstream consumer)
//! can treat uniformly.
//!
//! Two rewrites, both structural and unconditional (no constant-context
//! needed, unlike [`super::constant_folding`]):
//! - `x OP= e` lowers to `x = x OP e`, duplicating the target so later
//!   passes only ever see the plain [`crate::ast::Expression::Assignment`]
//!   shape.
//! - `loop { .. }` lowers to `while true { .. }`, per spec.md §3's own
//!   description of `Statement::Loop` as sugar for a `while-true` -- kept
//!   as its own AST node through parsing (for round-trip/pretty-print
//!   fidelity, see `ast::statement`'s doc comment) and only erased here,
//!   at the point the spec's optimization pipeline is allowed to erase
//!   sugar.

use crate::ast::{Expression, Statement};
use crate::ast::{Declaration, Module};

use super::{Level, OptimizerPass, PassMetrics};

pub struct Desugar;

impl OptimizerPass for Desugar {
    fn name(&self) -> &'static str {
        "desugar"
    }

    fn level(&self) -> Level {
        Level::Aggressive
    }

    fn run(&self, module: Module) -> (Module, PassMetrics) {
        let mut metrics = PassMetrics::default();
        let module = module
            .into_iter()
            .map(|decl| desugar_declaration(decl, &mut metrics))
            .collect();
        (module, metrics)
    }
}

fn desugar_declaration(decl: Declaration, metrics: &mut PassMetrics) -> Declaration {
    match decl {
        Declaration::Function(mut f) => {
            f.body = desugar_statements(f.body, metrics);
            Declaration::Function(f)
        }
        Declaration::Impl(mut i) => {
            i.methods = i
                .methods
                .into_iter()
                .map(|mut m| {
                    m.body = desugar_statements(m.body, metrics);
                    m
                })
                .collect();
            Declaration::Impl(i)
        }
        Declaration::Macro(mut m) => {
            m.matchers = m
                .matchers
                .into_iter()
                .map(|mut matcher| {
                    matcher.body = desugar_statements(matcher.body, metrics);
                    matcher
                })
                .collect();
            Declaration::Macro(m)
        }
        other => other,
    }
}

fn desugar_statements(stmts: Vec<Statement>, metrics: &mut PassMetrics) -> Vec<Statement> {
    stmts.into_iter().map(|s| desugar_statement(s, metrics)).collect()
}

fn desugar_statement(stmt: Statement, metrics: &mut PassMetrics) -> Statement {
    metrics.nodes_processed += 1;
    match stmt {
        Statement::Loop { body, span } => {
            metrics.nodes_optimized += 1;
            Statement::While {
                condition: Expression::Bool { value: true, span: span.clone() },
                body: desugar_statements(body, metrics),
                span,
            }
        }
        Statement::Expression { expression, span } => {
            Statement::Expression { expression: desugar_expr(expression, metrics), span }
        }
        Statement::VarDecl { name, is_mut, type_annotation, value, span } => Statement::VarDecl {
            name,
            is_mut,
            type_annotation,
            value: value.map(|v| desugar_expr(v, metrics)),
            span,
        },
        Statement::Return { value, span } => {
            Statement::Return { value: value.map(|v| desugar_expr(v, metrics)), span }
        }
        Statement::If { condition, then_branch, else_branch, span } => Statement::If {
            condition: desugar_expr(condition, metrics),
            then_branch: desugar_statements(then_branch, metrics),
            else_branch: else_branch.map(|b| desugar_statements(b, metrics)),
            span,
        },
        Statement::While { condition, body, span } => Statement::While {
            condition: desugar_expr(condition, metrics),
            body: desugar_statements(body, metrics),
            span,
        },
        Statement::For { init, condition, step, body, span } => Statement::For {
            init: init.map(|s| Box::new(desugar_statement(*s, metrics))),
            condition: condition.map(|c| desugar_expr(c, metrics)),
            step: step.map(|s| desugar_expr(s, metrics)),
            body: desugar_statements(body, metrics),
            span,
        },
        Statement::ForIn { binding, iterable, body, span } => Statement::ForIn {
            binding,
            iterable: desugar_expr(iterable, metrics),
            body: desugar_statements(body, metrics),
            span,
        },
        Statement::Match { scrutinee, arms, span } => Statement::Match {
            scrutinee: desugar_expr(scrutinee, metrics),
            arms: arms
                .into_iter()
                .map(|mut arm| {
                    arm.guard = arm.guard.map(|g| desugar_expr(g, metrics));
                    arm.body = Box::new(desugar_statement(*arm.body, metrics));
                    arm
                })
                .collect(),
            span,
        },
        Statement::Break { label, value, span } => {
            Statement::Break { label, value: value.map(|v| desugar_expr(v, metrics)), span }
        }
        Statement::Continue { label, span } => Statement::Continue { label, span },
        Statement::Defer { expression, span } => {
            Statement::Defer { expression: desugar_expr(expression, metrics), span }
        }
        Statement::Block { statements, span } => {
            Statement::Block { statements: desugar_statements(statements, metrics), span }
        }
    }
}

fn desugar_expr(expr: Expression, metrics: &mut PassMetrics) -> Expression {
    metrics.nodes_processed += 1;
    match expr {
        Expression::CompoundAssignment { operator, target, value, span } => {
            metrics.nodes_optimized += 1;
            let target = desugar_expr(*target, metrics);
            let value = desugar_expr(*value, metrics);
            let binary_span = target.span().merge(value.span());
            Expression::Assignment {
                value: Box::new(Expression::Binary {
                    operator: operator.as_binary(),
                    left: Box::new(target.clone()),
                    right: Box::new(value),
                    span: binary_span,
                }),
                target: Box::new(target),
                span,
            }
        }
        Expression::Unary { operator, operand, span } => {
            Expression::Unary { operator, operand: Box::new(desugar_expr(*operand, metrics)), span }
        }
        Expression::Binary { operator, left, right, span } => Expression::Binary {
            operator,
            left: Box::new(desugar_expr(*left, metrics)),
            right: Box::new(desugar_expr(*right, metrics)),
            span,
        },
        Expression::Assignment { target, value, span } => Expression::Assignment {
            target: Box::new(desugar_expr(*target, metrics)),
            value: Box::new(desugar_expr(*value, metrics)),
            span,
        },
        Expression::Ternary { condition, then_branch, else_branch, span } => Expression::Ternary {
            condition: Box::new(desugar_expr(*condition, metrics)),
            then_branch: Box::new(desugar_expr(*then_branch, metrics)),
            else_branch: Box::new(desugar_expr(*else_branch, metrics)),
            span,
        },
        Expression::Call { callee, args, span } => Expression::Call {
            callee: Box::new(desugar_expr(*callee, metrics)),
            args: args.into_iter().map(|a| desugar_expr(a, metrics)).collect(),
            span,
        },
        Expression::Index { target, index, span } => Expression::Index {
            target: Box::new(desugar_expr(*target, metrics)),
            index: Box::new(desugar_expr(*index, metrics)),
            span,
        },
        Expression::Member { target, member, span } => {
            Expression::Member { target: Box::new(desugar_expr(*target, metrics)), member, span }
        }
        Expression::ArrayLiteral { elements, span } => Expression::ArrayLiteral {
            elements: elements.into_iter().map(|e| desugar_expr(e, metrics)).collect(),
            span,
        },
        Expression::StructLiteral { path, fields, span } => Expression::StructLiteral {
            path,
            fields: fields
                .into_iter()
                .map(|mut f| {
                    f.value = desugar_expr(f.value, metrics);
                    f
                })
                .collect(),
            span,
        },
        Expression::Grouping { inner, span } => {
            Expression::Grouping { inner: Box::new(desugar_expr(*inner, metrics)), span }
        }
        Expression::Block { statements, trailing, span } => Expression::Block {
            statements: desugar_statements(statements, metrics),
            trailing: trailing.map(|t| Box::new(desugar_expr(*t, metrics))),
            span,
        },
        Expression::If { condition, then_branch, else_branch, span } => Expression::If {
            condition: Box::new(desugar_expr(*condition, metrics)),
            then_branch: Box::new(desugar_expr(*then_branch, metrics)),
            else_branch: else_branch.map(|b| Box::new(desugar_expr(*b, metrics))),
            span,
        },
        Expression::TemplateString { parts, span } => Expression::TemplateString {
            parts: parts
                .into_iter()
                .map(|p| match p {
                    crate::ast::TemplateStringPart::Interpolation(e) => {
                        crate::ast::TemplateStringPart::Interpolation(Box::new(desugar_expr(*e, metrics)))
                    }
                    other => other,
                })
                .collect(),
            span,
        },
        Expression::MacroInvocation { name, args, span } => Expression::MacroInvocation {
            name,
            args: args.into_iter().map(|a| desugar_expr(a, metrics)).collect(),
            span,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinaryOperator;
    use crate::parser::test_helpers::parse_function;

    fn desugar(body_src: &str) -> Vec<Statement> {
        let mut metrics = PassMetrics::default();
        desugar_statements(parse_function(&format!("fn f() {{\n{body_src}\n}}")).body, &mut metrics)
    }

    #[test]
    fn lowers_compound_assignment() {
        let stmts = desugar("x += 1;");
        match &stmts[0] {
            Statement::Expression { expression: Expression::Assignment { value, .. }, .. } => {
                assert!(matches!(**value, Expression::Binary { operator: BinaryOperator::Add, .. }));
            }
            other => panic!("expected a plain assignment, got {other:?}"),
        }
    }

    #[test]
    fn lowers_loop_to_while_true() {
        let stmts = desugar("loop {\nbreak;\n}");
        match &stmts[0] {
            Statement::While { condition: Expression::Bool { value: true, .. }, .. } => {}
            other => panic!("expected while(true), got {other:?}"),
        }
    }
}
