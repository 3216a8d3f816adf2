//! Dead-code detection and removal (spec.md §4.5 level 2).
//!
//! `if (const)` collapses to whichever branch the condition selects (or
//! vanishes if it selects a missing `else`); `while (false) { .. }` is
//! removed outright; statements lexically following a diverging statement
//! (`return`/`break`/`continue`) in the same block are dropped, since
//! control never reaches them. Emptied blocks are left as empty blocks
//! rather than invented into some unit value -- this language has no unit
//! expression literal to substitute, so "propagates upward" here means an
//! enclosing `if`/`while`/function body is left with zero statements
//! rather than forcing removal of the parent construct itself.

use crate::ast::{Declaration, Expression, Module, Statement, TemplateStringPart};

use super::{Level, OptimizerPass, PassMetrics};

pub struct DeadCodeElimination;

impl OptimizerPass for DeadCodeElimination {
    fn name(&self) -> &'static str {
        "dead-code-elimination"
    }

    fn level(&self) -> Level {
        Level::Default
    }

    fn run(&self, module: Module) -> (Module, PassMetrics) {
        let mut metrics = PassMetrics::default();
        let module = module
            .into_iter()
            .map(|decl| optimize_declaration(decl, &mut metrics))
            .collect();
        (module, metrics)
    }
}

fn optimize_declaration(decl: Declaration, metrics: &mut PassMetrics) -> Declaration {
    match decl {
        Declaration::Function(mut f) => {
            f.body = optimize_statements(f.body, metrics);
            Declaration::Function(f)
        }
        Declaration::Impl(mut i) => {
            i.methods = i
                .methods
                .into_iter()
                .map(|mut m| {
                    m.body = optimize_statements(m.body, metrics);
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
                    matcher.body = optimize_statements(matcher.body, metrics);
                    matcher
                })
                .collect();
            Declaration::Macro(m)
        }
        other => other,
    }
}

/// Rewrites a statement list: inlines/elides constant `if` and `while`,
/// recurses into nested bodies and expressions, then truncates anything
/// lexically after the first unconditionally-diverging statement.
fn optimize_statements(stmts: Vec<Statement>, metrics: &mut PassMetrics) -> Vec<Statement> {
    let mut out = Vec::with_capacity(stmts.len());
    for stmt in stmts {
        metrics.nodes_processed += 1;
        optimize_statement_into(stmt, &mut out, metrics);
    }
    truncate_after_divergence(&mut out, metrics);
    out
}

fn truncate_after_divergence(out: &mut Vec<Statement>, metrics: &mut PassMetrics) {
    if let Some(idx) = out.iter().position(|s| s.diverges()) {
        if idx + 1 < out.len() {
            metrics.nodes_optimized += 1;
            metrics.dead_code_removed += out.len() - (idx + 1);
            out.truncate(idx + 1);
        }
    }
}

/// Optimizes one statement, pushing zero, one, or many replacement
/// statements onto `out` -- `if (const)` splices its taken branch's
/// statements directly into the caller's list rather than nesting them
/// under a now-pointless conditional.
fn optimize_statement_into(stmt: Statement, out: &mut Vec<Statement>, metrics: &mut PassMetrics) {
    match stmt {
        Statement::If { condition, then_branch, else_branch, span } => {
            let condition = optimize_expr(condition, metrics);
            let then_branch = optimize_statements(then_branch, metrics);
            let else_branch = else_branch.map(|b| optimize_statements(b, metrics));
            match &condition {
                Expression::Bool { value: true, .. } => {
                    metrics.nodes_optimized += 1;
                    if else_branch.is_some() {
                        metrics.dead_code_removed += 1;
                    }
                    out.extend(then_branch);
                }
                Expression::Bool { value: false, .. } => {
                    metrics.nodes_optimized += 1;
                    metrics.dead_code_removed += 1;
                    if let Some(else_branch) = else_branch {
                        out.extend(else_branch);
                    }
                }
                _ => out.push(Statement::If { condition, then_branch, else_branch, span }),
            }
        }
        Statement::While { condition, body, span } => {
            let condition = optimize_expr(condition, metrics);
            if matches!(condition, Expression::Bool { value: false, .. }) {
                metrics.nodes_optimized += 1;
                metrics.dead_code_removed += 1;
            } else {
                let body = optimize_statements(body, metrics);
                out.push(Statement::While { condition, body, span });
            }
        }
        Statement::Loop { body, span } => {
            out.push(Statement::Loop { body: optimize_statements(body, metrics), span });
        }
        Statement::For { init, condition, step, body, span } => {
            let init = init.map(|s| Box::new(optimize_for_init(*s, metrics, &span)));
            let condition = condition.map(|c| optimize_expr(c, metrics));
            let step = step.map(|s| optimize_expr(s, metrics));
            let body = optimize_statements(body, metrics);
            out.push(Statement::For { init, condition, step, body, span });
        }
        Statement::ForIn { binding, iterable, body, span } => {
            let iterable = optimize_expr(iterable, metrics);
            let body = optimize_statements(body, metrics);
            out.push(Statement::ForIn { binding, iterable, body, span });
        }
        Statement::Match { scrutinee, arms, span } => {
            let scrutinee = optimize_expr(scrutinee, metrics);
            let arms = arms
                .into_iter()
                .map(|mut arm| {
                    arm.guard = arm.guard.map(|g| optimize_expr(g, metrics));
                    let body_span = arm.body.span().clone();
                    arm.body = Box::new(optimize_single_statement(*arm.body, metrics, &body_span));
                    arm
                })
                .collect();
            out.push(Statement::Match { scrutinee, arms, span });
        }
        Statement::Break { label, value, span } => {
            out.push(Statement::Break { label, value: value.map(|v| optimize_expr(v, metrics)), span });
        }
        Statement::Return { value, span } => {
            out.push(Statement::Return { value: value.map(|v| optimize_expr(v, metrics)), span });
        }
        Statement::Defer { expression, span } => {
            out.push(Statement::Defer { expression: optimize_expr(expression, metrics), span });
        }
        Statement::VarDecl { name, is_mut, type_annotation, value, span } => {
            out.push(Statement::VarDecl {
                name,
                is_mut,
                type_annotation,
                value: value.map(|v| optimize_expr(v, metrics)),
                span,
            });
        }
        Statement::Expression { expression, span } => {
            out.push(Statement::Expression { expression: optimize_expr(expression, metrics), span });
        }
        Statement::Continue { label, span } => out.push(Statement::Continue { label, span }),
        Statement::Block { statements, span } => {
            let statements = optimize_statements(statements, metrics);
            if statements.is_empty() {
                metrics.nodes_optimized += 1;
                metrics.dead_code_removed += 1;
            } else {
                out.push(Statement::Block { statements, span });
            }
        }
    }
}

/// `for` loop initializers are restricted by the grammar to a single
/// variable-declaration or expression statement, so optimizing one never
/// needs to splice in a different count of statements -- unlike a
/// general statement list, this always produces exactly one.
fn optimize_for_init(stmt: Statement, metrics: &mut PassMetrics, span: &crate::lexer::Span) -> Statement {
    optimize_single_statement(stmt, metrics, span)
}

/// Like [`optimize_for_init`], but for any grammar position restricted to
/// exactly one statement (a `for` initializer, a match arm body): if
/// optimizing drops the statement entirely (e.g. a dead `if false {}`),
/// substitute an inert `true` expression-statement rather than vanishing.
fn optimize_single_statement(stmt: Statement, metrics: &mut PassMetrics, span: &crate::lexer::Span) -> Statement {
    let mut probe = Vec::with_capacity(1);
    optimize_statement_into(stmt, &mut probe, metrics);
    probe.into_iter().next().unwrap_or_else(|| Statement::Expression {
        expression: Expression::Bool { value: true, span: span.clone() },
        span: span.clone(),
    })
}

fn optimize_expr(expr: Expression, metrics: &mut PassMetrics) -> Expression {
    metrics.nodes_processed += 1;
    match expr {
        Expression::Block { statements, trailing, span } => {
            let statements = optimize_statements(statements, metrics);
            let trailing = trailing.map(|t| Box::new(optimize_expr(*t, metrics)));
            Expression::Block { statements, trailing, span }
        }
        Expression::If { condition, then_branch, else_branch, span } => Expression::If {
            condition: Box::new(optimize_expr(*condition, metrics)),
            then_branch: Box::new(optimize_expr(*then_branch, metrics)),
            else_branch: else_branch.map(|b| Box::new(optimize_expr(*b, metrics))),
            span,
        },
        Expression::Unary { operator, operand, span } => {
            Expression::Unary { operator, operand: Box::new(optimize_expr(*operand, metrics)), span }
        }
        Expression::Binary { operator, left, right, span } => Expression::Binary {
            operator,
            left: Box::new(optimize_expr(*left, metrics)),
            right: Box::new(optimize_expr(*right, metrics)),
            span,
        },
        Expression::Assignment { target, value, span } => Expression::Assignment {
            target: Box::new(optimize_expr(*target, metrics)),
            value: Box::new(optimize_expr(*value, metrics)),
            span,
        },
        Expression::CompoundAssignment { operator, target, value, span } => Expression::CompoundAssignment {
            operator,
            target: Box::new(optimize_expr(*target, metrics)),
            value: Box::new(optimize_expr(*value, metrics)),
            span,
        },
        Expression::Ternary { condition, then_branch, else_branch, span } => Expression::Ternary {
            condition: Box::new(optimize_expr(*condition, metrics)),
            then_branch: Box::new(optimize_expr(*then_branch, metrics)),
            else_branch: Box::new(optimize_expr(*else_branch, metrics)),
            span,
        },
        Expression::Call { callee, args, span } => Expression::Call {
            callee: Box::new(optimize_expr(*callee, metrics)),
            args: args.into_iter().map(|a| optimize_expr(a, metrics)).collect(),
            span,
        },
        Expression::Index { target, index, span } => Expression::Index {
            target: Box::new(optimize_expr(*target, metrics)),
            index: Box::new(optimize_expr(*index, metrics)),
            span,
        },
        Expression::Member { target, member, span } => {
            Expression::Member { target: Box::new(optimize_expr(*target, metrics)), member, span }
        }
        Expression::ArrayLiteral { elements, span } => Expression::ArrayLiteral {
            elements: elements.into_iter().map(|e| optimize_expr(e, metrics)).collect(),
            span,
        },
        Expression::StructLiteral { path, fields, span } => Expression::StructLiteral {
            path,
            fields: fields
                .into_iter()
                .map(|mut f| {
                    f.value = optimize_expr(f.value, metrics);
                    f
                })
                .collect(),
            span,
        },
        Expression::Grouping { inner, span } => {
            Expression::Grouping { inner: Box::new(optimize_expr(*inner, metrics)), span }
        }
        Expression::TemplateString { parts, span } => Expression::TemplateString {
            parts: parts
                .into_iter()
                .map(|p| match p {
                    TemplateStringPart::Interpolation(e) => {
                        TemplateStringPart::Interpolation(Box::new(optimize_expr(*e, metrics)))
                    }
                    other => other,
                })
                .collect(),
            span,
        },
        Expression::MacroInvocation { name, args, span } => Expression::MacroInvocation {
            name,
            args: args.into_iter().map(|a| optimize_expr(a, metrics)).collect(),
            span,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::FunctionDeclaration;
    use crate::parser::test_helpers::parse_function;

    fn optimize(f: FunctionDeclaration) -> Vec<Statement> {
        let mut metrics = PassMetrics::default();
        optimize_statements(f.body, &mut metrics)
    }

    #[test]
    fn removes_dead_while_loop() {
        let body = optimize(parse_function("fn f() {\nwhile false {\n1;\n}\n}"));
        assert!(body.is_empty());
    }

    #[test]
    fn collapses_true_if_to_then_branch() {
        let body = optimize(parse_function("fn f() {\nif true {\nreturn 1;\n} else {\nreturn 2;\n}\n}"));
        assert_eq!(body.len(), 1);
        assert!(matches!(body[0], Statement::Return { .. }));
    }

    #[test]
    fn collapses_false_if_to_else_branch() {
        let body = optimize(parse_function("fn f() {\nif false {\nreturn 1;\n} else {\nreturn 2;\n}\n}"));
        assert_eq!(body.len(), 1);
        match &body[0] {
            Statement::Return { value: Some(Expression::Integer { value, .. }), .. } => assert_eq!(*value, 2),
            other => panic!("expected return 2, got {other:?}"),
        }
    }

    #[test]
    fn drops_statements_after_return() {
        let body = optimize(parse_function("fn f() {\nreturn 1;\nlet x = 2;\n}"));
        assert_eq!(body.len(), 1);
    }

    #[test]
    fn drops_statements_after_break_inside_loop_body() {
        let mut metrics = PassMetrics::default();
        let f = parse_function("fn f() {\nwhile true {\nbreak;\nlet x = 1;\n}\n}");
        let body = optimize_statements(f.body, &mut metrics);
        match &body[0] {
            Statement::While { body, .. } => assert_eq!(body.len(), 1),
            other => panic!("expected while loop, got {other:?}"),
        }
    }
}
