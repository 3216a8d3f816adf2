//! Constant folding and constant-identifier substitution (spec.md §4.5
//! level 1). Integer arithmetic wraps on overflow (`wrapping_*`), matching
//! how the target language's fixed-width integers behave at runtime;
//! division and modulo by a literal zero are deliberately left unfolded
//! so the diagnostic stays at the operation that would actually trap.

use std::collections::HashMap;

use crate::ast::{
    BinaryOperator, Declaration, Expression, Module, Statement, UnaryOperator,
};

use super::{Level, OptimizerPass, PassMetrics};

pub struct ConstantFolding;

impl OptimizerPass for ConstantFolding {
    fn name(&self) -> &'static str {
        "constant-folding"
    }

    fn level(&self) -> Level {
        Level::Basic
    }

    fn run(&self, module: Module) -> (Module, PassMetrics) {
        let mut metrics = PassMetrics::default();
        let consts = collect_constants(&module);
        let module = module
            .into_iter()
            .map(|decl| fold_declaration(decl, &consts, &mut metrics))
            .collect();
        (module, metrics)
    }
}

/// Top-level variable declarations whose initializer is already a literal
/// are substitutable at every use site. Declarations whose initializer is
/// not (yet) a literal are simply not included -- a later iteration of the
/// fixed-point loop may fold them into literals and pick them up then.
fn collect_constants(module: &Module) -> HashMap<String, Expression> {
    module
        .iter()
        .filter_map(|decl| match decl {
            Declaration::Variable(v) if !v.is_mut && v.value.is_literal() => {
                Some((v.name.name.clone(), v.value.clone()))
            }
            _ => None,
        })
        .collect()
}

fn fold_declaration(decl: Declaration, consts: &HashMap<String, Expression>, metrics: &mut PassMetrics) -> Declaration {
    match decl {
        Declaration::Function(mut f) => {
            f.body = fold_statements(f.body, consts, metrics);
            Declaration::Function(f)
        }
        Declaration::Variable(mut v) => {
            v.value = fold_expr(v.value, consts, metrics);
            Declaration::Variable(v)
        }
        Declaration::Impl(mut i) => {
            i.methods = i
                .methods
                .into_iter()
                .map(|mut m| {
                    m.body = fold_statements(m.body, consts, metrics);
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
                    matcher.body = fold_statements(matcher.body, consts, metrics);
                    matcher
                })
                .collect();
            Declaration::Macro(m)
        }
        other => other,
    }
}

fn fold_statements(
    statements: Vec<Statement>,
    consts: &HashMap<String, Expression>,
    metrics: &mut PassMetrics,
) -> Vec<Statement> {
    statements
        .into_iter()
        .map(|s| fold_statement(s, consts, metrics))
        .collect()
}

fn fold_statement(stmt: Statement, consts: &HashMap<String, Expression>, metrics: &mut PassMetrics) -> Statement {
    metrics.nodes_processed += 1;
    match stmt {
        Statement::Expression { expression, span } => {
            Statement::Expression { expression: fold_expr(expression, consts, metrics), span }
        }
        Statement::VarDecl { name, is_mut, type_annotation, value, span } => Statement::VarDecl {
            name,
            is_mut,
            type_annotation,
            value: value.map(|v| fold_expr(v, consts, metrics)),
            span,
        },
        Statement::Return { value, span } => {
            Statement::Return { value: value.map(|v| fold_expr(v, consts, metrics)), span }
        }
        Statement::If { condition, then_branch, else_branch, span } => Statement::If {
            condition: fold_expr(condition, consts, metrics),
            then_branch: fold_statements(then_branch, consts, metrics),
            else_branch: else_branch.map(|b| fold_statements(b, consts, metrics)),
            span,
        },
        Statement::While { condition, body, span } => Statement::While {
            condition: fold_expr(condition, consts, metrics),
            body: fold_statements(body, consts, metrics),
            span,
        },
        Statement::Loop { body, span } => Statement::Loop { body: fold_statements(body, consts, metrics), span },
        Statement::For { init, condition, step, body, span } => Statement::For {
            init: init.map(|s| Box::new(fold_statement(*s, consts, metrics))),
            condition: condition.map(|c| fold_expr(c, consts, metrics)),
            step: step.map(|s| fold_expr(s, consts, metrics)),
            body: fold_statements(body, consts, metrics),
            span,
        },
        Statement::ForIn { binding, iterable, body, span } => Statement::ForIn {
            binding,
            iterable: fold_expr(iterable, consts, metrics),
            body: fold_statements(body, consts, metrics),
            span,
        },
        Statement::Match { scrutinee, arms, span } => Statement::Match {
            scrutinee: fold_expr(scrutinee, consts, metrics),
            arms: arms
                .into_iter()
                .map(|mut arm| {
                    arm.body = Box::new(fold_statement(*arm.body, consts, metrics));
                    arm
                })
                .collect(),
            span,
        },
        Statement::Break { label, value, span } => {
            Statement::Break { label, value: value.map(|v| fold_expr(v, consts, metrics)), span }
        }
        Statement::Continue { label, span } => Statement::Continue { label, span },
        Statement::Defer { expression, span } => Statement::Defer { expression: fold_expr(expression, consts, metrics), span },
        Statement::Block { statements, span } => Statement::Block { statements: fold_statements(statements, consts, metrics), span },
    }
}

fn fold_expr(expr: Expression, consts: &HashMap<String, Expression>, metrics: &mut PassMetrics) -> Expression {
    metrics.nodes_processed += 1;
    match expr {
        Expression::Path { path, span } if path.segments.len() == 1 => {
            if let Some(value) = consts.get(&path.last().name) {
                metrics.nodes_optimized += 1;
                metrics.constants_folded += 1;
                clone_at(value, span)
            } else {
                Expression::Path { path, span }
            }
        }
        Expression::Unary { operator, operand, span } => {
            let operand = fold_expr(*operand, consts, metrics);
            match fold_unary(operator, &operand, span.clone()) {
                Some(folded) => {
                    metrics.nodes_optimized += 1;
                    metrics.constants_folded += 1;
                    folded
                }
                None => Expression::Unary { operator, operand: Box::new(operand), span },
            }
        }
        Expression::Binary { operator, left, right, span } => {
            let left = fold_expr(*left, consts, metrics);
            let right = fold_expr(*right, consts, metrics);
            match fold_binary(operator, &left, &right, span.clone()) {
                Some(folded) => {
                    metrics.nodes_optimized += 1;
                    metrics.constants_folded += 1;
                    folded
                }
                None => Expression::Binary { operator, left: Box::new(left), right: Box::new(right), span },
            }
        }
        Expression::Grouping { inner, span } => {
            let inner = fold_expr(*inner, consts, metrics);
            if inner.is_literal() {
                metrics.nodes_optimized += 1;
                metrics.constants_folded += 1;
                clone_at(&inner, span)
            } else {
                Expression::Grouping { inner: Box::new(inner), span }
            }
        }
        Expression::Ternary { condition, then_branch, else_branch, span } => {
            let condition = fold_expr(*condition, consts, metrics);
            let then_branch = fold_expr(*then_branch, consts, metrics);
            let else_branch = fold_expr(*else_branch, consts, metrics);
            if let Expression::Bool { value, .. } = condition {
                metrics.nodes_optimized += 1;
                metrics.constants_folded += 1;
                return if value { then_branch } else { else_branch };
            }
            Expression::Ternary {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
                span,
            }
        }
        Expression::Call { callee, args, span } => Expression::Call {
            callee: Box::new(fold_expr(*callee, consts, metrics)),
            args: args.into_iter().map(|a| fold_expr(a, consts, metrics)).collect(),
            span,
        },
        Expression::Index { target, index, span } => Expression::Index {
            target: Box::new(fold_expr(*target, consts, metrics)),
            index: Box::new(fold_expr(*index, consts, metrics)),
            span,
        },
        Expression::Member { target, member, span } => {
            Expression::Member { target: Box::new(fold_expr(*target, consts, metrics)), member, span }
        }
        Expression::ArrayLiteral { elements, span } => Expression::ArrayLiteral {
            elements: elements.into_iter().map(|e| fold_expr(e, consts, metrics)).collect(),
            span,
        },
        Expression::Assignment { target, value, span } => Expression::Assignment {
            target: Box::new(fold_expr(*target, consts, metrics)),
            value: Box::new(fold_expr(*value, consts, metrics)),
            span,
        },
        Expression::CompoundAssignment { operator, target, value, span } => Expression::CompoundAssignment {
            operator,
            target: Box::new(fold_expr(*target, consts, metrics)),
            value: Box::new(fold_expr(*value, consts, metrics)),
            span,
        },
        Expression::Block { statements, trailing, span } => Expression::Block {
            statements: fold_statements(statements, consts, metrics),
            trailing: trailing.map(|t| Box::new(fold_expr(*t, consts, metrics))),
            span,
        },
        Expression::If { condition, then_branch, else_branch, span } => Expression::If {
            condition: Box::new(fold_expr(*condition, consts, metrics)),
            then_branch: Box::new(fold_expr(*then_branch, consts, metrics)),
            else_branch: else_branch.map(|b| Box::new(fold_expr(*b, consts, metrics))),
            span,
        },
        other => other,
    }
}

fn clone_at(expr: &Expression, span: crate::lexer::Span) -> Expression {
    let mut cloned = expr.clone();
    set_span(&mut cloned, span);
    cloned
}

fn set_span(expr: &mut Expression, span: crate::lexer::Span) {
    match expr {
        Expression::Integer { span: s, .. }
        | Expression::Float { span: s, .. }
        | Expression::Str { span: s, .. }
        | Expression::Char { span: s, .. }
        | Expression::Bool { span: s, .. }
        | Expression::Null { span: s } => *s = span,
        _ => {}
    }
}

fn fold_unary(operator: UnaryOperator, operand: &Expression, span: crate::lexer::Span) -> Option<Expression> {
    match (operator, operand) {
        (UnaryOperator::Negate, Expression::Integer { value, .. }) => {
            Some(Expression::Integer { value: value.wrapping_neg(), span })
        }
        (UnaryOperator::Negate, Expression::Float { value, .. }) => {
            Some(Expression::Float { value: -value, span })
        }
        (UnaryOperator::Not, Expression::Bool { value, .. }) => Some(Expression::Bool { value: !value, span }),
        (UnaryOperator::BitNot, Expression::Integer { value, .. }) => {
            Some(Expression::Integer { value: !value, span })
        }
        _ => None,
    }
}

fn fold_binary(
    operator: BinaryOperator,
    left: &Expression,
    right: &Expression,
    span: crate::lexer::Span,
) -> Option<Expression> {
    use BinaryOperator::*;
    match (left, right) {
        (Expression::Integer { value: a, .. }, Expression::Integer { value: b, .. }) => {
            fold_integer_binary(operator, *a, *b, span)
        }
        (Expression::Float { value: a, .. }, Expression::Float { value: b, .. }) => {
            fold_float_binary(operator, *a, *b, span)
        }
        (Expression::Bool { value: a, .. }, Expression::Bool { value: b, .. }) => match operator {
            And => Some(Expression::Bool { value: *a && *b, span }),
            Or => Some(Expression::Bool { value: *a || *b, span }),
            Equals => Some(Expression::Bool { value: a == b, span }),
            NotEquals => Some(Expression::Bool { value: a != b, span }),
            _ => None,
        },
        (Expression::Str { value: a, .. }, Expression::Str { value: b, .. }) => match operator {
            Add => Some(Expression::Str { value: format!("{a}{b}"), span }),
            Equals => Some(Expression::Bool { value: a == b, span }),
            NotEquals => Some(Expression::Bool { value: a != b, span }),
            _ => None,
        },
        _ => None,
    }
}

fn fold_integer_binary(operator: BinaryOperator, a: i64, b: i64, span: crate::lexer::Span) -> Option<Expression> {
    use BinaryOperator::*;
    Some(match operator {
        Add => Expression::Integer { value: a.wrapping_add(b), span },
        Subtract => Expression::Integer { value: a.wrapping_sub(b), span },
        Multiply => Expression::Integer { value: a.wrapping_mul(b), span },
        Divide if b != 0 => Expression::Integer { value: a.wrapping_div(b), span },
        Modulo if b != 0 => Expression::Integer { value: a.wrapping_rem(b), span },
        Power if b >= 0 => Expression::Integer { value: a.wrapping_pow(b as u32), span },
        BitAnd => Expression::Integer { value: a & b, span },
        BitOr => Expression::Integer { value: a | b, span },
        BitXor => Expression::Integer { value: a ^ b, span },
        Shl if (0..64).contains(&b) => Expression::Integer { value: a.wrapping_shl(b as u32), span },
        Shr if (0..64).contains(&b) => Expression::Integer { value: a.wrapping_shr(b as u32), span },
        Equals => Expression::Bool { value: a == b, span },
        NotEquals => Expression::Bool { value: a != b, span },
        LessThan => Expression::Bool { value: a < b, span },
        GreaterThan => Expression::Bool { value: a > b, span },
        LessOrEqual => Expression::Bool { value: a <= b, span },
        GreaterOrEqual => Expression::Bool { value: a >= b, span },
        _ => return None,
    })
}

fn fold_float_binary(operator: BinaryOperator, a: f64, b: f64, span: crate::lexer::Span) -> Option<Expression> {
    use BinaryOperator::*;
    Some(match operator {
        Add => Expression::Float { value: a + b, span },
        Subtract => Expression::Float { value: a - b, span },
        Multiply => Expression::Float { value: a * b, span },
        Divide if b != 0.0 => Expression::Float { value: a / b, span },
        Power => Expression::Float { value: a.powf(b), span },
        Equals => Expression::Bool { value: a == b, span },
        NotEquals => Expression::Bool { value: a != b, span },
        LessThan => Expression::Bool { value: a < b, span },
        GreaterThan => Expression::Bool { value: a > b, span },
        LessOrEqual => Expression::Bool { value: a <= b, span },
        GreaterOrEqual => Expression::Bool { value: a >= b, span },
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::test_helpers::parse_expression;

    fn fold_once(src: &str) -> Expression {
        let mut metrics = PassMetrics::default();
        fold_expr(parse_expression(src), &HashMap::new(), &mut metrics)
    }

    #[test]
    fn folds_arithmetic() {
        assert_eq!(fold_once("1 + 2 * 3"), Expression::Integer { value: 7, span: crate::lexer::Span::dummy() });
    }

    #[test]
    fn wraps_integer_overflow() {
        let expr = fold_once(&format!("{} + 1", i64::MAX));
        assert_eq!(expr, Expression::Integer { value: i64::MIN, span: crate::lexer::Span::dummy() });
    }

    #[test]
    fn leaves_division_by_zero_unfolded() {
        let expr = fold_once("1 / 0");
        assert!(matches!(expr, Expression::Binary { operator: BinaryOperator::Divide, .. }));
    }

    #[test]
    fn folds_string_concatenation() {
        assert_eq!(
            fold_once("\"a\" + \"b\""),
            Expression::Str { value: "ab".to_string(), span: crate::lexer::Span::dummy() }
        );
    }

    #[test]
    fn folds_constant_ternary() {
        assert_eq!(fold_once("true ? 1 : 2"), Expression::Integer { value: 1, span: crate::lexer::Span::dummy() });
    }
}
