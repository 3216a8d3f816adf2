//! The statement sum. Dispatch-by-peek-token is the parser's job; this
//! module is only the tree shape: `if`, `while`, a dedicated C-style
//! `for` separate from `for-in`, `loop`, `match`, `break`/`continue`/
//! `defer`, variable declarations, expression statements, and return.

use crate::lexer::Span;

use super::common::Ident;
use super::expression::Expression;
use super::ty::Type;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MatchArm {
    pub pattern: Pattern,
    pub guard: Option<Expression>,
    pub body: Box<Statement>,
    pub span: Span,
}

/// Patterns are intentionally small: an identifier binding, a wildcard, a
/// literal to match against, or a path (unit enum variant / constant).
/// Nested destructuring patterns are intentionally not supported.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Pattern {
    Wildcard(Span),
    Binding(Ident),
    Literal(Expression),
    Path { path: super::common::Path, span: Span },
}

impl Pattern {
    pub fn span(&self) -> &Span {
        match self {
            Pattern::Wildcard(span) => span,
            Pattern::Binding(ident) => &ident.span,
            Pattern::Literal(expr) => expr.span(),
            Pattern::Path { span, .. } => span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Statement {
    Expression {
        expression: Expression,
        span: Span,
    },
    VarDecl {
        name: Ident,
        is_mut: bool,
        type_annotation: Option<Type>,
        value: Option<Expression>,
        span: Span,
    },
    Return {
        value: Option<Expression>,
        span: Span,
    },
    If {
        condition: Expression,
        then_branch: Vec<Statement>,
        else_branch: Option<Vec<Statement>>,
        span: Span,
    },
    While {
        condition: Expression,
        body: Vec<Statement>,
        span: Span,
    },
    Loop {
        body: Vec<Statement>,
        span: Span,
    },
    /// The C-style `for init; cond; step { .. }` form, kept distinct from
    /// [`Statement::ForIn`] since the two have unrelated grammars.
    For {
        init: Option<Box<Statement>>,
        condition: Option<Expression>,
        step: Option<Expression>,
        body: Vec<Statement>,
        span: Span,
    },
    ForIn {
        binding: Ident,
        iterable: Expression,
        body: Vec<Statement>,
        span: Span,
    },
    Match {
        scrutinee: Expression,
        arms: Vec<MatchArm>,
        span: Span,
    },
    Break {
        label: Option<Ident>,
        value: Option<Expression>,
        span: Span,
    },
    Continue {
        label: Option<Ident>,
        span: Span,
    },
    Defer {
        expression: Expression,
        span: Span,
    },
    /// A bare `{ .. }` block at statement granularity, e.g. a match arm
    /// body or a standalone nested scope. Unlike [`Expression::Block`] it
    /// has no trailing value.
    Block {
        statements: Vec<Statement>,
        span: Span,
    },
}

impl Statement {
    pub fn span(&self) -> &Span {
        match self {
            Statement::Expression { span, .. }
            | Statement::VarDecl { span, .. }
            | Statement::Return { span, .. }
            | Statement::If { span, .. }
            | Statement::While { span, .. }
            | Statement::Loop { span, .. }
            | Statement::For { span, .. }
            | Statement::ForIn { span, .. }
            | Statement::Match { span, .. }
            | Statement::Break { span, .. }
            | Statement::Continue { span, .. }
            | Statement::Defer { span, .. }
            | Statement::Block { span, .. } => span,
        }
    }

    /// Whether control unconditionally leaves the enclosing block here,
    /// used by the dead-code pass to drop everything lexically after this
    /// statement within the same block. A nested block diverges exactly
    /// when its own last statement does.
    pub fn diverges(&self) -> bool {
        match self {
            Statement::Return { .. } | Statement::Break { .. } | Statement::Continue { .. } => true,
            Statement::Block { statements, .. } => statements.last().is_some_and(|s| s.diverges()),
            _ => false,
        }
    }
}
