//! The expression sum. Binary/unary nodes carry `left`, `right`,
//! `operator` and a `span`, with a `span()` accessor; the full operator
//! set covers comparisons, arithmetic, bitwise, range and logical
//! operators, plus call/index/member/struct-literal/template-string/
//! macro-invocation forms.

use crate::lexer::Span;

use super::common::{Ident, Path};
use super::ty::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
    Equals,
    NotEquals,
    LessThan,
    GreaterThan,
    LessOrEqual,
    GreaterOrEqual,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    Range,
    RangeInclusive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum UnaryOperator {
    Negate,
    Not,
    BitNot,
    Deref,
    Ref,
}

/// A compound-assignment operator spelling (`+=`, `**=`, ...). The
/// desugar pass rewrites `x OP= y` into `x = x OP y` using the paired
/// plain [`BinaryOperator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum CompoundAssignOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl CompoundAssignOperator {
    pub fn as_binary(self) -> BinaryOperator {
        match self {
            CompoundAssignOperator::Add => BinaryOperator::Add,
            CompoundAssignOperator::Subtract => BinaryOperator::Subtract,
            CompoundAssignOperator::Multiply => BinaryOperator::Multiply,
            CompoundAssignOperator::Divide => BinaryOperator::Divide,
            CompoundAssignOperator::Modulo => BinaryOperator::Modulo,
            CompoundAssignOperator::Power => BinaryOperator::Power,
            CompoundAssignOperator::BitAnd => BinaryOperator::BitAnd,
            CompoundAssignOperator::BitOr => BinaryOperator::BitOr,
            CompoundAssignOperator::BitXor => BinaryOperator::BitXor,
            CompoundAssignOperator::Shl => BinaryOperator::Shl,
            CompoundAssignOperator::Shr => BinaryOperator::Shr,
        }
    }
}

/// One text run or interpolated expression inside a template string
/// literal (`f"hello ${name}!"`).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum TemplateStringPart {
    Text(String),
    Interpolation(Box<Expression>),
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StructLiteralField {
    pub name: Ident,
    pub value: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Expression {
    Integer { value: i64, span: Span },
    Float { value: f64, span: Span },
    Str { value: String, span: Span },
    Char { value: char, span: Span },
    Bool { value: bool, span: Span },
    Null { span: Span },
    Path { path: Path, span: Span },

    Unary {
        operator: UnaryOperator,
        operand: Box<Expression>,
        span: Span,
    },
    Binary {
        operator: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
        span: Span,
    },
    Assignment {
        target: Box<Expression>,
        value: Box<Expression>,
        span: Span,
    },
    CompoundAssignment {
        operator: CompoundAssignOperator,
        target: Box<Expression>,
        value: Box<Expression>,
        span: Span,
    },
    Ternary {
        condition: Box<Expression>,
        then_branch: Box<Expression>,
        else_branch: Box<Expression>,
        span: Span,
    },
    Call {
        callee: Box<Expression>,
        args: Vec<Expression>,
        span: Span,
    },
    Index {
        target: Box<Expression>,
        index: Box<Expression>,
        span: Span,
    },
    Member {
        target: Box<Expression>,
        member: Ident,
        span: Span,
    },
    ArrayLiteral {
        elements: Vec<Expression>,
        span: Span,
    },
    StructLiteral {
        path: Path,
        fields: Vec<StructLiteralField>,
        span: Span,
    },
    TemplateString {
        parts: Vec<TemplateStringPart>,
        span: Span,
    },
    MacroInvocation {
        name: Ident,
        args: Vec<Expression>,
        span: Span,
    },
    /// A parenthesized/block expression carried through so span enclosure
    /// and pretty-printing can round-trip `(x)` without folding it away
    /// before the optimizer gets a chance to.
    Grouping {
        inner: Box<Expression>,
        span: Span,
    },
    Block {
        statements: Vec<super::statement::Statement>,
        trailing: Option<Box<Expression>>,
        span: Span,
    },
    If {
        condition: Box<Expression>,
        then_branch: Box<Expression>,
        else_branch: Option<Box<Expression>>,
        span: Span,
    },
    /// A refinement type written in expression position, e.g. passing
    /// `{ x: i32 | x > 0 }` as a value where the grammar allows a type to
    /// be reified (spec.md §4.3's expression-prefix type-literal form).
    TypeLiteral {
        ty: Box<Type>,
        span: Span,
    },
}

impl Expression {
    pub fn span(&self) -> &Span {
        match self {
            Expression::Integer { span, .. }
            | Expression::Float { span, .. }
            | Expression::Str { span, .. }
            | Expression::Char { span, .. }
            | Expression::Bool { span, .. }
            | Expression::Null { span }
            | Expression::Path { span, .. }
            | Expression::Unary { span, .. }
            | Expression::Binary { span, .. }
            | Expression::Assignment { span, .. }
            | Expression::CompoundAssignment { span, .. }
            | Expression::Ternary { span, .. }
            | Expression::Call { span, .. }
            | Expression::Index { span, .. }
            | Expression::Member { span, .. }
            | Expression::ArrayLiteral { span, .. }
            | Expression::StructLiteral { span, .. }
            | Expression::TemplateString { span, .. }
            | Expression::MacroInvocation { span, .. }
            | Expression::Grouping { span, .. }
            | Expression::Block { span, .. }
            | Expression::If { span, .. }
            | Expression::TypeLiteral { span, .. } => span,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Expression::Integer { .. }
                | Expression::Float { .. }
                | Expression::Str { .. }
                | Expression::Char { .. }
                | Expression::Bool { .. }
                | Expression::Null { .. }
        )
    }
}
