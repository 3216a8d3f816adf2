//! Precedence and associativity table (spec.md §4.1): a static, total
//! function from operator token kind to binding power, consulted by the
//! Pratt core's continuation decision (spec.md §4.3).

use crate::ast::BinaryOperator;
use crate::lexer::TokenKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
    /// Chaining the operator with itself is a parse error, not silently
    /// left- or right-associated (equality/comparison/range operators).
    None,
}

/// `(left binding power, right binding power)` per the standard Pratt
/// binding-power encoding: left-associative operators bind slightly
/// tighter on their right side (`rbp = lbp + 1`) so a later occurrence at
/// the same precedence stops the current parse; right-associative
/// operators invert that (`rbp = lbp - 1`) so the same precedence
/// continues into the right operand.
pub fn infix_binding_power(kind: &TokenKind) -> Option<(BinaryOperator, u8, Associativity)> {
    use BinaryOperator::*;
    use TokenKind as K;
    Some(match kind {
        K::OrOr => (Or, 4, Associativity::Left),
        K::AndAnd => (And, 6, Associativity::Left),
        K::Pipe => (BitOr, 8, Associativity::Left),
        K::Caret => (BitXor, 10, Associativity::Left),
        K::Amp => (BitAnd, 12, Associativity::Left),
        K::EqEq => (Equals, 14, Associativity::None),
        K::NotEq => (NotEquals, 14, Associativity::None),
        K::Lt => (LessThan, 16, Associativity::None),
        K::Gt => (GreaterThan, 16, Associativity::None),
        K::Le => (LessOrEqual, 16, Associativity::None),
        K::Ge => (GreaterOrEqual, 16, Associativity::None),
        K::DotDot => (Range, 18, Associativity::None),
        K::DotDotEq => (RangeInclusive, 18, Associativity::None),
        K::Shl => (Shl, 20, Associativity::Left),
        K::Shr => (Shr, 20, Associativity::Left),
        K::Plus => (Add, 22, Associativity::Left),
        K::Minus => (Subtract, 22, Associativity::Left),
        K::Star => (Multiply, 24, Associativity::Left),
        K::Slash => (Divide, 24, Associativity::Left),
        K::Percent => (Modulo, 24, Associativity::Left),
        K::StarStar => (Power, 26, Associativity::Right),
        _ => return None,
    })
}

/// Binding power for prefix unary operators, all right-associative by
/// construction (`-!-x` parses as `-(!(-x))`).
pub fn prefix_binding_power(kind: &TokenKind) -> Option<(crate::ast::UnaryOperator, u8)> {
    use crate::ast::UnaryOperator::*;
    use TokenKind as K;
    Some(match kind {
        K::Minus => (Negate, 25),
        K::Bang => (Not, 25),
        K::Tilde => (BitNot, 25),
        K::Amp => (Ref, 25),
        K::Star => (Deref, 25),
        _ => return None,
    })
}

/// Binding power of the assignment/ternary/compound-assignment operators,
/// handled outside the main infix table since they are right-associative,
/// lower precedence than every [`infix_binding_power`] entry, and only
/// legal with an lvalue-shaped left operand (checked by the caller).
pub const ASSIGNMENT_BP: u8 = 2;
pub const TERNARY_BP: u8 = 2;

pub fn compound_assign_operator(kind: &TokenKind) -> Option<crate::ast::CompoundAssignOperator> {
    use crate::ast::CompoundAssignOperator::*;
    use TokenKind as K;
    Some(match kind {
        K::PlusEq => Add,
        K::MinusEq => Subtract,
        K::StarEq => Multiply,
        K::SlashEq => Divide,
        K::PercentEq => Modulo,
        K::StarStarEq => Power,
        K::AmpEq => BitAnd,
        K::PipeEq => BitOr,
        K::CaretEq => BitXor,
        K::ShlEq => Shl,
        K::ShrEq => Shr,
        _ => return None,
    })
}
