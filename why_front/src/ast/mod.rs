//! AST node model: Declaration, Statement, Expression and Type sum
//! types, each carrying a [`crate::lexer::Span`] directly rather than a
//! type-checking-stage generic -- there's no downstream type checker in
//! this crate, so nothing needs one. One file per node family.

pub mod common;
pub mod declaration;
pub mod expression;
pub mod statement;
pub mod ty;
pub mod visitor;

pub use common::{
    EffectAnnotation, EnumVariant, EnumVariantKind, GenericParam, GenericParamDefault,
    GenericParamKind, Ident, Parameter, Path, StructField, WherePredicate,
};
pub use declaration::{
    Declaration, EnumDeclaration, ExportDeclaration, ExportItem, FunctionDeclaration,
    ImplDeclaration, ImportDeclaration, MacroDefinition, MacroMatcher, MacroParamKind,
    MacroPatternElement, MacroQuantifier, Module, NewtypeDeclaration, StructDeclaration,
    TraitDeclaration, TraitMethodSignature, TypeAliasDeclaration, VariableDeclaration,
};
pub use expression::{BinaryOperator, CompoundAssignOperator, Expression, StructLiteralField, TemplateStringPart, UnaryOperator};
pub use statement::{MatchArm, Pattern, Statement};
pub use ty::Type;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Span;

    #[test]
    fn span_enclosure_holds_for_binary_expression() {
        let span = |start, end| Span::new(
            crate::lexer::Position { file: "t".into(), line: 1, column: start, byte_offset: start },
            crate::lexer::Position { file: "t".into(), line: 1, column: end, byte_offset: end },
        );
        let left = Expression::Integer { value: 1, span: span(0, 1) };
        let right = Expression::Integer { value: 2, span: span(4, 5) };
        let whole = span(0, 5);
        let expr = Expression::Binary {
            operator: BinaryOperator::Add,
            left: Box::new(left.clone()),
            right: Box::new(right.clone()),
            span: whole.clone(),
        };
        assert!(whole.encloses(expr_span_of(&left)));
        assert!(whole.encloses(expr_span_of(&right)));
        assert_eq!(expr.span(), &whole);
    }

    fn expr_span_of(e: &Expression) -> &Span {
        e.span()
    }

    #[test]
    fn structural_equality_ignores_position() {
        let pos_a = crate::lexer::Position { file: "a.y".into(), line: 1, column: 1, byte_offset: 0 };
        let pos_b = crate::lexer::Position { file: "b.y".into(), line: 99, column: 7, byte_offset: 40 };
        let a = Expression::Integer { value: 1, span: Span::new(pos_a.clone(), pos_a) };
        let b = Expression::Integer { value: 1, span: Span::new(pos_b.clone(), pos_b) };
        assert_eq!(a, b);
    }
}
