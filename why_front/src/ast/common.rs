//! Shared leaf and near-leaf node kinds referenced by more than one of the
//! four sum types: identifiers, dotted paths, function parameters, generic
//! parameters, where-predicates, struct fields and enum variants.

use crate::lexer::Span;

use super::expression::Expression;
use super::ty::Type;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Ident {
            name: name.into(),
            span,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.name == "_"
    }
}

/// A dotted/`::`-separated sequence of identifiers, e.g. `std::collections`
/// or a single bare `x`. Every path has at least one segment.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Path {
    pub segments: Vec<Ident>,
    pub span: Span,
}

impl Path {
    pub fn single(ident: Ident) -> Self {
        Path {
            span: ident.span.clone(),
            segments: vec![ident],
        }
    }

    pub fn last(&self) -> &Ident {
        self.segments
            .last()
            .expect("Path always has at least one segment")
    }
}

/// A single `name: Type` function parameter, optionally `mut`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Parameter {
    pub name: Ident,
    pub is_mut: bool,
    pub type_annotation: Type,
    pub span: Span,
}

/// Which of the three generic-parameter forms a [`GenericParam`] is:
/// `T` (type), `const N: usize` (const, carrying its type annotation), or
/// `'a` (lifetime).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum GenericParamKind {
    Type,
    Const { type_annotation: Type },
    Lifetime,
}

/// The `= ...` default trailing a generic parameter. Type and lifetime
/// params default to a [`Type`]; const params default to a constant
/// expression.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum GenericParamDefault {
    Type(Type),
    Const(Expression),
}

/// A generic parameter, e.g. the `T` in `fn id<T>(x: T) -> T`, the `const N`
/// in `struct Buf<const N: usize>`, or a lifetime. Carries optional trait
/// bounds and an optional default. Declaration order is preserved (spec's
/// ordering invariant for generic parameter lists).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GenericParam {
    pub kind: GenericParamKind,
    pub name: Ident,
    pub bounds: Vec<Path>,
    pub default: Option<GenericParamDefault>,
    pub span: Span,
}

/// A `where T: Bound` clause entry. Order among where-predicates carries no
/// semantic meaning and may be freely reordered by the optimizer or a
/// formatter without changing equivalence.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WherePredicate {
    pub subject: Type,
    pub bounds: Vec<Path>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StructField {
    pub name: Ident,
    pub type_annotation: Type,
    pub is_public: bool,
    pub span: Span,
}

/// One variant of an `enum` declaration. `Unit` carries no payload,
/// `Tuple` carries positional fields, `Struct` carries named fields --
/// mirroring the three ways a Y enum variant can be declared.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum EnumVariantKind {
    Unit,
    Tuple(Vec<Type>),
    Struct(Vec<StructField>),
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EnumVariant {
    pub name: Ident,
    pub kind: EnumVariantKind,
    pub span: Span,
}

/// An `effect` annotation attached to a function signature, e.g.
/// `fn read() effects [IO, Panic] -> String`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EffectAnnotation {
    pub effects: Vec<Ident>,
    pub span: Span,
}
