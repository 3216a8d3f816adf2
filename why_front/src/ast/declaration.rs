//! The declaration sum: everything that can appear at module scope.
//! Each variant corresponds to one top-level keyword and is dispatched
//! on by peeking the current token, rather than backtracking.

use crate::lexer::Span;

use super::common::{EffectAnnotation, EnumVariant, GenericParam, Ident, Parameter, StructField, WherePredicate};
use super::statement::Statement;
use super::ty::Type;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FunctionDeclaration {
    pub name: Ident,
    pub generics: Vec<GenericParam>,
    pub params: Vec<Parameter>,
    pub return_type: Option<Type>,
    pub effects: Option<EffectAnnotation>,
    pub where_clause: Vec<WherePredicate>,
    pub body: Vec<Statement>,
    pub is_public: bool,
    pub is_async: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VariableDeclaration {
    pub name: Ident,
    pub is_mut: bool,
    pub type_annotation: Option<Type>,
    pub value: super::expression::Expression,
    pub is_public: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StructDeclaration {
    pub name: Ident,
    pub generics: Vec<GenericParam>,
    pub fields: Vec<StructField>,
    pub where_clause: Vec<WherePredicate>,
    pub is_public: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EnumDeclaration {
    pub name: Ident,
    pub generics: Vec<GenericParam>,
    pub variants: Vec<EnumVariant>,
    pub is_public: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TraitMethodSignature {
    pub name: Ident,
    pub params: Vec<Parameter>,
    pub return_type: Option<Type>,
    pub default_body: Option<Vec<Statement>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TraitDeclaration {
    pub name: Ident,
    pub generics: Vec<GenericParam>,
    pub methods: Vec<TraitMethodSignature>,
    pub is_public: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ImplDeclaration {
    pub trait_name: Option<super::common::Path>,
    pub target: Type,
    pub generics: Vec<GenericParam>,
    pub methods: Vec<FunctionDeclaration>,
    pub where_clause: Vec<WherePredicate>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TypeAliasDeclaration {
    pub name: Ident,
    pub generics: Vec<GenericParam>,
    pub aliased: Type,
    pub is_public: bool,
    pub span: Span,
}

/// `newtype Meters = f64;` — distinct from a type alias in that it
/// introduces a nominal wrapper rather than a synonym.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NewtypeDeclaration {
    pub name: Ident,
    pub wrapped: Type,
    pub is_public: bool,
    pub span: Span,
}

/// `import a::b::*;` — `is_wildcard` marks the trailing `::*`, in which
/// case `path` holds only the segments before it (`a::b`).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ImportDeclaration {
    pub path: super::common::Path,
    pub alias: Option<Ident>,
    pub is_wildcard: bool,
    pub span: Span,
}

/// One entry of an `export { a, b as c };` list, or the sole entry of
/// the bare `export name;` form.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExportItem {
    pub name: Ident,
    pub alias: Option<Ident>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExportDeclaration {
    pub items: Vec<ExportItem>,
    pub span: Span,
}

/// Which kind of source fragment a macro pattern parameter captures.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum MacroParamKind {
    Expr,
    Stmt,
    Type,
    Ident,
    Block,
    /// Unconstrained token run, captured and substituted verbatim.
    Tokens,
}

/// Repetition marker on a pattern parameter, e.g. `$(args),*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum MacroQuantifier {
    Once,
    ZeroOrMore,
    OneOrMore,
    ZeroOrOne,
}

/// One captured parameter of a macro pattern: `$name:kind` with an
/// optional trailing repetition.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MacroPatternElement {
    pub name: Ident,
    pub kind: MacroParamKind,
    pub quantifier: MacroQuantifier,
    pub span: Span,
}

/// One `(pattern) => { body }` arm of a macro definition. A macro can
/// have several matchers, tried in declaration order at the call site.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MacroMatcher {
    pub pattern: Vec<MacroPatternElement>,
    /// `true` when the pattern ends in a bare `...` catch-all rather
    /// than a typed, possibly-repeated parameter list.
    pub variadic: bool,
    pub body: Vec<Statement>,
    pub span: Span,
}

/// A `macro name { (pattern) => { body } ... }` template definition.
/// `hygienic` records whether expansions get a fresh identifier scope
/// (the default) or deliberately splice into the caller's scope.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MacroDefinition {
    pub name: Ident,
    pub matchers: Vec<MacroMatcher>,
    pub hygienic: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Declaration {
    Function(FunctionDeclaration),
    Variable(VariableDeclaration),
    Struct(StructDeclaration),
    Enum(EnumDeclaration),
    Trait(TraitDeclaration),
    Impl(ImplDeclaration),
    TypeAlias(TypeAliasDeclaration),
    Newtype(NewtypeDeclaration),
    Import(ImportDeclaration),
    Export(ExportDeclaration),
    Macro(MacroDefinition),
}

impl Declaration {
    pub fn span(&self) -> &Span {
        match self {
            Declaration::Function(d) => &d.span,
            Declaration::Variable(d) => &d.span,
            Declaration::Struct(d) => &d.span,
            Declaration::Enum(d) => &d.span,
            Declaration::Trait(d) => &d.span,
            Declaration::Impl(d) => &d.span,
            Declaration::TypeAlias(d) => &d.span,
            Declaration::Newtype(d) => &d.span,
            Declaration::Import(d) => &d.span,
            Declaration::Export(d) => &d.span,
            Declaration::Macro(d) => &d.span,
        }
    }

    pub fn name(&self) -> Option<&Ident> {
        match self {
            Declaration::Function(d) => Some(&d.name),
            Declaration::Variable(d) => Some(&d.name),
            Declaration::Struct(d) => Some(&d.name),
            Declaration::Enum(d) => Some(&d.name),
            Declaration::Trait(d) => Some(&d.name),
            Declaration::Impl(_) => None,
            Declaration::TypeAlias(d) => Some(&d.name),
            Declaration::Newtype(d) => Some(&d.name),
            Declaration::Import(_) => None,
            Declaration::Export(d) => d.items.first().map(|i| &i.name),
            Declaration::Macro(d) => Some(&d.name),
        }
    }
}

/// A whole parsed compilation unit: an ordered sequence of top-level
/// declarations, in source order.
pub type Module = Vec<Declaration>;
