//! The type sum: every way a type can be written in source. Covers the
//! usual literal/fn/tuple/array/reference/pointer/generic-application
//! forms, a `span()` match accessor, a `Display` impl that reads back
//! close to source, plus refinement and dependent types.

use std::fmt;

use crate::lexer::Span;

use super::common::Path;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Type {
    /// A bare or generic-applied path, e.g. `i32`, `String`, `Vec<T>`.
    Basic { path: Path, args: Vec<Type>, span: Span },
    Tuple { elements: Vec<Type>, span: Span },
    /// `[T]` (unsized) or `[T; n]` (sized, `size` holding the length
    /// expression).
    Array {
        element: Box<Type>,
        size: Option<Box<super::expression::Expression>>,
        span: Span,
    },
    Reference { inner: Box<Type>, span: Span },
    Pointer { inner: Box<Type>, span: Span },
    /// `[async] func(params) [-> R]` — `return_type` is `None` for a
    /// function type with no declared return (unit return).
    Function {
        params: Vec<Type>,
        return_type: Option<Box<Type>>,
        is_async: bool,
        span: Span,
    },
    /// `{ x: i32 | x > 0 }` — a base type constrained by a boolean
    /// predicate expression over a bound name.
    Refinement {
        base: Box<Type>,
        binder: Box<super::common::Ident>,
        predicate: Box<super::expression::Expression>,
        span: Span,
    },
    /// `T where expr` — a base type constrained by a predicate that may
    /// reference the enclosing declaration's value parameters, e.g. an
    /// array-length-indexed return type.
    Dependent {
        base: Box<Type>,
        predicate: Box<super::expression::Expression>,
        span: Span,
    },
}

impl Type {
    pub fn span(&self) -> &Span {
        match self {
            Type::Basic { span, .. }
            | Type::Tuple { span, .. }
            | Type::Array { span, .. }
            | Type::Reference { span, .. }
            | Type::Pointer { span, .. }
            | Type::Function { span, .. }
            | Type::Refinement { span, .. }
            | Type::Dependent { span, .. } => span,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Basic { path, args, .. } => {
                let name = path
                    .segments
                    .iter()
                    .map(|s| s.name.as_str())
                    .collect::<Vec<_>>()
                    .join("::");
                write!(f, "{name}")?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            Type::Tuple { elements, .. } => {
                write!(f, "(")?;
                for (i, e) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{e}")?;
                }
                write!(f, ")")
            }
            Type::Array { element, size, .. } => match size {
                Some(_) => write!(f, "[{element}; ..]"),
                None => write!(f, "[{element}]"),
            },
            Type::Reference { inner, .. } => write!(f, "&{inner}"),
            Type::Pointer { inner, .. } => write!(f, "*{inner}"),
            Type::Function { params, return_type, is_async, .. } => {
                if *is_async {
                    write!(f, "async ")?;
                }
                write!(f, "func(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, ")")?;
                if let Some(r) = return_type {
                    write!(f, " -> {r}")?;
                }
                Ok(())
            }
            Type::Refinement { base, binder, .. } => {
                write!(f, "{{ {}: {base} | .. }}", binder.name)
            }
            Type::Dependent { base, .. } => write!(f, "{base} where .."),
        }
    }
}
