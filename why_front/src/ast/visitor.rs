//! A parameterized-over-return-type visitor for walking the
//! Declaration/Statement/Expression/Type trees without writing the same
//! recursive match arms in every consumer.
//!
//! The optimizer's rewrite passes do not implement this trait directly --
//! they need an owned, rebuildable tree rather than a borrowing visitor --
//! but recovery-adjacent read-only queries (node counting, depth,
//! find-by-kind) in `optimizer::validator` are expressed against it.

use super::declaration::Declaration;
use super::expression::Expression;
use super::statement::Statement;
use super::ty::Type;

pub trait Visitor<R> {
    fn visit_declaration(&mut self, decl: &Declaration) -> R;
    fn visit_statement(&mut self, stmt: &Statement) -> R;
    fn visit_expression(&mut self, expr: &Expression) -> R;
    fn visit_type(&mut self, ty: &Type) -> R;
}
