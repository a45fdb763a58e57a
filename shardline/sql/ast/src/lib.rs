//! Position-addressable SQL statement tree.
//!
//! The tree is produced by an external parser. Every node that may be rewritten by text-span
//! replacement downstream is wrapped in [`span::Spanned`], and binding fills the `bound` slots of
//! column and table references in a cloned tree.

#[macro_use(apply)]
extern crate macro_rules_attribute;

pub mod ast;
mod macros;
pub mod predicate;
pub mod span;
pub mod visit;
