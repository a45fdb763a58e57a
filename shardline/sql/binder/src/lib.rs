//! Statement binding and routing-condition extraction.
//!
//! [`BindEngine`] takes a parsed [`sql_ast::ast::Statement`] and a metadata snapshot, attaches
//! fully qualified provenance to every column reference, and wraps the bound statement in a
//! [`context::StatementContext`] carrying the routing and encrypt condition trees.

pub mod binder;
pub mod bound;
pub mod condition;
pub mod context;
mod engine;
pub mod error;
pub mod options;
pub mod scope;

pub use engine::BindEngine;
