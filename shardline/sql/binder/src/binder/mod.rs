mod expr;
mod insert;
mod merge;
mod select;
mod table;
mod update;

pub use insert::{BoundInsert, InsertColumns};
use shardline_catalog::provider::CatalogProvider;
use shardline_common::dialect::CasePolicy;
use smol_str::SmolStr;
use sql_ast::ast::Ident;

use crate::options::BinderOptions;

/// Attaches metadata provenance to the tables and columns of a statement.
///
/// Binding never touches its input: every `bind_*` method returns a new tree with the `bound`
/// slots filled and all spans preserved.
#[derive(Debug)]
pub struct Binder<'a> {
    catalog: &'a dyn CatalogProvider,
    options: &'a BinderOptions,
}

impl<'a> Binder<'a> {
    pub fn new(catalog: &'a dyn CatalogProvider, options: &'a BinderOptions) -> Self {
        Binder { catalog, options }
    }

    #[inline]
    pub fn options(&self) -> &BinderOptions {
        self.options
    }

    #[inline]
    fn policy(&self) -> CasePolicy {
        self.options.case_policy()
    }

    #[inline]
    fn normalize(&self, ident: &Ident) -> SmolStr {
        SmolStr::new(self.policy().normalize(&ident.value, ident.is_quoted()))
    }
}
