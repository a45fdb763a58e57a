use sql_ast::ast::{DeleteStatement, UpdateStatement};
use sql_ast::span::Spanned;

use super::Binder;
use crate::error::BindResult;
use crate::scope::ScopeChain;

impl Binder<'_> {
    pub fn bind_update(&self, update: &UpdateStatement) -> BindResult<UpdateStatement> {
        let (table, scoped) = self.bind_simple_table(update.table.value(), update.table.span())?;
        let tables = [scoped];
        let scope = ScopeChain::root(&tables);
        let assignments = update
            .assignments
            .iter()
            .map(|a| self.bind_assignment(a, &scope, &scope))
            .collect::<BindResult<_>>()?;
        let where_clause = update
            .where_clause
            .as_ref()
            .map(|e| self.bind_expr(e, &scope))
            .transpose()?;
        Ok(UpdateStatement {
            table: Spanned(table, update.table.span()),
            assignments,
            where_clause,
        })
    }

    pub fn bind_delete(&self, delete: &DeleteStatement) -> BindResult<DeleteStatement> {
        let (table, scoped) = self.bind_simple_table(delete.table.value(), delete.table.span())?;
        let tables = [scoped];
        let scope = ScopeChain::root(&tables);
        let where_clause = delete
            .where_clause
            .as_ref()
            .map(|e| self.bind_expr(e, &scope))
            .transpose()?;
        Ok(DeleteStatement {
            table: Spanned(table, delete.table.span()),
            where_clause,
        })
    }
}
