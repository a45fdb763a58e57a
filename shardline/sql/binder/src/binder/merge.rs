use shardline_common::error::not_implemented;
use sql_ast::ast::{MergeInsert, MergeStatement, MergeUpdate, TableRef};
use sql_ast::span::Spanned;

use super::Binder;
use crate::error::{BindError, BindResult};
use crate::scope::ScopeChain;

impl Binder<'_> {
    /// Binds a MERGE statement.
    ///
    /// The ON condition, assignment values and inserted values see both the target and the
    /// source. Assignment and insert columns always belong to the target.
    pub fn bind_merge(&self, merge: &MergeStatement) -> BindResult<MergeStatement> {
        if let TableRef::Join(_) = merge.source.value() {
            return not_implemented("merge with a joined source", None);
        }
        let (target, scoped) = self.bind_simple_table(merge.target.value(), merge.target.span())?;
        let mut tables = vec![scoped];
        let source = self.bind_table_ref(&merge.source, &mut tables, None)?;

        let combined = ScopeChain::root(&tables);
        let target_only = ScopeChain::root(&tables[..1]);

        let on = self.bind_expr(&merge.on, &combined)?;
        let when_matched = merge
            .when_matched
            .as_ref()
            .map(|update| {
                Ok::<_, BindError>(MergeUpdate {
                    assignments: update
                        .assignments
                        .iter()
                        .map(|a| self.bind_assignment(a, &target_only, &combined))
                        .collect::<BindResult<_>>()?,
                    where_clause: update
                        .where_clause
                        .as_ref()
                        .map(|e| self.bind_expr(e, &combined))
                        .transpose()?,
                })
            })
            .transpose()?;
        let when_not_matched = merge
            .when_not_matched
            .as_ref()
            .map(|insert| {
                if !insert.columns.is_empty() && insert.columns.len() != insert.values.len() {
                    let span = match (insert.values.first(), insert.values.last()) {
                        (Some(first), Some(last)) => first.1.start..last.1.end,
                        _ => merge.target.span(),
                    };
                    return Err(BindError::ColumnCountMismatch {
                        columns: insert.columns.len(),
                        values: insert.values.len(),
                        span: span.into(),
                    });
                }
                Ok(MergeInsert {
                    columns: insert
                        .columns
                        .iter()
                        .map(|c| c.try_map_ref(|c| self.bind_column(c, &target_only)))
                        .collect::<BindResult<_>>()?,
                    values: insert
                        .values
                        .iter()
                        .map(|v| self.bind_expr(v, &combined))
                        .collect::<BindResult<_>>()?,
                })
            })
            .transpose()?;

        Ok(MergeStatement {
            target: Spanned(target, merge.target.span()),
            source,
            on,
            when_matched,
            when_not_matched,
        })
    }
}
