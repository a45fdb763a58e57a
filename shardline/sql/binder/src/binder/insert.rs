use serde::Serialize;
use smol_str::SmolStr;
use sql_ast::ast::{Assignment, InsertSource, InsertStatement};
use sql_ast::span::Spanned;

use super::Binder;
use crate::bound::{BoundProjection, BoundTable};
use crate::error::{BindError, BindResult};
use crate::scope::ScopeChain;

/// The columns an INSERT writes, and whether the statement listed them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum InsertColumns {
    /// Listed in the statement, or named by `INSERT ... SET`.
    Explicit(Vec<SmolStr>),
    /// Omitted from the statement and taken from metadata, in table order, without derived-only
    /// columns.
    Derived(Vec<SmolStr>),
}

impl InsertColumns {
    #[inline]
    pub fn names(&self) -> &[SmolStr] {
        match self {
            InsertColumns::Explicit(names) | InsertColumns::Derived(names) => names,
        }
    }

    #[inline]
    pub fn is_derived(&self) -> bool {
        matches!(self, InsertColumns::Derived(_))
    }

    /// Returns the position of `column`, ignoring ASCII case.
    pub fn position(&self, column: &str) -> Option<usize> {
        self.names()
            .iter()
            .position(|c| c.eq_ignore_ascii_case(column))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundInsert {
    pub statement: InsertStatement,
    pub table: BoundTable,
    pub columns: InsertColumns,
    /// Output columns of the source query of `INSERT ... SELECT`.
    pub select_projections: Option<Vec<BoundProjection>>,
}

impl Binder<'_> {
    pub fn bind_insert(&self, insert: &InsertStatement) -> BindResult<BoundInsert> {
        let (table, scoped) = self.bind_simple_table(insert.table.value(), insert.table.span())?;
        let bound_table = BoundTable::from_simple(&table, self.policy());
        let tables = [scoped];
        let scope = ScopeChain::root(&tables);

        let bound_columns = insert
            .columns
            .iter()
            .map(|c| c.try_map_ref(|c| self.bind_column(c, &scope)))
            .collect::<BindResult<Vec<_>>>()?;
        let explicit: Vec<SmolStr> = bound_columns
            .iter()
            .map(|c| match &c.value().bound {
                Some(bound) => bound.original_column.clone(),
                None => self.normalize(c.value().name.value()),
            })
            .collect();

        let mut select_projections = None;
        let (source, columns) = match &insert.source {
            InsertSource::Values(rows) => {
                let rows = rows
                    .iter()
                    .map(|row| {
                        check_count(explicit.len(), row.value().len(), row.span())?;
                        row.try_map_ref(|values| {
                            values
                                .iter()
                                .map(|v| self.bind_expr(v, &scope))
                                .collect::<BindResult<Vec<_>>>()
                        })
                    })
                    .collect::<BindResult<_>>()?;
                (InsertSource::Values(rows), None)
            }
            InsertSource::Select(select) => {
                let bound = self.bind_select(select.value(), None)?;
                check_count(explicit.len(), bound.projections.len(), select.span())?;
                select_projections = Some(bound.projections);
                (
                    InsertSource::Select(Box::new(Spanned(bound.statement, select.span()))),
                    None,
                )
            }
            InsertSource::Set(assignments) => {
                let assignments = assignments
                    .iter()
                    .map(|a| self.bind_assignment(a, &scope, &scope))
                    .collect::<BindResult<Vec<_>>>()?;
                let names = assignments
                    .iter()
                    .map(|a| {
                        let column = a.value().column.value();
                        match &column.bound {
                            Some(bound) => bound.original_column.clone(),
                            None => self.normalize(column.name.value()),
                        }
                    })
                    .collect();
                (
                    InsertSource::Set(assignments),
                    Some(InsertColumns::Explicit(names)),
                )
            }
        };

        let columns = columns.unwrap_or_else(|| {
            if explicit.is_empty() {
                let derived = tables[0]
                    .columns()
                    .iter()
                    .filter(|c| c.visible)
                    .map(|c| c.name.clone())
                    .collect();
                InsertColumns::Derived(derived)
            } else {
                InsertColumns::Explicit(explicit)
            }
        });

        Ok(BoundInsert {
            statement: InsertStatement {
                table: Spanned(table, insert.table.span()),
                columns: bound_columns,
                source,
            },
            table: bound_table,
            columns,
            select_projections,
        })
    }

    /// Binds `column = value`. The column resolves against `target`, the value against `source`.
    pub(super) fn bind_assignment(
        &self,
        assignment: &Spanned<Assignment>,
        target: &ScopeChain<'_>,
        source: &ScopeChain<'_>,
    ) -> BindResult<Spanned<Assignment>> {
        assignment.try_map_ref(|a| {
            Ok(Assignment {
                column: a.column.try_map_ref(|c| self.bind_column(c, target))?,
                value: self.bind_expr(&a.value, source)?,
            })
        })
    }
}

/// Explicit column lists must match every row. Omitted lists are not checked.
fn check_count(columns: usize, values: usize, span: std::ops::Range<usize>) -> BindResult<()> {
    if columns != 0 && columns != values {
        return Err(BindError::ColumnCountMismatch {
            columns,
            values,
            span: span.into(),
        });
    }
    Ok(())
}
