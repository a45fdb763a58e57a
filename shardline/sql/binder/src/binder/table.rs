use std::ops::Range;

use shardline_common::constants::DUAL_TABLE_NAME;
use smol_str::SmolStr;
use sql_ast::ast::{
    DerivedTable, Ident, JoinConstraint, JoinTable, SimpleTable, TableBoundInfo, TableRef,
    TableSourceType, UsingColumn,
};
use sql_ast::span::Spanned;

use super::Binder;
use crate::bound::BoundProjection;
use crate::error::{BindError, BindResult};
use crate::scope::{ScopeChain, ScopedTable};

impl Binder<'_> {
    /// Binds a table named in the statement against metadata.
    ///
    /// Unqualified names resolve in the current database and the dialect's default schema.
    /// `DUAL` is accepted without metadata.
    pub fn bind_simple_table(
        &self,
        table: &SimpleTable,
        span: Range<usize>,
    ) -> BindResult<(SimpleTable, ScopedTable)> {
        let name = table.name.value();
        let visible_name = table
            .alias
            .as_ref()
            .map_or_else(|| name.name.value().clone(), |a| a.value().clone());

        if name.database.is_none()
            && name.schema.is_none()
            && name.name.value().value.eq_ignore_ascii_case(DUAL_TABLE_NAME)
        {
            let database = self.options.current_database.clone();
            let schema = SmolStr::new(self.options.default_schema());
            let bound = TableBoundInfo {
                original_database: database.clone(),
                original_schema: schema.clone(),
                original_table: DUAL_TABLE_NAME.into(),
            };
            let scoped = ScopedTable::new(
                visible_name,
                database,
                schema,
                DUAL_TABLE_NAME,
                TableSourceType::Unknown,
            );
            return Ok((with_bound(table, bound), scoped));
        }

        let (database_name, database_span) = match &name.database {
            Some(database) => (self.normalize(database.value()), database.span()),
            None => (self.options.current_database.clone(), span.clone()),
        };
        let database = self.catalog.get_database(&database_name)?.ok_or_else(|| {
            BindError::UnknownDatabase {
                name: database_name.clone(),
                span: database_span.into(),
            }
        })?;

        let (schema_name, schema_span) = match &name.schema {
            Some(schema) => (self.normalize(schema.value()), schema.span()),
            None => (
                SmolStr::new(self.options.dialect.default_schema_name(database.name())),
                span.clone(),
            ),
        };
        let schema =
            database
                .get_schema(&schema_name)?
                .ok_or_else(|| BindError::SchemaNotFound {
                    name: schema_name.clone(),
                    span: schema_span.into(),
                })?;

        let table_name = self.normalize(name.name.value());
        let metadata =
            schema
                .get_table(&table_name)?
                .ok_or_else(|| BindError::TableNotFound {
                    name: table_name.clone(),
                    span: name.name.span().into(),
                })?;

        let bound = TableBoundInfo {
            original_database: database.name().into(),
            original_schema: schema.name().into(),
            original_table: metadata.name().into(),
        };
        let scoped = metadata.columns().iter().fold(
            ScopedTable::new(
                visible_name,
                database.name(),
                schema.name(),
                metadata.name(),
                TableSourceType::PhysicalTable,
            ),
            |scoped, column| scoped.with_own_column(column.name(), column.is_visible()),
        );
        Ok((with_bound(table, bound), scoped))
    }

    /// Binds one FROM item, appending the tables it declares to `tables` in declaration order.
    pub(super) fn bind_table_ref(
        &self,
        table: &Spanned<TableRef>,
        tables: &mut Vec<ScopedTable>,
        parent: Option<&ScopeChain<'_>>,
    ) -> BindResult<Spanned<TableRef>> {
        let bound = match table.value() {
            TableRef::Simple(simple) => {
                let (simple, scoped) = self.bind_simple_table(simple, table.span())?;
                tables.push(scoped);
                TableRef::Simple(simple)
            }
            TableRef::Derived(derived) => {
                let bound = self.bind_select(derived.query.value(), parent)?;
                tables.push(self.derived_table(&derived.alias, &bound.projections));
                TableRef::Derived(DerivedTable {
                    query: Box::new(Spanned(bound.statement, derived.query.span())),
                    alias: derived.alias.clone(),
                })
            }
            TableRef::Join(join) => TableRef::Join(Box::new(self.bind_join(join, tables, parent)?)),
        };
        Ok(Spanned(bound, table.span()))
    }

    fn bind_join(
        &self,
        join: &JoinTable,
        tables: &mut Vec<ScopedTable>,
        parent: Option<&ScopeChain<'_>>,
    ) -> BindResult<JoinTable> {
        let start = tables.len();
        let left = self.bind_table_ref(&join.left, tables, parent)?;
        let mid = tables.len();
        let right = self.bind_table_ref(&join.right, tables, parent)?;
        let constraint = match &join.constraint {
            None => None,
            Some(JoinConstraint::On(expr)) => {
                let scope = ScopeChain::new(tables.as_slice(), parent);
                Some(JoinConstraint::On(self.bind_expr(expr, &scope)?))
            }
            Some(JoinConstraint::Using(columns)) => {
                let columns = columns
                    .iter()
                    .map(|c| self.bind_using_column(c, &tables[start..mid], &tables[mid..]))
                    .collect::<BindResult<_>>()?;
                Some(JoinConstraint::Using(columns))
            }
        };
        Ok(JoinTable {
            left,
            right,
            kind: join.kind,
            constraint,
        })
    }

    /// Binds a `USING` column to the first table on each side of the join that declares it.
    fn bind_using_column(
        &self,
        column: &Spanned<UsingColumn>,
        left: &[ScopedTable],
        right: &[ScopedTable],
    ) -> BindResult<Spanned<UsingColumn>> {
        let name = column.value().name.value();
        let find = |tables: &[ScopedTable]| {
            tables
                .iter()
                .find_map(|t| t.find_column(name, self.policy()))
                .map(|c| c.bound.clone())
        };
        match (find(left), find(right)) {
            (Some(left), Some(right)) => Ok(Spanned(
                UsingColumn {
                    name: column.value().name.clone(),
                    left: Some(left),
                    right: Some(right),
                },
                column.span(),
            )),
            _ => Err(BindError::UsingColumnNotFound {
                column: name.value.clone(),
                span: column.span().into(),
            }),
        }
    }

    /// Builds the scope entry of a subquery in FROM from its output columns.
    fn derived_table(
        &self,
        alias: &Spanned<Ident>,
        projections: &[BoundProjection],
    ) -> ScopedTable {
        let scoped = ScopedTable::new(
            alias.value().clone(),
            self.options.current_database.clone(),
            self.options.default_schema(),
            self.normalize(alias.value()),
            TableSourceType::TemporaryTable,
        );
        projections
            .iter()
            .fold(scoped, |scoped, projection| match &projection.column {
                Some(bound) => {
                    scoped.with_forwarded_column(projection.label.clone(), bound.clone())
                }
                None => scoped.with_own_column(projection.label.clone(), true),
            })
    }
}

fn with_bound(table: &SimpleTable, bound: TableBoundInfo) -> SimpleTable {
    SimpleTable {
        name: table.name.clone(),
        alias: table.alias.clone(),
        bound: Some(bound),
    }
}
