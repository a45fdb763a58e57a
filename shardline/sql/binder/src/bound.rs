//! Results of binding that are not part of the statement tree itself.

use std::ops::Range;

use serde::Serialize;
use smol_str::SmolStr;
use shardline_common::constants::DUAL_TABLE_NAME;
use shardline_common::dialect::CasePolicy;
use sql_ast::ast::{ColumnBoundInfo, SelectStatement, SimpleTable, TableSourceType};

/// Label PostgreSQL reports for a projection that is neither a column nor aliased.
pub const ANONYMOUS_COLUMN_LABEL: &str = "?column?";

/// One output column of a query, with `*` already expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundProjection {
    pub label: SmolStr,
    pub span: Range<usize>,
    /// Present when the projection is a bare column reference, or comes from `*`.
    pub column: Option<ColumnBoundInfo>,
}

/// A table referenced anywhere in a bound statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundTable {
    pub database: SmolStr,
    pub schema: SmolStr,
    pub table: SmolStr,
    pub alias: Option<SmolStr>,
    pub source: TableSourceType,
}

impl BoundTable {
    /// Reads the provenance a binder attached to `table`. Unbound tables fall back to the names
    /// as written.
    pub fn from_simple(table: &SimpleTable, policy: CasePolicy) -> Self {
        let alias = table
            .alias
            .as_ref()
            .map(|a| SmolStr::new(policy.normalize(&a.value().value, a.value().is_quoted())));
        match &table.bound {
            Some(bound) => {
                let source = if bound.original_table == DUAL_TABLE_NAME {
                    TableSourceType::Unknown
                } else {
                    TableSourceType::PhysicalTable
                };
                Self {
                    database: bound.original_database.clone(),
                    schema: bound.original_schema.clone(),
                    table: bound.original_table.clone(),
                    alias,
                    source,
                }
            }
            None => {
                let name = table.name.value();
                let part = |ident: Option<&sql_ast::ast::Ident>| {
                    ident.map_or_else(SmolStr::default, |i| {
                        SmolStr::new(policy.normalize(&i.value, i.is_quoted()))
                    })
                };
                Self {
                    database: part(name.database.as_ref().map(|d| d.value())),
                    schema: part(name.schema.as_ref().map(|s| s.value())),
                    table: part(Some(name.name.value())),
                    alias,
                    source: TableSourceType::Unknown,
                }
            }
        }
    }

    /// Name the statement refers to the table by.
    #[inline]
    pub fn visible_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundSelect {
    pub statement: SelectStatement,
    pub projections: Vec<BoundProjection>,
}
