//! Table scopes and column owner resolution.
//!
//! Every (sub)query binds its columns against a [`ScopeChain`]: the tables declared by the query
//! itself, plus a borrowed link to the scope of the enclosing query.

use shardline_common::dialect::CasePolicy;
use smol_str::SmolStr;
use sql_ast::ast::{ColumnBoundInfo, Ident, TableSourceType};

use crate::options::AncestorLookup;

/// A column a scoped table exposes, with the provenance it binds to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedColumn {
    pub name: SmolStr,
    pub bound: ColumnBoundInfo,
    /// Whether `*` expands to the column.
    pub visible: bool,
}

/// A table declared in a FROM clause, a DML target, or a merge source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedTable {
    visible_name: Ident,
    database: SmolStr,
    schema: SmolStr,
    table: SmolStr,
    source: TableSourceType,
    columns: Vec<ScopedColumn>,
}

impl ScopedTable {
    /// Creates a scoped table. For physical tables `table` is the logical table name; for derived
    /// tables it is the alias.
    pub fn new(
        visible_name: Ident,
        database: impl Into<SmolStr>,
        schema: impl Into<SmolStr>,
        table: impl Into<SmolStr>,
        source: TableSourceType,
    ) -> Self {
        Self {
            visible_name,
            database: database.into(),
            schema: schema.into(),
            table: table.into(),
            source,
            columns: Vec::new(),
        }
    }

    /// Adds a column whose provenance is this table itself.
    pub fn with_own_column(mut self, name: impl Into<SmolStr>, visible: bool) -> Self {
        let name = name.into();
        let bound = self.own_bound_info(name.clone());
        self.columns.push(ScopedColumn {
            name,
            bound,
            visible,
        });
        self
    }

    /// Adds a column that forwards the provenance of an inner column.
    pub fn with_forwarded_column(
        mut self,
        name: impl Into<SmolStr>,
        bound: ColumnBoundInfo,
    ) -> Self {
        self.columns.push(ScopedColumn {
            name: name.into(),
            bound,
            visible: true,
        });
        self
    }

    #[inline]
    pub fn visible_name(&self) -> &Ident {
        &self.visible_name
    }

    #[inline]
    pub fn database(&self) -> &str {
        &self.database
    }

    #[inline]
    pub fn schema(&self) -> &str {
        &self.schema
    }

    #[inline]
    pub fn table(&self) -> &str {
        &self.table
    }

    #[inline]
    pub fn source(&self) -> TableSourceType {
        self.source
    }

    #[inline]
    pub fn columns(&self) -> &[ScopedColumn] {
        &self.columns
    }

    pub fn find_column(&self, name: &Ident, policy: CasePolicy) -> Option<&ScopedColumn> {
        self.columns
            .iter()
            .find(|c| name.matches_name(&c.name, policy))
    }

    /// Binds `name` to this table. A name the table does not expose binds to the table under the
    /// name as written, normalized by `policy`.
    pub fn bind_column(&self, name: &Ident, policy: CasePolicy) -> ColumnBoundInfo {
        match self.find_column(name, policy) {
            Some(column) => column.bound.clone(),
            None => {
                let column = SmolStr::new(policy.normalize(&name.value, name.is_quoted()));
                self.own_bound_info(column)
            }
        }
    }

    /// Returns `true` if both tables are the same physical table, possibly under different
    /// aliases.
    pub fn is_same_logical_table(&self, other: &ScopedTable) -> bool {
        self.source == TableSourceType::PhysicalTable
            && other.source == TableSourceType::PhysicalTable
            && self.database == other.database
            && self.schema == other.schema
            && self.table == other.table
    }

    fn own_bound_info(&self, column: SmolStr) -> ColumnBoundInfo {
        ColumnBoundInfo {
            original_database: self.database.clone(),
            original_schema: self.schema.clone(),
            original_table: self.table.clone(),
            original_column: column,
            table_source: self.source,
        }
    }
}

/// The tables visible to one query level, linked to the scope of the enclosing query.
#[derive(Debug, Clone, Copy)]
pub struct ScopeChain<'s> {
    tables: &'s [ScopedTable],
    parent: Option<&'s ScopeChain<'s>>,
}

impl<'s> ScopeChain<'s> {
    #[inline]
    pub fn new(tables: &'s [ScopedTable], parent: Option<&'s ScopeChain<'s>>) -> Self {
        Self { tables, parent }
    }

    #[inline]
    pub fn root(tables: &'s [ScopedTable]) -> Self {
        Self::new(tables, None)
    }

    #[inline]
    pub fn tables(&self) -> &'s [ScopedTable] {
        self.tables
    }

    #[inline]
    pub fn parent(&self) -> Option<&'s ScopeChain<'s>> {
        self.parent
    }

    /// Finds the table an explicit owner (alias or table name) refers to, nearest level first.
    /// Owners are always looked up through every enclosing level, since a correlated reference
    /// names its level explicitly.
    pub fn resolve_owner(&self, owner: &Ident, policy: CasePolicy) -> Option<&'s ScopedTable> {
        self.tables
            .iter()
            .find(|t| t.visible_name.matches(owner, policy))
            .or_else(|| self.parent.and_then(|p| p.resolve_owner(owner, policy)))
    }

    /// Resolves the owner of an unqualified column. Returns the table and the number of levels
    /// walked up to find it.
    pub fn resolve(
        &self,
        name: &Ident,
        policy: CasePolicy,
        lookup: AncestorLookup,
    ) -> Option<(&'s ScopedTable, usize)> {
        let mut scope = Some(self);
        let mut depth = 0;
        while let Some(current) = scope {
            if let Some(table) = current.resolve_level(name, policy) {
                return Some((table, depth));
            }
            if lookup == AncestorLookup::CurrentLevel {
                break;
            }
            scope = current.parent;
            depth += 1;
        }
        None
    }

    fn resolve_level(&self, name: &Ident, policy: CasePolicy) -> Option<&'s ScopedTable> {
        match self.tables {
            [] => None,
            [only] => Some(only),
            [first, rest @ ..] if rest.iter().all(|t| t.is_same_logical_table(first)) => {
                Some(first)
            }
            tables => tables
                .iter()
                .find(|t| t.find_column(name, policy).is_some()),
        }
    }
}
