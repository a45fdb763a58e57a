//! AST definitions for queries and table references.

use super::{ColumnBoundInfo, Expr, Ident, TableBoundInfo, TableName};
use crate::macros::{base, ext};
use crate::span::{BoxSpanned, OptSpanned, Spanned, VecSpanned};

#[apply(base)]
pub struct SelectStatement {
    pub distinct: bool,
    pub projections: VecSpanned<Projection>,
    pub from: VecSpanned<TableRef>,
    pub where_clause: OptSpanned<Expr>,
    pub group_by: VecSpanned<Expr>,
    pub having: OptSpanned<Expr>,
    pub order_by: VecSpanned<OrderByExpr>,
    pub limit: Option<Limit>,
}

#[apply(base)]
pub enum Projection {
    Expr {
        expr: Spanned<Expr>,
        alias: OptSpanned<Ident>,
    },
    /// `*` or `owner.*`
    Shorthand { owner: OptSpanned<Ident> },
}

#[apply(base)]
pub struct OrderByExpr {
    pub expr: Spanned<Expr>,
    pub asc: Option<bool>,
}

#[apply(base)]
pub struct Limit {
    pub limit: OptSpanned<Expr>,
    pub offset: OptSpanned<Expr>,
}

#[apply(base)]
pub enum TableRef {
    Simple(SimpleTable),
    Derived(DerivedTable),
    Join(Box<JoinTable>),
}

/// A table named directly in the statement, with an optional alias.
#[apply(base)]
pub struct SimpleTable {
    pub name: Spanned<TableName>,
    pub alias: OptSpanned<Ident>,
    pub bound: Option<TableBoundInfo>,
}

impl SimpleTable {
    #[inline]
    pub fn new(name: Spanned<TableName>, alias: OptSpanned<Ident>) -> Self {
        Self {
            name,
            alias,
            bound: None,
        }
    }

    /// Returns the alias if present, or the bare table name.
    #[inline]
    pub fn visible_name(&self) -> &Ident {
        self.alias
            .as_ref()
            .map_or(&self.name.value().name.0, Spanned::value)
    }
}

/// A subquery in FROM, e.g. `(SELECT ...) AS t`.
#[apply(base)]
pub struct DerivedTable {
    pub query: BoxSpanned<SelectStatement>,
    pub alias: Spanned<Ident>,
}

#[apply(base)]
pub struct JoinTable {
    pub left: Spanned<TableRef>,
    pub right: Spanned<TableRef>,
    pub kind: JoinKind,
    pub constraint: Option<JoinConstraint>,
}

#[apply(ext)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

#[apply(base)]
pub enum JoinConstraint {
    On(Spanned<Expr>),
    Using(VecSpanned<UsingColumn>),
}

/// A column named in `USING (...)`. Binding records the column on each side of the join.
#[apply(base)]
pub struct UsingColumn {
    pub name: Spanned<Ident>,
    pub left: Option<ColumnBoundInfo>,
    pub right: Option<ColumnBoundInfo>,
}

impl UsingColumn {
    #[inline]
    pub fn new(name: Spanned<Ident>) -> Self {
        Self {
            name,
            left: None,
            right: None,
        }
    }
}
