//! AST definitions for data-modifying statements.

use super::{ColumnRef, Expr, SelectStatement, SimpleTable, TableRef};
use crate::macros::base;
use crate::span::{BoxSpanned, OptSpanned, Spanned, VecSpanned};

#[apply(base)]
pub struct InsertStatement {
    pub table: Spanned<SimpleTable>,
    /// Empty when the statement lists no columns.
    pub columns: VecSpanned<ColumnRef>,
    pub source: InsertSource,
}

#[apply(base)]
pub enum InsertSource {
    /// `VALUES (...), (...)`, one entry per row.
    Values(VecSpanned<VecSpanned<Expr>>),
    /// `INSERT ... SELECT ...`
    Select(BoxSpanned<SelectStatement>),
    /// `INSERT ... SET col = value, ...`
    Set(VecSpanned<Assignment>),
}

/// `column = value` in SET clauses.
#[apply(base)]
pub struct Assignment {
    pub column: Spanned<ColumnRef>,
    pub value: Spanned<Expr>,
}

#[apply(base)]
pub struct UpdateStatement {
    pub table: Spanned<SimpleTable>,
    pub assignments: VecSpanned<Assignment>,
    pub where_clause: OptSpanned<Expr>,
}

#[apply(base)]
pub struct DeleteStatement {
    pub table: Spanned<SimpleTable>,
    pub where_clause: OptSpanned<Expr>,
}

#[apply(base)]
pub struct MergeStatement {
    pub target: Spanned<SimpleTable>,
    pub source: Spanned<TableRef>,
    pub on: Spanned<Expr>,
    pub when_matched: Option<MergeUpdate>,
    pub when_not_matched: Option<MergeInsert>,
}

/// `WHEN MATCHED THEN UPDATE SET ... [WHERE ...]`
#[apply(base)]
pub struct MergeUpdate {
    pub assignments: VecSpanned<Assignment>,
    pub where_clause: OptSpanned<Expr>,
}

/// `WHEN NOT MATCHED THEN INSERT (...) VALUES (...)`
#[apply(base)]
pub struct MergeInsert {
    pub columns: VecSpanned<ColumnRef>,
    pub values: VecSpanned<Expr>,
}
