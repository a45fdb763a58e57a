use smol_str::SmolStr;

use super::{
    CloseCursorStatement, DeclareCursorStatement, DeleteStatement, FetchStatement,
    InsertStatement, MergeStatement, MoveStatement, SelectStatement, SetStatement,
    UpdateStatement,
};
use crate::macros::base;

#[apply(base)]
pub enum Statement {
    Select(SelectStatement),
    Insert(InsertStatement),
    Update(UpdateStatement),
    Delete(DeleteStatement),
    Merge(MergeStatement),
    DeclareCursor(DeclareCursorStatement),
    CloseCursor(CloseCursorStatement),
    Move(MoveStatement),
    Fetch(FetchStatement),
    Set(SetStatement),
    /// A statement with no SQL body, e.g. `;`.
    Empty,
    /// Any statement not modeled above, carrying its leading keywords (e.g. `BEGIN`).
    Other(SmolStr),
}

impl Statement {
    /// Returns `true` if the statement may produce rows.
    #[inline]
    pub fn is_query(&self) -> bool {
        matches!(self, Statement::Select(_) | Statement::Fetch(_))
    }
}
