//! AST definitions for cursor statements.

use super::{Ident, SelectStatement};
use crate::macros::{base, ext};
use crate::span::{BoxSpanned, OptSpanned, Spanned};

/// `DECLARE name CURSOR FOR SELECT ...`
#[apply(base)]
pub struct DeclareCursorStatement {
    pub name: Spanned<Ident>,
    pub query: BoxSpanned<SelectStatement>,
}

/// `CLOSE name` or `CLOSE ALL` when `name` is absent.
#[apply(base)]
pub struct CloseCursorStatement {
    pub name: OptSpanned<Ident>,
}

#[apply(base)]
pub struct MoveStatement {
    pub cursor: Spanned<Ident>,
    pub direction: Direction,
}

#[apply(base)]
pub struct FetchStatement {
    pub cursor: Spanned<Ident>,
    pub direction: Direction,
}

#[apply(ext)]
pub enum Direction {
    Next,
    Prior,
    First,
    Last,
    Absolute(i64),
    Relative(i64),
    /// `FORWARD [count | ALL]`, `None` meaning all.
    Forward(Option<u64>),
    /// `BACKWARD [count | ALL]`, `None` meaning all.
    Backward(Option<u64>),
}
