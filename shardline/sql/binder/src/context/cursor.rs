use shardline_common::dialect::CasePolicy;
use smol_str::SmolStr;
use sql_ast::ast::{CloseCursorStatement, Direction, FetchStatement, MoveStatement};

use super::{SelectStatementContext, object_name};

/// `DECLARE name CURSOR FOR <query>`, routed like its query.
#[derive(Debug, Clone, PartialEq)]
pub struct CursorStatementContext {
    name: SmolStr,
    select: SelectStatementContext,
}

impl CursorStatementContext {
    #[inline]
    pub fn new(name: SmolStr, select: SelectStatementContext) -> Self {
        Self { name, select }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn select(&self) -> &SelectStatementContext {
        &self.select
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseStatementContext {
    name: Option<SmolStr>,
}

impl CloseStatementContext {
    pub fn new(statement: &CloseCursorStatement, policy: CasePolicy) -> Self {
        Self {
            name: statement.name.as_ref().map(|n| object_name(n.value(), policy)),
        }
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// `CLOSE ALL`
    #[inline]
    pub fn is_close_all(&self) -> bool {
        self.name.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveStatementContext {
    cursor: SmolStr,
    direction: Direction,
}

impl MoveStatementContext {
    pub fn new(statement: &MoveStatement, policy: CasePolicy) -> Self {
        Self {
            cursor: object_name(statement.cursor.value(), policy),
            direction: statement.direction,
        }
    }

    #[inline]
    pub fn cursor(&self) -> &str {
        &self.cursor
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchStatementContext {
    cursor: SmolStr,
    direction: Direction,
}

impl FetchStatementContext {
    pub fn new(statement: &FetchStatement, policy: CasePolicy) -> Self {
        Self {
            cursor: object_name(statement.cursor.value(), policy),
            direction: statement.direction,
        }
    }

    #[inline]
    pub fn cursor(&self) -> &str {
        &self.cursor
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }
}
