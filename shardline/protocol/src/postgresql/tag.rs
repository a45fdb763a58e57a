use shardline_binder::context::{CommonStatementContext, StatementContext};
use smol_str::SmolStr;
use sql_ast::ast::Statement;

/// The command a CommandComplete packet reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandTag {
    Select,
    Insert,
    Update,
    Delete,
    Merge,
    DeclareCursor,
    CloseCursor,
    Move,
    Fetch,
    Set,
    Empty,
    /// Uppercased leading keywords of a statement passed through unbound.
    Other(SmolStr),
}

impl CommandTag {
    pub fn of(context: &StatementContext) -> Self {
        match context {
            StatementContext::Select(_) => CommandTag::Select,
            StatementContext::Insert(_) => CommandTag::Insert,
            StatementContext::Cursor(_) => CommandTag::DeclareCursor,
            StatementContext::Close(_) => CommandTag::CloseCursor,
            StatementContext::Move(_) => CommandTag::Move,
            StatementContext::Fetch(_) => CommandTag::Fetch,
            StatementContext::Common(CommonStatementContext::Update(_)) => CommandTag::Update,
            StatementContext::Common(CommonStatementContext::Delete(_)) => CommandTag::Delete,
            StatementContext::Common(CommonStatementContext::Merge(_)) => CommandTag::Merge,
            StatementContext::Common(CommonStatementContext::Other(statement)) => {
                Self::of_statement(statement)
            }
        }
    }

    pub fn of_statement(statement: &Statement) -> Self {
        match statement {
            Statement::Select(_) => CommandTag::Select,
            Statement::Insert(_) => CommandTag::Insert,
            Statement::Update(_) => CommandTag::Update,
            Statement::Delete(_) => CommandTag::Delete,
            Statement::Merge(_) => CommandTag::Merge,
            Statement::DeclareCursor(_) => CommandTag::DeclareCursor,
            Statement::CloseCursor(_) => CommandTag::CloseCursor,
            Statement::Move(_) => CommandTag::Move,
            Statement::Fetch(_) => CommandTag::Fetch,
            Statement::Set(_) => CommandTag::Set,
            Statement::Empty => CommandTag::Empty,
            Statement::Other(keywords) => CommandTag::Other(keywords.to_uppercase().into()),
        }
    }

    /// Renders the tag text for a command that affected or returned `rows` rows.
    pub fn render(&self, rows: u64) -> String {
        match self {
            CommandTag::Select => format!("SELECT {rows}"),
            // oid is always zero
            CommandTag::Insert => format!("INSERT 0 {rows}"),
            CommandTag::Update => format!("UPDATE {rows}"),
            CommandTag::Delete => format!("DELETE {rows}"),
            CommandTag::Merge => format!("MERGE {rows}"),
            CommandTag::Move => format!("MOVE {rows}"),
            CommandTag::Fetch => format!("FETCH {rows}"),
            CommandTag::DeclareCursor => "DECLARE CURSOR".to_string(),
            CommandTag::CloseCursor => "CLOSE CURSOR".to_string(),
            CommandTag::Set => "SET".to_string(),
            CommandTag::Empty => String::new(),
            CommandTag::Other(keywords) => keywords.to_string(),
        }
    }
}
