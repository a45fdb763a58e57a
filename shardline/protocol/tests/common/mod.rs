#![allow(dead_code)]

use std::collections::VecDeque;
use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use shardline_binder::BindEngine;
use shardline_binder::context::StatementContext;
use shardline_binder::options::BinderOptions;
use shardline_catalog::column::Column;
use shardline_catalog::memory::MemoryCatalog;
use shardline_catalog::memory::database::MemoryDatabaseCatalog;
use shardline_catalog::memory::schema::MemorySchemaCatalog;
use shardline_catalog::memory::table::MemoryTableCatalog;
use shardline_catalog::rule::RuleMetadata;
use shardline_common::data_type::DataType;
use shardline_common::value::ScalarValue;
use shardline_protocol::backend::{
    BackendError, BackendHandler, BackendHandlerFactory, BackendResult, QueryHeader,
    QueryResponseRow, ResponseHeader,
};
use shardline_protocol::postgresql::PreparedStatement;
use shardline_protocol::postgresql::types::PgType;
use sql_ast::ast::*;
use sql_ast::span::Spanned;

pub fn catalog() -> MemoryCatalog {
    let t_order = MemoryTableCatalog::new("t_order").with_columns([
        Column::new("order_id", DataType::BigInt).with_primary_key(),
        Column::new("user_id", DataType::Integer),
        Column::new("status", DataType::Varchar),
    ]);
    let schema = MemorySchemaCatalog::new("public")
        .with_table(t_order)
        .unwrap();
    let database = MemoryDatabaseCatalog::new("foo_db")
        .with_schema(schema)
        .unwrap();
    MemoryCatalog::new().with_database(database).unwrap()
}

pub fn prepare(name: &str, statement: Statement, declared: &[PgType]) -> PreparedStatement {
    let catalog = catalog();
    let rules = RuleMetadata::new();
    let options = BinderOptions::new("foo_db");
    let engine = BindEngine::new(&catalog, &rules, &options);
    PreparedStatement::prepare(name, "", &statement, declared, &engine).unwrap()
}

/// Calls observed by a [`MockFactory`] and the handlers it created.
#[derive(Debug, Default)]
pub struct BackendLog {
    pub created: Mutex<Vec<Vec<ScalarValue>>>,
    pub closed: AtomicUsize,
}

impl BackendLog {
    pub fn created(&self) -> Vec<Vec<ScalarValue>> {
        self.created.lock().clone()
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct MockFactory {
    header: ResponseHeader,
    rows: Vec<QueryResponseRow>,
    fail_execute: bool,
    fail_close: bool,
    pub log: Arc<BackendLog>,
}

impl MockFactory {
    pub fn query(columns: Vec<QueryHeader>, rows: Vec<QueryResponseRow>) -> Self {
        Self {
            header: ResponseHeader::Query(columns),
            rows,
            fail_execute: false,
            fail_close: false,
            log: Arc::default(),
        }
    }

    pub fn update(updated: u64) -> Self {
        Self {
            header: ResponseHeader::Update { updated },
            ..Self::query(vec![], vec![])
        }
    }

    pub fn failing_execute(mut self) -> Self {
        self.fail_execute = true;
        self
    }

    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }
}

impl BackendHandlerFactory for MockFactory {
    fn create(
        &self,
        _sql: &str,
        _context: &StatementContext,
        parameters: &[ScalarValue],
    ) -> BackendResult<Box<dyn BackendHandler>> {
        self.log.created.lock().push(parameters.to_vec());
        Ok(Box::new(MockHandler {
            header: self.header.clone(),
            rows: self.rows.iter().cloned().collect(),
            current: None,
            fail_execute: self.fail_execute,
            fail_close: self.fail_close,
            log: self.log.clone(),
        }))
    }
}

#[derive(Debug)]
struct MockHandler {
    header: ResponseHeader,
    rows: VecDeque<QueryResponseRow>,
    current: Option<QueryResponseRow>,
    fail_execute: bool,
    fail_close: bool,
    log: Arc<BackendLog>,
}

impl BackendHandler for MockHandler {
    fn execute(&mut self) -> BackendResult<ResponseHeader> {
        if self.fail_execute {
            return Err(BackendError::msg("table t_order_0 does not exist"));
        }
        Ok(self.header.clone())
    }

    fn next(&mut self) -> BackendResult<bool> {
        self.current = self.rows.pop_front();
        Ok(self.current.is_some())
    }

    fn row_data(&mut self) -> BackendResult<QueryResponseRow> {
        self.current
            .clone()
            .ok_or_else(|| BackendError::msg("no current row"))
    }

    fn close(&mut self) -> BackendResult<()> {
        self.log.closed.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            return Err(BackendError::msg("connection reset"));
        }
        Ok(())
    }
}

pub fn int_rows(values: &[i32]) -> Vec<QueryResponseRow> {
    values
        .iter()
        .map(|v| QueryResponseRow::new(vec![ScalarValue::Int32(*v)]))
        .collect()
}

// Spans only need to be distinct enough for the binder; they are never read back here.
fn span(start: usize, len: usize) -> Range<usize> {
    start..start + len
}

pub fn ident(value: &str, at: usize) -> Spanned<Ident> {
    Spanned(Ident::new(value), span(at, value.len()))
}

pub fn col(name: &str, at: usize) -> Spanned<Expr> {
    let name = ident(name, at);
    let span = name.span();
    Spanned(Expr::Column(ColumnRef::new(None, name)), span)
}

pub fn param(index: usize, at: usize) -> Spanned<Expr> {
    Spanned(Expr::Parameter(ParameterMarker { index }), span(at, 2))
}

fn table(name: &str, at: usize) -> Spanned<SimpleTable> {
    let name = ident(name, at);
    let span = name.span();
    let table_name = Spanned(
        TableName {
            database: None,
            schema: None,
            name,
        },
        span.clone(),
    );
    Spanned(SimpleTable::new(table_name, None), span)
}

/// `SELECT order_id, status FROM t_order WHERE user_id = $1`
pub fn select_orders() -> Statement {
    let projections = vec![col("order_id", 7), col("status", 17)]
        .into_iter()
        .map(|expr| {
            let span = expr.span();
            Spanned(Projection::Expr { expr, alias: None }, span)
        })
        .collect();
    let left = col("user_id", 42);
    let right = param(0, 52);
    let condition = Spanned(
        Expr::Binary {
            op: BinaryOp::Eq,
            left: Box::new(left),
            right: Box::new(right),
        },
        42..54,
    );
    Statement::Select(SelectStatement {
        distinct: false,
        projections,
        from: vec![table("t_order", 29).map(TableRef::Simple)],
        where_clause: Some(condition),
        group_by: vec![],
        having: None,
        order_by: vec![],
        limit: None,
    })
}

/// `INSERT INTO t_order (order_id, user_id, status) VALUES ($1, $2, $3)`
pub fn insert_order() -> Statement {
    let columns = [("order_id", 21), ("user_id", 31), ("status", 40)]
        .into_iter()
        .map(|(name, at)| {
            let name = ident(name, at);
            let span = name.span();
            Spanned(ColumnRef::new(None, name), span)
        })
        .collect();
    let values = vec![param(0, 56), param(1, 60), param(2, 64)];
    Statement::Insert(InsertStatement {
        table: table("t_order", 12),
        columns,
        source: InsertSource::Values(vec![Spanned(values, 56..66)]),
    })
}

/// `SET client_encoding = utf8`
pub fn set_client_encoding() -> Statement {
    let assign = VariableAssign {
        variable: ident("client_encoding", 4),
        value: Spanned("utf8".into(), 22..26),
    };
    Statement::Set(SetStatement {
        assignments: vec![Spanned(assign, 4..26)],
    })
}

pub fn order_header() -> Vec<QueryHeader> {
    vec![QueryHeader::new("order_id", DataType::Integer)]
}
