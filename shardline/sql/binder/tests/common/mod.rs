#![allow(dead_code)]

use std::cell::Cell;
use std::ops::Range;

use shardline_binder::options::BinderOptions;
use shardline_catalog::column::Column;
use shardline_catalog::memory::MemoryCatalog;
use shardline_catalog::memory::database::MemoryDatabaseCatalog;
use shardline_catalog::memory::schema::MemorySchemaCatalog;
use shardline_catalog::memory::table::MemoryTableCatalog;
use shardline_catalog::rule::{
    EncryptRule, EncryptRuleConfig, RuleMetadata, ShardingRule, ShardingRuleConfig,
};
use shardline_common::data_type::DataType;
use sql_ast::ast::*;
use sql_ast::span::{BoxSpanned, Spanned};

/// `foo_db.public` with `t_order`, `t_order_item` and `t_user`.
pub fn catalog() -> MemoryCatalog {
    let t_order = MemoryTableCatalog::new("t_order").with_columns([
        Column::new("order_id", DataType::BigInt).with_primary_key(),
        Column::new("user_id", DataType::Integer),
        Column::new("status", DataType::Varchar),
    ]);
    let t_order_item = MemoryTableCatalog::new("t_order_item").with_columns([
        Column::new("item_id", DataType::BigInt).with_primary_key(),
        Column::new("order_id", DataType::BigInt),
        Column::new("user_id", DataType::Integer),
        Column::new("status", DataType::Varchar),
    ]);
    let t_user = MemoryTableCatalog::new("t_user").with_columns([
        Column::new("user_id", DataType::Integer).with_primary_key(),
        Column::new("name", DataType::Varchar),
        Column::new("pwd", DataType::Varchar),
        Column::new("pwd_cipher", DataType::Varchar)
            .with_generated()
            .with_visible(false),
    ]);
    let schema = MemorySchemaCatalog::new("public")
        .with_table(t_order)
        .and_then(|s| s.with_table(t_order_item))
        .and_then(|s| s.with_table(t_user))
        .unwrap();
    let database = MemoryDatabaseCatalog::new("foo_db")
        .with_schema(schema)
        .unwrap();
    MemoryCatalog::new().with_database(database).unwrap()
}

pub fn rules() -> RuleMetadata {
    let sharding: ShardingRuleConfig = serde_json::from_str(
        r#"{
            "tables": [
                {
                    "name": "t_order",
                    "sharding_columns": ["user_id", "order_id", "status", "ts"],
                    "generate_key_column": "order_id"
                },
                { "name": "t_order_item", "sharding_columns": ["user_id", "order_id"] }
            ]
        }"#,
    )
    .unwrap();
    let encrypt: EncryptRuleConfig = serde_json::from_str(
        r#"{ "tables": [{ "name": "t_user", "columns": [{ "name": "pwd", "encryptor": "aes" }] }] }"#,
    )
    .unwrap();
    RuleMetadata::new()
        .with_sharding(ShardingRule::new(sharding))
        .with_encrypt(EncryptRule::new(encrypt))
}

pub fn options() -> BinderOptions {
    BinderOptions::new("foo_db")
}

thread_local! {
    static OFFSET: Cell<usize> = const { Cell::new(0) };
}

/// Hands out a fresh, non-overlapping span for every leaf node.
fn next_span(len: usize) -> Range<usize> {
    OFFSET.with(|offset| {
        let start = offset.get();
        offset.set(start + len + 1);
        start..start + len
    })
}

fn join_span<A, B>(left: &Spanned<A>, right: &Spanned<B>) -> Range<usize> {
    left.1.start..right.1.end
}

pub fn ident(value: &str) -> Spanned<Ident> {
    Spanned(Ident::new(value), next_span(value.len()))
}

pub fn column_ref(owner: Option<&str>, name: &str) -> Spanned<ColumnRef> {
    let owner = owner.map(ident);
    let name = ident(name);
    let span = match &owner {
        Some(owner) => join_span(owner, &name),
        None => name.span(),
    };
    Spanned(ColumnRef::new(owner, name), span)
}

pub fn col(name: &str) -> Spanned<Expr> {
    column_ref(None, name).map(Expr::Column)
}

pub fn qcol(owner: &str, name: &str) -> Spanned<Expr> {
    column_ref(Some(owner), name).map(Expr::Column)
}

pub fn int(value: i64) -> Spanned<Expr> {
    Spanned(
        Expr::Literal(Literal::Integer(value)),
        next_span(value.to_string().len()),
    )
}

pub fn string(value: &str) -> Spanned<Expr> {
    Spanned(
        Expr::Literal(Literal::String(value.into())),
        next_span(value.len() + 2),
    )
}

/// `$index + 1`
pub fn param(index: usize) -> Spanned<Expr> {
    Spanned(Expr::Parameter(ParameterMarker { index }), next_span(2))
}

pub fn binary(left: Spanned<Expr>, op: BinaryOp, right: Spanned<Expr>) -> Spanned<Expr> {
    let span = join_span(&left, &right);
    Spanned(
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        span,
    )
}

pub fn eq(left: Spanned<Expr>, right: Spanned<Expr>) -> Spanned<Expr> {
    binary(left, BinaryOp::Eq, right)
}

pub fn and(left: Spanned<Expr>, right: Spanned<Expr>) -> Spanned<Expr> {
    binary(left, BinaryOp::And, right)
}

pub fn or(left: Spanned<Expr>, right: Spanned<Expr>) -> Spanned<Expr> {
    binary(left, BinaryOp::Or, right)
}

pub fn in_list(expr: Spanned<Expr>, list: Vec<Spanned<Expr>>) -> Spanned<Expr> {
    let end = list.last().map_or(expr.1.end, |e| e.1.end + 1);
    let span = expr.1.start..end;
    Spanned(
        Expr::InList {
            expr: Box::new(expr),
            list,
            negated: false,
        },
        span,
    )
}

pub fn between(expr: Spanned<Expr>, low: Spanned<Expr>, high: Spanned<Expr>) -> Spanned<Expr> {
    let span = join_span(&expr, &high);
    Spanned(
        Expr::Between {
            expr: Box::new(expr),
            low: Box::new(low),
            high: Box::new(high),
            negated: false,
        },
        span,
    )
}

pub fn function(name: &str, args: Vec<Spanned<Expr>>) -> Spanned<Expr> {
    let name = ident(name);
    let end = args.last().map_or(name.1.end, |a| a.1.end + 1);
    let span = name.1.start..end;
    Spanned(Expr::Function(FunctionCall { name, args }), span)
}

pub fn simple_table(name: &str, alias: Option<&str>) -> Spanned<SimpleTable> {
    let name = ident(name);
    let table_name = Spanned(
        TableName {
            database: None,
            schema: None,
            name: name.clone(),
        },
        name.span(),
    );
    let alias = alias.map(ident);
    let span = match &alias {
        Some(alias) => join_span(&name, alias),
        None => name.span(),
    };
    Spanned(SimpleTable::new(table_name, alias), span)
}

pub fn table(name: &str, alias: Option<&str>) -> Spanned<TableRef> {
    simple_table(name, alias).map(TableRef::Simple)
}

pub fn join(
    left: Spanned<TableRef>,
    kind: JoinKind,
    right: Spanned<TableRef>,
    constraint: Option<JoinConstraint>,
) -> Spanned<TableRef> {
    let span = join_span(&left, &right);
    Spanned(
        TableRef::Join(Box::new(JoinTable {
            left,
            right,
            kind,
            constraint,
        })),
        span,
    )
}

pub fn projection(expr: Spanned<Expr>) -> Spanned<Projection> {
    let span = expr.span();
    Spanned(Projection::Expr { expr, alias: None }, span)
}

pub fn star() -> Spanned<Projection> {
    Spanned(Projection::Shorthand { owner: None }, next_span(1))
}

pub fn select(
    projections: Vec<Spanned<Projection>>,
    from: Vec<Spanned<TableRef>>,
    where_clause: Option<Spanned<Expr>>,
) -> SelectStatement {
    SelectStatement {
        distinct: false,
        projections,
        from,
        where_clause,
        group_by: vec![],
        having: None,
        order_by: vec![],
        limit: None,
    }
}

fn subquery(query: SelectStatement) -> BoxSpanned<SelectStatement> {
    Box::new(Spanned(query, next_span(1)))
}

/// `expr IN (query)`
pub fn in_subquery(expr: Spanned<Expr>, query: SelectStatement) -> Spanned<Expr> {
    let query = subquery(query);
    let span = expr.1.start..query.1.end;
    Spanned(
        Expr::InSubquery {
            expr: Box::new(expr),
            query,
            negated: false,
        },
        span,
    )
}

pub fn exists(query: SelectStatement) -> Spanned<Expr> {
    let query = subquery(query);
    let span = query.span();
    Spanned(
        Expr::Exists {
            query,
            negated: false,
        },
        span,
    )
}

/// `(query) AS alias`
pub fn derived(query: SelectStatement, alias: &str) -> Spanned<TableRef> {
    let query = subquery(query);
    let alias = ident(alias);
    let span = query.1.start..alias.1.end;
    Spanned(TableRef::Derived(DerivedTable { query, alias }), span)
}

pub fn row(values: Vec<Spanned<Expr>>) -> Spanned<Vec<Spanned<Expr>>> {
    let start = values.first().map_or(0, |v| v.1.start);
    let end = values.last().map_or(start, |v| v.1.end);
    Spanned(values, start..end)
}

pub fn insert_values(
    table: &str,
    columns: &[&str],
    rows: Vec<Spanned<Vec<Spanned<Expr>>>>,
) -> InsertStatement {
    InsertStatement {
        table: simple_table(table, None),
        columns: columns.iter().map(|c| column_ref(None, c)).collect(),
        source: InsertSource::Values(rows),
    }
}

pub fn assignment(column: Spanned<ColumnRef>, value: Spanned<Expr>) -> Spanned<Assignment> {
    let span = join_span(&column, &value);
    Spanned(Assignment { column, value }, span)
}
