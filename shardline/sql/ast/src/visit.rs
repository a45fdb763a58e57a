//! Read-only traversal over the statement tree.
//!
//! Nodes are visited in source order, subqueries included.

use std::ops::Range;

use crate::ast::*;
use crate::span::Spanned;

pub trait Visitor<'a> {
    fn visit_column(&mut self, _column: &'a ColumnRef) {}

    fn visit_table(&mut self, _table: &'a SimpleTable, _span: Range<usize>) {}

    fn visit_parameter(&mut self, _parameter: ParameterMarker) {}

    /// Called for every WHERE, JOIN ON and MERGE ON predicate before its expression is walked.
    fn visit_predicate(&mut self, _predicate: &'a Spanned<Expr>) {}
}

pub fn walk_statement<'a, V: Visitor<'a>>(v: &mut V, statement: &'a Statement) {
    match statement {
        Statement::Select(select) => walk_select(v, select),
        Statement::Insert(insert) => {
            v.visit_table(insert.table.value(), insert.table.span());
            insert.columns.iter().for_each(|c| v.visit_column(c.value()));
            match &insert.source {
                InsertSource::Values(rows) => rows
                    .iter()
                    .flat_map(|row| row.value().iter())
                    .for_each(|e| walk_expr(v, e.value())),
                InsertSource::Select(select) => walk_select(v, select.value()),
                InsertSource::Set(assignments) => walk_assignments(v, assignments),
            }
        }
        Statement::Update(update) => {
            v.visit_table(update.table.value(), update.table.span());
            walk_assignments(v, &update.assignments);
            if let Some(expr) = &update.where_clause {
                v.visit_predicate(expr);
                walk_expr(v, expr.value());
            }
        }
        Statement::Delete(delete) => {
            v.visit_table(delete.table.value(), delete.table.span());
            if let Some(expr) = &delete.where_clause {
                v.visit_predicate(expr);
                walk_expr(v, expr.value());
            }
        }
        Statement::Merge(merge) => walk_merge(v, merge),
        Statement::DeclareCursor(cursor) => walk_select(v, cursor.query.value()),
        Statement::CloseCursor(_)
        | Statement::Move(_)
        | Statement::Fetch(_)
        | Statement::Set(_)
        | Statement::Empty
        | Statement::Other(_) => {}
    }
}

pub fn walk_select<'a, V: Visitor<'a>>(v: &mut V, select: &'a SelectStatement) {
    for projection in &select.projections {
        if let Projection::Expr { expr, .. } = projection.value() {
            walk_expr(v, expr.value());
        }
    }
    for table in &select.from {
        walk_table(v, table);
    }
    if let Some(predicate) = &select.where_clause {
        v.visit_predicate(predicate);
    }
    let clauses = select
        .where_clause
        .iter()
        .chain(&select.group_by)
        .chain(&select.having)
        .chain(select.order_by.iter().map(|o| &o.value().expr));
    for expr in clauses {
        walk_expr(v, expr.value());
    }
    if let Some(limit) = &select.limit {
        for expr in limit.limit.iter().chain(&limit.offset) {
            walk_expr(v, expr.value());
        }
    }
}

pub fn walk_merge<'a, V: Visitor<'a>>(v: &mut V, merge: &'a MergeStatement) {
    v.visit_table(merge.target.value(), merge.target.span());
    walk_table(v, &merge.source);
    v.visit_predicate(&merge.on);
    walk_expr(v, merge.on.value());
    if let Some(update) = &merge.when_matched {
        walk_assignments(v, &update.assignments);
        if let Some(expr) = &update.where_clause {
            v.visit_predicate(expr);
            walk_expr(v, expr.value());
        }
    }
    if let Some(insert) = &merge.when_not_matched {
        insert.columns.iter().for_each(|c| v.visit_column(c.value()));
        insert.values.iter().for_each(|e| walk_expr(v, e.value()));
    }
}

fn walk_assignments<'a, V: Visitor<'a>>(v: &mut V, assignments: &'a [Spanned<Assignment>]) {
    for assignment in assignments {
        v.visit_column(assignment.value().column.value());
        walk_expr(v, assignment.value().value.value());
    }
}

fn walk_table<'a, V: Visitor<'a>>(v: &mut V, table: &'a Spanned<TableRef>) {
    match table.value() {
        TableRef::Simple(simple) => v.visit_table(simple, table.span()),
        TableRef::Derived(derived) => walk_select(v, derived.query.value()),
        TableRef::Join(join) => {
            walk_table(v, &join.left);
            walk_table(v, &join.right);
            if let Some(JoinConstraint::On(expr)) = &join.constraint {
                v.visit_predicate(expr);
                walk_expr(v, expr.value());
            }
        }
    }
}

pub fn walk_expr<'a, V: Visitor<'a>>(v: &mut V, expr: &'a Expr) {
    match expr {
        Expr::Column(column) => v.visit_column(column),
        Expr::Literal(_) => {}
        Expr::Parameter(parameter) => v.visit_parameter(*parameter),
        Expr::Binary { left, right, .. } => {
            walk_expr(v, left.value());
            walk_expr(v, right.value());
        }
        Expr::Unary { child, .. } => walk_expr(v, child.value()),
        Expr::InList { expr, list, .. } => {
            walk_expr(v, expr.value());
            list.iter().for_each(|e| walk_expr(v, e.value()));
        }
        Expr::Between {
            expr, low, high, ..
        } => {
            walk_expr(v, expr.value());
            walk_expr(v, low.value());
            walk_expr(v, high.value());
        }
        Expr::IsNull { expr, .. } => walk_expr(v, expr.value()),
        Expr::Function(call) => call.args.iter().for_each(|e| walk_expr(v, e.value())),
        Expr::Subquery(query) | Expr::Exists { query, .. } => walk_select(v, query.value()),
        Expr::InSubquery { expr, query, .. } => {
            walk_expr(v, expr.value());
            walk_select(v, query.value());
        }
    }
}

#[derive(Default)]
struct ColumnCollector<'a>(Vec<&'a ColumnRef>);

impl<'a> Visitor<'a> for ColumnCollector<'a> {
    fn visit_column(&mut self, column: &'a ColumnRef) {
        self.0.push(column);
    }
}

/// Collects every column reference reachable from `statement`.
pub fn collect_columns(statement: &Statement) -> Vec<&ColumnRef> {
    let mut collector = ColumnCollector::default();
    walk_statement(&mut collector, statement);
    collector.0
}

#[derive(Default)]
struct ParameterCollector(Vec<ParameterMarker>);

impl Visitor<'_> for ParameterCollector {
    fn visit_parameter(&mut self, parameter: ParameterMarker) {
        self.0.push(parameter);
    }
}

#[derive(Default)]
struct PredicateCollector<'a>(Vec<&'a Spanned<Expr>>);

impl<'a> Visitor<'a> for PredicateCollector<'a> {
    fn visit_predicate(&mut self, predicate: &'a Spanned<Expr>) {
        self.0.push(predicate);
    }
}

/// Collects the WHERE and JOIN ON predicates of `select` in source order, including those of
/// subqueries and derived tables.
pub fn collect_select_predicates(select: &SelectStatement) -> Vec<&Spanned<Expr>> {
    let mut collector = PredicateCollector::default();
    walk_select(&mut collector, select);
    collector.0
}

/// Collects `predicate` followed by the predicates of the subqueries nested in it.
pub fn collect_nested_predicates(predicate: &Spanned<Expr>) -> Vec<&Spanned<Expr>> {
    let mut collector = PredicateCollector(vec![predicate]);
    walk_expr(&mut collector, predicate.value());
    collector.0
}

#[derive(Default)]
struct TableCollector<'a>(Vec<&'a SimpleTable>);

impl<'a> Visitor<'a> for TableCollector<'a> {
    fn visit_table(&mut self, table: &'a SimpleTable, _span: Range<usize>) {
        self.0.push(table);
    }
}

/// Collects every simple table reachable from `statement`, subqueries included.
pub fn collect_tables(statement: &Statement) -> Vec<&SimpleTable> {
    let mut collector = TableCollector::default();
    walk_statement(&mut collector, statement);
    collector.0
}

/// Like [`collect_tables`], for a single query.
pub fn collect_select_tables(select: &SelectStatement) -> Vec<&SimpleTable> {
    let mut collector = TableCollector::default();
    walk_select(&mut collector, select);
    collector.0
}

/// Like [`collect_tables`], for a single MERGE statement. The target comes first.
pub fn collect_merge_tables(merge: &MergeStatement) -> Vec<&SimpleTable> {
    let mut collector = TableCollector::default();
    walk_merge(&mut collector, merge);
    collector.0
}

/// Returns the number of parameters `statement` expects, i.e. one past the highest marker index.
pub fn parameter_count(statement: &Statement) -> usize {
    let mut collector = ParameterCollector::default();
    walk_statement(&mut collector, statement);
    collector.0.iter().map(|p| p.index + 1).max().unwrap_or(0)
}

/// Collects the parameter markers of `expr`.
pub fn collect_parameters(expr: &Expr) -> Vec<ParameterMarker> {
    let mut collector = ParameterCollector::default();
    walk_expr(&mut collector, expr);
    collector.0
}
