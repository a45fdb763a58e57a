use std::ops::Range;

use serde::Serialize;
use shardline_catalog::rule::RuleMetadata;
use shardline_common::dialect::CasePolicy;
use shardline_common::value::ScalarValue;
use smol_str::SmolStr;
use sql_ast::ast::{Expr, InsertSource, InsertStatement};
use sql_ast::span::Spanned;
use sql_ast::visit::collect_parameters;
use tracing::debug;

use super::SelectStatementContext;
use crate::binder::{BoundInsert, InsertColumns};
use crate::bound::{BoundSelect, BoundTable};
use crate::condition::{
    AndCondition, Condition, ConditionColumn, ConditionOperator, ConditionValue, EncryptMarker,
    EncryptMarkerKind, GeneratedKeyCondition, GeneratedKeyValue, OrCondition, simple_value,
};

/// A single value of an inserted row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum InsertValue {
    Literal(ScalarValue),
    Parameter(usize),
    /// Anything else, identified by its span.
    Expression(Range<usize>),
}

impl InsertValue {
    fn from_expr(expr: &Spanned<Expr>) -> Self {
        match simple_value(expr.value()) {
            Some(ConditionValue::Literal(value)) => InsertValue::Literal(value),
            Some(ConditionValue::Parameter(index)) => InsertValue::Parameter(index),
            None => InsertValue::Expression(expr.span()),
        }
    }
}

/// The values of one inserted row, and where its parameters start in the flat parameter list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsertValueContext {
    values: Vec<Spanned<InsertValue>>,
    parameter_count: usize,
    parameters_offset: usize,
}

impl InsertValueContext {
    fn new<'e>(row: impl IntoIterator<Item = &'e Spanned<Expr>>, parameters_offset: usize) -> Self {
        let mut parameter_count = 0;
        let values = row
            .into_iter()
            .map(|expr| {
                parameter_count += collect_parameters(expr.value()).len();
                Spanned(InsertValue::from_expr(expr), expr.span())
            })
            .collect();
        Self {
            values,
            parameter_count,
            parameters_offset,
        }
    }

    #[inline]
    pub fn values(&self) -> &[Spanned<InsertValue>] {
        &self.values
    }

    #[inline]
    pub fn value(&self, index: usize) -> Option<&InsertValue> {
        self.values.get(index).map(|v| v.value())
    }

    /// Returns the literal at `index`, if the value there is a literal.
    pub fn literal_value(&self, index: usize) -> Option<&ScalarValue> {
        match self.value(index)? {
            InsertValue::Literal(value) => Some(value),
            _ => None,
        }
    }

    /// Number of parameter markers in the row, nested ones included.
    #[inline]
    pub fn parameter_count(&self) -> usize {
        self.parameter_count
    }

    #[inline]
    pub fn parameters_offset(&self) -> usize {
        self.parameters_offset
    }
}

/// The table's generated key column, and the values rows supply for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedKeyContext {
    pub column: SmolStr,
    /// `true` when the statement omits the column and the middleware must generate it.
    pub generated: bool,
    pub conditions: Vec<GeneratedKeyCondition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatementContext {
    statement: InsertStatement,
    tables: Vec<BoundTable>,
    columns: InsertColumns,
    value_contexts: Vec<InsertValueContext>,
    generated_key: Option<GeneratedKeyContext>,
    routing: OrCondition,
    encrypt_markers: Vec<EncryptMarker>,
    insert_select: Option<Box<SelectStatementContext>>,
}

impl InsertStatementContext {
    pub fn new(bound: BoundInsert, rules: &RuleMetadata, policy: CasePolicy) -> Self {
        let BoundInsert {
            statement,
            table,
            columns,
            select_projections,
        } = bound;

        let rows: Vec<Vec<&Spanned<Expr>>> = match &statement.source {
            InsertSource::Values(rows) => rows
                .iter()
                .map(|row| row.value().iter().collect())
                .collect(),
            InsertSource::Set(assignments) => {
                vec![assignments.iter().map(|a| &a.value().value).collect()]
            }
            InsertSource::Select(_) => Vec::new(),
        };
        let mut offset = 0;
        let value_contexts: Vec<_> = rows
            .into_iter()
            .map(|row| {
                let context = InsertValueContext::new(row, offset);
                offset += context.parameter_count();
                context
            })
            .collect();

        let generated_key = rules
            .generate_key_column(&table.table)
            .map(|column| generated_key_context(column, &columns, &value_contexts));
        let routing = routing_conditions(&table, &columns, &value_contexts, rules);
        let encrypt_markers = value_markers(&table, &columns, &value_contexts, rules);

        let insert_select = match (&statement.source, select_projections) {
            (InsertSource::Select(select), Some(projections)) => {
                let bound = BoundSelect {
                    statement: select.value().clone(),
                    projections,
                };
                Some(Box::new(SelectStatementContext::new(bound, rules, policy)))
            }
            _ => None,
        };
        let mut tables = vec![table];
        if let Some(select) = &insert_select {
            tables.extend(select.tables().iter().cloned());
        }

        Self {
            statement,
            tables,
            columns,
            value_contexts,
            generated_key,
            routing,
            encrypt_markers,
            insert_select,
        }
    }

    #[inline]
    pub fn statement(&self) -> &InsertStatement {
        &self.statement
    }

    /// The target table, then the tables of an `INSERT ... SELECT` source.
    #[inline]
    pub fn tables(&self) -> &[BoundTable] {
        &self.tables
    }

    #[inline]
    pub fn table(&self) -> &BoundTable {
        &self.tables[0]
    }

    #[inline]
    pub fn columns(&self) -> &InsertColumns {
        &self.columns
    }

    /// Returns `true` if the statement names its columns, by list or by `SET`.
    #[inline]
    pub fn contains_insert_columns(&self) -> bool {
        !self.columns.is_derived()
    }

    #[inline]
    pub fn value_contexts(&self) -> &[InsertValueContext] {
        &self.value_contexts
    }

    /// Number of inserted rows known at bind time. Zero for `INSERT ... SELECT`.
    #[inline]
    pub fn value_list_count(&self) -> usize {
        self.value_contexts.len()
    }

    /// Splits a flat parameter list into the parameters of each row.
    pub fn grouped_parameters<'p>(&self, parameters: &'p [ScalarValue]) -> Vec<&'p [ScalarValue]> {
        self.value_contexts
            .iter()
            .map(|context| {
                let start = context.parameters_offset().min(parameters.len());
                let end = (start + context.parameter_count()).min(parameters.len());
                &parameters[start..end]
            })
            .collect()
    }

    /// Maps parameters that are a whole inserted value to the column they are inserted into.
    pub fn parameter_columns(&self) -> Vec<(usize, &str)> {
        self.value_contexts
            .iter()
            .flat_map(|context| {
                context
                    .values()
                    .iter()
                    .zip(self.columns.names())
                    .filter_map(|(value, column)| match value.value() {
                        InsertValue::Parameter(index) => Some((*index, column.as_str())),
                        _ => None,
                    })
            })
            .collect()
    }

    #[inline]
    pub fn generated_key(&self) -> Option<&GeneratedKeyContext> {
        self.generated_key.as_ref()
    }

    /// One group per row, each holding the `=` conditions on sharding columns.
    #[inline]
    pub fn routing_conditions(&self) -> &OrCondition {
        &self.routing
    }

    #[inline]
    pub fn encrypt_markers(&self) -> &[EncryptMarker] {
        &self.encrypt_markers
    }

    #[inline]
    pub fn insert_select(&self) -> Option<&SelectStatementContext> {
        self.insert_select.as_deref()
    }
}

fn generated_key_context(
    column: &str,
    columns: &InsertColumns,
    value_contexts: &[InsertValueContext],
) -> GeneratedKeyContext {
    let Some(position) = columns.position(column) else {
        return GeneratedKeyContext {
            column: column.into(),
            generated: true,
            conditions: Vec::new(),
        };
    };
    let conditions = value_contexts
        .iter()
        .enumerate()
        .filter_map(|(row, context)| {
            let value = match context.values().get(position)? {
                Spanned(InsertValue::Parameter(index), _) => GeneratedKeyValue::Parameter(*index),
                Spanned(InsertValue::Literal(value), _) => {
                    GeneratedKeyValue::Literal(value.clone())
                }
                Spanned(InsertValue::Expression(_), span) => {
                    GeneratedKeyValue::Expression(span.clone())
                }
            };
            Some(GeneratedKeyCondition {
                column: column.into(),
                row,
                value,
            })
        })
        .collect();
    GeneratedKeyContext {
        column: column.into(),
        generated: false,
        conditions,
    }
}

fn routing_conditions(
    table: &BoundTable,
    columns: &InsertColumns,
    value_contexts: &[InsertValueContext],
    rules: &RuleMetadata,
) -> OrCondition {
    let mut and_conditions = Vec::with_capacity(value_contexts.len());
    for (row, context) in value_contexts.iter().enumerate() {
        let conditions: Vec<_> = columns
            .names()
            .iter()
            .zip(context.values())
            .filter(|(column, _)| rules.is_sharding_column(&table.table, column))
            .filter_map(|(column, value)| {
                let operand = match value.value() {
                    InsertValue::Literal(literal) => ConditionValue::Literal(literal.clone()),
                    InsertValue::Parameter(index) => ConditionValue::Parameter(*index),
                    InsertValue::Expression(_) => return None,
                };
                Some(Condition {
                    column: ConditionColumn::new(table.table.clone(), column.clone()),
                    operator: ConditionOperator::Eq,
                    values: vec![operand],
                    span: value.span(),
                })
            })
            .collect();
        if conditions.is_empty() {
            debug!(
                table = %table.table,
                row,
                "inserted row without sharding value, routing to all shards"
            );
            return OrCondition::default();
        }
        and_conditions.push(AndCondition::new(conditions));
    }
    OrCondition::new(and_conditions)
}

fn value_markers(
    table: &BoundTable,
    columns: &InsertColumns,
    value_contexts: &[InsertValueContext],
    rules: &RuleMetadata,
) -> Vec<EncryptMarker> {
    value_contexts
        .iter()
        .flat_map(|context| columns.names().iter().zip(context.values()))
        .filter_map(|(column, value)| {
            let encryptor = rules.find_encryptor(&table.table, column)?;
            Some(EncryptMarker {
                span: value.span(),
                column: ConditionColumn::new(table.table.clone(), column.clone()),
                encryptor: encryptor.into(),
                kind: EncryptMarkerKind::InsertValue,
            })
        })
        .collect()
}
