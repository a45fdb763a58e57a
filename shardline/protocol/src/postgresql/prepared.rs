use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use bytes::Bytes;
use itertools::Itertools;
use shardline_binder::BindEngine;
use shardline_binder::context::{CommonStatementContext, StatementContext};
use shardline_catalog::column::Column;
use shardline_catalog::provider::CatalogProvider;
use shardline_common::data_type::DataType;
use shardline_common::value::ScalarValue;
use smol_str::SmolStr;
use sql_ast::ast::{Statement, VariableAssign};
use sql_ast::span::Spanned;
use sql_ast::visit::parameter_count;
use tracing::debug;

use super::message::{BackendMessage, FieldDescription, ValueFormat};
use super::types::{PgType, decode_parameter};
use crate::error::{ProtocolError, ProtocolResult};

/// A parsed and bound statement registered by a Parse message.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedStatement {
    name: SmolStr,
    sql: String,
    context: StatementContext,
    parameter_types: Vec<PgType>,
    /// `None` when the statement returns no rows, or its columns are only known after execution.
    row_fields: Option<Vec<FieldDescription>>,
}

impl PreparedStatement {
    /// Binds `statement` and resolves the types of its parameters.
    ///
    /// `declared` holds the oids sent with Parse and may be shorter than the number of parameter
    /// markers. Parameters left unspecified whose value is inserted straight into a column take
    /// that column's type.
    pub fn prepare(
        name: impl Into<SmolStr>,
        sql: impl Into<String>,
        statement: &Statement,
        declared: &[PgType],
        engine: &BindEngine<'_>,
    ) -> ProtocolResult<Self> {
        let name = name.into();
        let context = engine.bind(statement)?;
        let catalog = engine.catalog();

        let count = parameter_count(statement).max(declared.len());
        let mut parameter_types = declared.to_vec();
        parameter_types.resize(count, PgType::Unspecified);
        if let StatementContext::Insert(insert) = &context {
            let table = insert.table();
            for (index, column) in insert.parameter_columns() {
                if parameter_types[index] != PgType::Unspecified {
                    continue;
                }
                let data_type =
                    column_type(catalog, &table.database, &table.schema, &table.table, column)?;
                if let Some(data_type) = data_type {
                    parameter_types[index] = data_type.into();
                }
            }
        }

        let row_fields = match &context {
            StatementContext::Select(select) => Some(
                select
                    .projections()
                    .iter()
                    .map(|projection| {
                        let data_type = match &projection.column {
                            Some(info) => column_type(
                                catalog,
                                &info.original_database,
                                &info.original_schema,
                                &info.original_table,
                                &info.original_column,
                            )?
                            .map_or(PgType::Text, PgType::from),
                            None => PgType::Text,
                        };
                        Ok(FieldDescription::new(
                            projection.label.clone(),
                            data_type,
                            ValueFormat::Text,
                        ))
                    })
                    .collect::<ProtocolResult<Vec<_>>>()?,
            ),
            _ => None,
        };

        debug!(
            statement = %name,
            parameters = %parameter_types.iter().join(","),
            "statement prepared"
        );
        Ok(Self {
            name,
            sql: sql.into(),
            context,
            parameter_types,
            row_fields,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    #[inline]
    pub fn context(&self) -> &StatementContext {
        &self.context
    }

    #[inline]
    pub fn parameter_types(&self) -> &[PgType] {
        &self.parameter_types
    }

    /// Returns `true` for a statement with no SQL body.
    pub fn is_empty(&self) -> bool {
        matches!(self.passthrough(), Some(Statement::Empty))
    }

    /// The assignments of a `SET` statement, empty for anything else.
    pub fn set_assignments(&self) -> impl Iterator<Item = &VariableAssign> {
        let assignments: &[Spanned<VariableAssign>] = match self.passthrough() {
            Some(Statement::Set(set)) => set.assignments.as_slice(),
            _ => &[],
        };
        assignments.iter().map(|assign| assign.value())
    }

    fn passthrough(&self) -> Option<&Statement> {
        match &self.context {
            StatementContext::Common(CommonStatementContext::Other(statement)) => Some(statement),
            _ => None,
        }
    }

    /// Decodes the raw parameters of a Bind message against the resolved parameter types.
    pub fn decode_parameters(
        &self,
        formats: &[ValueFormat],
        raw: &[Option<Bytes>],
    ) -> ProtocolResult<Vec<ScalarValue>> {
        if raw.len() != self.parameter_types.len() {
            return Err(ProtocolError::ParameterCountMismatch {
                expected: self.parameter_types.len(),
                actual: raw.len(),
            });
        }
        raw.iter()
            .zip(&self.parameter_types)
            .enumerate()
            .map(|(index, (value, ty))| {
                let format = ValueFormat::select(formats, index);
                decode_parameter(index, *ty, format, value.as_deref())
            })
            .collect()
    }

    /// Answers Describe for the statement: ParameterDescription, then RowDescription or NoData.
    pub fn describe(&self) -> Vec<BackendMessage> {
        let rows = match &self.row_fields {
            Some(fields) => BackendMessage::RowDescription(fields.clone()),
            None => BackendMessage::NoData,
        };
        vec![
            BackendMessage::ParameterDescription(self.parameter_types.clone()),
            rows,
        ]
    }
}

fn column_type(
    catalog: &dyn CatalogProvider,
    database: &str,
    schema: &str,
    table: &str,
    column: &str,
) -> ProtocolResult<Option<DataType>> {
    let Some(database) = catalog.get_database(database)? else {
        return Ok(None);
    };
    let Some(schema) = database.get_schema(schema)? else {
        return Ok(None);
    };
    let Some(table) = schema.get_table(table)? else {
        return Ok(None);
    };
    Ok(table.get_column(column).map(Column::data_type))
}

/// Prepared statements of one session, by name.
///
/// The unnamed statement is replaced by every Parse that targets it. Named statements must be
/// closed before their name can be reused.
#[derive(Debug, Default)]
pub struct PreparedStatementRegistry {
    statements: HashMap<SmolStr, Arc<PreparedStatement>>,
}

impl PreparedStatementRegistry {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        statement: PreparedStatement,
    ) -> ProtocolResult<Arc<PreparedStatement>> {
        let statement = Arc::new(statement);
        match self.statements.entry(statement.name.clone()) {
            Entry::Occupied(mut entry) if entry.key().is_empty() => {
                entry.insert(statement.clone());
            }
            Entry::Occupied(entry) => {
                return Err(ProtocolError::DuplicatePreparedStatement(entry.key().clone()));
            }
            Entry::Vacant(entry) => {
                entry.insert(statement.clone());
            }
        }
        Ok(statement)
    }

    pub fn get(&self, name: &str) -> ProtocolResult<Arc<PreparedStatement>> {
        self.statements
            .get(name)
            .cloned()
            .ok_or_else(|| ProtocolError::PreparedStatementNotFound(name.into()))
    }

    /// Removes the statement. Closing a name that does not exist is not an error.
    pub fn close(&mut self, name: &str) {
        self.statements.remove(name);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}
