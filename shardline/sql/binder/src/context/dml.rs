use shardline_catalog::rule::RuleMetadata;
use shardline_common::dialect::CasePolicy;
use sql_ast::ast::{DeleteStatement, MergeStatement, UpdateStatement};
use sql_ast::visit::{collect_merge_tables, collect_nested_predicates};

use super::{ConditionSet, assignment_markers};
use crate::bound::BoundTable;
use crate::condition::{EncryptMarker, OrCondition};

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatementContext {
    statement: UpdateStatement,
    tables: Vec<BoundTable>,
    conditions: ConditionSet,
    encrypt_markers: Vec<EncryptMarker>,
}

impl UpdateStatementContext {
    pub fn new(statement: UpdateStatement, rules: &RuleMetadata, policy: CasePolicy) -> Self {
        let tables = vec![BoundTable::from_simple(statement.table.value(), policy)];
        let predicates = statement.where_clause.iter().flat_map(collect_nested_predicates);
        let conditions = ConditionSet::extract(predicates, rules);
        let mut encrypt_markers = assignment_markers(&statement.assignments, rules);
        encrypt_markers.extend(conditions.encrypt_markers.iter().cloned());
        Self {
            statement,
            tables,
            conditions,
            encrypt_markers,
        }
    }

    #[inline]
    pub fn statement(&self) -> &UpdateStatement {
        &self.statement
    }

    #[inline]
    pub fn tables(&self) -> &[BoundTable] {
        &self.tables
    }

    #[inline]
    pub fn routing_conditions(&self) -> &OrCondition {
        &self.conditions.routing
    }

    #[inline]
    pub fn encrypt_conditions(&self) -> &OrCondition {
        &self.conditions.encrypt
    }

    /// Assignment markers first, then predicate markers.
    #[inline]
    pub fn encrypt_markers(&self) -> &[EncryptMarker] {
        &self.encrypt_markers
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatementContext {
    statement: DeleteStatement,
    tables: Vec<BoundTable>,
    conditions: ConditionSet,
}

impl DeleteStatementContext {
    pub fn new(statement: DeleteStatement, rules: &RuleMetadata, policy: CasePolicy) -> Self {
        let tables = vec![BoundTable::from_simple(statement.table.value(), policy)];
        let predicates = statement.where_clause.iter().flat_map(collect_nested_predicates);
        let conditions = ConditionSet::extract(predicates, rules);
        Self {
            statement,
            tables,
            conditions,
        }
    }

    #[inline]
    pub fn statement(&self) -> &DeleteStatement {
        &self.statement
    }

    #[inline]
    pub fn tables(&self) -> &[BoundTable] {
        &self.tables
    }

    #[inline]
    pub fn routing_conditions(&self) -> &OrCondition {
        &self.conditions.routing
    }

    #[inline]
    pub fn encrypt_conditions(&self) -> &OrCondition {
        &self.conditions.encrypt
    }

    #[inline]
    pub fn encrypt_markers(&self) -> &[EncryptMarker] {
        &self.conditions.encrypt_markers
    }
}

/// Routing of a MERGE comes from its ON condition and the subqueries inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeStatementContext {
    statement: MergeStatement,
    tables: Vec<BoundTable>,
    conditions: ConditionSet,
    encrypt_markers: Vec<EncryptMarker>,
}

impl MergeStatementContext {
    pub fn new(statement: MergeStatement, rules: &RuleMetadata, policy: CasePolicy) -> Self {
        let tables = collect_merge_tables(&statement)
            .into_iter()
            .map(|t| BoundTable::from_simple(t, policy))
            .collect();
        let conditions = ConditionSet::extract(collect_nested_predicates(&statement.on), rules);
        let mut encrypt_markers = statement
            .when_matched
            .as_ref()
            .map(|update| assignment_markers(&update.assignments, rules))
            .unwrap_or_default();
        encrypt_markers.extend(conditions.encrypt_markers.iter().cloned());
        Self {
            statement,
            tables,
            conditions,
            encrypt_markers,
        }
    }

    #[inline]
    pub fn statement(&self) -> &MergeStatement {
        &self.statement
    }

    /// The target first, then the tables of the source.
    #[inline]
    pub fn tables(&self) -> &[BoundTable] {
        &self.tables
    }

    #[inline]
    pub fn routing_conditions(&self) -> &OrCondition {
        &self.conditions.routing
    }

    #[inline]
    pub fn encrypt_markers(&self) -> &[EncryptMarker] {
        &self.encrypt_markers
    }
}
