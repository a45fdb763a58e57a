use shardline_catalog::rule::RuleMetadata;
use shardline_common::dialect::CasePolicy;
use sql_ast::ast::{SelectStatement, TableSourceType};
use sql_ast::visit::{collect_select_predicates, collect_select_tables};

use super::ConditionSet;
use crate::bound::{BoundProjection, BoundSelect, BoundTable};
use crate::condition::{EncryptMarker, OrCondition};

#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatementContext {
    statement: SelectStatement,
    tables: Vec<BoundTable>,
    projections: Vec<BoundProjection>,
    conditions: ConditionSet,
}

impl SelectStatementContext {
    pub fn new(bound: BoundSelect, rules: &RuleMetadata, policy: CasePolicy) -> Self {
        let BoundSelect {
            statement,
            projections,
        } = bound;
        let tables = collect_select_tables(&statement)
            .into_iter()
            .map(|t| BoundTable::from_simple(t, policy))
            .collect();
        let conditions = ConditionSet::extract(collect_select_predicates(&statement), rules);
        Self {
            statement,
            tables,
            projections,
            conditions,
        }
    }

    #[inline]
    pub fn statement(&self) -> &SelectStatement {
        &self.statement
    }

    #[inline]
    pub fn tables(&self) -> &[BoundTable] {
        &self.tables
    }

    /// Output columns, with `*` expanded.
    #[inline]
    pub fn projections(&self) -> &[BoundProjection] {
        &self.projections
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

    /// Returns `true` if the query reads any table other than `DUAL`.
    pub fn contains_tables(&self) -> bool {
        self.tables
            .iter()
            .any(|t| t.source != TableSourceType::Unknown)
    }
}
