//! Bound statement contexts handed to routing, rewriting and the wire protocol.
//!
//! A context owns its bound statement; nothing in it refers back to the input tree.

mod common;
mod cursor;
mod dml;
mod insert;
mod select;

pub use common::CommonStatementContext;
pub use cursor::{
    CloseStatementContext, CursorStatementContext, FetchStatementContext, MoveStatementContext,
};
pub use dml::{DeleteStatementContext, MergeStatementContext, UpdateStatementContext};
pub use insert::{GeneratedKeyContext, InsertStatementContext, InsertValue, InsertValueContext};
use serde::Serialize;
pub use select::SelectStatementContext;
use shardline_catalog::rule::RuleMetadata;
use shardline_common::dialect::CasePolicy;
use smol_str::SmolStr;
use sql_ast::ast::{Assignment, Expr};
use sql_ast::span::Spanned;

use crate::bound::BoundTable;
use crate::condition::{
    ConditionColumn, EncryptMarker, EncryptMarkerKind, OrCondition, extract_encrypt_conditions,
    extract_routing_conditions,
};

#[derive(Debug, Clone, PartialEq)]
pub enum StatementContext {
    Select(SelectStatementContext),
    Insert(InsertStatementContext),
    Cursor(CursorStatementContext),
    Close(CloseStatementContext),
    Move(MoveStatementContext),
    Fetch(FetchStatementContext),
    Common(CommonStatementContext),
}

impl StatementContext {
    /// Tables the statement reads or writes, subqueries included.
    pub fn tables(&self) -> &[BoundTable] {
        match self {
            StatementContext::Select(context) => context.tables(),
            StatementContext::Insert(context) => context.tables(),
            StatementContext::Cursor(context) => context.select().tables(),
            StatementContext::Close(_) | StatementContext::Move(_) | StatementContext::Fetch(_) => {
                &[]
            }
            StatementContext::Common(context) => context.tables(),
        }
    }

    /// Returns the routing tree, or `None` for statements that are never routed by value.
    pub fn routing_conditions(&self) -> Option<&OrCondition> {
        match self {
            StatementContext::Select(context) => Some(context.routing_conditions()),
            StatementContext::Insert(context) => Some(context.routing_conditions()),
            StatementContext::Cursor(context) => Some(context.select().routing_conditions()),
            StatementContext::Close(_) | StatementContext::Move(_) | StatementContext::Fetch(_) => {
                None
            }
            StatementContext::Common(context) => context.routing_conditions(),
        }
    }

    /// Returns the encrypt rewrite markers, in source order of their predicates.
    pub fn encrypt_markers(&self) -> &[EncryptMarker] {
        match self {
            StatementContext::Select(context) => context.encrypt_markers(),
            StatementContext::Insert(context) => context.encrypt_markers(),
            StatementContext::Cursor(context) => context.select().encrypt_markers(),
            StatementContext::Close(_) | StatementContext::Move(_) | StatementContext::Fetch(_) => {
                &[]
            }
            StatementContext::Common(context) => context.encrypt_markers(),
        }
    }

    /// Returns `true` if executing the statement produces rows.
    #[inline]
    pub fn is_query(&self) -> bool {
        matches!(
            self,
            StatementContext::Select(_) | StatementContext::Fetch(_)
        )
    }
}

/// Routing and encrypt conditions of the predicates of one statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConditionSet {
    pub routing: OrCondition,
    pub encrypt: OrCondition,
    pub encrypt_markers: Vec<EncryptMarker>,
}

impl ConditionSet {
    /// Extracts each predicate on its own and concatenates the groups in order.
    ///
    /// A predicate that cannot narrow adds no routing group, it does not clear the groups of the
    /// others.
    pub fn extract<'a>(
        predicates: impl IntoIterator<Item = &'a Spanned<Expr>>,
        rules: &RuleMetadata,
    ) -> Self {
        let mut set = Self::default();
        for predicate in predicates {
            let routing = extract_routing_conditions(predicate, |table, column| {
                rules.is_sharding_column(table, column)
            });
            set.routing.and_conditions.extend(routing.and_conditions);
            let (encrypt, markers) = extract_encrypt_conditions(predicate, |table, column| {
                rules.find_encryptor(table, column).map(SmolStr::new)
            });
            set.encrypt.and_conditions.extend(encrypt.and_conditions);
            for marker in markers {
                if !set.encrypt_markers.iter().any(|m| m.span == marker.span) {
                    set.encrypt_markers.push(marker);
                }
            }
        }
        set
    }
}

/// Emits one marker per assignment to an encrypted column, spanning the column and the value.
pub(crate) fn assignment_markers(
    assignments: &[Spanned<Assignment>],
    rules: &RuleMetadata,
) -> Vec<EncryptMarker> {
    assignments
        .iter()
        .filter_map(|assignment| {
            let Assignment { column, value } = assignment.value();
            let bound = column.value().bound.as_ref()?;
            let encryptor = rules.find_encryptor(&bound.original_table, &bound.original_column)?;
            Some(EncryptMarker {
                span: column.1.start..value.1.end,
                column: ConditionColumn::new(
                    bound.original_table.clone(),
                    bound.original_column.clone(),
                ),
                encryptor: encryptor.into(),
                kind: EncryptMarkerKind::Assignment,
            })
        })
        .collect()
}

/// Normalizes an identifier that names a session object, e.g. a cursor.
pub(crate) fn object_name(ident: &sql_ast::ast::Ident, policy: CasePolicy) -> SmolStr {
    SmolStr::new(policy.normalize(&ident.value, ident.is_quoted()))
}
