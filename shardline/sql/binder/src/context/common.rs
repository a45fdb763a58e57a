use sql_ast::ast::Statement;

use super::{DeleteStatementContext, MergeStatementContext, UpdateStatementContext};
use crate::bound::BoundTable;
use crate::condition::{EncryptMarker, OrCondition};

/// Every statement without a dedicated context.
///
/// Data-modifying statements carry what their binders produced. Anything else is passed through
/// untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum CommonStatementContext {
    Update(UpdateStatementContext),
    Delete(DeleteStatementContext),
    Merge(MergeStatementContext),
    Other(Statement),
}

impl CommonStatementContext {
    pub fn tables(&self) -> &[BoundTable] {
        match self {
            CommonStatementContext::Update(context) => context.tables(),
            CommonStatementContext::Delete(context) => context.tables(),
            CommonStatementContext::Merge(context) => context.tables(),
            CommonStatementContext::Other(_) => &[],
        }
    }

    pub fn routing_conditions(&self) -> Option<&OrCondition> {
        match self {
            CommonStatementContext::Update(context) => Some(context.routing_conditions()),
            CommonStatementContext::Delete(context) => Some(context.routing_conditions()),
            CommonStatementContext::Merge(context) => Some(context.routing_conditions()),
            CommonStatementContext::Other(_) => None,
        }
    }

    pub fn encrypt_markers(&self) -> &[EncryptMarker] {
        match self {
            CommonStatementContext::Update(context) => context.encrypt_markers(),
            CommonStatementContext::Delete(context) => context.encrypt_markers(),
            CommonStatementContext::Merge(context) => context.encrypt_markers(),
            CommonStatementContext::Other(_) => &[],
        }
    }

    /// Returns the statement when it was passed through without binding.
    #[inline]
    pub fn passthrough(&self) -> Option<&Statement> {
        match self {
            CommonStatementContext::Other(statement) => Some(statement),
            _ => None,
        }
    }
}
