use shardline_catalog::provider::CatalogProvider;
use shardline_catalog::rule::RuleMetadata;
use sql_ast::ast::Statement;
use tracing::debug;

use crate::binder::Binder;
use crate::context::{
    CloseStatementContext, CommonStatementContext, CursorStatementContext,
    DeleteStatementContext, FetchStatementContext, InsertStatementContext, MergeStatementContext,
    MoveStatementContext, SelectStatementContext, StatementContext, UpdateStatementContext,
    object_name,
};
use crate::error::BindResult;
use crate::options::BinderOptions;

/// Binds statements against one metadata snapshot and rule set.
#[derive(Debug, Clone, Copy)]
pub struct BindEngine<'a> {
    catalog: &'a dyn CatalogProvider,
    rules: &'a RuleMetadata,
    options: &'a BinderOptions,
}

impl<'a> BindEngine<'a> {
    pub fn new(
        catalog: &'a dyn CatalogProvider,
        rules: &'a RuleMetadata,
        options: &'a BinderOptions,
    ) -> Self {
        Self {
            catalog,
            rules,
            options,
        }
    }

    #[inline]
    pub fn catalog(&self) -> &'a dyn CatalogProvider {
        self.catalog
    }

    /// Binds `statement` and wraps the result in the context its kind calls for.
    ///
    /// The input is never modified. Statement kinds without a binder are passed through as
    /// [`CommonStatementContext::Other`].
    pub fn bind(&self, statement: &Statement) -> BindResult<StatementContext> {
        let binder = Binder::new(self.catalog, self.options);
        let policy = self.options.case_policy();
        let rules = self.rules;
        let context = match statement {
            Statement::Select(select) => {
                let bound = binder.bind_select(select, None)?;
                StatementContext::Select(SelectStatementContext::new(bound, rules, policy))
            }
            Statement::Insert(insert) => {
                let bound = binder.bind_insert(insert)?;
                StatementContext::Insert(InsertStatementContext::new(bound, rules, policy))
            }
            Statement::DeclareCursor(cursor) => {
                let bound = binder.bind_select(cursor.query.value(), None)?;
                let select = SelectStatementContext::new(bound, rules, policy);
                let name = object_name(cursor.name.value(), policy);
                StatementContext::Cursor(CursorStatementContext::new(name, select))
            }
            Statement::CloseCursor(close) => {
                StatementContext::Close(CloseStatementContext::new(close, policy))
            }
            Statement::Move(statement) => {
                StatementContext::Move(MoveStatementContext::new(statement, policy))
            }
            Statement::Fetch(statement) => {
                StatementContext::Fetch(FetchStatementContext::new(statement, policy))
            }
            Statement::Update(update) => {
                let bound = binder.bind_update(update)?;
                StatementContext::Common(CommonStatementContext::Update(
                    UpdateStatementContext::new(bound, rules, policy),
                ))
            }
            Statement::Delete(delete) => {
                let bound = binder.bind_delete(delete)?;
                StatementContext::Common(CommonStatementContext::Delete(
                    DeleteStatementContext::new(bound, rules, policy),
                ))
            }
            Statement::Merge(merge) => {
                let bound = binder.bind_merge(merge)?;
                StatementContext::Common(CommonStatementContext::Merge(
                    MergeStatementContext::new(bound, rules, policy),
                ))
            }
            Statement::Set(_) | Statement::Empty | Statement::Other(_) => {
                StatementContext::Common(CommonStatementContext::Other(statement.clone()))
            }
        };
        debug!(
            tables = context.tables().len(),
            routed = context.routing_conditions().is_some_and(|c| !c.is_empty()),
            "statement bound"
        );
        Ok(context)
    }
}
