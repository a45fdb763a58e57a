use shardline_common::constants::is_pseudo_column;
use sql_ast::ast::{ColumnRef, Expr, FunctionCall, SelectStatement};
use sql_ast::span::{BoxSpanned, Spanned};
use tracing::debug;

use super::Binder;
use crate::error::{BindError, BindResult};
use crate::scope::ScopeChain;

impl Binder<'_> {
    pub fn bind_expr(
        &self,
        expr: &Spanned<Expr>,
        scope: &ScopeChain<'_>,
    ) -> BindResult<Spanned<Expr>> {
        expr.try_map_ref(|e| self.bind_expr_inner(e, scope))
    }

    fn bind_boxed(
        &self,
        expr: &BoxSpanned<Expr>,
        scope: &ScopeChain<'_>,
    ) -> BindResult<BoxSpanned<Expr>> {
        self.bind_expr(expr, scope).map(Box::new)
    }

    fn bind_expr_inner(&self, expr: &Expr, scope: &ScopeChain<'_>) -> BindResult<Expr> {
        let bound = match expr {
            Expr::Column(column) => Expr::Column(self.bind_column(column, scope)?),
            Expr::Literal(_) | Expr::Parameter(_) => expr.clone(),
            Expr::Binary { op, left, right } => Expr::Binary {
                op: *op,
                left: self.bind_boxed(left, scope)?,
                right: self.bind_boxed(right, scope)?,
            },
            Expr::Unary { op, child } => Expr::Unary {
                op: *op,
                child: self.bind_boxed(child, scope)?,
            },
            Expr::InList {
                expr,
                list,
                negated,
            } => Expr::InList {
                expr: self.bind_boxed(expr, scope)?,
                list: list
                    .iter()
                    .map(|e| self.bind_expr(e, scope))
                    .collect::<BindResult<_>>()?,
                negated: *negated,
            },
            Expr::Between {
                expr,
                low,
                high,
                negated,
            } => Expr::Between {
                expr: self.bind_boxed(expr, scope)?,
                low: self.bind_boxed(low, scope)?,
                high: self.bind_boxed(high, scope)?,
                negated: *negated,
            },
            Expr::IsNull { expr, negated } => Expr::IsNull {
                expr: self.bind_boxed(expr, scope)?,
                negated: *negated,
            },
            Expr::Function(call) => Expr::Function(FunctionCall {
                name: call.name.clone(),
                args: call
                    .args
                    .iter()
                    .map(|e| self.bind_expr(e, scope))
                    .collect::<BindResult<_>>()?,
            }),
            Expr::Subquery(query) => Expr::Subquery(self.bind_subquery(query, scope)?),
            Expr::InSubquery {
                expr,
                query,
                negated,
            } => Expr::InSubquery {
                expr: self.bind_boxed(expr, scope)?,
                query: self.bind_subquery(query, scope)?,
                negated: *negated,
            },
            Expr::Exists { query, negated } => Expr::Exists {
                query: self.bind_subquery(query, scope)?,
                negated: *negated,
            },
        };
        Ok(bound)
    }

    /// Binds a subquery with `scope` as its enclosing scope.
    fn bind_subquery(
        &self,
        query: &BoxSpanned<SelectStatement>,
        scope: &ScopeChain<'_>,
    ) -> BindResult<BoxSpanned<SelectStatement>> {
        let bound = self.bind_select(query.value(), Some(scope))?;
        Ok(Box::new(Spanned(bound.statement, query.span())))
    }

    /// Resolves the owning table of a column reference and attaches its provenance.
    ///
    /// An explicit owner that matches no table in scope is an error. An unqualified column that
    /// cannot be resolved stays unbound.
    pub fn bind_column(&self, column: &ColumnRef, scope: &ScopeChain<'_>) -> BindResult<ColumnRef> {
        let name = column.name.value();
        if is_pseudo_column(&name.value) {
            return Ok(column.clone());
        }
        let bound = match &column.owner {
            Some(owner) => {
                let table = scope
                    .resolve_owner(owner.value(), self.policy())
                    .ok_or_else(|| BindError::ColumnBinding {
                        owner: owner.value().value.clone(),
                        column: name.value.clone(),
                        span: (owner.1.start..column.name.1.end).into(),
                    })?;
                Some(table.bind_column(name, self.policy()))
            }
            None => match scope.resolve(name, self.policy(), self.options.ancestor_lookup) {
                Some((table, depth)) => {
                    if depth > 0 {
                        // Resolution may have skipped a nearer subquery that meant this column.
                        debug!(
                            column = %name.value,
                            table = table.table(),
                            depth,
                            "unqualified column resolved in an enclosing query"
                        );
                    }
                    Some(table.bind_column(name, self.policy()))
                }
                None => {
                    debug!(column = %name.value, span = ?column.name.span(), "column left unbound");
                    None
                }
            },
        };
        Ok(ColumnRef {
            owner: column.owner.clone(),
            name: column.name.clone(),
            bound,
        })
    }
}
