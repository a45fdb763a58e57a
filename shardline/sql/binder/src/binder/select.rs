use smol_str::SmolStr;
use sql_ast::ast::{Expr, Limit, OrderByExpr, Projection, SelectStatement};
use sql_ast::span::Spanned;

use super::Binder;
use crate::bound::{ANONYMOUS_COLUMN_LABEL, BoundProjection, BoundSelect};
use crate::error::{BindError, BindResult};
use crate::scope::ScopeChain;

impl Binder<'_> {
    /// Binds a query. `parent` is the scope of the enclosing query when the query is a subquery.
    pub fn bind_select(
        &self,
        select: &SelectStatement,
        parent: Option<&ScopeChain<'_>>,
    ) -> BindResult<BoundSelect> {
        let mut tables = Vec::new();
        let from = select
            .from
            .iter()
            .map(|t| self.bind_table_ref(t, &mut tables, parent))
            .collect::<BindResult<Vec<_>>>()?;
        let scope = ScopeChain::new(&tables, parent);

        let mut projections = Vec::new();
        let bound_projections = select
            .projections
            .iter()
            .map(|p| self.bind_projection(p, &scope, &mut projections))
            .collect::<BindResult<Vec<_>>>()?;

        let bind_opt = |expr: &Option<Spanned<Expr>>| {
            expr.as_ref()
                .map(|e| self.bind_expr(e, &scope))
                .transpose()
        };
        let where_clause = bind_opt(&select.where_clause)?;
        let having = bind_opt(&select.having)?;
        let group_by = select
            .group_by
            .iter()
            .map(|e| self.bind_expr(e, &scope))
            .collect::<BindResult<_>>()?;
        let order_by = select
            .order_by
            .iter()
            .map(|o| {
                o.try_map_ref(|o| {
                    Ok::<_, BindError>(OrderByExpr {
                        expr: self.bind_expr(&o.expr, &scope)?,
                        asc: o.asc,
                    })
                })
            })
            .collect::<BindResult<_>>()?;
        let limit = select
            .limit
            .as_ref()
            .map(|limit| {
                Ok::<_, BindError>(Limit {
                    limit: bind_opt(&limit.limit)?,
                    offset: bind_opt(&limit.offset)?,
                })
            })
            .transpose()?;

        Ok(BoundSelect {
            statement: SelectStatement {
                distinct: select.distinct,
                projections: bound_projections,
                from,
                where_clause,
                group_by,
                having,
                order_by,
                limit,
            },
            projections,
        })
    }

    /// Binds one projection and appends its output columns to `output`, expanding `*`.
    fn bind_projection(
        &self,
        projection: &Spanned<Projection>,
        scope: &ScopeChain<'_>,
        output: &mut Vec<BoundProjection>,
    ) -> BindResult<Spanned<Projection>> {
        match projection.value() {
            Projection::Shorthand { owner } => {
                let tables = match owner {
                    Some(owner) => {
                        let table = scope
                            .tables()
                            .iter()
                            .find(|t| t.visible_name().matches(owner.value(), self.policy()))
                            .ok_or_else(|| BindError::ColumnBinding {
                                owner: owner.value().value.clone(),
                                column: "*".into(),
                                span: projection.span().into(),
                            })?;
                        std::slice::from_ref(table)
                    }
                    None => scope.tables(),
                };
                let columns = tables
                    .iter()
                    .flat_map(|t| t.columns())
                    .filter(|c| c.visible);
                output.extend(columns.map(|c| BoundProjection {
                    label: c.name.clone(),
                    span: projection.span(),
                    column: Some(c.bound.clone()),
                }));
                Ok(projection.clone())
            }
            Projection::Expr { expr, alias } => {
                let expr = self.bind_expr(expr, scope)?;
                let column = match expr.value() {
                    Expr::Column(column) => Some(column),
                    _ => None,
                };
                let label = match (alias, column) {
                    (Some(alias), _) => self.normalize(alias.value()),
                    (None, Some(column)) => self.normalize(column.name.value()),
                    (None, None) => SmolStr::new_static(ANONYMOUS_COLUMN_LABEL),
                };
                output.push(BoundProjection {
                    label,
                    span: projection.span(),
                    column: column.and_then(|c| c.bound.clone()),
                });
                Ok(Spanned(
                    Projection::Expr {
                        expr,
                        alias: alias.clone(),
                    },
                    projection.span(),
                ))
            }
        }
    }
}
