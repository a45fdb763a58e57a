use shardline_common::value::ScalarValue;
use smol_str::{SmolStr, format_smolstr};
use sql_ast::ast::{BinaryOp, ColumnRef, Expr, Literal, UnaryOp};
use sql_ast::predicate::extract_and_predicates;
use sql_ast::span::Spanned;
use tracing::{debug, trace, warn};

use super::{
    AndCondition, Condition, ConditionColumn, ConditionOperator, ConditionValue, EncryptMarker,
    EncryptMarkerKind, OrCondition,
};

pub fn literal_value(literal: &Literal) -> ScalarValue {
    match literal {
        Literal::Integer(v) => ScalarValue::Int64(*v),
        Literal::Decimal(v) => ScalarValue::Decimal(v.clone()),
        Literal::String(v) => ScalarValue::String(v.to_string()),
        Literal::Boolean(v) => ScalarValue::Boolean(*v),
        Literal::Null => ScalarValue::Null,
    }
}

/// Converts a literal, parameter marker or signed numeric literal into a condition operand.
/// Returns `None` for anything else.
pub fn simple_value(expr: &Expr) -> Option<ConditionValue> {
    match expr {
        Expr::Literal(literal) => Some(ConditionValue::Literal(literal_value(literal))),
        Expr::Parameter(parameter) => Some(ConditionValue::Parameter(parameter.index)),
        Expr::Unary { op, child } => {
            let value = match (op, child.value()) {
                (UnaryOp::Plus, Expr::Literal(Literal::Integer(v))) => ScalarValue::Int64(*v),
                (UnaryOp::Minus, Expr::Literal(Literal::Integer(v))) => {
                    ScalarValue::Int64(v.checked_neg()?)
                }
                (UnaryOp::Plus, Expr::Literal(Literal::Decimal(v))) => {
                    ScalarValue::Decimal(v.clone())
                }
                (UnaryOp::Minus, Expr::Literal(Literal::Decimal(v))) => {
                    ScalarValue::Decimal(format_smolstr!("-{v}"))
                }
                _ => return None,
            };
            Some(ConditionValue::Literal(value))
        }
        _ => None,
    }
}

/// Which operators a purpose accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Purpose {
    Routing,
    Encrypt,
}

/// Splits an atomic predicate into its column, operator and operand expressions.
fn match_predicate(
    expr: &Spanned<Expr>,
    purpose: Purpose,
) -> Option<(&ColumnRef, ConditionOperator, Vec<&Spanned<Expr>>)> {
    let encrypt = purpose == Purpose::Encrypt;
    match expr.value() {
        Expr::Binary { op, left, right } => {
            let operator = match op {
                BinaryOp::Eq => ConditionOperator::Eq,
                BinaryOp::Ne if encrypt => ConditionOperator::Ne,
                BinaryOp::Like if encrypt => ConditionOperator::Like,
                _ => return None,
            };
            match (left.value(), right.value()) {
                // A join condition does not filter.
                (Expr::Column(_), Expr::Column(_)) => None,
                (Expr::Column(column), _) => Some((column, operator, vec![&**right])),
                (_, Expr::Column(column)) => Some((column, operator, vec![&**left])),
                _ => None,
            }
        }
        Expr::InList {
            expr,
            list,
            negated,
        } => {
            let operator = match *negated {
                false => ConditionOperator::In,
                true if encrypt => ConditionOperator::NotIn,
                true => return None,
            };
            Some((expr.value().as_column()?, operator, list.iter().collect()))
        }
        Expr::Between {
            expr,
            low,
            high,
            negated: false,
        } => Some((
            expr.value().as_column()?,
            ConditionOperator::Between,
            vec![&**low, &**high],
        )),
        _ => None,
    }
}

fn build_condition(
    predicate: &Spanned<Expr>,
    purpose: Purpose,
    is_relevant: &impl Fn(&str, &str) -> bool,
) -> Option<Condition> {
    let (column, operator, operands) = match_predicate(predicate, purpose)?;
    let Some(bound) = &column.bound else {
        debug!(
            column = %column.name.value().value,
            span = ?predicate.span(),
            "column is not bound, predicate does not narrow"
        );
        return None;
    };
    if !is_relevant(&bound.original_table, &bound.original_column) {
        return None;
    }
    let values = operands
        .iter()
        .map(|e| simple_value(e.value()))
        .collect::<Option<Vec<_>>>()?;
    Some(Condition {
        column: ConditionColumn::new(
            bound.original_table.clone(),
            bound.original_column.clone(),
        ),
        operator,
        values,
        span: predicate.span(),
    })
}

/// Extracts the conditions on sharding columns from `predicate`.
///
/// Each OR branch becomes one [`AndCondition`] holding its `=`, `IN` and `BETWEEN` conditions in
/// source order. If any branch has no such condition the statement cannot be narrowed, and the
/// result is empty. So is a predicate with too many OR branches to expand.
pub fn extract_routing_conditions(
    predicate: &Spanned<Expr>,
    is_sharding_column: impl Fn(&str, &str) -> bool,
) -> OrCondition {
    let Some(groups) = extract_and_predicates(predicate) else {
        warn!(span = ?predicate.span(), "predicate too large to expand, routing to all shards");
        return OrCondition::default();
    };
    let mut and_conditions = Vec::new();
    for group in groups {
        let conditions: Vec<_> = group
            .into_iter()
            .filter_map(|p| build_condition(p, Purpose::Routing, &is_sharding_column))
            .inspect(|c| trace!(condition = %c, "routing condition"))
            .collect();
        if conditions.is_empty() {
            debug!(
                span = ?predicate.span(),
                "predicate branch without sharding condition, routing to all shards"
            );
            return OrCondition::default();
        }
        and_conditions.push(AndCondition::new(conditions));
    }
    OrCondition::new(and_conditions)
}

/// Extracts the conditions on encrypted columns from `predicate`, together with one rewrite
/// marker per distinct predicate.
///
/// Branches without encrypted columns are dropped rather than clearing the tree. A predicate too
/// large to expand yields nothing.
pub fn extract_encrypt_conditions(
    predicate: &Spanned<Expr>,
    find_encryptor: impl Fn(&str, &str) -> Option<SmolStr>,
) -> (OrCondition, Vec<EncryptMarker>) {
    let Some(groups) = extract_and_predicates(predicate) else {
        warn!(span = ?predicate.span(), "predicate too large to expand, no encrypt markers");
        return Default::default();
    };
    let is_encrypted = |table: &str, column: &str| find_encryptor(table, column).is_some();
    let mut and_conditions = Vec::new();
    let mut markers: Vec<EncryptMarker> = Vec::new();
    for group in groups {
        let conditions: Vec<_> = group
            .into_iter()
            .filter_map(|p| build_condition(p, Purpose::Encrypt, &is_encrypted))
            .inspect(|c| trace!(condition = %c, "encrypt condition"))
            .collect();
        for condition in &conditions {
            if markers.iter().any(|m| m.span == condition.span) {
                continue;
            }
            let ConditionColumn { table, column } = &condition.column;
            if let Some(encryptor) = find_encryptor(table, column) {
                markers.push(EncryptMarker {
                    span: condition.span.clone(),
                    column: condition.column.clone(),
                    encryptor,
                    kind: EncryptMarkerKind::Predicate,
                });
            }
        }
        if !conditions.is_empty() {
            and_conditions.push(AndCondition::new(conditions));
        }
    }
    (OrCondition::new(and_conditions), markers)
}
