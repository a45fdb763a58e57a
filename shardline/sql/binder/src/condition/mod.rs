//! OR-of-AND condition trees restricted to routing or encrypt relevant columns.

mod extractor;

use std::fmt;
use std::ops::Range;

pub use extractor::{
    extract_encrypt_conditions, extract_routing_conditions, literal_value, simple_value,
};
use itertools::Itertools;
use serde::Serialize;
use shardline_common::value::ScalarValue;
use smol_str::SmolStr;

/// The logical column a condition constrains.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ConditionColumn {
    pub table: SmolStr,
    pub column: SmolStr,
}

impl ConditionColumn {
    #[inline]
    pub fn new(table: impl Into<SmolStr>, column: impl Into<SmolStr>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

impl fmt::Display for ConditionColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// Operators a condition may carry. Routing only ever produces `Eq`, `In` and `Between`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConditionOperator {
    Eq,
    In,
    Between,
    Ne,
    NotIn,
    Like,
}

impl ConditionOperator {
    #[inline]
    pub fn is_routing(&self) -> bool {
        matches!(
            self,
            ConditionOperator::Eq | ConditionOperator::In | ConditionOperator::Between
        )
    }
}

/// An operand of a condition: a literal, or the zero-based index of a parameter marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ConditionValue {
    Literal(ScalarValue),
    Parameter(usize),
}

impl ConditionValue {
    /// Resolves the operand against bound parameter values.
    pub fn resolve<'a>(&'a self, parameters: &'a [ScalarValue]) -> Option<&'a ScalarValue> {
        match self {
            ConditionValue::Literal(value) => Some(value),
            ConditionValue::Parameter(index) => parameters.get(*index),
        }
    }
}

impl fmt::Display for ConditionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionValue::Literal(ScalarValue::String(s)) => write!(f, "'{s}'"),
            ConditionValue::Literal(value) => write!(f, "{value}"),
            ConditionValue::Parameter(index) => write!(f, "${}", index + 1),
        }
    }
}

/// One atomic predicate on a column, e.g. `t_order.order_id IN (1, $2)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    pub column: ConditionColumn,
    pub operator: ConditionOperator,
    /// One value for comparisons, the list for `IN`, the two bounds for `BETWEEN`.
    pub values: Vec<ConditionValue>,
    /// Span of the whole predicate in the SQL text.
    pub span: Range<usize>,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let column = &self.column;
        match (self.operator, self.values.as_slice()) {
            (ConditionOperator::Eq, [value]) => write!(f, "{column} = {value}"),
            (ConditionOperator::Ne, [value]) => write!(f, "{column} <> {value}"),
            (ConditionOperator::Like, [value]) => write!(f, "{column} LIKE {value}"),
            (ConditionOperator::Between, [low, high]) => {
                write!(f, "{column} BETWEEN {low} AND {high}")
            }
            (ConditionOperator::NotIn, values) => {
                write!(f, "{column} NOT IN ({})", values.iter().join(", "))
            }
            (_, values) => write!(f, "{column} IN ({})", values.iter().join(", ")),
        }
    }
}

/// Conjunction of conditions, in left-to-right source order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AndCondition {
    pub conditions: Vec<Condition>,
}

impl AndCondition {
    #[inline]
    pub fn new(conditions: Vec<Condition>) -> Self {
        Self { conditions }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Returns the conditions on `column`, in source order.
    pub fn conditions_on<'a>(
        &'a self,
        column: &'a ConditionColumn,
    ) -> impl Iterator<Item = &'a Condition> + 'a {
        self.conditions.iter().filter(move |c| &c.column == column)
    }
}

impl fmt::Display for AndCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.conditions.iter().join(" AND "))
    }
}

/// Disjunction of [`AndCondition`]s.
///
/// An empty routing tree means the statement cannot be narrowed and goes to every shard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrCondition {
    pub and_conditions: Vec<AndCondition>,
}

impl OrCondition {
    #[inline]
    pub fn new(and_conditions: Vec<AndCondition>) -> Self {
        Self { and_conditions }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.and_conditions.is_empty()
    }

    /// Iterates over every condition of every group.
    pub fn conditions(&self) -> impl Iterator<Item = &Condition> {
        self.and_conditions.iter().flat_map(|a| a.conditions.iter())
    }
}

impl fmt::Display for OrCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.and_conditions.iter().join(" OR "))
    }
}

/// The value a row supplies for the table's generated key column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GeneratedKeyValue {
    Parameter(usize),
    Literal(ScalarValue),
    /// Any other expression, identified by its span in the SQL text.
    Expression(Range<usize>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedKeyCondition {
    pub column: SmolStr,
    /// Zero-based index of the VALUES row.
    pub row: usize,
    pub value: GeneratedKeyValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EncryptMarkerKind {
    /// A predicate in WHERE or ON.
    Predicate,
    /// `column = value` in an UPDATE or MERGE SET clause.
    Assignment,
    /// A value in an INSERT row.
    InsertValue,
}

/// Marks a text span a downstream rewriter replaces with its ciphertext form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncryptMarker {
    pub span: Range<usize>,
    pub column: ConditionColumn,
    pub encryptor: SmolStr,
    pub kind: EncryptMarkerKind,
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;

    fn condition(
        column: &str,
        operator: ConditionOperator,
        values: Vec<ConditionValue>,
    ) -> Condition {
        Condition {
            column: ConditionColumn::new("t_order", column),
            operator,
            values,
            span: 0..0,
        }
    }

    #[test]
    fn test_display() {
        let or = OrCondition::new(vec![
            AndCondition::new(vec![
                condition(
                    "user_id",
                    ConditionOperator::Eq,
                    vec![ConditionValue::Literal(10i64.into())],
                ),
                condition(
                    "order_id",
                    ConditionOperator::In,
                    vec![
                        ConditionValue::Literal(1i64.into()),
                        ConditionValue::Parameter(1),
                    ],
                ),
            ]),
            AndCondition::new(vec![condition(
                "status",
                ConditionOperator::Between,
                vec![
                    ConditionValue::Literal("a".into()),
                    ConditionValue::Parameter(0),
                ],
            )]),
        ]);
        assert_snapshot!(
            or,
            @"(t_order.user_id = 10 AND t_order.order_id IN (1, $2)) OR (t_order.status BETWEEN 'a' AND $1)"
        );
    }

    #[test]
    fn test_resolve_parameter() {
        let parameters = [ScalarValue::Int32(7)];
        assert_eq!(
            ConditionValue::Parameter(0).resolve(&parameters),
            Some(&ScalarValue::Int32(7))
        );
        assert_eq!(ConditionValue::Parameter(1).resolve(&parameters), None);
    }
}
