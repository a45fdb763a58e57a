//! Normalization of predicates into OR-of-AND groups.

use crate::ast::{BinaryOp, Expr};
use crate::span::Spanned;

/// Upper bound on the number of groups [`extract_and_predicates`] produces.
pub const MAX_AND_GROUPS: usize = 1024;

/// Splits `expr` into disjunctive groups of conjunctive predicates, preserving left-to-right
/// source order inside every group.
///
/// `OR` concatenates the groups of both sides, `AND` combines every left group with every right
/// group, so `a AND (b OR c)` yields `[[a, b], [a, c]]`. Any other expression is a single atomic
/// predicate.
///
/// Returns `None` once the expansion would exceed [`MAX_AND_GROUPS`].
pub fn extract_and_predicates(expr: &Spanned<Expr>) -> Option<Vec<Vec<&Spanned<Expr>>>> {
    match expr.value() {
        Expr::Binary {
            op: BinaryOp::Or,
            left,
            right,
        } => {
            let mut groups = extract_and_predicates(left)?;
            let right = extract_and_predicates(right)?;
            if groups.len() + right.len() > MAX_AND_GROUPS {
                return None;
            }
            groups.extend(right);
            Some(groups)
        }
        Expr::Binary {
            op: BinaryOp::And,
            left,
            right,
        } => {
            let left = extract_and_predicates(left)?;
            let right = extract_and_predicates(right)?;
            if left.len().saturating_mul(right.len()) > MAX_AND_GROUPS {
                return None;
            }
            let groups = left
                .iter()
                .flat_map(|l| {
                    right
                        .iter()
                        .map(move |r| l.iter().chain(r.iter()).copied().collect())
                })
                .collect();
            Some(groups)
        }
        _ => Some(vec![vec![expr]]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ColumnRef, Ident, Literal};

    fn eq(name: &str, value: i64, start: usize) -> Spanned<Expr> {
        let column = ColumnRef::new(None, Spanned(Ident::new(name), start..start + name.len()));
        Spanned(
            Expr::Binary {
                op: BinaryOp::Eq,
                left: Box::new(Spanned(column.into(), start..start + name.len())),
                right: Box::new(Spanned(Expr::Literal(Literal::Integer(value)), start..start)),
            },
            start..start + name.len() + 2,
        )
    }

    fn binary(op: BinaryOp, left: Spanned<Expr>, right: Spanned<Expr>) -> Spanned<Expr> {
        let span = left.1.start..right.1.end;
        Spanned(
            Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        )
    }

    fn starts(groups: &[Vec<&Spanned<Expr>>]) -> Vec<Vec<usize>> {
        groups
            .iter()
            .map(|g| g.iter().map(|e| e.1.start).collect())
            .collect()
    }

    #[test]
    fn test_and_keeps_order() {
        let expr = binary(
            BinaryOp::And,
            binary(BinaryOp::And, eq("a", 1, 0), eq("b", 2, 10)),
            eq("c", 3, 20),
        );
        assert_eq!(starts(&extract_and_predicates(&expr).unwrap()), [[0, 10, 20]]);
    }

    #[test]
    fn test_and_distributes_over_or() {
        let expr = binary(
            BinaryOp::And,
            eq("a", 1, 0),
            binary(BinaryOp::Or, eq("b", 2, 10), eq("c", 3, 20)),
        );
        assert_eq!(
            starts(&extract_and_predicates(&expr).unwrap()),
            [vec![0, 10], vec![0, 20]]
        );
    }

    #[test]
    fn test_or_splits_groups() {
        let expr = binary(
            BinaryOp::Or,
            binary(BinaryOp::And, eq("a", 1, 0), eq("b", 2, 10)),
            eq("c", 3, 20),
        );
        assert_eq!(
            starts(&extract_and_predicates(&expr).unwrap()),
            [vec![0, 10], vec![20]]
        );
    }

    #[test]
    fn test_expansion_is_capped() {
        // (a0 OR b0) AND (a1 OR b1) AND ... doubles the group count per clause.
        let clause = |i: usize| {
            binary(
                BinaryOp::Or,
                eq("a", 1, i * 20),
                eq("b", 2, i * 20 + 10),
            )
        };
        let mut expr = clause(0);
        for i in 1..10 {
            expr = binary(BinaryOp::And, expr, clause(i));
        }
        assert_eq!(extract_and_predicates(&expr).unwrap().len(), MAX_AND_GROUPS);
        let expr = binary(BinaryOp::And, expr, clause(10));
        assert!(extract_and_predicates(&expr).is_none());
    }
}
