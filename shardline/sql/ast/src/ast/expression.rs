//! AST definitions for value expressions and predicates.

use smol_str::SmolStr;

use super::{ColumnRef, Ident, SelectStatement};
use crate::macros::{base, ext};
use crate::span::{BoxSpanned, Spanned, VecSpanned};

#[apply(base)]
pub enum Expr {
    Column(ColumnRef),
    Literal(Literal),
    Parameter(ParameterMarker),
    Binary {
        op: BinaryOp,
        left: BoxSpanned<Expr>,
        right: BoxSpanned<Expr>,
    },
    Unary {
        op: UnaryOp,
        child: BoxSpanned<Expr>,
    },
    /// `expr [NOT] IN (a, b, ...)`
    InList {
        expr: BoxSpanned<Expr>,
        list: VecSpanned<Expr>,
        negated: bool,
    },
    /// `expr [NOT] BETWEEN low AND high`
    Between {
        expr: BoxSpanned<Expr>,
        low: BoxSpanned<Expr>,
        high: BoxSpanned<Expr>,
        negated: bool,
    },
    /// `expr IS [NOT] NULL`
    IsNull {
        expr: BoxSpanned<Expr>,
        negated: bool,
    },
    Function(FunctionCall),
    Subquery(BoxSpanned<SelectStatement>),
    /// `expr [NOT] IN (SELECT ...)`
    InSubquery {
        expr: BoxSpanned<Expr>,
        query: BoxSpanned<SelectStatement>,
        negated: bool,
    },
    /// `[NOT] EXISTS (SELECT ...)`
    Exists {
        query: BoxSpanned<SelectStatement>,
        negated: bool,
    },
}

impl Expr {
    /// Returns `true` for literals, parameter markers and signed numeric literals, i.e. the
    /// operands a routing condition can carry.
    pub fn is_simple(&self) -> bool {
        match self {
            Expr::Literal(_) | Expr::Parameter(_) => true,
            Expr::Unary {
                op: UnaryOp::Minus | UnaryOp::Plus,
                child,
            } => matches!(
                child.value(),
                Expr::Literal(Literal::Integer(_) | Literal::Decimal(_))
            ),
            _ => false,
        }
    }

    #[inline]
    pub fn as_column(&self) -> Option<&ColumnRef> {
        match self {
            Expr::Column(column) => Some(column),
            _ => None,
        }
    }
}

impl From<ColumnRef> for Expr {
    #[inline]
    fn from(column: ColumnRef) -> Self {
        Expr::Column(column)
    }
}

/// Binary operators.
#[apply(ext)]
pub enum BinaryOp {
    /// Addition, e.g., `a + b`.
    Add,
    /// Subtraction, e.g., `a - b`.
    Sub,
    /// Multiplication, e.g., `a * b`.
    Mul,
    /// Division, e.g., `a / b`.
    Div,
    /// Concatenation, e.g., `a || b`.
    Concat,
    /// OR, e.g., `a OR b`.
    Or,
    /// AND, e.g., `a AND b`.
    And,
    /// Less than, e.g., `a < b`.
    Lt,
    /// Less than or equal, e.g., `a <= b`.
    Le,
    /// Greater than, e.g., `a > b`.
    Gt,
    /// Greater than or equal, e.g., `a >= b`.
    Ge,
    /// Equal, e.g., `a = b`.
    Eq,
    /// Not equal, e.g., `a <> b`.
    Ne,
    /// Pattern match, e.g., `a LIKE b`.
    Like,
}

impl BinaryOp {
    #[inline]
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Lt
                | BinaryOp::Le
                | BinaryOp::Gt
                | BinaryOp::Ge
                | BinaryOp::Eq
                | BinaryOp::Ne
                | BinaryOp::Like
        )
    }
}

/// Unary operators.
#[apply(ext)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
}

#[apply(base)]
pub enum Literal {
    Integer(i64),
    /// Non-integral numbers are kept as written.
    Decimal(SmolStr),
    String(SmolStr),
    Boolean(bool),
    Null,
}

/// A placeholder such as `$1` or `?`. `index` is zero-based into the bound parameter list.
#[apply(ext)]
pub struct ParameterMarker {
    pub index: usize,
}

#[apply(base)]
pub struct FunctionCall {
    pub name: Spanned<Ident>,
    pub args: VecSpanned<Expr>,
}
