use smol_str::SmolStr;

use super::Ident;
use crate::macros::base;
use crate::span::{Spanned, VecSpanned};

/// `SET name = value [, ...]`
#[apply(base)]
pub struct SetStatement {
    pub assignments: VecSpanned<VariableAssign>,
}

#[apply(base)]
pub struct VariableAssign {
    pub variable: Spanned<Ident>,
    pub value: Spanned<SmolStr>,
}
