//! AST definitions for identifiers, object names and bound provenance.

use shardline_common::dialect::CasePolicy;
use smol_str::SmolStr;

use crate::macros::{base, ext};
use crate::span::{OptSpanned, Spanned};

#[apply(ext)]
pub enum QuoteCharacter {
    None,
    /// `"name"`
    Double,
    /// `` `name` ``
    Backtick,
    /// `[name]`
    Bracket,
}

/// An identifier together with the quote characters it was written with.
#[apply(base)]
pub struct Ident {
    pub value: SmolStr,
    pub quote: QuoteCharacter,
}

impl Ident {
    #[inline]
    pub fn new(value: impl Into<SmolStr>) -> Self {
        Self {
            value: value.into(),
            quote: QuoteCharacter::None,
        }
    }

    #[inline]
    pub fn quoted(value: impl Into<SmolStr>) -> Self {
        Self {
            value: value.into(),
            quote: QuoteCharacter::Double,
        }
    }

    #[inline]
    pub fn is_quoted(&self) -> bool {
        self.quote != QuoteCharacter::None
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Compares two identifiers as written in SQL.
    #[inline]
    pub fn matches(&self, other: &Ident, policy: CasePolicy) -> bool {
        policy.eq(&self.value, self.is_quoted(), &other.value, other.is_quoted())
    }

    /// Compares the identifier against a name stored in metadata, which is taken verbatim.
    #[inline]
    pub fn matches_name(&self, name: &str, policy: CasePolicy) -> bool {
        policy.eq(&self.value, self.is_quoted(), name, true)
    }
}

impl From<&str> for Ident {
    #[inline]
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A possibly qualified table name, e.g. `foo_db.public.t_order`.
#[apply(base)]
pub struct TableName {
    pub database: OptSpanned<Ident>,
    pub schema: OptSpanned<Ident>,
    pub name: Spanned<Ident>,
}

/// Where the columns of a bound table come from.
#[apply(ext)]
pub enum TableSourceType {
    /// A table in the metadata snapshot.
    PhysicalTable,
    /// A subquery or other derived table.
    TemporaryTable,
    /// A table without metadata, e.g. `DUAL`.
    Unknown,
}

/// Provenance of a bound table reference.
#[apply(base)]
pub struct TableBoundInfo {
    pub original_database: SmolStr,
    pub original_schema: SmolStr,
    /// Table name as stored in metadata.
    pub original_table: SmolStr,
}

/// Fully qualified provenance of a bound column reference. All four names are always populated.
#[apply(base)]
pub struct ColumnBoundInfo {
    pub original_database: SmolStr,
    pub original_schema: SmolStr,
    pub original_table: SmolStr,
    pub original_column: SmolStr,
    pub table_source: TableSourceType,
}

/// A column reference such as `o.status`. `bound` is filled by the binder.
#[apply(base)]
pub struct ColumnRef {
    pub owner: OptSpanned<Ident>,
    pub name: Spanned<Ident>,
    pub bound: Option<ColumnBoundInfo>,
}

impl ColumnRef {
    #[inline]
    pub fn new(owner: OptSpanned<Ident>, name: Spanned<Ident>) -> Self {
        Self {
            owner,
            name,
            bound: None,
        }
    }

    #[inline]
    pub fn with_bound(mut self, bound: ColumnBoundInfo) -> Self {
        self.bound = Some(bound);
        self
    }
}
