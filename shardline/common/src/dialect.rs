use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::constants::PUBLIC_SCHEMA_NAME;

/// How two identifiers are compared for equality.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CasePolicy {
    /// `Foo`, `"foo"` and `FOO` are all equal.
    #[default]
    Insensitive,
    /// Identifiers are compared byte by byte.
    Sensitive,
    /// Unquoted identifiers are folded to lower case, quoted identifiers are kept verbatim.
    QuotedSensitive,
}

impl CasePolicy {
    /// Returns the form of `value` that is compared under this policy.
    pub fn normalize<'a>(&self, value: &'a str, quoted: bool) -> Cow<'a, str> {
        match self {
            CasePolicy::Insensitive => Cow::Owned(value.to_lowercase()),
            CasePolicy::Sensitive => Cow::Borrowed(value),
            CasePolicy::QuotedSensitive if quoted => Cow::Borrowed(value),
            CasePolicy::QuotedSensitive => Cow::Owned(value.to_lowercase()),
        }
    }

    #[inline]
    pub fn eq(&self, left: &str, left_quoted: bool, right: &str, right_quoted: bool) -> bool {
        self.normalize(left, left_quoted) == self.normalize(right, right_quoted)
    }
}

/// SQL dialect of the frontend connection.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Dialect {
    #[default]
    PostgreSql,
    OpenGauss,
    MySql,
    Oracle,
    SqlServer,
    Sql92,
}

impl Dialect {
    /// Returns the schema used when a table reference carries no owner, or `None` when the
    /// dialect has no schema layer and the database doubles as the schema.
    pub fn default_schema(&self) -> Option<&'static str> {
        match self {
            Dialect::PostgreSql | Dialect::OpenGauss => Some(PUBLIC_SCHEMA_NAME),
            Dialect::SqlServer => Some("dbo"),
            Dialect::MySql | Dialect::Oracle | Dialect::Sql92 => None,
        }
    }

    /// Resolves the schema name for `database` when the SQL omits it.
    pub fn default_schema_name<'a>(&self, database: &'a str) -> &'a str {
        self.default_schema().unwrap_or(database)
    }

    pub fn case_policy(&self) -> CasePolicy {
        match self {
            Dialect::PostgreSql | Dialect::OpenGauss => CasePolicy::QuotedSensitive,
            Dialect::MySql | Dialect::Oracle | Dialect::SqlServer | Dialect::Sql92 => {
                CasePolicy::Insensitive
            }
        }
    }
}
