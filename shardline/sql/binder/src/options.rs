use serde::Deserialize;
use shardline_common::dialect::{CasePolicy, Dialect};
use smol_str::SmolStr;

/// Name of the logical database used when the session has not selected one.
pub const DEFAULT_DATABASE_NAME: &str = "logic_db";

/// How far an unqualified column may be resolved up the subquery nesting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AncestorLookup {
    /// Try every enclosing query, nearest first. A column may end up bound to an outer table
    /// even when an inner level is the one that was meant.
    #[default]
    AllAncestors,
    /// Only the query the column appears in.
    CurrentLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BinderOptions {
    pub dialect: Dialect,
    pub current_database: SmolStr,
    pub ancestor_lookup: AncestorLookup,
}

impl Default for BinderOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            current_database: DEFAULT_DATABASE_NAME.into(),
            ancestor_lookup: AncestorLookup::default(),
        }
    }
}

impl BinderOptions {
    #[inline]
    pub fn new(current_database: impl Into<SmolStr>) -> Self {
        Self {
            current_database: current_database.into(),
            ..Default::default()
        }
    }

    #[inline]
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    #[inline]
    pub fn with_ancestor_lookup(mut self, lookup: AncestorLookup) -> Self {
        self.ancestor_lookup = lookup;
        self
    }

    #[inline]
    pub fn case_policy(&self) -> CasePolicy {
        self.dialect.case_policy()
    }

    /// Schema of unqualified tables in the current database.
    #[inline]
    pub fn default_schema(&self) -> &str {
        self.dialect.default_schema_name(&self.current_database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_from_json() {
        let options: BinderOptions =
            serde_json::from_str(r#"{"dialect":"mysql","current_database":"foo_db"}"#).unwrap();
        assert_eq!(options.dialect, Dialect::MySql);
        assert_eq!(options.ancestor_lookup, AncestorLookup::AllAncestors);
        assert_eq!(options.default_schema(), "foo_db");
        assert_eq!(BinderOptions::default().default_schema(), "public");
    }
}
