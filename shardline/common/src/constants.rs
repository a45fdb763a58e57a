/// Default schema of PostgreSQL-family dialects.
pub const PUBLIC_SCHEMA_NAME: &str = "public";

/// Dummy single-row table accepted without metadata.
pub const DUAL_TABLE_NAME: &str = "dual";

/// Pseudo-columns and niladic functions that look like column references but must never be
/// bound against a table.
pub const PSEUDO_COLUMN_NAMES: &[&str] = &[
    "rownum",
    "row_number",
    "rownum_",
    "rowid",
    "sysdate",
    "systimestamp",
    "current_timestamp",
    "localtimestamp",
    "uid",
    "user",
    "nextval",
    "level",
    "day",
];

#[inline]
pub fn is_pseudo_column(name: &str) -> bool {
    PSEUDO_COLUMN_NAMES
        .iter()
        .any(|pseudo| pseudo.eq_ignore_ascii_case(name))
}
