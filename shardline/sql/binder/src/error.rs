use miette::{Diagnostic, SourceSpan};
use shardline_catalog::error::CatalogError;
use shardline_common::error::NotImplemented;
use smol_str::SmolStr;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum BindError {
    #[error("catalog error")]
    Catalog(#[from] CatalogError),

    #[error("unknown database: {name}")]
    UnknownDatabase {
        name: SmolStr,
        #[label("database not found")]
        span: SourceSpan,
    },

    #[error("schema not found: {name}")]
    SchemaNotFound {
        name: SmolStr,
        #[label("schema not found")]
        span: SourceSpan,
    },

    #[error("table not found: {name}")]
    TableNotFound {
        name: SmolStr,
        #[label("table not found")]
        span: SourceSpan,
    },

    #[error("column {owner}.{column} does not match any table in scope")]
    ColumnBinding {
        owner: SmolStr,
        column: SmolStr,
        #[label("unknown table or alias `{owner}`")]
        span: SourceSpan,
    },

    #[error("column count doesn't match value count: {columns} columns, {values} values")]
    ColumnCountMismatch {
        columns: usize,
        values: usize,
        #[label("{values} values here")]
        span: SourceSpan,
    },

    #[error("column {column} in USING clause must exist on both sides of the join")]
    #[diagnostic(help("check that both joined tables declare the column"))]
    UsingColumnNotFound {
        column: SmolStr,
        #[label("not found on both sides")]
        span: SourceSpan,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    NotImplemented(#[from] NotImplemented),
}

pub type BindResult<T> = std::result::Result<T, BindError>;
