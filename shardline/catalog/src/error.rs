use std::error::Error;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("duplicate {kind}: {name}")]
    Duplicate { kind: &'static str, name: String },

    #[error(transparent)]
    External(#[from] Box<dyn Error + Send + Sync + 'static>),
}

pub type CatalogResult<T> = Result<T, CatalogError>;
