use miette::Diagnostic;
use shardline_binder::error::BindError;
use shardline_catalog::error::CatalogError;
use shardline_common::error::NotImplemented;
use smol_str::SmolStr;
use thiserror::Error;

use crate::backend::BackendError;

#[derive(Debug, Error, Diagnostic)]
pub enum ProtocolError {
    #[error("illegal portal state: cannot {operation} while {state}")]
    IllegalState {
        operation: &'static str,
        state: &'static str,
    },

    #[error("backend error")]
    Backend(#[from] BackendError),

    #[error("catalog error")]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Bind(#[from] BindError),

    #[error("portal \"{0}\" does not exist")]
    PortalNotFound(SmolStr),

    #[error("portal \"{0}\" already exists")]
    DuplicatePortal(SmolStr),

    #[error("prepared statement \"{0}\" does not exist")]
    PreparedStatementNotFound(SmolStr),

    #[error("prepared statement \"{0}\" already exists")]
    DuplicatePreparedStatement(SmolStr),

    #[error("bind message supplies {actual} parameters, but prepared statement requires {expected}")]
    ParameterCountMismatch { expected: usize, actual: usize },

    #[error("invalid {kind} value for parameter ${}: {message}", index + 1)]
    InvalidParameter {
        index: usize,
        kind: &'static str,
        message: SmolStr,
    },

    #[error("malformed message: {0}")]
    Malformed(SmolStr),

    #[error(transparent)]
    #[diagnostic(transparent)]
    NotImplemented(#[from] NotImplemented),
}

pub type ProtocolResult<T> = std::result::Result<T, ProtocolError>;
