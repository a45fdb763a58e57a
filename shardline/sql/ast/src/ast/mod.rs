mod common;
mod cursor;
mod dml;
mod expression;
mod query;
mod session;
mod statement;

pub use common::*;
pub use cursor::*;
pub use dml::*;
pub use expression::*;
pub use query::*;
pub use session::*;
pub use statement::*;
