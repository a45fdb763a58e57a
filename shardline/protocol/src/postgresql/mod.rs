//! The PostgreSQL dialect of the frontend.

pub mod batch;
pub mod codec;
mod context;
pub mod message;
pub mod portal;
pub mod prepared;
mod session;
mod tag;
pub mod types;

pub use batch::{BatchedStatement, BatchedStatementExecutor};
pub use context::PortalContext;
pub use portal::{Portal, PortalState};
pub use prepared::{PreparedStatement, PreparedStatementRegistry};
pub use session::ExtendedQuerySession;
pub use tag::CommandTag;
