//! The seam between the wire protocol and statement execution.
//!
//! Routing and physical execution live behind [`BackendHandler`]. The protocol layer only drives
//! a handler through `execute`, `next`/`row_data` and `close`.

use std::collections::HashSet;
use std::error::Error;
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use shardline_binder::context::StatementContext;
use shardline_common::data_type::DataType;
use shardline_common::value::ScalarValue;
use smol_str::SmolStr;
use thiserror::Error;

/// An error raised by the execution backend, passed to the client unchanged.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct BackendError(#[from] Box<dyn Error + Send + Sync + 'static>);

impl BackendError {
    pub fn msg(message: impl Into<String>) -> Self {
        Self(message.into().into())
    }
}

pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Describes one output column of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryHeader {
    pub schema: SmolStr,
    pub table: SmolStr,
    pub label: SmolStr,
    pub column: SmolStr,
    pub data_type: DataType,
}

impl QueryHeader {
    pub fn new(label: impl Into<SmolStr>, data_type: DataType) -> Self {
        let label = label.into();
        Self {
            schema: SmolStr::default(),
            table: SmolStr::default(),
            column: label.clone(),
            label,
            data_type,
        }
    }
}

/// What executing a statement produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseHeader {
    /// The statement returns rows with these columns.
    Query(Vec<QueryHeader>),
    /// The statement changed `updated` rows and returns none.
    Update { updated: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryResponseRow {
    pub cells: Vec<ScalarValue>,
}

impl QueryResponseRow {
    #[inline]
    pub fn new(cells: Vec<ScalarValue>) -> Self {
        Self { cells }
    }
}

impl<T: Into<ScalarValue>> FromIterator<T> for QueryResponseRow {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

/// Executes one bound statement and streams its rows.
pub trait BackendHandler: Debug + Send {
    /// Submits the statement. Rows are pulled afterwards with [`BackendHandler::next`].
    fn execute(&mut self) -> BackendResult<ResponseHeader>;

    /// Advances to the next row. Returns `false` once the result is exhausted.
    fn next(&mut self) -> BackendResult<bool>;

    /// Returns the row the last successful [`BackendHandler::next`] moved to.
    fn row_data(&mut self) -> BackendResult<QueryResponseRow>;

    /// Releases everything the handler holds. Called at most once.
    fn close(&mut self) -> BackendResult<()>;
}

/// Creates a handler for a statement with its parameters bound.
pub trait BackendHandlerFactory: Debug + Send + Sync {
    fn create(
        &self,
        sql: &str,
        context: &StatementContext,
        parameters: &[ScalarValue],
    ) -> BackendResult<Box<dyn BackendHandler>>;
}

/// Identifies a portal's hold on the session's backend connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceId(u64);

/// Tracks which portals of a session currently hold backend resources.
#[derive(Debug, Default)]
pub struct ConnectionResourceManager {
    next_id: AtomicU64,
    in_use: Mutex<HashSet<ResourceId>>,
}

impl ConnectionResourceManager {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&self) -> ResourceId {
        ResourceId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    pub fn mark_in_use(&self, id: ResourceId) {
        self.in_use.lock().insert(id);
    }

    /// Returns `false` if `id` was not in use.
    pub fn unmark_in_use(&self, id: ResourceId) -> bool {
        self.in_use.lock().remove(&id)
    }

    pub fn is_in_use(&self, id: ResourceId) -> bool {
        self.in_use.lock().contains(&id)
    }

    pub fn in_use_count(&self) -> usize {
        self.in_use.lock().len()
    }
}
