//! Aggregated Bind/Describe/Execute triples against one prepared statement.

use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use super::message::{BackendMessage, BindMessage, ValueFormat};
use super::portal::Portal;
use super::prepared::PreparedStatement;
use crate::backend::{BackendHandlerFactory, ConnectionResourceManager};
use crate::error::ProtocolResult;

/// The raw parameters of one Bind in a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchedStatement {
    pub parameter_formats: Vec<ValueFormat>,
    pub parameters: Vec<Option<Bytes>>,
    pub result_formats: Vec<ValueFormat>,
}

impl From<BindMessage> for BatchedStatement {
    fn from(bind: BindMessage) -> Self {
        Self {
            parameter_formats: bind.parameter_formats,
            parameters: bind.parameters,
            result_formats: bind.result_formats,
        }
    }
}

#[derive(Debug)]
pub struct BatchedStatementExecutor {
    statement: Arc<PreparedStatement>,
    factory: Arc<dyn BackendHandlerFactory>,
    resources: Arc<ConnectionResourceManager>,
}

impl BatchedStatementExecutor {
    pub fn new(
        statement: Arc<PreparedStatement>,
        factory: Arc<dyn BackendHandlerFactory>,
        resources: Arc<ConnectionResourceManager>,
    ) -> Self {
        Self {
            statement,
            factory,
            resources,
        }
    }

    /// Runs every triple in arrival order.
    ///
    /// Each triple appends BindComplete, its describe answer and its execute output. The first
    /// failure aborts the rest of the batch.
    pub fn execute(
        &self,
        batch: impl IntoIterator<Item = BatchedStatement>,
    ) -> ProtocolResult<Vec<BackendMessage>> {
        let mut packets = Vec::new();
        let mut executed = 0usize;
        for item in batch {
            let parameters = self
                .statement
                .decode_parameters(&item.parameter_formats, &item.parameters)?;
            let mut portal = Portal::new(
                "",
                self.statement.clone(),
                parameters,
                item.result_formats,
                self.factory.clone(),
                self.resources.clone(),
            );
            portal.bind()?;
            packets.push(BackendMessage::BindComplete);
            packets.push(portal.describe()?);
            packets.extend(portal.execute(0)?);
            portal.close();
            executed += 1;
        }
        debug!(
            statement = %self.statement.name(),
            executed,
            "batched statements executed"
        );
        Ok(packets)
    }
}
