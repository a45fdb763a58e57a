use std::sync::Arc;

use shardline_common::value::ScalarValue;
use smol_str::SmolStr;
use strum::{Display, IntoStaticStr};
use tracing::{debug, warn};

use super::message::{BackendMessage, FieldDescription, ValueFormat};
use super::prepared::PreparedStatement;
use super::tag::CommandTag;
use super::types::{PgType, encode_value};
use crate::backend::{
    BackendHandler, BackendHandlerFactory, ConnectionResourceManager, QueryResponseRow,
    ResourceId, ResponseHeader,
};
use crate::error::{ProtocolError, ProtocolResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum PortalState {
    /// Parameters are decoded but nothing was sent to the backend.
    Created,
    /// The backend accepted the statement. No rows were fetched yet.
    Bound,
    Executing,
    /// Execute stopped at its row limit with rows left.
    Suspended,
    Completed,
    Closed,
}

/// A prepared statement with its parameters bound, ready to be executed.
///
/// A portal is owned by a single session and drives one [`BackendHandler`] through its lifetime.
#[derive(Debug)]
pub struct Portal {
    name: SmolStr,
    statement: Arc<PreparedStatement>,
    parameters: Vec<ScalarValue>,
    result_formats: Vec<ValueFormat>,
    factory: Arc<dyn BackendHandlerFactory>,
    resources: Arc<ConnectionResourceManager>,
    resource: ResourceId,
    handler: Option<Box<dyn BackendHandler>>,
    header: Option<ResponseHeader>,
    /// A row fetched past the limit of the previous Execute.
    pending: Option<QueryResponseRow>,
    state: PortalState,
}

impl Portal {
    pub fn new(
        name: impl Into<SmolStr>,
        statement: Arc<PreparedStatement>,
        parameters: Vec<ScalarValue>,
        result_formats: Vec<ValueFormat>,
        factory: Arc<dyn BackendHandlerFactory>,
        resources: Arc<ConnectionResourceManager>,
    ) -> Self {
        let resource = resources.allocate();
        Self {
            name: name.into(),
            statement,
            parameters,
            result_formats,
            factory,
            resources,
            resource,
            handler: None,
            header: None,
            pending: None,
            state: PortalState::Created,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn state(&self) -> PortalState {
        self.state
    }

    #[inline]
    pub fn statement(&self) -> &PreparedStatement {
        &self.statement
    }

    #[inline]
    pub fn resource(&self) -> ResourceId {
        self.resource
    }

    fn transition(&mut self, to: PortalState) {
        if self.state != to {
            debug!(portal = %self.name, from = %self.state, to = %to, "portal state changed");
            self.state = to;
        }
    }

    fn expect_state(&self, operation: &'static str, allowed: &[PortalState]) -> ProtocolResult<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(ProtocolError::IllegalState {
                operation,
                state: self.state.into(),
            })
        }
    }

    /// Marks the session's connection resource in use and submits the statement to the backend.
    ///
    /// No rows are fetched. An empty statement never reaches the backend.
    pub fn bind(&mut self) -> ProtocolResult<()> {
        self.expect_state("bind", &[PortalState::Created])?;
        self.resources.mark_in_use(self.resource);
        if let Err(err) = self.submit() {
            self.release();
            return Err(err);
        }
        self.transition(PortalState::Bound);
        Ok(())
    }

    fn submit(&mut self) -> ProtocolResult<()> {
        if self.statement.is_empty() {
            return Ok(());
        }
        let handler = self.handler.insert(self.factory.create(
            self.statement.sql(),
            self.statement.context(),
            &self.parameters,
        )?);
        self.header = Some(handler.execute()?);
        Ok(())
    }

    /// Answers Describe for the portal: RowDescription for row-producing statements, NoData for
    /// anything else.
    pub fn describe(&self) -> ProtocolResult<BackendMessage> {
        self.expect_state(
            "describe",
            &[
                PortalState::Bound,
                PortalState::Executing,
                PortalState::Suspended,
                PortalState::Completed,
            ],
        )?;
        if self.statement.is_empty() || self.statement.set_assignments().next().is_some() {
            return Ok(BackendMessage::NoData);
        }
        match &self.header {
            Some(ResponseHeader::Query(columns)) => {
                let fields = columns
                    .iter()
                    .enumerate()
                    .map(|(i, column)| {
                        FieldDescription::new(
                            column.label.clone(),
                            PgType::from(column.data_type),
                            ValueFormat::select(&self.result_formats, i),
                        )
                    })
                    .collect();
                Ok(BackendMessage::RowDescription(fields))
            }
            Some(ResponseHeader::Update { .. }) | None => Ok(BackendMessage::NoData),
        }
    }

    /// Runs the portal until `max_rows` rows were sent, or to completion when `max_rows <= 0`.
    ///
    /// The last packet is PortalSuspended if rows remain, CommandComplete otherwise.
    pub fn execute(&mut self, max_rows: i32) -> ProtocolResult<Vec<BackendMessage>> {
        self.expect_state(
            "execute",
            &[
                PortalState::Bound,
                PortalState::Executing,
                PortalState::Suspended,
                PortalState::Completed,
            ],
        )?;
        if self.statement.is_empty() {
            self.transition(PortalState::Completed);
            return Ok(vec![BackendMessage::EmptyQueryResponse]);
        }
        let tag = CommandTag::of(self.statement.context());
        if self.state == PortalState::Completed {
            return Ok(vec![BackendMessage::CommandComplete { tag: tag.render(0) }]);
        }

        self.transition(PortalState::Executing);
        let mut packets = Vec::new();
        let rows = match self.header {
            Some(ResponseHeader::Query(_)) => {
                let limit = usize::try_from(max_rows).ok().filter(|limit| *limit > 0);
                let mut sent = 0;
                while let Some(row) = self.fetch()? {
                    if limit.is_some_and(|limit| sent == limit) {
                        self.pending = Some(row);
                        packets.push(BackendMessage::PortalSuspended);
                        self.transition(PortalState::Suspended);
                        return Ok(packets);
                    }
                    packets.push(self.encode_row(&row)?);
                    sent += 1;
                }
                sent as u64
            }
            Some(ResponseHeader::Update { updated }) => updated,
            None => 0,
        };

        packets.push(BackendMessage::CommandComplete {
            tag: tag.render(rows),
        });
        packets.extend(self.statement.set_assignments().map(|assign| {
            BackendMessage::ParameterStatus {
                name: assign.variable.value().value.clone(),
                value: assign.value.value().clone(),
            }
        }));
        self.transition(PortalState::Completed);
        Ok(packets)
    }

    fn fetch(&mut self) -> ProtocolResult<Option<QueryResponseRow>> {
        if let Some(row) = self.pending.take() {
            return Ok(Some(row));
        }
        let Some(handler) = self.handler.as_mut() else {
            return Ok(None);
        };
        if handler.next()? {
            Ok(Some(handler.row_data()?))
        } else {
            Ok(None)
        }
    }

    fn encode_row(&self, row: &QueryResponseRow) -> ProtocolResult<BackendMessage> {
        let cells = row
            .cells
            .iter()
            .enumerate()
            .map(|(i, cell)| encode_value(cell, ValueFormat::select(&self.result_formats, i)))
            .collect::<ProtocolResult<_>>()?;
        Ok(BackendMessage::DataRow(cells))
    }

    fn release(&mut self) {
        if let Some(mut handler) = self.handler.take()
            && let Err(err) = handler.close()
        {
            warn!(portal = %self.name, error = %err, "failed to close backend handler");
        }
        self.pending = None;
        self.resources.unmark_in_use(self.resource);
    }

    /// Releases the backend handler and the connection resource. Closing twice is a no-op.
    pub fn close(&mut self) {
        if self.state == PortalState::Closed {
            return;
        }
        self.release();
        self.transition(PortalState::Closed);
    }
}

impl Drop for Portal {
    fn drop(&mut self) {
        self.close();
    }
}
