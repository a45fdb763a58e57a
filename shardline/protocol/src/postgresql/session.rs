use std::sync::Arc;

use smol_str::SmolStr;

use super::context::PortalContext;
use super::message::{BackendMessage, BindMessage, DescribeTarget, FrontendMessage};
use super::portal::Portal;
use super::prepared::{PreparedStatement, PreparedStatementRegistry};
use crate::backend::{BackendHandlerFactory, ConnectionResourceManager};
use crate::error::ProtocolResult;

/// Per-connection state of the extended query protocol.
///
/// Parsing happens upstream: statements arrive through [`ExtendedQuerySession::parse`] already
/// bound. Authentication, ReadyForQuery and error packets are the caller's business.
#[derive(Debug)]
pub struct ExtendedQuerySession {
    statements: PreparedStatementRegistry,
    portals: PortalContext,
    factory: Arc<dyn BackendHandlerFactory>,
    resources: Arc<ConnectionResourceManager>,
}

impl ExtendedQuerySession {
    pub fn new(factory: Arc<dyn BackendHandlerFactory>) -> Self {
        Self {
            statements: PreparedStatementRegistry::new(),
            portals: PortalContext::new(),
            factory,
            resources: Arc::new(ConnectionResourceManager::new()),
        }
    }

    #[inline]
    pub fn resources(&self) -> &ConnectionResourceManager {
        &self.resources
    }

    #[inline]
    pub fn statements(&self) -> &PreparedStatementRegistry {
        &self.statements
    }

    #[inline]
    pub fn portals(&self) -> &PortalContext {
        &self.portals
    }

    pub fn parse(&mut self, statement: PreparedStatement) -> ProtocolResult<BackendMessage> {
        self.statements.register(statement)?;
        Ok(BackendMessage::ParseComplete)
    }

    pub fn handle(&mut self, message: FrontendMessage) -> ProtocolResult<Vec<BackendMessage>> {
        match message {
            FrontendMessage::Bind(bind) => self.bind(bind).map(|m| vec![m]),
            FrontendMessage::Describe(describe) => match describe.target {
                DescribeTarget::Statement => Ok(self.statements.get(&describe.name)?.describe()),
                DescribeTarget::Portal => {
                    let portal = self.portals.get_mut(&describe.name)?;
                    Ok(vec![portal.describe()?])
                }
            },
            FrontendMessage::Execute(execute) => self
                .portals
                .get_mut(&execute.portal)?
                .execute(execute.max_rows),
            FrontendMessage::Close(close) => {
                match close.target {
                    DescribeTarget::Statement => self.statements.close(&close.name),
                    DescribeTarget::Portal => self.portals.close(&close.name),
                }
                Ok(vec![BackendMessage::CloseComplete])
            }
            FrontendMessage::Sync | FrontendMessage::Flush => Ok(vec![]),
        }
    }

    fn bind(&mut self, bind: BindMessage) -> ProtocolResult<BackendMessage> {
        let statement = self.statements.get(&bind.statement)?;
        let parameters = statement.decode_parameters(&bind.parameter_formats, &bind.parameters)?;
        let name = SmolStr::new(&bind.portal);
        let portal = Portal::new(
            bind.portal,
            statement,
            parameters,
            bind.result_formats,
            self.factory.clone(),
            self.resources.clone(),
        );
        if let Err(err) = self.portals.add(portal)?.bind() {
            self.portals.close(&name);
            return Err(err);
        }
        Ok(BackendMessage::BindComplete)
    }

    /// Closes every portal, as at the end of the session.
    pub fn close_all(&mut self) {
        self.portals.close_all();
    }
}
