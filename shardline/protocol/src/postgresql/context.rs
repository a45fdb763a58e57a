use std::collections::HashMap;

use smol_str::SmolStr;

use super::portal::Portal;
use crate::error::{ProtocolError, ProtocolResult};

/// The open portals of one session.
#[derive(Debug, Default)]
pub struct PortalContext {
    portals: HashMap<SmolStr, Portal>,
}

impl PortalContext {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `portal`. A new unnamed portal closes and replaces the previous one.
    pub fn add(&mut self, portal: Portal) -> ProtocolResult<&mut Portal> {
        let name = SmolStr::new(portal.name());
        if !name.is_empty() && self.portals.contains_key(&name) {
            return Err(ProtocolError::DuplicatePortal(name));
        }
        // The replaced portal is closed on drop.
        self.portals.insert(name.clone(), portal);
        self.get_mut(&name)
    }

    pub fn get_mut(&mut self, name: &str) -> ProtocolResult<&mut Portal> {
        self.portals
            .get_mut(name)
            .ok_or_else(|| ProtocolError::PortalNotFound(name.into()))
    }

    /// Closes and forgets the portal. Closing a name that does not exist is not an error.
    pub fn close(&mut self, name: &str) {
        if let Some(mut portal) = self.portals.remove(name) {
            portal.close();
        }
    }

    /// Closes every portal, at the end of a transaction or session.
    pub fn close_all(&mut self) {
        for (_, mut portal) in self.portals.drain() {
            portal.close();
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.portals.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.portals.is_empty()
    }
}
