pub mod database;
pub mod schema;
pub mod table;

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use self::database::MemoryDatabaseCatalog;
use crate::error::{CatalogError, CatalogResult};
use crate::provider::{CatalogProvider, DatabaseProvider, DatabaseRef};

/// An in-memory metadata snapshot. It is populated once and then shared read-only.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    databases: HashMap<String, Arc<MemoryDatabaseCatalog>>,
}

impl MemoryCatalog {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_database(&mut self, database: MemoryDatabaseCatalog) -> CatalogResult<()> {
        match self.databases.entry(database.name().to_lowercase()) {
            Entry::Occupied(e) => Err(CatalogError::Duplicate {
                kind: "database",
                name: e.key().clone(),
            }),
            Entry::Vacant(e) => {
                e.insert(Arc::new(database));
                Ok(())
            }
        }
    }

    #[inline]
    pub fn with_database(mut self, database: MemoryDatabaseCatalog) -> CatalogResult<Self> {
        self.add_database(database)?;
        Ok(self)
    }
}

impl CatalogProvider for MemoryCatalog {
    #[inline]
    fn get_database(&self, name: &str) -> CatalogResult<Option<DatabaseRef>> {
        Ok(self
            .databases
            .get(&name.to_lowercase())
            .map(|d| d.clone() as _))
    }

    #[inline]
    fn database_names(&self) -> Vec<String> {
        self.databases
            .values()
            .map(|d| d.name().to_string())
            .collect()
    }
}
