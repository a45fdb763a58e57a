use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use smol_str::SmolStr;

use super::schema::MemorySchemaCatalog;
use crate::error::{CatalogError, CatalogResult};
use crate::provider::{DatabaseProvider, SchemaProvider, SchemaRef};

#[derive(Debug)]
pub struct MemoryDatabaseCatalog {
    name: SmolStr,
    schemas: HashMap<String, Arc<MemorySchemaCatalog>>,
}

impl MemoryDatabaseCatalog {
    #[inline]
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            schemas: HashMap::new(),
        }
    }

    pub fn add_schema(&mut self, schema: MemorySchemaCatalog) -> CatalogResult<()> {
        match self.schemas.entry(schema.name().to_lowercase()) {
            Entry::Occupied(e) => Err(CatalogError::Duplicate {
                kind: "schema",
                name: e.key().clone(),
            }),
            Entry::Vacant(e) => {
                e.insert(Arc::new(schema));
                Ok(())
            }
        }
    }

    #[inline]
    pub fn with_schema(mut self, schema: MemorySchemaCatalog) -> CatalogResult<Self> {
        self.add_schema(schema)?;
        Ok(self)
    }
}

impl DatabaseProvider for MemoryDatabaseCatalog {
    #[inline]
    fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    fn get_schema(&self, name: &str) -> CatalogResult<Option<SchemaRef>> {
        Ok(self.schemas.get(&name.to_lowercase()).map(|s| s.clone() as _))
    }
}
