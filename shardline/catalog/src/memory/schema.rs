use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use smol_str::SmolStr;

use super::table::MemoryTableCatalog;
use crate::error::{CatalogError, CatalogResult};
use crate::provider::{SchemaProvider, TableProvider, TableRef};

#[derive(Debug)]
pub struct MemorySchemaCatalog {
    name: SmolStr,
    tables: HashMap<String, Arc<MemoryTableCatalog>>,
}

impl MemorySchemaCatalog {
    #[inline]
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            tables: HashMap::new(),
        }
    }

    pub fn add_table(&mut self, table: MemoryTableCatalog) -> CatalogResult<()> {
        match self.tables.entry(table.name().to_lowercase()) {
            Entry::Occupied(e) => Err(CatalogError::Duplicate {
                kind: "table",
                name: e.key().clone(),
            }),
            Entry::Vacant(e) => {
                e.insert(Arc::new(table));
                Ok(())
            }
        }
    }

    #[inline]
    pub fn with_table(mut self, table: MemoryTableCatalog) -> CatalogResult<Self> {
        self.add_table(table)?;
        Ok(self)
    }
}

impl SchemaProvider for MemorySchemaCatalog {
    #[inline]
    fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    fn get_table(&self, name: &str) -> CatalogResult<Option<TableRef>> {
        Ok(self.tables.get(&name.to_lowercase()).map(|t| t.clone() as _))
    }

    #[inline]
    fn table_names(&self) -> Vec<String> {
        self.tables.values().map(|t| t.name().to_string()).collect()
    }
}
