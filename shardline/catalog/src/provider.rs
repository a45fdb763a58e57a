use std::fmt::Debug;
use std::sync::Arc;

use crate::column::Column;
use crate::error::CatalogResult;

pub type CatalogRef = Arc<dyn CatalogProvider>;
pub type DatabaseRef = Arc<dyn DatabaseProvider>;
pub type SchemaRef = Arc<dyn SchemaProvider>;
pub type TableRef = Arc<dyn TableProvider>;

/// A read-only snapshot of logical metadata: databases contain schemas, schemas contain tables.
///
/// Lookups by name are expected to be case-insensitive.
pub trait CatalogProvider: Debug + Send + Sync {
    /// Retrieves a logical database by its name.
    fn get_database(&self, name: &str) -> CatalogResult<Option<DatabaseRef>>;

    /// Returns the names of all logical databases.
    fn database_names(&self) -> Vec<String>;

    #[inline]
    fn contains_database(&self, name: &str) -> CatalogResult<bool> {
        Ok(self.get_database(name)?.is_some())
    }
}

pub trait DatabaseProvider: Debug + Send + Sync {
    /// Returns the name of the database.
    fn name(&self) -> &str;

    /// Retrieves a schema by its name.
    fn get_schema(&self, name: &str) -> CatalogResult<Option<SchemaRef>>;

    #[inline]
    fn contains_schema(&self, name: &str) -> CatalogResult<bool> {
        Ok(self.get_schema(name)?.is_some())
    }
}

pub trait SchemaProvider: Debug + Send + Sync {
    /// Returns the name of the schema.
    fn name(&self) -> &str;

    /// Retrieves a table by its name.
    fn get_table(&self, name: &str) -> CatalogResult<Option<TableRef>>;

    /// Returns the names of all tables in the schema.
    fn table_names(&self) -> Vec<String>;

    #[inline]
    fn contains_table(&self, name: &str) -> CatalogResult<bool> {
        Ok(self.get_table(name)?.is_some())
    }
}

/// Represents a logical table. Columns are returned in declaration order.
pub trait TableProvider: Debug + Send + Sync {
    /// Returns the name of the table.
    fn name(&self) -> &str;

    /// Returns all columns of the table in declaration order.
    fn columns(&self) -> &[Column];

    /// Retrieves a column by its name, ignoring ASCII case.
    #[inline]
    fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns()
            .iter()
            .find(|c| c.name().eq_ignore_ascii_case(name))
    }

    #[inline]
    fn contains_column(&self, name: &str) -> bool {
        self.get_column(name).is_some()
    }

    /// Returns the columns that take part in a derived insert column list.
    fn visible_columns(&self) -> Vec<&Column> {
        self.columns().iter().filter(|c| c.is_visible()).collect()
    }
}
