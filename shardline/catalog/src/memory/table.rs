use serde::Deserialize;
use smol_str::SmolStr;

use crate::column::Column;
use crate::provider::TableProvider;

#[derive(Debug, Clone, Deserialize)]
pub struct MemoryTableCatalog {
    name: SmolStr,
    columns: Vec<Column>,
}

impl MemoryTableCatalog {
    #[inline]
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    #[inline]
    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    #[inline]
    pub fn with_columns(mut self, columns: impl IntoIterator<Item = Column>) -> Self {
        self.columns.extend(columns);
        self
    }
}

impl TableProvider for MemoryTableCatalog {
    #[inline]
    fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    fn columns(&self) -> &[Column] {
        &self.columns
    }
}

#[cfg(test)]
mod tests {
    use shardline_common::data_type::DataType;

    use super::*;

    #[test]
    fn test_visible_columns_keep_order() {
        let table = MemoryTableCatalog::new("t_user").with_columns([
            Column::new("user_id", DataType::Integer),
            Column::new("pwd_cipher", DataType::Varchar).with_visible(false),
            Column::new("pwd", DataType::Varchar),
        ]);
        let names: Vec<_> = table.visible_columns().iter().map(|c| c.name()).collect();
        assert_eq!(names, ["user_id", "pwd"]);
    }

    #[test]
    fn test_deserialize_table() {
        let table: MemoryTableCatalog = serde_json::from_str(
            r#"{"name":"t_order","columns":[
                {"name":"order_id","data_type":"bigint","primary_key":true,"generated":true},
                {"name":"status","data_type":"varchar"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(table.name(), "t_order");
        let order_id = table.get_column("ORDER_ID").unwrap();
        assert_eq!(order_id.name(), "order_id");
        assert!(order_id.is_generated());
        assert!(order_id.is_primary_key());
        assert_eq!(table.columns()[1].data_type(), DataType::Varchar);
        assert!(table.columns()[1].is_nullable());
    }
}
