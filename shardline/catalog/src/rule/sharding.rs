use std::collections::HashMap;

use serde::Deserialize;

use super::ShardingRuleProvider;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ShardingRuleConfig {
    pub tables: Vec<ShardingTableConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ShardingTableConfig {
    pub name: String,
    pub sharding_columns: Vec<String>,
    pub generate_key_column: Option<String>,
}

#[derive(Debug)]
struct ShardingTable {
    sharding_columns: Vec<String>,
    generate_key_column: Option<String>,
}

/// Sharding rule built from [`ShardingRuleConfig`]. Table and column names match ignoring ASCII
/// case.
#[derive(Debug, Default)]
pub struct ShardingRule {
    tables: HashMap<String, ShardingTable>,
}

impl ShardingRule {
    pub fn new(config: ShardingRuleConfig) -> Self {
        let tables = config
            .tables
            .into_iter()
            .map(|table| {
                let rule = ShardingTable {
                    sharding_columns: table
                        .sharding_columns
                        .into_iter()
                        .map(|c| c.to_lowercase())
                        .collect(),
                    generate_key_column: table.generate_key_column,
                };
                (table.name.to_lowercase(), rule)
            })
            .collect();
        Self { tables }
    }
}

impl From<ShardingRuleConfig> for ShardingRule {
    #[inline]
    fn from(config: ShardingRuleConfig) -> Self {
        Self::new(config)
    }
}

impl ShardingRuleProvider for ShardingRule {
    #[inline]
    fn is_sharding_table(&self, table: &str) -> bool {
        self.tables.contains_key(&table.to_lowercase())
    }

    fn is_sharding_column(&self, table: &str, column: &str) -> bool {
        self.tables.get(&table.to_lowercase()).is_some_and(|t| {
            t.sharding_columns
                .iter()
                .any(|c| c.eq_ignore_ascii_case(column))
        })
    }

    fn generate_key_column(&self, table: &str) -> Option<&str> {
        self.tables
            .get(&table.to_lowercase())
            .and_then(|t| t.generate_key_column.as_deref())
    }
}
