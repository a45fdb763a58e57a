use std::collections::HashMap;

use serde::Deserialize;

use super::EncryptRuleProvider;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EncryptRuleConfig {
    pub tables: Vec<EncryptTableConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EncryptTableConfig {
    pub name: String,
    pub columns: Vec<EncryptColumnConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EncryptColumnConfig {
    pub name: String,
    pub encryptor: String,
}

/// Encrypt rule keyed by lower-cased table name, then lower-cased column name.
#[derive(Debug, Default)]
pub struct EncryptRule {
    tables: HashMap<String, HashMap<String, String>>,
}

impl EncryptRule {
    pub fn new(config: EncryptRuleConfig) -> Self {
        let tables = config
            .tables
            .into_iter()
            .map(|table| {
                let columns = table
                    .columns
                    .into_iter()
                    .map(|c| (c.name.to_lowercase(), c.encryptor))
                    .collect();
                (table.name.to_lowercase(), columns)
            })
            .collect();
        Self { tables }
    }
}

impl From<EncryptRuleConfig> for EncryptRule {
    #[inline]
    fn from(config: EncryptRuleConfig) -> Self {
        Self::new(config)
    }
}

impl EncryptRuleProvider for EncryptRule {
    fn find_encryptor(&self, table: &str, column: &str) -> Option<&str> {
        self.tables
            .get(&table.to_lowercase())?
            .get(&column.to_lowercase())
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{RuleMetadata, ShardingRule};

    #[test]
    fn test_find_encryptor() {
        let config: EncryptRuleConfig = serde_json::from_str(
            r#"{"tables":[{"name":"t_user","columns":[{"name":"pwd","encryptor":"aes"}]}]}"#,
        )
        .unwrap();
        let rule = EncryptRule::new(config);
        assert_eq!(rule.find_encryptor("T_USER", "PWD"), Some("aes"));
        assert!(!rule.is_encrypt_column("t_user", "user_id"));
    }

    #[test]
    fn test_absent_rules_never_match() {
        let rules = RuleMetadata::new().with_sharding(ShardingRule::default());
        assert!(!rules.is_sharding_column("t_order", "order_id"));
        assert!(!rules.is_encrypt_column("t_user", "pwd"));
        assert_eq!(rules.generate_key_column("t_order"), None);
    }
}
