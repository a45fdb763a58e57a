//! Rule metadata consulted by the binder: which columns pick a shard, which table has a generated
//! key, and which columns carry an encryptor.

pub mod encrypt;
pub mod sharding;

use std::fmt::Debug;
use std::sync::Arc;

pub use self::encrypt::{EncryptColumnConfig, EncryptRule, EncryptRuleConfig, EncryptTableConfig};
pub use self::sharding::{ShardingRule, ShardingRuleConfig, ShardingTableConfig};

pub type ShardingRuleRef = Arc<dyn ShardingRuleProvider>;
pub type EncryptRuleRef = Arc<dyn EncryptRuleProvider>;

pub trait ShardingRuleProvider: Debug + Send + Sync {
    /// Returns `true` if the logical table is sharded.
    fn is_sharding_table(&self, table: &str) -> bool;

    /// Returns `true` if the column's value participates in choosing a physical shard.
    fn is_sharding_column(&self, table: &str, column: &str) -> bool;

    /// Returns the column whose value is generated by the middleware, if any.
    fn generate_key_column(&self, table: &str) -> Option<&str>;
}

pub trait EncryptRuleProvider: Debug + Send + Sync {
    /// Returns the name of the encryptor configured for the column, if any.
    fn find_encryptor(&self, table: &str, column: &str) -> Option<&str>;

    #[inline]
    fn is_encrypt_column(&self, table: &str, column: &str) -> bool {
        self.find_encryptor(table, column).is_some()
    }
}

/// The set of rules active for one logical database. Absent rules never match.
#[derive(Debug, Clone, Default)]
pub struct RuleMetadata {
    sharding: Option<ShardingRuleRef>,
    encrypt: Option<EncryptRuleRef>,
}

impl RuleMetadata {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_sharding(mut self, rule: impl ShardingRuleProvider + 'static) -> Self {
        self.sharding = Some(Arc::new(rule));
        self
    }

    #[inline]
    pub fn with_encrypt(mut self, rule: impl EncryptRuleProvider + 'static) -> Self {
        self.encrypt = Some(Arc::new(rule));
        self
    }

    #[inline]
    pub fn sharding(&self) -> Option<&ShardingRuleRef> {
        self.sharding.as_ref()
    }

    #[inline]
    pub fn encrypt(&self) -> Option<&EncryptRuleRef> {
        self.encrypt.as_ref()
    }

    pub fn is_sharding_column(&self, table: &str, column: &str) -> bool {
        self.sharding
            .as_ref()
            .is_some_and(|rule| rule.is_sharding_column(table, column))
    }

    pub fn generate_key_column(&self, table: &str) -> Option<&str> {
        self.sharding
            .as_ref()
            .and_then(|rule| rule.generate_key_column(table))
    }

    pub fn find_encryptor(&self, table: &str, column: &str) -> Option<&str> {
        self.encrypt
            .as_ref()
            .and_then(|rule| rule.find_encryptor(table, column))
    }

    #[inline]
    pub fn is_encrypt_column(&self, table: &str, column: &str) -> bool {
        self.find_encryptor(table, column).is_some()
    }
}
