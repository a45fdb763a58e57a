use std::borrow::Borrow;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use shardline_common::data_type::DataType;
use smol_str::SmolStr;

/// Column metadata of a logical table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    name: SmolStr,
    data_type: DataType,
    #[serde(default)]
    primary_key: bool,
    #[serde(default = "default_nullable")]
    nullable: bool,
    /// Whether the database generates the value, e.g. an auto-increment key.
    #[serde(default)]
    generated: bool,
    /// Invisible columns are derived by rules (assisted query or cipher columns) and are never
    /// part of a derived insert column list.
    #[serde(default = "default_visible")]
    visible: bool,
}

fn default_nullable() -> bool {
    true
}

fn default_visible() -> bool {
    true
}

impl Borrow<str> for Column {
    fn borrow(&self) -> &str {
        &self.name
    }
}

impl Hash for Column {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.as_str().hash(state);
    }
}

impl Column {
    #[inline]
    pub fn new(name: impl Into<SmolStr>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            primary_key: false,
            nullable: true,
            generated: false,
            visible: true,
        }
    }

    #[inline]
    pub fn with_primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    #[inline]
    pub fn with_generated(mut self) -> Self {
        self.generated = true;
        self
    }

    #[inline]
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    #[inline]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    #[inline]
    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    #[inline]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    #[inline]
    pub fn is_generated(&self) -> bool {
        self.generated
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }
}
